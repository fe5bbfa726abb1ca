//! Export compositing.
//!
//! Flattens a base image and the store's text items onto a fixed square
//! surface. Text is laid out as an SVG overlay and rasterized with
//! resvg/tiny-skia straight onto the surface holding the base image:
//!
//! ```text
//! background fill -> base image (stretched) -> per item: stroke, then fill
//! ```
//!
//! Items are painted in store order, so later items cover earlier ones.

use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;

use card_core::{Editor, TextItem};
use serde::{Deserialize, Serialize};

use crate::base_image::BaseImage;
use crate::error::{RenderError, RenderResult};
use crate::overlay::escape_markup;

/// Largest accepted output edge in pixels.
pub const MAX_SIZE: u32 = 8192;

/// Compositor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeConfig {
    /// Output edge length in pixels.
    pub size: u32,
    /// Outline width as a fraction of the scaled font size.
    pub stroke_ratio: f32,
    /// Outline color as RGB.
    pub stroke_color: [u8; 3],
    /// Outline opacity in `[0, 1]`.
    pub stroke_opacity: f32,
    /// CSS-style font family list.
    pub font_family: String,
    /// Font weight.
    pub font_weight: u16,
    /// Extra directories to load fonts from, on top of system fonts.
    pub font_dirs: Vec<PathBuf>,
    /// Fill behind the base image, visible only where it is transparent.
    pub background: [u8; 4],
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            size: 1024,
            stroke_ratio: 0.15,
            stroke_color: [0, 0, 0],
            stroke_opacity: 0.4,
            font_family: "\"Noto Sans TC\", sans-serif".to_string(),
            font_weight: 900,
            font_dirs: Vec::new(),
            background: [0, 0, 0, 255],
        }
    }
}

impl CompositeConfig {
    /// Set the output edge length.
    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Load fonts from an extra directory.
    #[must_use]
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    /// Set the background fill.
    #[must_use]
    pub fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.background = rgba;
        self
    }

    /// Parse settings from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] for malformed JSON.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        serde_json::from_str(json).map_err(|e| RenderError::InvalidConfig(e.to_string()))
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> RenderResult<()> {
        if self.size == 0 || self.size > MAX_SIZE {
            return Err(RenderError::InvalidConfig(format!(
                "size must be in 1..={MAX_SIZE}, got {}",
                self.size
            )));
        }
        if !self.stroke_ratio.is_finite() || self.stroke_ratio < 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "stroke_ratio must be a non-negative number, got {}",
                self.stroke_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.stroke_opacity) {
            return Err(RenderError::InvalidConfig(format!(
                "stroke_opacity must be in [0, 1], got {}",
                self.stroke_opacity
            )));
        }
        if self.font_family.trim().is_empty() {
            return Err(RenderError::InvalidConfig(
                "font_family must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A composited card.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pixmap: tiny_skia::Pixmap,
}

impl Surface {
    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha RGBA of one pixel, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        // tiny-skia only bounds-checks the flat index, so x past the width
        // would wrap onto the next row.
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Encode the surface as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Export`] if encoding fails.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }
}

/// Flattens base images and text items into export surfaces.
pub struct Compositor {
    config: CompositeConfig,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Compositor {
    /// Create a compositor, loading system fonts plus any configured font
    /// directories.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] if the configuration is
    /// unusable.
    pub fn new(config: CompositeConfig) -> RenderResult<Self> {
        config.validate()?;

        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in &config.font_dirs {
            db.load_fonts_dir(dir);
        }
        if db.is_empty() {
            tracing::warn!("No fonts found; text items will not be drawn");
        } else {
            tracing::debug!("Loaded {} font faces", db.len());
        }

        Ok(Self {
            config,
            fontdb: Arc::new(db),
        })
    }

    /// Create a compositor with default settings.
    ///
    /// # Errors
    ///
    /// Never fails with the default configuration; the `Result` mirrors
    /// [`Compositor::new`].
    pub fn with_defaults() -> RenderResult<Self> {
        Self::new(CompositeConfig::default())
    }

    /// The active settings.
    #[must_use]
    pub fn config(&self) -> &CompositeConfig {
        &self.config
    }

    /// Number of font faces available for text.
    #[must_use]
    pub fn font_count(&self) -> usize {
        self.fontdb.len()
    }

    /// Composite the editor's items over `base`, scaled from the editor's
    /// current container width.
    ///
    /// # Errors
    ///
    /// See [`Compositor::composite`].
    pub fn composite_editor(&self, base: &BaseImage, editor: &Editor) -> RenderResult<Surface> {
        self.composite(base, editor.store().items(), editor.container().width)
    }

    /// Composite `items` over `base`.
    ///
    /// `container_width` is the on-screen width the items were laid out
    /// against; font sizes are scaled by `size / container_width`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] for a non-positive container
    /// width, and [`RenderError::Export`] if the overlay cannot be built.
    pub fn composite(
        &self,
        base: &BaseImage,
        items: &[TextItem],
        container_width: f32,
    ) -> RenderResult<Surface> {
        if !container_width.is_finite() || container_width <= 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "container width must be positive, got {container_width}"
            )));
        }

        let size = self.config.size;
        #[allow(clippy::cast_precision_loss)]
        let edge = size as f32;
        let scale = edge / container_width;

        let mut pixmap = tiny_skia::Pixmap::new(size, size)
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;
        let [r, g, b, a] = self.config.background;
        pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));

        Self::draw_base(&mut pixmap, base, edge);

        if !items.is_empty() {
            let svg = self.overlay_svg(items, scale);
            let tree = self.parse_overlay(&svg)?;
            resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
        }

        tracing::debug!(
            "Composited {} items at {size}x{size} (scale {scale:.3})",
            items.len()
        );
        Ok(Surface { pixmap })
    }

    /// Build the text overlay as an SVG document of the output size.
    ///
    /// Each item becomes an outline `<text>` followed by a fill `<text>`,
    /// both centred on the item's position.
    #[must_use]
    pub fn overlay_svg(&self, items: &[TextItem], scale: f32) -> String {
        let size = self.config.size;
        #[allow(clippy::cast_precision_loss)]
        let edge = size as f32;
        let family = escape_markup(&self.config.font_family);
        let weight = self.config.font_weight;
        let [sr, sg, sb] = self.config.stroke_color;

        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">"
        );

        for item in items {
            #[allow(clippy::cast_precision_loss)]
            let font_px = item.font_size() as f32 * scale;
            let x = item.x() / 100.0 * edge;
            let y = item.y() / 100.0 * edge;
            let content = escape_markup(item.content());
            tracing::trace!(
                "Layer {} at ({x:.1}, {y:.1}) size {font_px:.1}px",
                item.id()
            );

            let common = format!(
                "x=\"{x}\" y=\"{y}\" font-size=\"{font_px}\" font-family=\"{family}\" font-weight=\"{weight}\" text-anchor=\"middle\" dominant-baseline=\"central\""
            );
            let _ = write!(
                svg,
                "<text {common} fill=\"none\" stroke=\"#{sr:02x}{sg:02x}{sb:02x}\" stroke-opacity=\"{}\" stroke-width=\"{}\">{content}</text>",
                self.config.stroke_opacity,
                font_px * self.config.stroke_ratio,
            );
            let _ = write!(
                svg,
                "<text {common} fill=\"{}\">{content}</text>",
                item.color().hex()
            );
        }

        svg.push_str("</svg>");
        svg
    }

    fn parse_overlay(&self, svg: &str) -> RenderResult<usvg::Tree> {
        let options = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            font_resolver: font_resolver(),
            ..Default::default()
        };
        usvg::Tree::from_str(svg, &options)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))
    }

    /// Stretch the base image over the whole surface.
    fn draw_base(pixmap: &mut tiny_skia::Pixmap, base: &BaseImage, edge: f32) {
        #[allow(clippy::cast_precision_loss)]
        let (sx, sy) = (
            edge / base.width() as f32,
            edge / base.height() as f32,
        );
        let quality = if (sx - 1.0).abs() < f32::EPSILON && (sy - 1.0).abs() < f32::EPSILON {
            tiny_skia::FilterQuality::Nearest
        } else {
            tiny_skia::FilterQuality::Bicubic
        };
        let paint = tiny_skia::PixmapPaint {
            quality,
            ..tiny_skia::PixmapPaint::default()
        };
        pixmap.draw_pixmap(
            0,
            0,
            base.pixmap().as_ref(),
            &paint,
            tiny_skia::Transform::from_scale(sx, sy),
            None,
        );
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("config", &self.config)
            .field("font_faces", &self.fontdb.len())
            .finish()
    }
}

/// Resolve the requested families, then generic families, then any face at
/// all, so text still renders on hosts without the preferred font.
fn font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families: Vec<usvg::fontdb::Family<'_>> = font
                .families()
                .iter()
                .map(|family| match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                })
                .collect();
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Serif);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };
            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|face| face.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compositor(size: u32) -> Compositor {
        Compositor::new(CompositeConfig::default().with_size(size)).expect("compositor")
    }

    #[test]
    fn test_config_defaults() {
        let config = CompositeConfig::default();
        assert_eq!(config.size, 1024);
        assert!((config.stroke_ratio - 0.15).abs() < f32::EPSILON);
        assert!((config.stroke_opacity - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.font_weight, 900);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        for config in [
            CompositeConfig::default().with_size(0),
            CompositeConfig::default().with_size(MAX_SIZE + 1),
            CompositeConfig {
                stroke_ratio: -1.0,
                ..CompositeConfig::default()
            },
            CompositeConfig {
                stroke_opacity: 1.5,
                ..CompositeConfig::default()
            },
            CompositeConfig {
                font_family: "  ".to_string(),
                ..CompositeConfig::default()
            },
        ] {
            assert!(matches!(
                Compositor::new(config),
                Err(RenderError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_config_from_json() {
        let config = CompositeConfig::from_json(r#"{"size": 512}"#).expect("json");
        assert_eq!(config.size, 512);
        assert_eq!(config.font_weight, 900);
        assert!(CompositeConfig::from_json("{").is_err());
    }

    #[test]
    fn test_overlay_svg_layout() {
        let mut editor = Editor::new();
        editor.add_text("A&B");
        let compositor = compositor(1000);

        let svg = compositor.overlay_svg(editor.store().items(), 2.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("x=\"500\" y=\"500\""));
        assert!(svg.contains("font-size=\"64\""));
        assert!(svg.contains("stroke-width=\"9.6\""));
        assert!(svg.contains("stroke-opacity=\"0.4\""));
        assert!(svg.contains("fill=\"#ffffff\""));
        assert!(svg.contains("A&amp;B"));
        assert!(svg.contains("&quot;Noto Sans TC&quot;"));

        // Outline is emitted before the fill.
        let stroke_at = svg.find("stroke=\"#000000\"").expect("stroke");
        let fill_at = svg.find("fill=\"#ffffff\"").expect("fill");
        assert!(stroke_at < fill_at);
    }

    #[test]
    fn test_overlay_svg_keeps_store_order() {
        let mut editor = Editor::new();
        editor.add_text("first");
        editor.add_text("second");
        let svg = compositor(64).overlay_svg(editor.store().items(), 1.0);
        let first = svg.find(">first<").expect("first");
        let second = svg.find(">second<").expect("second");
        assert!(first < second);
    }

    #[test]
    fn test_base_only_composite() {
        let base = BaseImage::solid(8, 8, [200, 100, 50, 255]).expect("base");
        let surface = compositor(32).composite(&base, &[], 448.0).expect("composite");

        assert_eq!((surface.width(), surface.height()), (32, 32));
        for (x, y) in [(0, 0), (31, 31), (16, 16)] {
            let px = surface.pixel(x, y).expect("pixel");
            for (got, want) in px.iter().zip([200u8, 100, 50, 255]) {
                assert!(got.abs_diff(want) <= 2, "pixel ({x},{y}) = {px:?}");
            }
        }
        assert!(surface.pixel(32, 0).is_none());
    }

    #[test]
    fn test_pixel_outside_surface_is_none() {
        let base = BaseImage::solid(8, 8, [200, 100, 50, 255]).expect("base");
        let surface = compositor(32).composite(&base, &[], 448.0).expect("composite");

        assert!(surface.pixel(32, 0).is_none());
        assert!(surface.pixel(40, 3).is_none());
        assert!(surface.pixel(0, 32).is_none());
        assert!(surface.pixel(31, 0).is_some());
    }

    #[test]
    fn test_transparent_base_shows_background() {
        let base = BaseImage::solid(4, 4, [0, 0, 0, 0]).expect("base");
        let compositor = Compositor::new(
            CompositeConfig::default()
                .with_size(16)
                .with_background([10, 20, 30, 255]),
        )
        .expect("compositor");
        let surface = compositor.composite(&base, &[], 100.0).expect("composite");
        assert_eq!(surface.pixel(8, 8), Some([10, 20, 30, 255]));
    }

    #[test]
    fn test_zero_container_width_is_rejected() {
        let base = BaseImage::solid(4, 4, [0, 0, 0, 255]).expect("base");
        let compositor = compositor(16);
        assert!(matches!(
            compositor.composite(&base, &[], 0.0),
            Err(RenderError::InvalidConfig(_))
        ));
        assert!(compositor.composite(&base, &[], f32::NAN).is_err());
    }

    #[test]
    fn test_png_encoding() {
        let base = BaseImage::solid(4, 4, [1, 2, 3, 255]).expect("base");
        let png = compositor(16)
            .composite(&base, &[], 100.0)
            .expect("composite")
            .encode_png()
            .expect("png");
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
    }
}
