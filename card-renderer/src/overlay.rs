//! On-screen overlay: the base image plus one positioned layer per item.
//!
//! Purely presentational. A host either reads the [`OverlayFrame`] (as
//! struct or JSON) and patches its own DOM, or injects
//! [`OverlayRenderer::render_html`] output directly.

use std::fmt::Write;

use card_core::{Editor, ItemId, TextColor, TextItem};
use serde::Serialize;

/// Stacking index of the selected layer.
pub const SELECTED_Z_INDEX: u32 = 50;

/// Stacking index of every other layer.
pub const LAYER_Z_INDEX: u32 = 10;

const TEXT_SHADOW: &str = "0 2px 8px rgba(0,0,0,0.6)";

/// One positioned text layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayLayer {
    /// Item this layer shows.
    pub id: ItemId,
    /// Display text.
    pub content: String,
    /// Layer centre, percent of container width.
    pub left_pct: f32,
    /// Layer centre, percent of container height.
    pub top_pct: f32,
    /// Font size in CSS pixels.
    pub font_size_px: u32,
    /// Text color.
    pub color: TextColor,
    /// Stacking index.
    pub z_index: u32,
    /// Whether the layer gets the focus treatment and a remove button.
    pub selected: bool,
    /// Scale applied on top of the centring translation.
    pub scale: f32,
}

impl OverlayLayer {
    fn from_item(item: &TextItem, selected: bool, selected_scale: f32) -> Self {
        Self {
            id: item.id(),
            content: item.content().to_string(),
            left_pct: item.x(),
            top_pct: item.y(),
            font_size_px: item.font_size(),
            color: item.color(),
            z_index: if selected {
                SELECTED_Z_INDEX
            } else {
                LAYER_Z_INDEX
            },
            selected,
            scale: if selected { selected_scale } else { 1.0 },
        }
    }

    /// Inline CSS for the layer element.
    #[must_use]
    pub fn style(&self) -> String {
        let scale = if (self.scale - 1.0).abs() > f32::EPSILON {
            format!(" scale({})", self.scale)
        } else {
            String::new()
        };
        format!(
            "position:absolute;left:{}%;top:{}%;font-size:{}px;color:{};z-index:{};\
             transform:translate(-50%,-50%){scale};text-shadow:{TEXT_SHADOW};\
             font-weight:900;white-space:nowrap",
            self.left_pct,
            self.top_pct,
            self.font_size_px,
            self.color.hex(),
            self.z_index,
        )
    }
}

/// Everything the preview shows for one editor state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayFrame {
    /// Base image reference, if one is loaded.
    pub image_src: Option<String>,
    /// Layers bottom to top; the selected layer comes last.
    pub layers: Vec<OverlayLayer>,
    /// Hint text under the preview.
    pub hint: String,
}

impl OverlayFrame {
    /// The selected layer, if any.
    #[must_use]
    pub fn selected_layer(&self) -> Option<&OverlayLayer> {
        self.layers.iter().find(|layer| layer.selected)
    }

    /// Serialize the frame to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Builds overlay frames from editor state.
#[derive(Debug, Clone, Copy)]
pub struct OverlayRenderer {
    selected_scale: f32,
}

impl OverlayRenderer {
    /// Create a renderer that enlarges the selected layer by 10%.
    #[must_use]
    pub fn new() -> Self {
        Self {
            selected_scale: 1.1,
        }
    }

    /// Set the focus scale of the selected layer.
    #[must_use]
    pub fn with_selected_scale(mut self, scale: f32) -> Self {
        self.selected_scale = scale;
        self
    }

    /// Build the frame for the editor's current state.
    #[must_use]
    pub fn frame(&self, editor: &Editor, image_src: Option<&str>) -> OverlayFrame {
        let store = editor.store();
        let selected = store.selected();
        let layers = store
            .display_order()
            .map(|item| {
                OverlayLayer::from_item(item, Some(item.id()) == selected, self.selected_scale)
            })
            .collect();

        OverlayFrame {
            image_src: image_src.map(str::to_string),
            layers,
            hint: editor.hint().to_string(),
        }
    }

    /// Render a frame as self-contained HTML markup.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn render_html(&self, frame: &OverlayFrame) -> String {
        let mut html = String::from(
            "<div class=\"card-overlay\" style=\"position:relative;aspect-ratio:1/1;overflow:hidden\">",
        );

        if let Some(src) = &frame.image_src {
            let _ = write!(
                html,
                "<img src=\"{}\" alt=\"card\" style=\"width:100%;height:100%;object-fit:cover;pointer-events:none\"/>",
                escape_markup(src)
            );
        }

        for layer in &frame.layers {
            let class = if layer.selected {
                "card-layer selected"
            } else {
                "card-layer"
            };
            let _ = write!(
                html,
                "<div class=\"{class}\" data-id=\"{}\" style=\"{}\">{}",
                layer.id,
                layer.style(),
                escape_markup(&layer.content)
            );
            if layer.selected {
                let _ = write!(
                    html,
                    "<button class=\"card-remove\" data-id=\"{}\">\u{2715}</button>",
                    layer.id
                );
            }
            html.push_str("</div>");
        }

        html.push_str("</div>");
        let _ = write!(
            html,
            "<p class=\"card-hint\">{}</p>",
            escape_markup(&frame.hint)
        );
        html
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape special XML/HTML characters.
pub(crate) fn escape_markup(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_core::{HINT_DRAG, HINT_PICK};

    #[test]
    fn test_selected_layer_is_stacked_last() {
        let mut editor = Editor::new();
        let a = editor.add_text("first");
        let b = editor.add_text("second");
        editor.select(Some(a));

        let frame = OverlayRenderer::new().frame(&editor, Some("data:image/png;base64,AA=="));
        let ids: Vec<_> = frame.layers.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![b, a]);
        assert_eq!(frame.layers[0].z_index, LAYER_Z_INDEX);
        assert_eq!(frame.layers[1].z_index, SELECTED_Z_INDEX);
        assert_eq!(frame.selected_layer().map(|l| l.id), Some(a));
        assert_eq!(frame.hint, HINT_DRAG);
    }

    #[test]
    fn test_layers_keep_store_order_without_selection() {
        let mut editor = Editor::new();
        let a = editor.add_text("first");
        let b = editor.add_text("second");
        editor.select(None);

        let frame = OverlayRenderer::new().frame(&editor, None);
        let ids: Vec<_> = frame.layers.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![a, b]);
        assert!(frame.layers.iter().all(|l| l.z_index == LAYER_Z_INDEX));
    }

    #[test]
    fn test_empty_editor_shows_pick_hint() {
        let frame = OverlayRenderer::new().frame(&Editor::new(), None);
        assert!(frame.layers.is_empty());
        assert!(frame.image_src.is_none());
        assert_eq!(frame.hint, HINT_PICK);
    }

    #[test]
    fn test_layer_style() {
        let mut editor = Editor::new();
        editor.add_text("Hi");
        let frame = OverlayRenderer::new().frame(&editor, None);
        let style = frame.layers[0].style();

        assert!(style.contains("left:50%"));
        assert!(style.contains("top:50%"));
        assert!(style.contains("font-size:32px"));
        assert!(style.contains("color:#ffffff"));
        assert!(style.contains("z-index:50"));
        assert!(style.contains("translate(-50%,-50%) scale(1.1)"));

        editor.select(None);
        let frame = OverlayRenderer::new().frame(&editor, None);
        assert!(!frame.layers[0].style().contains("scale"));
    }

    #[test]
    fn test_custom_selected_scale() {
        let mut editor = Editor::new();
        editor.add_text("Hi");
        let frame = OverlayRenderer::new()
            .with_selected_scale(1.25)
            .frame(&editor, None);
        assert!(frame.layers[0].style().contains("scale(1.25)"));
    }

    #[test]
    fn test_html_escapes_content_and_marks_selection() {
        let mut editor = Editor::new();
        editor.add_text("<b>&\"fun\"</b>");
        let renderer = OverlayRenderer::new();
        let html = renderer.render_html(&renderer.frame(&editor, Some("a\"b.png")));

        assert!(html.contains("&lt;b&gt;&amp;&quot;fun&quot;&lt;/b&gt;"));
        assert!(html.contains("src=\"a&quot;b.png\""));
        assert!(html.contains("card-layer selected"));
        assert!(html.contains("card-remove"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_only_selected_layer_has_remove_button() {
        let mut editor = Editor::new();
        editor.add_text("a");
        editor.add_text("b");
        let renderer = OverlayRenderer::new();
        let html = renderer.render_html(&renderer.frame(&editor, None));
        assert_eq!(html.matches("card-remove").count(), 1);
    }

    #[test]
    fn test_frame_json() {
        let mut editor = Editor::new();
        editor.add_text("Hi");
        let json = OverlayRenderer::new()
            .frame(&editor, None)
            .to_json()
            .expect("json");
        assert!(json.contains("\"fontSizePx\":32"));
        assert!(json.contains("\"zIndex\":50"));
        assert!(json.contains("\"color\":\"#ffffff\""));
    }
}
