//! Base image loading.
//!
//! Supports base64 or percent-encoded data URIs (what the generation
//! collaborator returns), raw bytes and files. A [`BaseImage`] only exists
//! once fully decoded, so the compositor can never draw a partial frame.

use std::path::{Path, PathBuf};

use base64::Engine;

use crate::error::{RenderError, RenderResult};

/// Where a base image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A `data:` URI.
    DataUri(String),
    /// Encoded image bytes.
    Bytes(Vec<u8>),
    /// A file on disk.
    Path(PathBuf),
}

impl ImageSource {
    /// Interpret a string reference: `data:` URIs as such, anything else as
    /// a file path.
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        if reference.starts_with("data:") {
            Self::DataUri(reference.to_string())
        } else {
            Self::Path(PathBuf::from(reference))
        }
    }
}

/// A fully decoded base image, ready to draw.
#[derive(Debug, Clone)]
pub struct BaseImage {
    pixmap: tiny_skia::Pixmap,
}

impl BaseImage {
    /// Load and decode an image from any source.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Resource`] if the source cannot be read or
    /// decoded.
    pub fn load(source: &ImageSource) -> RenderResult<Self> {
        match source {
            ImageSource::DataUri(uri) => Self::from_data_uri(uri),
            ImageSource::Bytes(bytes) => Self::from_bytes(bytes),
            ImageSource::Path(path) => Self::from_path(path),
        }
    }

    /// Decode an image from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be decoded.
    pub fn from_bytes(data: &[u8]) -> RenderResult<Self> {
        let img = image::load_from_memory(data)
            .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;

        let pixmap = rgba_to_pixmap(&img.to_rgba8())?;
        tracing::debug!("Decoded base image {}x{}", pixmap.width(), pixmap.height());
        Ok(Self { pixmap })
    }

    /// Decode an image from a data URI such as `data:image/png;base64,iVBOR...`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data URI is malformed or the image cannot be
    /// decoded.
    pub fn from_data_uri(uri: &str) -> RenderResult<Self> {
        let bytes = decode_data_uri(uri)?;
        Self::from_bytes(&bytes)
    }

    /// Read and decode an image file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn from_path(path: &Path) -> RenderResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            RenderError::Resource(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_bytes(&bytes)
    }

    /// A single-color image.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RenderResult<Self> {
        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            RenderError::Resource(format!("Invalid image size {width}x{height}"))
        })?;
        pixmap.fill(tiny_skia::Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
        Ok(Self { pixmap })
    }

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

    pub(crate) fn pixmap(&self) -> &tiny_skia::Pixmap {
        &self.pixmap
    }
}

/// Convert straight-alpha RGBA into a premultiplied pixmap.
fn rgba_to_pixmap(rgba: &image::RgbaImage) -> RenderResult<tiny_skia::Pixmap> {
    let (width, height) = rgba.dimensions();
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RenderError::Resource(format!("Invalid image size {width}x{height}")))?;

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Extract the payload bytes of a data URI.
fn decode_data_uri(uri: &str) -> RenderResult<Vec<u8>> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    // Find the comma separating metadata from data
    let (metadata, encoded_data) = uri_data
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    let mime = metadata.split(';').next().unwrap_or_default();
    if !mime.is_empty() && !mime.to_lowercase().starts_with("image/") {
        return Err(RenderError::Resource(format!(
            "Data URI is not an image: {mime}"
        )));
    }

    if metadata.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data.trim())
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))
    } else {
        Ok(percent_encoding::percent_decode_str(encoded_data).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1x1 red pixel.
    const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    #[test]
    fn test_data_uri_loading() {
        let data_uri = format!("data:image/png;base64,{PNG_BASE64}");
        let image = BaseImage::load(&ImageSource::parse(&data_uri)).expect("valid data URI");
        assert_eq!(image.width(), 1);
        assert_eq!(image.height(), 1);
        let px = image.pixmap().pixel(0, 0).expect("pixel");
        assert_eq!((px.red(), px.green(), px.alpha()), (255, 0, 255));
    }

    #[test]
    fn test_invalid_data_uris() {
        assert!(BaseImage::from_data_uri("not a data uri").is_err());
        assert!(BaseImage::from_data_uri("data:image/png").is_err());
        assert!(BaseImage::from_data_uri("data:text/plain;base64,aGk=").is_err());
        assert!(BaseImage::from_data_uri("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_undecodable_bytes_are_a_resource_error() {
        let result = BaseImage::from_bytes(b"definitely not an image");
        assert!(matches!(result, Err(RenderError::Resource(_))));
    }

    #[test]
    fn test_parse_treats_plain_strings_as_paths() {
        assert_eq!(
            ImageSource::parse("/tmp/card.png"),
            ImageSource::Path(PathBuf::from("/tmp/card.png"))
        );
    }

    #[test]
    fn test_solid_image() {
        let image = BaseImage::solid(4, 2, [10, 20, 30, 255]).expect("solid");
        assert_eq!((image.width(), image.height()), (4, 2));
        let px = image.pixmap().pixel(3, 1).expect("pixel");
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (10, 20, 30, 255));
        assert!(BaseImage::solid(0, 2, [0, 0, 0, 255]).is_err());
    }
}
