//! # Card Renderer
//!
//! Turns editor state into pixels: the live overlay view, and the flattened
//! square PNG used for download and sharing.
//!
//! ```text
//! ┌───────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │ ImageSource   │──▶│ BaseImage        │──▶│ Compositor       │
//! │ data URI/path │   │ (fully decoded)  │   │ SVG text overlay │
//! └───────────────┘   └──────────────────┘   │ resvg/tiny-skia  │
//!                                            └────────┬─────────┘
//! ┌───────────────┐                                   ▼
//! │ Overlay       │  on-screen layers        ┌──────────────────┐
//! │ Renderer      │  (z-index, focus ring)   │ ExportGateway    │
//! └───────────────┘                          │ download / share │
//!                                            └──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod base_image;
pub mod compositor;
pub mod error;
pub mod gateway;
pub mod overlay;

pub use base_image::{BaseImage, ImageSource};
pub use compositor::{CompositeConfig, Compositor, Surface, MAX_SIZE};
pub use error::{RenderError, RenderResult};
pub use gateway::{
    ExportFile, ExportGateway, ShareConfig, ShareError, ShareOutcome, ShareTarget, PNG_MIME,
};
pub use overlay::{OverlayFrame, OverlayLayer, OverlayRenderer, LAYER_Z_INDEX, SELECTED_Z_INDEX};
