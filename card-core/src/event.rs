//! Pointer input for the overlay editor.
//!
//! Mouse and touch input are normalized into one [`PointerEvent`] shape so
//! the drag controller handles both the same way.

use serde::{Deserialize, Serialize};

use crate::ItemId;

/// Phase of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button or finger down.
    Press,
    /// Pointer moved.
    Move,
    /// Button or finger up.
    Release,
    /// Gesture cancelled by the platform.
    Cancel,
}

/// Device the event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerSource {
    /// Mouse or pen.
    Mouse,
    /// Touch screen.
    Touch,
}

/// A pointer position in client (viewport) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerPoint {
    /// X position in pixels.
    pub x: f32,
    /// Y position in pixels.
    pub y: f32,
}

impl PointerPoint {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A normalized mouse or touch event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Gesture phase.
    pub phase: PointerPhase,
    /// Originating device.
    pub source: PointerSource,
    /// Active points. A mouse event carries one; a touch event carries every
    /// current touch, and a touch end may carry none.
    pub points: Vec<PointerPoint>,
    /// Item under the pointer at press time, `None` for the background.
    pub target: Option<ItemId>,
}

impl PointerEvent {
    /// A mouse event at a single position.
    #[must_use]
    pub fn mouse(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            source: PointerSource::Mouse,
            points: vec![PointerPoint::new(x, y)],
            target: None,
        }
    }

    /// A touch event with the current touch list.
    #[must_use]
    pub fn touch(phase: PointerPhase, points: Vec<PointerPoint>) -> Self {
        Self {
            phase,
            source: PointerSource::Touch,
            points,
            target: None,
        }
    }

    /// Mark the item this event was delivered to.
    #[must_use]
    pub fn on_item(mut self, id: ItemId) -> Self {
        self.target = Some(id);
        self
    }

    /// The point that drives a drag: the only mouse point, or the first touch.
    #[must_use]
    pub fn primary_point(&self) -> Option<PointerPoint> {
        self.points.first().copied()
    }
}

/// The editor container's bounding box in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerRect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl ContainerRect {
    /// Create a rect.
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A square container at the origin, the shape of the card preview.
    #[must_use]
    pub const fn square(size: f32) -> Self {
        Self::new(0.0, 0.0, size, size)
    }

    /// Whether the rect has a usable, non-zero area.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for ContainerRect {
    /// The preview size used by the browser editor (`max-w-md`).
    fn default() -> Self {
        Self::square(448.0)
    }
}
