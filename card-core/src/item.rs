//! Text items - the greeting annotations placed on a card.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CardError, EditorConfig};

/// Unique identifier for a text item.
///
/// Ids are handed out by the store from a monotonic counter and are never
/// reused within that store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(u64);

impl ItemId {
    /// Wrap a raw id value (e.g. one echoed back by a host UI).
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed text color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextColor {
    /// `#ffffff`
    White,
    /// `#fbbf24`
    Amber,
    /// `#ff4d4d`
    Red,
    /// `#000000`
    Black,
    /// `#4ade80`
    Green,
    /// `#60a5fa`
    Blue,
}

impl TextColor {
    /// Every palette entry, in swatch order.
    pub const PALETTE: [Self; 6] = [
        Self::White,
        Self::Amber,
        Self::Red,
        Self::Black,
        Self::Green,
        Self::Blue,
    ];

    /// Lowercase `#rrggbb` form.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::White => "#ffffff",
            Self::Amber => "#fbbf24",
            Self::Red => "#ff4d4d",
            Self::Black => "#000000",
            Self::Green => "#4ade80",
            Self::Blue => "#60a5fa",
        }
    }

    /// Color channels as `[r, g, b]`.
    #[must_use]
    pub const fn rgb(self) -> [u8; 3] {
        match self {
            Self::White => [0xff, 0xff, 0xff],
            Self::Amber => [0xfb, 0xbf, 0x24],
            Self::Red => [0xff, 0x4d, 0x4d],
            Self::Black => [0x00, 0x00, 0x00],
            Self::Green => [0x4a, 0xde, 0x80],
            Self::Blue => [0x60, 0xa5, 0xfa],
        }
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex())
    }
}

impl FromStr for TextColor {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::PALETTE
            .into_iter()
            .find(|c| c.hex().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CardError::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for TextColor {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TextColor> for String {
    fn from(color: TextColor) -> Self {
        color.hex().to_string()
    }
}

/// One placed greeting annotation.
///
/// Fields are read-only outside the crate; all mutation goes through
/// [`TextItemStore`](crate::TextItemStore) so the clamping invariants hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItem {
    id: ItemId,
    content: String,
    x: f32,
    y: f32,
    font_size: u32,
    color: TextColor,
}

impl TextItem {
    pub(crate) fn new(id: ItemId, content: String, config: &EditorConfig) -> Self {
        let (x, y) = config.default_position;
        Self {
            id,
            content,
            x: config.position_bounds.clamp(x),
            y: config.position_bounds.clamp(y),
            font_size: config.font_size_bounds.clamp(config.default_font_size),
            color: config.default_color,
        }
    }

    /// Item id.
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Display text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Horizontal centre in percent of the container width.
    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Vertical centre in percent of the container height.
    #[must_use]
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Font size in on-screen pixels.
    #[must_use]
    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    /// Fill color.
    #[must_use]
    pub fn color(&self) -> TextColor {
        self.color
    }

    /// Merge a patch, clamping every field into the configured bounds.
    pub(crate) fn apply(&mut self, patch: &ItemPatch, config: &EditorConfig) {
        if let Some(x) = patch.x.filter(|v| v.is_finite()) {
            self.x = config.position_bounds.clamp(x);
        }
        if let Some(y) = patch.y.filter(|v| v.is_finite()) {
            self.y = config.position_bounds.clamp(y);
        }
        if let Some(size) = patch.font_size {
            self.font_size = config.font_size_bounds.clamp(size);
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }
}

/// A partial update for a [`TextItem`]. Unset fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    /// New horizontal position in percent.
    pub x: Option<f32>,
    /// New vertical position in percent.
    pub y: Option<f32>,
    /// New font size in pixels.
    pub font_size: Option<u32>,
    /// New fill color.
    pub color: Option<TextColor>,
}

impl ItemPatch {
    /// A patch that moves the item.
    #[must_use]
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// A patch that only changes the font size.
    #[must_use]
    pub fn font_size(size: u32) -> Self {
        Self {
            font_size: Some(size),
            ..Self::default()
        }
    }

    /// A patch that only changes the color.
    #[must_use]
    pub fn color(color: TextColor) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    /// Add a font size change.
    #[must_use]
    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Add a color change.
    #[must_use]
    pub fn with_color(mut self, color: TextColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.font_size.is_none() && self.color.is_none()
    }
}
