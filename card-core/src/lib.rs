//! # Greeting Card Core
//!
//! Editor logic for the greeting card maker. Compiles to WASM so the
//! browser editor runs the same code as native tests.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                card-core                    │
//! ├─────────────────────────────────────────────┤
//! │  Text Item Store │  Pointer-Drag Controller │
//! │  - Ordered items │  - Mouse/touch events    │
//! │  - Selection     │  - Scoped listeners      │
//! │  - Clamping      │  - Percent positioning   │
//! ├─────────────────────────────────────────────┤
//! │  Editor facade   │  Card session            │
//! │  - Catalog       │  - Idle/Generating/...   │
//! │  - Style panel   │  - Generator trait       │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod drag;
pub mod editor;
pub mod error;
pub mod event;
pub mod item;
pub mod session;
pub mod store;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use catalog::{Greeting, GreetingCatalog};
pub use config::{Bounds, EditorConfig};
pub use drag::{DragController, GestureOutcome, ListenerScope, NoopScope};
pub use editor::{Editor, HINT_DRAG, HINT_PICK};
pub use error::{CardError, CardResult};
pub use event::{ContainerRect, PointerEvent, PointerPhase, PointerPoint, PointerSource};
pub use item::{ItemId, ItemPatch, TextColor, TextItem};
pub use session::{CardSession, Generator, SessionPhase, DEFAULT_GENERATION_ERROR};
pub use store::TextItemStore;

/// Card core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
