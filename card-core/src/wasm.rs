//! WebAssembly bindings for the browser editor.
//!
//! The page owns the DOM; this module owns the editor state. Drag listeners
//! are attached and detached by page-supplied callbacks so the page never
//! keeps a `mousemove`/`touchmove` listener alive across gestures.

use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::{
    ContainerRect, Editor, GestureOutcome, ItemId, ListenerScope, PointerEvent, PointerPhase,
    PointerPoint, PointerSource, TextColor,
};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Listener scope backed by two JavaScript functions.
struct JsListenerScope {
    attach: js_sys::Function,
    detach: js_sys::Function,
}

impl ListenerScope for JsListenerScope {
    fn attach(&self) {
        if let Err(e) = self.attach.call0(&JsValue::NULL) {
            tracing::warn!("attach callback threw: {e:?}");
        }
    }

    fn detach(&self) {
        if let Err(e) = self.detach.call0(&JsValue::NULL) {
            tracing::warn!("detach callback threw: {e:?}");
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn id_to_js(id: ItemId) -> f64 {
    id.get() as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn id_from_js(raw: f64) -> Option<ItemId> {
    (raw.is_finite() && raw >= 0.0).then(|| ItemId::from_raw(raw as u64))
}

fn parse_phase(phase: &str) -> Result<PointerPhase, String> {
    match phase {
        "press" | "mousedown" | "touchstart" => Ok(PointerPhase::Press),
        "move" | "mousemove" | "touchmove" => Ok(PointerPhase::Move),
        "release" | "mouseup" | "touchend" => Ok(PointerPhase::Release),
        "cancel" | "touchcancel" => Ok(PointerPhase::Cancel),
        other => Err(format!("unknown pointer phase: {other}")),
    }
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor. `attach`/`detach` are called when a drag starts and
    /// ends and should add/remove the page's document-level listeners.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(attach: js_sys::Function, detach: js_sys::Function) -> Self {
        let scope = Rc::new(JsListenerScope { attach, detach });
        Self {
            editor: Editor::new().with_listener_scope(scope),
        }
    }

    /// Place a catalog greeting. Returns the new item id, or `undefined`.
    #[wasm_bindgen(js_name = addGreeting)]
    pub fn add_greeting(&mut self, greeting_id: u32) -> Option<f64> {
        self.editor.add_greeting(greeting_id).map(id_to_js)
    }

    /// Remove an item; unknown ids are ignored.
    pub fn remove(&mut self, id: f64) -> bool {
        id_from_js(id).is_some_and(|id| self.editor.remove(id))
    }

    /// Select an item, or clear the selection with `undefined`.
    pub fn select(&mut self, id: Option<f64>) {
        self.editor.select(id.and_then(id_from_js));
    }

    /// Set the selected item's font size.
    #[wasm_bindgen(js_name = setFontSize)]
    pub fn set_font_size(&mut self, size: u32) -> bool {
        self.editor.set_font_size(size)
    }

    /// Set the selected item's color from a palette hex string.
    ///
    /// # Errors
    ///
    /// Returns an error string for an off-palette color.
    #[wasm_bindgen(js_name = setColor)]
    pub fn set_color(&mut self, hex: &str) -> Result<bool, String> {
        let color: TextColor = hex.parse().map_err(|e: crate::CardError| e.to_string())?;
        Ok(self.editor.set_color(color))
    }

    /// Report the container's bounding client rect for export scaling.
    #[wasm_bindgen(js_name = setContainer)]
    pub fn set_container(&mut self, left: f32, top: f32, width: f32, height: f32) {
        self.editor
            .set_container(ContainerRect::new(left, top, width, height));
    }

    /// Feed a pointer event. `coords` holds `[x0, y0, x1, y1, ...]` client
    /// coordinates (one pair for mouse, every touch for touch events) and
    /// `target` the id of the item the event was delivered to.
    /// `left`/`top`/`width`/`height` are the container's
    /// `getBoundingClientRect()` measured for this event.
    ///
    /// Returns `true` when the store changed.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown phase name.
    #[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
    pub fn pointer(
        &mut self,
        phase: &str,
        is_touch: bool,
        coords: Vec<f32>,
        target: Option<f64>,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
    ) -> Result<bool, String> {
        let phase = parse_phase(phase)?;
        let mut points: Vec<PointerPoint> = coords
            .chunks_exact(2)
            .map(|pair| PointerPoint::new(pair[0], pair[1]))
            .collect();

        let mut event = if is_touch {
            PointerEvent::touch(phase, points)
        } else {
            points.truncate(1);
            PointerEvent {
                source: PointerSource::Mouse,
                ..PointerEvent::touch(phase, points)
            }
        };
        event.target = target.and_then(id_from_js);

        Ok(!matches!(
            self.editor
                .pointer(&event, ContainerRect::new(left, top, width, height)),
            GestureOutcome::Ignored | GestureOutcome::Ended(_)
        ))
    }

    /// Items and selection as JSON.
    #[wasm_bindgen(js_name = itemsJson)]
    #[must_use]
    pub fn items_json(&self) -> String {
        self.editor.store().to_json().unwrap_or_default()
    }

    /// Hint text for the preview.
    #[must_use]
    pub fn hint(&self) -> String {
        self.editor.hint().to_string()
    }
}
