//! The overlay editor: one store, one drag controller, one catalog.
//!
//! Every writer (pointer gestures, the style panel, the greeting picker and
//! the remove button) funnels through the store's `add`/`remove`/`update`/
//! `select` operations here.

use std::rc::Rc;

use crate::{
    ContainerRect, DragController, EditorConfig, GestureOutcome, GreetingCatalog, ItemId,
    ItemPatch, ListenerScope, PointerEvent, TextColor, TextItemStore,
};

/// Hint shown while an item is selected.
pub const HINT_DRAG: &str = "drag text to move";

/// Hint shown while nothing is selected.
pub const HINT_PICK: &str = "pick a greeting to add";

/// The text overlay editor for one card.
#[derive(Debug)]
pub struct Editor {
    store: TextItemStore,
    drag: DragController,
    container: ContainerRect,
    catalog: GreetingCatalog,
}

impl Editor {
    /// Create an editor with the default catalog and configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GreetingCatalog::default(), EditorConfig::default())
    }

    /// Create an editor with the given catalog and configuration.
    #[must_use]
    pub fn with_config(catalog: GreetingCatalog, config: EditorConfig) -> Self {
        Self {
            store: TextItemStore::with_config(config),
            drag: DragController::new(),
            container: ContainerRect::default(),
            catalog,
        }
    }

    /// Use `scope` for document-level drag listeners.
    ///
    /// Any gesture in progress is ended first.
    #[must_use]
    pub fn with_listener_scope(mut self, scope: Rc<dyn ListenerScope>) -> Self {
        self.drag.release();
        self.drag = DragController::with_scope(scope);
        self
    }

    /// Read-only view of the items and selection.
    #[must_use]
    pub fn store(&self) -> &TextItemStore {
        &self.store
    }

    /// The greeting catalog.
    #[must_use]
    pub fn catalog(&self) -> &GreetingCatalog {
        &self.catalog
    }

    /// The last reported container bounds, used to scale exports.
    #[must_use]
    pub fn container(&self) -> ContainerRect {
        self.container
    }

    /// Report the container's size for exports. Drags do not read this;
    /// each pointer event carries its own measurement.
    pub fn set_container(&mut self, rect: ContainerRect) {
        self.container = rect;
    }

    /// Place the catalog greeting with this id. Returns `None` for an
    /// unknown greeting.
    pub fn add_greeting(&mut self, greeting_id: u32) -> Option<ItemId> {
        let text = self.catalog.get(greeting_id)?.text.clone();
        Some(self.store.add(text))
    }

    /// Place arbitrary text.
    pub fn add_text(&mut self, content: impl Into<String>) -> ItemId {
        self.store.add(content)
    }

    /// Remove an item; no-op if absent. Ends a drag on that item.
    pub fn remove(&mut self, id: ItemId) -> bool {
        if self.drag.active_item() == Some(id) {
            self.drag.release();
        }
        self.store.remove(id).is_some()
    }

    /// Remove the selected item, as the removal affordance does.
    pub fn remove_selected(&mut self) -> Option<ItemId> {
        let id = self.store.selected()?;
        self.remove(id).then_some(id)
    }

    /// Merge a patch into an item; no-op if absent.
    pub fn update(&mut self, id: ItemId, patch: &ItemPatch) -> bool {
        self.store.update(id, patch)
    }

    /// Set or clear the selection.
    pub fn select(&mut self, id: Option<ItemId>) {
        self.store.select(id);
    }

    /// Set the font size of the selected item, clamped to the configured
    /// range. Returns `false` when nothing is selected.
    pub fn set_font_size(&mut self, size: u32) -> bool {
        self.store
            .selected()
            .is_some_and(|id| self.store.update(id, &ItemPatch::font_size(size)))
    }

    /// Set the color of the selected item. Returns `false` when nothing is
    /// selected.
    pub fn set_color(&mut self, color: TextColor) -> bool {
        self.store
            .selected()
            .is_some_and(|id| self.store.update(id, &ItemPatch::color(color)))
    }

    /// Feed a pointer event through the drag controller.
    ///
    /// `container` is the container's bounding box measured for this event.
    /// A usable measurement also becomes the export container.
    pub fn pointer(&mut self, event: &PointerEvent, container: ContainerRect) -> GestureOutcome {
        if container.is_usable() {
            self.container = container;
        }
        self.drag.handle(&mut self.store, event, container)
    }

    /// Whether a drag gesture is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Hint text for the preview area.
    #[must_use]
    pub fn hint(&self) -> &'static str {
        if self.store.selected().is_some() {
            HINT_DRAG
        } else {
            HINT_PICK
        }
    }

    /// End any gesture and remove every item.
    pub fn clear(&mut self) {
        self.drag.release();
        self.store.clear();
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PointerPhase;

    #[test]
    fn add_greeting_from_catalog() {
        let mut editor = Editor::new();
        let id = editor.add_greeting(1).expect("greeting 1");
        assert_eq!(editor.store().get(id).map(|i| i.content()), Some("2026 龍馬精神 🔥"));
        assert!(editor.add_greeting(404).is_none());
        assert_eq!(editor.store().len(), 1);
    }

    #[test]
    fn style_edits_apply_to_selection_only() {
        let mut editor = Editor::new();
        let a = editor.add_text("a");
        let b = editor.add_text("b");

        assert!(editor.set_color(TextColor::Green));
        assert!(editor.set_font_size(250));
        assert_eq!(editor.store().get(b).map(|i| i.color()), Some(TextColor::Green));
        assert_eq!(editor.store().get(b).map(|i| i.font_size()), Some(100));
        assert_eq!(editor.store().get(a).map(|i| i.color()), Some(TextColor::White));

        editor.select(None);
        assert!(!editor.set_color(TextColor::Red));
    }

    #[test]
    fn hint_follows_selection() {
        let mut editor = Editor::new();
        assert_eq!(editor.hint(), HINT_PICK);
        editor.add_text("a");
        assert_eq!(editor.hint(), HINT_DRAG);
    }

    #[test]
    fn remove_selected_clears_selection() {
        let mut editor = Editor::new();
        let id = editor.add_text("a");
        assert_eq!(editor.remove_selected(), Some(id));
        assert_eq!(editor.store().selected(), None);
        assert_eq!(editor.remove_selected(), None);
    }

    #[test]
    fn removing_dragged_item_ends_drag() {
        let mut editor = Editor::new();
        let id = editor.add_text("a");
        editor.pointer(
            &PointerEvent::mouse(PointerPhase::Press, 5.0, 5.0).on_item(id),
            ContainerRect::default(),
        );
        assert!(editor.is_dragging());

        editor.remove(id);
        assert!(!editor.is_dragging());
    }

    #[test]
    fn pointer_uses_container_passed_with_event() {
        let mut editor = Editor::new();
        let rect = ContainerRect::square(500.0);
        let id = editor.add_text("a");

        editor.pointer(&PointerEvent::mouse(PointerPhase::Press, 0.0, 0.0).on_item(id), rect);
        editor.pointer(&PointerEvent::mouse(PointerPhase::Move, 50.0, 100.0), rect);
        editor.pointer(&PointerEvent::mouse(PointerPhase::Release, 50.0, 100.0), rect);

        let item = editor.store().get(id).expect("item");
        assert!((item.x() - 60.0).abs() < 1e-4);
        assert!((item.y() - 70.0).abs() < 1e-4);
        assert_eq!(editor.container(), rect);
    }

    #[test]
    fn container_resize_mid_drag_is_picked_up() {
        let mut editor = Editor::new();
        editor.set_container(ContainerRect::square(400.0));
        let id = editor.add_text("a");

        let press = PointerEvent::mouse(PointerPhase::Press, 0.0, 0.0).on_item(id);
        editor.pointer(&press, ContainerRect::square(400.0));
        // The container shrank to 200px after the press; +40px is now 20%.
        editor.pointer(
            &PointerEvent::mouse(PointerPhase::Move, 40.0, 0.0),
            ContainerRect::square(200.0),
        );

        let item = editor.store().get(id).expect("item");
        assert!((item.x() - 70.0).abs() < 1e-4);
        assert_eq!(editor.container(), ContainerRect::square(200.0));
    }

    #[test]
    fn unusable_measurement_keeps_export_container() {
        let mut editor = Editor::new();
        editor.set_container(ContainerRect::square(400.0));
        editor.pointer(
            &PointerEvent::mouse(PointerPhase::Press, 0.0, 0.0),
            ContainerRect::square(0.0),
        );
        assert_eq!(editor.container(), ContainerRect::square(400.0));
    }
}
