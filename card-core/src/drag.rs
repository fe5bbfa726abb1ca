//! Press-move-release drag gestures on text items.
//!
//! While a gesture is active the host must deliver move and release events
//! from the whole document, not just from the item, so the drag survives the
//! pointer leaving the item. That document-level listening is modelled as a
//! [`ListenerScope`] the controller acquires on press and releases when the
//! gesture ends, a new gesture starts, or the controller is dropped.

use std::fmt;
use std::rc::Rc;

use crate::{
    ContainerRect, ItemId, ItemPatch, PointerEvent, PointerPhase, PointerPoint, TextItemStore,
};

/// Host hook for attaching and detaching document-level move/release
/// listeners.
pub trait ListenerScope {
    /// Start delivering move/release events from the whole document.
    fn attach(&self);

    /// Stop delivering them.
    fn detach(&self);
}

/// A scope for hosts that always route every event to the controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScope;

impl ListenerScope for NoopScope {
    fn attach(&self) {}
    fn detach(&self) {}
}

/// Attached listeners, detached on drop.
struct ListenerGuard {
    scope: Rc<dyn ListenerScope>,
}

impl ListenerGuard {
    fn acquire(scope: &Rc<dyn ListenerScope>) -> Self {
        scope.attach();
        Self {
            scope: Rc::clone(scope),
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.scope.detach();
    }
}

/// State captured at press time.
struct DragSession {
    item: ItemId,
    start: PointerPoint,
    origin: (f32, f32),
    _listeners: ListenerGuard,
}

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// A drag started on this item (which is now selected).
    Started(ItemId),
    /// The item was selected but the press carried no coordinates to drag from.
    Selected(ItemId),
    /// The press hit the background; the selection was cleared.
    Deselected,
    /// The dragged item moved to the given clamped position.
    Moved {
        /// Dragged item.
        id: ItemId,
        /// New `x` in percent.
        x: f32,
        /// New `y` in percent.
        y: f32,
    },
    /// The gesture on this item ended.
    Ended(ItemId),
    /// Nothing happened.
    Ignored,
}

/// Turns pointer gestures into position updates on the store.
pub struct DragController {
    scope: Rc<dyn ListenerScope>,
    session: Option<DragSession>,
}

impl DragController {
    /// Create a controller whose host routes all events itself.
    #[must_use]
    pub fn new() -> Self {
        Self::with_scope(Rc::new(NoopScope))
    }

    /// Create a controller that acquires listeners through `scope`.
    #[must_use]
    pub fn with_scope(scope: Rc<dyn ListenerScope>) -> Self {
        Self {
            scope,
            session: None,
        }
    }

    /// Dispatch an event by phase.
    ///
    /// `container` is the container's bounding box at the time of this
    /// event; it is only used for moves.
    pub fn handle(
        &mut self,
        store: &mut TextItemStore,
        event: &PointerEvent,
        container: ContainerRect,
    ) -> GestureOutcome {
        match event.phase {
            PointerPhase::Press => self.press(store, event),
            PointerPhase::Move => self.drag_to(store, event, container),
            PointerPhase::Release | PointerPhase::Cancel => self
                .release()
                .map_or(GestureOutcome::Ignored, GestureOutcome::Ended),
        }
    }

    /// Begin a gesture.
    ///
    /// Any gesture still in progress is ended first. A press on an item
    /// selects it and starts a drag; a press anywhere else clears the
    /// selection.
    pub fn press(&mut self, store: &mut TextItemStore, event: &PointerEvent) -> GestureOutcome {
        self.release();

        let Some(item) = event.target.and_then(|id| store.get(id)) else {
            store.select(None);
            return GestureOutcome::Deselected;
        };
        let id = item.id();
        let origin = (item.x(), item.y());
        store.select(Some(id));

        let Some(start) = event.primary_point() else {
            return GestureOutcome::Selected(id);
        };

        tracing::debug!(
            "Drag start on item {id} at ({}, {}) from ({}, {})",
            start.x,
            start.y,
            origin.0,
            origin.1
        );
        self.session = Some(DragSession {
            item: id,
            start,
            origin,
            _listeners: ListenerGuard::acquire(&self.scope),
        });
        GestureOutcome::Started(id)
    }

    /// Move the dragged item to follow the pointer.
    ///
    /// The pixel delta since the press is converted to percent of the
    /// container's current size, added to the item's position at press time
    /// and clamped by the store.
    pub fn drag_to(
        &mut self,
        store: &mut TextItemStore,
        event: &PointerEvent,
        container: ContainerRect,
    ) -> GestureOutcome {
        let Some((id, start, origin)) = self.session.as_ref().map(|s| (s.item, s.start, s.origin))
        else {
            return GestureOutcome::Ignored;
        };

        if !store.contains(id) {
            tracing::debug!("Dragged item {id} was removed, ending gesture");
            self.session = None;
            return GestureOutcome::Ignored;
        }
        let Some(point) = event.primary_point() else {
            return GestureOutcome::Ignored;
        };
        if !container.is_usable() {
            tracing::trace!("Skipping move against unusable container {container:?}");
            return GestureOutcome::Ignored;
        }

        let delta_x = (point.x - start.x) / container.width * 100.0;
        let delta_y = (point.y - start.y) / container.height * 100.0;
        let patch = ItemPatch::position(origin.0 + delta_x, origin.1 + delta_y);
        store.update(id, &patch);

        match store.get(id) {
            Some(item) => {
                tracing::trace!("Drag item {id} to ({}, {})", item.x(), item.y());
                GestureOutcome::Moved {
                    id,
                    x: item.x(),
                    y: item.y(),
                }
            }
            None => GestureOutcome::Ignored,
        }
    }

    /// End the current gesture, releasing its listeners.
    ///
    /// Returns the item that was being dragged, if any.
    pub fn release(&mut self) -> Option<ItemId> {
        let session = self.session.take()?;
        tracing::debug!("Drag end on item {}", session.item);
        Some(session.item)
    }

    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// The item being dragged, if any.
    #[must_use]
    pub fn active_item(&self) -> Option<ItemId> {
        self.session.as_ref().map(|s| s.item)
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DragController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragController")
            .field("active_item", &self.active_item())
            .finish_non_exhaustive()
    }
}
