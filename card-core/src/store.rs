//! The text item store: ordered items plus the current selection.
//!
//! Insertion order is the paint order used by the compositor. The on-screen
//! overlay additionally lifts the selected item above the rest, see
//! [`TextItemStore::display_order`].

use serde::Serialize;

use crate::{EditorConfig, ItemId, ItemPatch, TextItem};

/// In-memory collection of placed text items.
///
/// Every operation is synchronous, and operations on an unknown id are
/// no-ops rather than errors.
#[derive(Debug, Clone, Serialize)]
pub struct TextItemStore {
    /// Items in insertion (paint) order.
    items: Vec<TextItem>,
    /// Currently selected item, if any.
    selected: Option<ItemId>,
    /// Next id to hand out.
    #[serde(skip)]
    next_id: u64,
    #[serde(skip)]
    config: EditorConfig,
}

impl TextItemStore {
    /// Create an empty store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Create an empty store with the given configuration.
    #[must_use]
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            next_id: 1,
            config,
        }
    }

    /// The store configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Append a new item with default placement and style, and select it.
    pub fn add(&mut self, content: impl Into<String>) -> ItemId {
        let id = ItemId::from_raw(self.next_id);
        self.next_id += 1;

        let item = TextItem::new(id, content.into(), &self.config);
        tracing::debug!("Added item {id}: '{}'", item.content());
        self.items.push(item);
        self.selected = Some(id);
        id
    }

    /// Remove an item. Returns the removed item, or `None` if it was absent.
    ///
    /// Clears the selection when it pointed at the removed item.
    pub fn remove(&mut self, id: ItemId) -> Option<TextItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::debug!("Removed item {id}");
        Some(self.items.remove(index))
    }

    /// Merge a patch into an item. Returns `false` if the id is unknown.
    pub fn update(&mut self, id: ItemId, patch: &ItemPatch) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            tracing::trace!("Ignoring update for unknown item {id}");
            return false;
        };
        item.apply(patch, &self.config);
        true
    }

    /// Set the selection. Selecting an unknown id clears the selection.
    pub fn select(&mut self, id: Option<ItemId>) {
        self.selected = id.filter(|id| self.contains(*id));
    }

    /// The selected id, if any.
    #[must_use]
    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    /// The selected item, if any.
    #[must_use]
    pub fn selected_item(&self) -> Option<&TextItem> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Get an item by id.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&TextItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether an item with this id exists.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// All items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[TextItem] {
        &self.items
    }

    /// Items in on-screen stacking order: insertion order with the
    /// selected item moved last.
    pub fn display_order(&self) -> impl Iterator<Item = &TextItem> {
        let selected = self.selected;
        self.items
            .iter()
            .filter(move |item| Some(item.id()) != selected)
            .chain(self.selected_item())
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every item and clear the selection. Ids are not reused.
    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
    }

    /// Serialize the items and selection to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> crate::CardResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for TextItemStore {
    fn default() -> Self {
        Self::new()
    }
}
