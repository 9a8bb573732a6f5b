//! Keyboard selection over the flattened result list.

use crate::catalog::CatalogItem;

/// The flattened result list and the highlighted row.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    results: Vec<CatalogItem>,
    selected: Option<usize>,
}

impl SelectionState {
    /// Replace the results, selecting the first row (or nothing when empty)
    pub fn replace(&mut self, results: Vec<CatalogItem>) {
        self.selected = if results.is_empty() { None } else { Some(0) };
        self.results = results;
    }

    pub fn clear(&mut self) {
        self.results.clear();
        self.selected = None;
    }

    pub fn results(&self) -> &[CatalogItem] {
        &self.results
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&CatalogItem> {
        self.selected.and_then(|i| self.results.get(i))
    }

    /// The selected item when it has preview text to show
    pub fn preview(&self) -> Option<&CatalogItem> {
        self.selected().filter(|item| item.preview.is_some())
    }

    /// True when nothing is above the selection
    pub fn at_top(&self) -> bool {
        self.selected.map_or(true, |i| i == 0)
    }

    pub fn move_down(&mut self) {
        if let Some(i) = self.selected {
            self.selected = Some((i + 1).min(self.results.len() - 1));
        }
    }

    pub fn move_up(&mut self) {
        if let Some(i) = self.selected {
            self.selected = Some(i.saturating_sub(1));
        }
    }

    /// Point at a specific row (mouse hover/click). Out of range is ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.results.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
