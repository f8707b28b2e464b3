use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::PathBuf;

use tracing::debug;

use crate::error::StoreError;
use crate::item::AnnotatedItem;
use crate::store::{AnnotationStore, ModeTag};

/// All candidates of one run plus the search text, selection and the store they persist to.
///
/// The view is never stored: it is recomputed from the items and the search text every
/// time it is asked for. `selected` indexes into that view.
pub struct ListModel {
    items: Vec<AnnotatedItem>,
    store: AnnotationStore,
    store_path: PathBuf,
    search: String,
    selected: usize,
    page_size: usize,
}

impl ListModel {
    pub fn new<I, S>(names: I, store: AnnotationStore, store_path: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let items = names
            .into_iter()
            .map(Into::<String>::into)
            .filter(|name| seen.insert(name.clone()))
            .map(|name| {
                let record = store.get(&name).cloned().unwrap_or_default();
                AnnotatedItem::new(name, record)
            })
            .collect();
        Self {
            items,
            store,
            store_path: store_path.into(),
            search: String::new(),
            selected: 0,
            page_size: 1,
        }
    }

    pub fn filtered_sorted(&self, search: &str) -> Vec<&AnnotatedItem> {
        self.view_indices(search)
            .into_iter()
            .map(|index| &self.items[index])
            .collect()
    }

    pub fn view(&self) -> Vec<&AnnotatedItem> {
        self.filtered_sorted(&self.search)
    }

    pub fn view_len(&self) -> usize {
        self.view_indices(&self.search).len()
    }

    pub fn total_len(&self) -> usize {
        self.items.len()
    }

    /// Replaces the search text and puts the selection back on the first row.
    pub fn set_search(&mut self, text: &str) {
        if self.search != text {
            self.search.clear();
            self.search.push_str(text);
        }
        self.selected = 0;
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&AnnotatedItem> {
        self.selected_item_index().map(|index| &self.items[index])
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.view_len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let last = (len - 1) as isize;
        self.selected = (self.selected as isize).saturating_add(delta).clamp(0, last) as usize;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Visible row count, reported by whatever draws the list.
    pub fn set_page_size(&mut self, rows: usize) {
        self.page_size = rows.max(1);
    }

    pub fn page_up(&mut self) {
        self.move_selection(-(self.page_size() as isize));
    }

    pub fn page_down(&mut self) {
        self.move_selection(self.page_size() as isize);
    }

    /// Toggles the pin of the selected item and writes the store. `None` without a selection.
    pub fn toggle_pin_selected(&mut self) -> Result<Option<bool>, StoreError> {
        self.mutate_selected(AnnotatedItem::toggle_pin)
    }

    pub fn set_comment_selected(&mut self, text: &str) -> Result<Option<()>, StoreError> {
        self.mutate_selected(|item| item.set_comment(text))
    }

    pub fn cycle_mode_tag_selected(&mut self) -> Result<Option<ModeTag>, StoreError> {
        self.mutate_selected(AnnotatedItem::cycle_mode_tag)
    }

    fn mutate_selected<T>(
        &mut self,
        mutate: impl FnOnce(&mut AnnotatedItem) -> T,
    ) -> Result<Option<T>, StoreError> {
        let Some(index) = self.selected_item_index() else {
            return Ok(None);
        };
        let value = mutate(&mut self.items[index]);
        self.persist(index)?;
        self.follow(index);
        Ok(Some(value))
    }

    fn persist(&mut self, index: usize) -> Result<(), StoreError> {
        let item = &self.items[index];
        *self.store.get_or_create(item.name()) = item.record().clone();
        self.store.save(&self.store_path)?;
        debug!(name = item.name(), record = ?item.record(), "annotation persisted");
        Ok(())
    }

    /// Keeps the selection on a mutated item after the view reorders around it.
    fn follow(&mut self, index: usize) {
        let view = self.view_indices(&self.search);
        match view.iter().position(|&candidate| candidate == index) {
            Some(position) => self.selected = position,
            None => self.selected = self.selected.min(view.len().saturating_sub(1)),
        }
    }

    fn selected_item_index(&self) -> Option<usize> {
        self.view_indices(&self.search).get(self.selected).copied()
    }

    fn view_indices(&self, search: &str) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| search.is_empty() || item.contains(search))
            .map(|(index, _)| index)
            .collect();
        indices.sort_by(|&a, &b| view_order(&self.items[a], &self.items[b]));
        indices
    }
}

/// Pinned first, then case-insensitive name.
fn view_order(a: &AnnotatedItem, b: &AnnotatedItem) -> Ordering {
    b.is_pinned()
        .cmp(&a.is_pinned())
        .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
}
