// ── Per-view collection state ──
//
// Pure state transitions with no I/O. The controller owns one of these
// inside its published snapshot and drives it from network results.

use std::sync::Arc;

use crate::model::{FilterCriteria, FilterPatch, PaginationMeta, ResourceId, SelectionSet};

/// Items, query, paging and selection for one collection view.
#[derive(Debug)]
pub struct CollectionStore<R> {
    criteria: FilterCriteria,
    default_limit: u32,
    items: Arc<Vec<Arc<R>>>,
    pagination: Option<PaginationMeta>,
    /// Query `pagination` was reported for.
    paged_for: Option<FilterCriteria>,
    selection: SelectionSet,
}

// Manual impl: `R` itself need not be `Clone` to clone the `Arc`s.
impl<R> Clone for CollectionStore<R> {
    fn clone(&self) -> Self {
        Self {
            criteria: self.criteria.clone(),
            default_limit: self.default_limit,
            items: Arc::clone(&self.items),
            pagination: self.pagination,
            paged_for: self.paged_for.clone(),
            selection: self.selection.clone(),
        }
    }
}

impl<R> CollectionStore<R> {
    pub fn new(default_limit: u32) -> Self {
        Self {
            criteria: FilterCriteria::new(default_limit),
            default_limit: default_limit.max(1),
            items: Arc::new(Vec::new()),
            pagination: None,
            paged_for: None,
            selection: SelectionSet::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn items(&self) -> &Arc<Vec<Arc<R>>> {
        &self.items
    }

    /// `None` until the first page has been committed.
    pub fn pagination(&self) -> Option<PaginationMeta> {
        self.pagination
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    // ── Query transitions ────────────────────────────────────────────

    /// Merge a filter patch. Returns `true` if the criteria changed.
    pub fn set_filter(&mut self, patch: &FilterPatch) -> bool {
        self.criteria.apply(patch)
    }

    /// Reset to the unfiltered first page at the default page size.
    pub fn clear_filter(&mut self) -> bool {
        let reset = FilterCriteria::new(self.default_limit);
        if self.criteria == reset {
            return false;
        }
        self.criteria = reset;
        true
    }

    /// Move to page `n`.
    ///
    /// No-op (returns `false`) when `n` is 0, equals the current page, or
    /// lies past the last known page. While the totals for the current
    /// filters are unknown any `n >= 1` is accepted; [`clamp_page`]
    /// corrects it once they arrive.
    ///
    /// [`clamp_page`]: Self::clamp_page
    pub fn set_page(&mut self, n: u32) -> bool {
        if n < 1 || n == self.criteria.page {
            return false;
        }
        if self.known_last_page().is_some_and(|last| n > last) {
            return false;
        }
        self.criteria.page = n;
        true
    }

    /// Pull the page back to the last page the server reported for the
    /// current filters. Returns `true` if the page moved.
    pub fn clamp_page(&mut self) -> bool {
        match self.known_last_page() {
            Some(last) if self.criteria.page > last => {
                self.criteria.page = last;
                true
            }
            _ => false,
        }
    }

    /// Last page, if the committed totals belong to the current filters.
    fn known_last_page(&self) -> Option<u32> {
        let meta = self.pagination?;
        let query = self.paged_for.as_ref()?;
        query.same_query(&self.criteria).then_some(meta.last_page())
    }

    // ── Selection transitions ────────────────────────────────────────

    pub fn toggle_selection(&mut self, id: ResourceId) -> bool {
        self.selection.toggle(id)
    }

    pub fn select_all(&mut self, ids: impl IntoIterator<Item = ResourceId>) {
        self.selection.select_all(ids);
    }

    pub fn deselect(&mut self, id: &ResourceId) -> bool {
        self.selection.remove(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ── Results ──────────────────────────────────────────────────────

    /// Replace items and paging with the result of `requested`.
    /// Selection is kept.
    pub fn commit(
        &mut self,
        items: Arc<Vec<Arc<R>>>,
        pagination: PaginationMeta,
        requested: &FilterCriteria,
    ) {
        self.items = items;
        self.pagination = Some(pagination);
        self.paged_for = Some(requested.clone());
    }
}
