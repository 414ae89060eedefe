// ── Row selection ──

use indexmap::IndexSet;
use serde::Serialize;

use super::ResourceId;

/// Ids the operator has ticked, in the order they were ticked.
///
/// Selection is independent of the visible page: an id stays selected when
/// it scrolls off the current result page, until it is explicitly cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: IndexSet<ResourceId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns `true` if it is now selected.
    pub fn toggle(&mut self, id: ResourceId) -> bool {
        if self.ids.shift_remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Replace the selection with exactly `ids`.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = ResourceId>) {
        self.ids = ids.into_iter().collect();
    }

    /// Deselect one id. Returns `true` if it was selected.
    pub fn remove(&mut self, id: &ResourceId) -> bool {
        self.ids.shift_remove(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceId> {
        self.ids.iter()
    }

    pub fn to_vec(&self) -> Vec<ResourceId> {
        self.ids.iter().cloned().collect()
    }
}

impl FromIterator<ResourceId> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = ResourceId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
