// ── Shared response cache ──
//
// Lock-free storage shared by every controller of one resource type.
// Holds normalized records by id and whole list pages keyed by the exact
// query that produced them, so a view can paint a previous result while it
// revalidates. Mutations invalidate; the generation counter tells other
// views their pages may be stale.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{FilterCriteria, PaginationMeta, Resource, ResourceId};

/// A list result as it was last seen for some query.
#[derive(Debug)]
pub struct CachedPage<R> {
    pub items: Arc<Vec<Arc<R>>>,
    pub pagination: PaginationMeta,
}

impl<R> Clone for CachedPage<R> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            pagination: self.pagination,
        }
    }
}

pub struct ResponseCache<R: Resource> {
    /// Primary storage: id -> latest normalized record.
    by_id: DashMap<ResourceId, Arc<R>>,

    /// List pages keyed by `FilterCriteria::cache_key`.
    pages: DashMap<String, CachedPage<R>>,

    /// Bumped on every invalidation.
    generation: watch::Sender<u64>,
}

impl<R: Resource> Default for ResponseCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ResponseCache<R> {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0u64);
        Self {
            by_id: DashMap::new(),
            pages: DashMap::new(),
            generation,
        }
    }

    /// Record a list result. Returns the shared item vector.
    pub fn store_page(
        &self,
        criteria: &FilterCriteria,
        items: Vec<R>,
        pagination: PaginationMeta,
    ) -> Arc<Vec<Arc<R>>> {
        let items: Arc<Vec<Arc<R>>> = Arc::new(
            items
                .into_iter()
                .map(|item| {
                    let item = Arc::new(item);
                    self.by_id.insert(item.id().clone(), Arc::clone(&item));
                    item
                })
                .collect(),
        );
        self.pages.insert(
            criteria.cache_key(),
            CachedPage {
                items: Arc::clone(&items),
                pagination,
            },
        );
        items
    }

    /// Record a single record (detail fetch or mutation result).
    pub fn store_one(&self, item: R) -> Arc<R> {
        let item = Arc::new(item);
        self.by_id.insert(item.id().clone(), Arc::clone(&item));
        item
    }

    /// Look up a record by id.
    pub fn get(&self, id: &ResourceId) -> Option<Arc<R>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Last result seen for exactly this query.
    pub fn page(&self, criteria: &FilterCriteria) -> Option<CachedPage<R>> {
        self.pages.get(&criteria.cache_key()).map(|r| r.value().clone())
    }

    /// Forget the page for one query (explicit refresh).
    pub fn forget_page(&self, criteria: &FilterCriteria) {
        self.pages.remove(&criteria.cache_key());
    }

    /// Invalidate after a mutation.
    ///
    /// All list pages are dropped, since any of them may contain or be
    /// shifted by the affected record. With an id, that record is dropped
    /// too; without one (create), only pages go.
    pub fn invalidate(&self, id: Option<&ResourceId>) {
        if let Some(id) = id {
            self.by_id.remove(id);
        }
        self.pages.clear();
        self.generation.send_modify(|g| *g += 1);
    }

    /// Invalidate after a bulk mutation touching `ids`.
    pub fn invalidate_many(&self, ids: &[ResourceId]) {
        for id in ids {
            self.by_id.remove(id);
        }
        self.pages.clear();
        self.generation.send_modify(|g| *g += 1);
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.by_id.clear();
        self.pages.clear();
        self.generation.send_modify(|g| *g += 1);
    }

    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Wakes whenever the cache is invalidated.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
