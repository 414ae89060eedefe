// ── Collection controller ──
//
// Orchestrates one collection view: filter/paging state, debounced
// search, the refresh cycle, mutations and export. State is published
// through a `watch` channel; every network result is committed only if
// it belongs to the most recently issued request and the controller has
// not been disposed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::CollectionConfig;
use crate::convert::normalize_page;
use crate::debounce::DebouncedSearch;
use crate::error::{CoreError, ErrorKind};
use crate::export::{ExportSink, export_filename};
use crate::gateway::Gateway;
use crate::model::{
    BulkAction, BulkReport, FilterCriteria, FilterPatch, MutationOutcome, PaginationMeta,
    Resource, ResourceId, SelectionSet,
};
use crate::store::{CollectionStore, ResponseCache};
use crate::stream::SnapshotStream;

// ── Snapshot ─────────────────────────────────────────────────────

/// Coarse lifecycle of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet.
    Idle,
    Loading,
    Ready,
    /// Last refresh failed; previous items are still shown.
    Errored,
}

/// Everything a view renders, published as one value.
#[derive(Debug)]
pub struct CollectionSnapshot<R> {
    store: CollectionStore<R>,
    is_loading: bool,
    error: Option<CoreError>,
    loaded: bool,
}

impl<R> Clone for CollectionSnapshot<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            loaded: self.loaded,
        }
    }
}

impl<R> CollectionSnapshot<R> {
    fn new(default_limit: u32) -> Self {
        Self {
            store: CollectionStore::new(default_limit),
            is_loading: false,
            error: None,
            loaded: false,
        }
    }

    pub fn items(&self) -> &Arc<Vec<Arc<R>>> {
        self.store.items()
    }

    pub fn pagination(&self) -> Option<PaginationMeta> {
        self.store.pagination()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        self.store.criteria()
    }

    pub fn selection(&self) -> &SelectionSet {
        self.store.selection()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Last failure, cleared by the next successful refresh.
    pub fn error(&self) -> Option<&CoreError> {
        self.error.as_ref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(CoreError::kind)
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Errored
        } else if self.loaded {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    /// Loaded successfully and matched nothing. Distinct from "not yet
    /// loaded" and from "failed".
    pub fn is_empty_result(&self) -> bool {
        self.loaded && !self.is_loading && self.error.is_none() && self.store.items().is_empty()
    }
}

impl<R: Resource> CollectionSnapshot<R> {
    /// Selected records visible on the current page.
    pub fn selected_items(&self) -> Vec<Arc<R>> {
        let selection = self.store.selection();
        self.store
            .items()
            .iter()
            .filter(|item| selection.contains(item.id()))
            .cloned()
            .collect()
    }
}

// ── Controller ───────────────────────────────────────────────────

/// Drives one collection view of resource `R` through gateway `G`.
///
/// Cheaply cloneable via `Arc`. The view is torn down by [`dispose`]
/// or when the last handle is dropped; after that no network result
/// touches state.
///
/// [`dispose`]: Self::dispose
pub struct CollectionController<R: Resource, G: Gateway<R>> {
    inner: Arc<ControllerInner<R, G>>,
}

impl<R: Resource, G: Gateway<R>> Clone for CollectionController<R, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<R: Resource, G: Gateway<R>> {
    gateway: G,
    cache: Arc<ResponseCache<R>>,
    config: CollectionConfig,
    state: watch::Sender<CollectionSnapshot<R>>,
    search: DebouncedSearch,
    /// Sequence number of the most recently issued list request.
    latest_seq: AtomicU64,
    disposed: CancellationToken,
}

impl<R: Resource, G: Gateway<R>> Drop for ControllerInner<R, G> {
    fn drop(&mut self) {
        self.disposed.cancel();
        self.search.cancel();
    }
}

impl<R: Resource, G: Gateway<R>> CollectionController<R, G> {
    /// Controller with its own private cache.
    pub fn new(gateway: G, config: CollectionConfig) -> Self {
        Self::with_cache(gateway, Arc::new(ResponseCache::new()), config)
    }

    /// Controller sharing `cache` with other views of the same resource.
    pub fn with_cache(gateway: G, cache: Arc<ResponseCache<R>>, config: CollectionConfig) -> Self {
        let (state, _) = watch::channel(CollectionSnapshot::new(config.default_limit));
        Self {
            inner: Arc::new(ControllerInner {
                gateway,
                cache,
                search: DebouncedSearch::new(config.search_debounce),
                config,
                state,
                latest_seq: AtomicU64::new(0),
                disposed: CancellationToken::new(),
            }),
        }
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn snapshot(&self) -> CollectionSnapshot<R> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> SnapshotStream<R> {
        SnapshotStream::new(self.inner.state.subscribe())
    }

    pub fn items(&self) -> Arc<Vec<Arc<R>>> {
        Arc::clone(self.inner.state.borrow().items())
    }

    pub fn pagination(&self) -> Option<PaginationMeta> {
        self.inner.state.borrow().pagination()
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.inner.state.borrow().criteria().clone()
    }

    pub fn selection(&self) -> SelectionSet {
        self.inner.state.borrow().selection().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading()
    }

    pub fn error(&self) -> Option<CoreError> {
        self.inner.state.borrow().error().cloned()
    }

    /// Search text as typed, ahead of the debounce.
    pub fn typed_search(&self) -> String {
        self.inner.search.typed()
    }

    pub fn cache(&self) -> &Arc<ResponseCache<R>> {
        &self.inner.cache
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.inner.config
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.is_cancelled()
    }

    // ── Query ────────────────────────────────────────────────────

    /// Record typed search text; the filter follows after the quiet
    /// period with no further input.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn search(&self, text: impl Into<String>) {
        if self.is_disposed() {
            return;
        }
        let weak: Weak<ControllerInner<R, G>> = Arc::downgrade(&self.inner);
        self.inner.search.input(text, move |text| async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let controller = CollectionController { inner };
            trace!(collection = R::COLLECTION, %text, "search settled");
            controller.set_filter(FilterPatch::new().search(text)).await;
        });
    }

    /// Merge a filter patch and refetch if the criteria changed.
    pub async fn set_filter(&self, patch: FilterPatch) {
        if self.is_disposed() {
            return;
        }
        let mut changed = false;
        self.inner.state.send_if_modified(|s| {
            changed = s.store.set_filter(&patch);
            changed
        });
        if changed {
            self.run_cycle().await;
        } else {
            trace!(collection = R::COLLECTION, "filter unchanged, no refetch");
        }
    }

    /// Back to the unfiltered first page. Drops any pending search.
    pub async fn clear_filter(&self) {
        if self.is_disposed() {
            return;
        }
        self.inner.search.reset();
        let mut changed = false;
        self.inner.state.send_if_modified(|s| {
            changed = s.store.clear_filter();
            changed
        });
        if changed {
            self.run_cycle().await;
        }
    }

    /// Move to page `n`. Returns `false` (and does nothing) when `n` is
    /// out of range or already current.
    pub async fn change_page(&self, n: u32) -> bool {
        if self.is_disposed() {
            return false;
        }
        let mut changed = false;
        self.inner.state.send_if_modified(|s| {
            changed = s.store.set_page(n);
            changed
        });
        if changed {
            self.run_cycle().await;
        }
        changed
    }

    /// Refetch the current criteria, bypassing the cached page.
    pub async fn refresh(&self) {
        if self.is_disposed() {
            return;
        }
        self.inner.cache.forget_page(&self.criteria());
        self.run_cycle().await;
    }

    // ── Selection ────────────────────────────────────────────────

    /// Returns `true` if `id` is now selected.
    pub fn toggle_selection(&self, id: ResourceId) -> bool {
        if self.is_disposed() {
            return false;
        }
        let mut selected = false;
        self.inner.state.send_modify(|s| {
            selected = s.store.toggle_selection(id);
        });
        selected
    }

    /// Replace the selection with `ids`.
    pub fn select_all(&self, ids: impl IntoIterator<Item = ResourceId>) {
        if self.is_disposed() {
            return;
        }
        let ids: Vec<ResourceId> = ids.into_iter().collect();
        self.inner.state.send_modify(|s| s.store.select_all(ids));
    }

    /// Select exactly the records on the current page.
    pub fn select_page(&self) {
        if self.is_disposed() {
            return;
        }
        self.inner.state.send_modify(|s| {
            let ids: Vec<ResourceId> = s.store.items().iter().map(|i| i.id().clone()).collect();
            s.store.select_all(ids);
        });
    }

    pub fn clear_selection(&self) {
        if self.is_disposed() {
            return;
        }
        self.inner.state.send_modify(|s| s.store.clear_selection());
    }

    // ── Records ──────────────────────────────────────────────────

    /// Fetch one record, preferring the cache.
    pub async fn get(&self, id: &ResourceId) -> Option<Arc<R>> {
        if let Some(hit) = self.inner.cache.get(id) {
            return Some(hit);
        }
        if self.is_disposed() {
            return None;
        }
        match self.inner.gateway.get(id).await {
            Ok(wire) => Some(self.inner.cache.store_one(R::normalize(wire))),
            Err(e) => {
                warn!(collection = R::COLLECTION, %id, error = %e, "fetch failed");
                self.record_error(e);
                None
            }
        }
    }

    pub async fn create(&self, draft: R::Draft) -> MutationOutcome<R> {
        if let Err(e) = R::validate(&draft) {
            return MutationOutcome::failed(&e);
        }
        if self.is_disposed() {
            return MutationOutcome::failed(&disposed_error());
        }
        match self.inner.gateway.create(&draft).await {
            Ok(wire) => {
                let record = R::normalize(wire);
                info!(collection = R::COLLECTION, id = %record.id(), "created");
                self.inner.cache.invalidate(None);
                if !record.id().is_empty() {
                    self.inner.cache.store_one(record.clone());
                }
                self.run_cycle().await;
                MutationOutcome::succeeded(Some(record))
            }
            Err(e) => self.mutation_failed("create", None, e),
        }
    }

    pub async fn update(&self, id: &ResourceId, draft: R::Draft) -> MutationOutcome<R> {
        if let Err(e) = R::validate(&draft) {
            return MutationOutcome::failed(&e);
        }
        if self.is_disposed() {
            return MutationOutcome::failed(&disposed_error());
        }
        match self.inner.gateway.update(id, &draft).await {
            Ok(wire) => {
                let record = R::normalize(wire);
                info!(collection = R::COLLECTION, %id, "updated");
                self.inner.cache.invalidate(Some(id));
                if !record.id().is_empty() {
                    self.inner.cache.store_one(record.clone());
                }
                self.run_cycle().await;
                MutationOutcome::succeeded(Some(record))
            }
            Err(e) => self.mutation_failed("update", Some(id), e),
        }
    }

    /// Delete one record. On failure the current items are left as
    /// they are and the error is recorded.
    pub async fn remove(&self, id: &ResourceId) -> bool {
        if self.is_disposed() {
            return false;
        }
        match self.inner.gateway.remove(id).await {
            Ok(()) => {
                info!(collection = R::COLLECTION, %id, "deleted");
                self.inner.cache.invalidate(Some(id));
                self.inner.state.send_if_modified(|s| s.store.deselect(id));
                self.run_cycle().await;
                true
            }
            Err(e) => self.mutation_failed("delete", Some(id), e).success,
        }
    }

    /// Apply `action` to every id. `true` only if all succeeded.
    pub async fn bulk_action(&self, ids: &[ResourceId], action: BulkAction<R::Draft>) -> bool {
        self.bulk_action_report(ids, action).await.all_succeeded()
    }

    /// As [`bulk_action`](Self::bulk_action), with the per-id tally.
    ///
    /// Ids are processed one at a time. One refresh follows if anything
    /// succeeded.
    pub async fn bulk_action_report(
        &self,
        ids: &[ResourceId],
        action: BulkAction<R::Draft>,
    ) -> BulkReport {
        let mut report = BulkReport::default();
        if let BulkAction::Update(ref draft) = action {
            if let Err(e) = R::validate(draft) {
                report.failed = ids.iter().map(|id| (id.clone(), e.to_string())).collect();
                return report;
            }
        }
        if self.is_disposed() {
            let reason = disposed_error().to_string();
            report.failed = ids.iter().map(|id| (id.clone(), reason.clone())).collect();
            return report;
        }

        let mut first_error = None;
        for id in ids {
            let result = match action {
                BulkAction::Delete => self.inner.gateway.remove(id).await,
                BulkAction::Update(ref draft) => {
                    self.inner.gateway.update(id, draft).await.map(|_| ())
                }
            };
            match result {
                Ok(()) => report.succeeded.push(id.clone()),
                Err(e) => {
                    warn!(collection = R::COLLECTION, %id, action = action.verb(), error = %e, "bulk item failed");
                    report.failed.push((id.clone(), e.to_string()));
                    first_error.get_or_insert(e);
                }
            }
        }

        info!(
            collection = R::COLLECTION,
            action = action.verb(),
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "bulk action finished"
        );

        if !report.succeeded.is_empty() {
            self.inner.cache.invalidate_many(&report.succeeded);
            if matches!(action, BulkAction::Delete) {
                self.inner.state.send_if_modified(|s| {
                    let mut changed = false;
                    for id in &report.succeeded {
                        changed |= s.store.deselect(id);
                    }
                    changed
                });
            }
            self.run_cycle().await;
        }
        // Recorded after the refresh, which would otherwise clear it.
        if let Some(e) = first_error {
            self.record_error(e);
        }
        report
    }

    /// Export everything matching the active filters to `sink` as
    /// `<collection>-export-<date>.csv`.
    pub async fn export_current_view<S: ExportSink>(&self, sink: &S) -> bool {
        if self.is_disposed() {
            return false;
        }
        let criteria = self.criteria();
        let filename = export_filename(R::COLLECTION, Utc::now().date_naive());

        let result = match self.inner.gateway.export(&criteria).await {
            Ok(stream) => sink.save(&filename, stream).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(bytes) => {
                info!(collection = R::COLLECTION, %filename, bytes, "export complete");
                true
            }
            Err(e) => {
                warn!(collection = R::COLLECTION, error = %e, "export failed");
                self.record_error(e);
                false
            }
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Tear the view down. Pending search is cancelled and in-flight
    /// results are discarded on arrival.
    pub fn dispose(&self) {
        if self.inner.disposed.is_cancelled() {
            return;
        }
        self.inner.disposed.cancel();
        self.inner.search.cancel();
        debug!(collection = R::COLLECTION, "controller disposed");
    }

    // ── Refresh cycle ────────────────────────────────────────────

    /// Fetch the current criteria. A result reporting fewer pages than
    /// the page being shown moves to the last page and fetches again.
    async fn run_cycle(&self) {
        while self.fetch_once().await {
            debug!(
                collection = R::COLLECTION,
                page = self.criteria().page,
                "page past the end, refetching"
            );
        }
    }

    /// One list request for the current criteria. Returns `true` if the
    /// committed result clamped the page.
    ///
    /// Allocating the sequence number, reading the criteria and setting
    /// `is_loading` happen under the state lock, so commits are totally
    /// ordered against newer requests.
    async fn fetch_once(&self) -> bool {
        let inner = &self.inner;
        let mut issued: Option<(u64, FilterCriteria)> = None;
        inner.state.send_if_modified(|s| {
            if inner.disposed.is_cancelled() {
                return false;
            }
            let seq = inner.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
            let criteria = s.store.criteria().clone();
            s.is_loading = true;
            if let Some(cached) = inner.cache.page(&criteria) {
                trace!(collection = R::COLLECTION, seq, "painting cached page while revalidating");
                s.store.commit(cached.items, cached.pagination, &criteria);
            }
            issued = Some((seq, criteria));
            true
        });
        let Some((seq, criteria)) = issued else {
            return false;
        };

        let _loading = LoadingGuard { inner, seq };
        debug!(collection = R::COLLECTION, seq, page = criteria.page, "list request issued");
        let result = inner.gateway.list(&criteria).await;

        let mut clamped = false;
        inner.state.send_if_modified(|s| {
            if !inner.is_current(seq) {
                trace!(collection = R::COLLECTION, seq, "discarding superseded response");
                return false;
            }
            match result {
                Ok(page) => {
                    let (items, pagination) = normalize_page::<R>(page, &criteria);
                    let items = inner.cache.store_page(&criteria, items, pagination);
                    s.store.commit(items, pagination, &criteria);
                    s.error = None;
                    s.loaded = true;
                    clamped = s.store.clamp_page();
                }
                Err(e) => {
                    warn!(collection = R::COLLECTION, seq, error = %e, "list request failed");
                    s.error = Some(e);
                }
            }
            s.is_loading = false;
            true
        });
        clamped
    }

    fn record_error(&self, err: CoreError) {
        let inner = &self.inner;
        inner.state.send_if_modified(|s| {
            if inner.disposed.is_cancelled() {
                return false;
            }
            s.error = Some(err);
            true
        });
    }

    fn mutation_failed(
        &self,
        verb: &str,
        id: Option<&ResourceId>,
        err: CoreError,
    ) -> MutationOutcome<R> {
        match id {
            Some(id) => warn!(collection = R::COLLECTION, %id, error = %err, "{verb} failed"),
            None => warn!(collection = R::COLLECTION, error = %err, "{verb} failed"),
        }
        let outcome = MutationOutcome::failed(&err);
        self.record_error(err);
        outcome
    }
}

impl<R: Resource, G: Gateway<R>> ControllerInner<R, G> {
    fn is_current(&self, seq: u64) -> bool {
        !self.disposed.is_cancelled() && self.latest_seq.load(Ordering::SeqCst) == seq
    }
}

fn disposed_error() -> CoreError {
    CoreError::Internal("controller disposed".into())
}

/// Clears `is_loading` when a request ends, by success, failure or the
/// future being dropped, unless a newer request now owns the flag.
struct LoadingGuard<'a, R: Resource, G: Gateway<R>> {
    inner: &'a ControllerInner<R, G>,
    seq: u64,
}

impl<R: Resource, G: Gateway<R>> Drop for LoadingGuard<'_, R, G> {
    fn drop(&mut self) {
        let inner = self.inner;
        let seq = self.seq;
        inner.state.send_if_modified(|s| {
            if !inner.is_current(seq) || !s.is_loading {
                return false;
            }
            s.is_loading = false;
            true
        });
    }
}
