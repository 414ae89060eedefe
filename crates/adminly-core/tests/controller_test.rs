#![allow(clippy::unwrap_used)]
// Behavioral tests for `CollectionController` against a scripted gateway.

mod common;

use std::sync::Mutex;
use std::time::Duration;

use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use tokio_test::{assert_pending, assert_ready};

use adminly_core::{
    BulkAction, CoreError, ErrorKind, ExportSink, ExportStream, FilterPatch, Phase, ResourceId,
    User, UserDraft, UserStatus,
};

use common::{ids, network_error, status_draft, user_page, users};

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

fn rid(s: &str) -> ResourceId {
    ResourceId::from(s)
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_commits_items_and_totals() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1, 2, 3], 1, 23)));

    users.refresh().await;

    let snap = users.snapshot();
    assert_eq!(ids(snap.items()), vec!["1", "2", "3"]);
    let meta = snap.pagination().unwrap();
    assert_eq!(meta.total(), 23);
    assert_eq!(meta.total_pages(), 3);
    assert_eq!(snap.phase(), Phase::Ready);
    assert!(!snap.is_loading());

    let calls = gateway.list_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].page, 1);
    assert_eq!(calls[0].limit, 10);
}

#[tokio::test]
async fn test_empty_result_is_distinct_from_idle_and_error() {
    let (gateway, users) = users();
    assert_eq!(users.snapshot().phase(), Phase::Idle);
    assert!(!users.snapshot().is_empty_result());

    gateway.reply_list(Ok(user_page(&[], 1, 0)));
    users.refresh().await;

    let snap = users.snapshot();
    assert!(snap.is_empty_result());
    assert_eq!(snap.pagination().unwrap().total_pages(), 0);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_items() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1, 2], 1, 2)));
    users.refresh().await;

    gateway.reply_list(Err(network_error()));
    users.refresh().await;

    let snap = users.snapshot();
    assert_eq!(ids(snap.items()), vec!["1", "2"]);
    assert_eq!(snap.error_kind(), Some(ErrorKind::Network));
    assert_eq!(snap.phase(), Phase::Errored);
    assert!(!snap.is_loading());

    gateway.reply_list(Ok(user_page(&[1, 2, 4], 1, 3)));
    users.refresh().await;
    assert_eq!(users.error(), None);
    assert_eq!(ids(&users.items()), vec!["1", "2", "4"]);
}

// ── Ordering ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_last_request_wins_when_responses_arrive_reversed() {
    let (gateway, users) = users();
    let gate_a = gateway.gate_list();
    let gate_b = gateway.gate_list();

    let a = tokio::spawn({
        let users = users.clone();
        async move { users.set_filter(FilterPatch::new().status("active")).await }
    });
    settle().await;
    let b = tokio::spawn({
        let users = users.clone();
        async move { users.set_filter(FilterPatch::new().status("inactive")).await }
    });
    settle().await;
    assert_eq!(gateway.list_calls().len(), 2);

    gate_b.send(Ok(user_page(&[20, 21], 1, 2))).unwrap();
    b.await.unwrap();
    gate_a.send(Ok(user_page(&[10], 1, 1))).unwrap();
    a.await.unwrap();

    assert_eq!(ids(&users.items()), vec!["20", "21"]);
    assert_eq!(users.criteria().status.as_deref(), Some("inactive"));
}

#[tokio::test]
async fn test_superseded_response_is_discarded_even_if_first() {
    let (gateway, users) = users();
    let gate_a = gateway.gate_list();
    let gate_b = gateway.gate_list();

    let a = tokio::spawn({
        let users = users.clone();
        async move { users.change_page(2).await }
    });
    settle().await;
    let b = tokio::spawn({
        let users = users.clone();
        async move { users.change_page(3).await }
    });
    settle().await;

    gate_a.send(Ok(user_page(&[11, 12], 2, 40))).unwrap();
    assert!(a.await.unwrap());
    assert!(users.items().is_empty(), "stale page must not be committed");
    assert!(users.is_loading(), "newer request still owns the loading flag");

    gate_b.send(Ok(user_page(&[21, 22], 3, 40))).unwrap();
    assert!(b.await.unwrap());
    assert_eq!(ids(&users.items()), vec!["21", "22"]);
    assert!(!users.is_loading());
}

#[tokio::test]
async fn test_stale_failure_does_not_clear_loading_or_set_error() {
    let (gateway, users) = users();
    let gate_a = gateway.gate_list();
    let gate_b = gateway.gate_list();

    let a = tokio::spawn({
        let users = users.clone();
        async move { users.refresh().await }
    });
    settle().await;
    let b = tokio::spawn({
        let users = users.clone();
        async move { users.refresh().await }
    });
    settle().await;

    gate_a.send(Err(network_error())).unwrap();
    a.await.unwrap();
    assert!(users.is_loading());
    assert_eq!(users.error(), None);

    gate_b.send(Ok(user_page(&[1], 1, 1))).unwrap();
    b.await.unwrap();
    assert!(!users.is_loading());
}

#[tokio::test]
async fn test_back_to_back_refreshes_of_unchanged_data_agree() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1, 2, 3], 1, 23)));
    users.refresh().await;
    let first = users.snapshot();

    let gate_a = gateway.gate_list();
    let gate_b = gateway.gate_list();
    let a = tokio::spawn({
        let users = users.clone();
        async move { users.refresh().await }
    });
    let b = tokio::spawn({
        let users = users.clone();
        async move { users.refresh().await }
    });
    settle().await;
    assert_eq!(gateway.list_calls().len(), 3);

    gate_a.send(Ok(user_page(&[1, 2, 3], 1, 23))).unwrap();
    gate_b.send(Ok(user_page(&[1, 2, 3], 1, 23))).unwrap();
    a.await.unwrap();
    b.await.unwrap();

    let second = users.snapshot();
    assert_eq!(second.items().as_slice(), first.items().as_slice());
    assert_eq!(second.pagination(), first.pagination());
    assert!(!second.is_loading());
    assert_eq!(second.error(), None);
}

// ── Debounced search ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_search_burst_triggers_one_refetch() {
    let (gateway, users) = users();

    users.search("a");
    tokio::time::sleep(Duration::from_millis(100)).await;
    users.search("ab");
    tokio::time::sleep(Duration::from_millis(100)).await;
    users.search("abc");

    assert_eq!(users.typed_search(), "abc");
    assert!(gateway.list_calls().is_empty());
    assert_eq!(users.criteria().search, None);

    tokio::time::sleep(Duration::from_millis(350)).await;
    settle().await;

    let calls = gateway.list_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].search.as_deref(), Some("abc"));
    assert_eq!(calls[0].page, 1);
}

#[tokio::test(start_paused = true)]
async fn test_search_resets_page() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1], 1, 50)));
    users.refresh().await;
    assert!(users.change_page(4).await);

    users.search("grace");
    tokio::time::sleep(Duration::from_millis(400)).await;
    settle().await;

    assert_eq!(users.criteria().page, 1);
    assert_eq!(gateway.list_calls().last().unwrap().page, 1);
}

#[tokio::test(start_paused = true)]
async fn test_clear_filter_cancels_pending_search() {
    let (gateway, users) = users();
    users.search("pending");

    users.clear_filter().await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    settle().await;

    assert!(gateway.list_calls().is_empty());
    assert_eq!(users.typed_search(), "");
}

// ── Pagination ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_change_page_out_of_range_is_noop() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1, 2], 1, 23)));
    users.refresh().await;

    assert!(!users.change_page(0).await);
    assert!(!users.change_page(4).await);
    assert!(!users.change_page(1).await);
    assert_eq!(gateway.list_calls().len(), 1);

    assert!(users.change_page(3).await);
    assert_eq!(users.criteria().page, 3);
    assert_eq!(gateway.list_calls().len(), 2);
}

#[tokio::test]
async fn test_page_past_end_of_new_filter_is_pulled_back() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1, 2], 1, 50)));
    users.refresh().await;

    let filter_gate = gateway.gate_list();
    let filtered = tokio::spawn({
        let users = users.clone();
        async move { users.set_filter(FilterPatch::new().status("banned")).await }
    });
    settle().await;

    // Totals for "banned" are not known yet, so page 4 is accepted.
    gateway.reply_list(Ok(user_page(&[], 4, 3)));
    gateway.reply_list(Ok(user_page(&[7, 8, 9], 1, 3)));
    assert!(users.change_page(4).await);

    filter_gate.send(Ok(user_page(&[7, 8, 9], 1, 3))).unwrap();
    filtered.await.unwrap();

    let snap = users.snapshot();
    assert_eq!(snap.criteria().page, 1);
    assert_eq!(snap.pagination().unwrap().last_page(), 1);
    assert_eq!(ids(snap.items()), vec!["7", "8", "9"]);
    assert!(!snap.is_loading());

    let pages: Vec<u32> = gateway.list_calls().iter().map(|c| c.page).collect();
    assert_eq!(pages, vec![1, 1, 4, 1]);
    assert!(!users.change_page(2).await);
}

#[tokio::test]
async fn test_cached_page_is_shown_while_revalidating() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1, 2], 1, 20)));
    users.refresh().await;
    gateway.reply_list(Ok(user_page(&[11, 12], 2, 20)));
    users.change_page(2).await;

    let gate = gateway.gate_list();
    let back = tokio::spawn({
        let users = users.clone();
        async move { users.change_page(1).await }
    });
    settle().await;

    let snap = users.snapshot();
    assert!(snap.is_loading());
    assert_eq!(ids(snap.items()), vec!["1", "2"]);

    gate.send(Ok(user_page(&[1, 2, 3], 1, 21))).unwrap();
    back.await.unwrap();
    assert_eq!(ids(&users.items()), vec!["1", "2", "3"]);
}

// ── Selection ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_selection_survives_paging() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1, 2], 1, 20)));
    users.refresh().await;

    assert!(users.toggle_selection(rid("1")));
    gateway.reply_list(Ok(user_page(&[11, 12], 2, 20)));
    users.change_page(2).await;

    assert!(users.selection().contains(&rid("1")));
    assert!(users.snapshot().selected_items().is_empty());

    gateway.reply_list(Ok(user_page(&[1, 2], 1, 20)));
    assert!(users.change_page(1).await);
    assert!(users.selection().contains(&rid("1")));
    assert_eq!(ids(&users.snapshot().selected_items()), vec!["1"]);

    assert!(!users.toggle_selection(rid("1")));
    assert!(users.selection().is_empty());
}

#[tokio::test]
async fn test_select_page_and_clear() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1, 2, 3], 1, 3)));
    users.refresh().await;
    users.toggle_selection(rid("99"));

    users.select_page();
    assert_eq!(users.selection().to_vec(), vec![rid("1"), rid("2"), rid("3")]);

    users.clear_selection();
    assert!(users.selection().is_empty());
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_remove_success_deselects_and_refreshes() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1, 2], 1, 2)));
    users.refresh().await;
    users.toggle_selection(rid("2"));
    let generation = users.cache().generation();

    gateway.reply_list(Ok(user_page(&[1], 1, 1)));
    assert!(users.remove(&rid("2")).await);

    assert_eq!(gateway.removed(), vec![rid("2")]);
    assert!(!users.selection().contains(&rid("2")));
    assert_eq!(ids(&users.items()), vec!["1"]);
    assert_eq!(gateway.list_calls().len(), 2);
    assert!(users.cache().generation() > generation);
}

#[tokio::test]
async fn test_remove_failure_leaves_items() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1, 2], 1, 2)));
    users.refresh().await;

    gateway.reply_remove(Err(CoreError::Server {
        message: "user has open transactions".into(),
        status: Some(409),
    }));
    assert!(!users.remove(&rid("2")).await);

    assert_eq!(ids(&users.items()), vec!["1", "2"]);
    assert_eq!(users.error().map(|e| e.kind()), Some(ErrorKind::ServerError));
    assert_eq!(gateway.list_calls().len(), 1);
}

#[tokio::test]
async fn test_bulk_delete_partial_failure() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1, 2, 3], 1, 3)));
    users.refresh().await;
    users.select_all([rid("1"), rid("2"), rid("3")]);

    gateway.reply_remove(Ok(()));
    gateway.reply_remove(Err(network_error()));
    gateway.reply_remove(Ok(()));
    gateway.reply_list(Ok(user_page(&[2], 1, 1)));

    let selected = users.selection().to_vec();
    let ok = users.bulk_action(&selected, BulkAction::Delete).await;

    assert!(!ok);
    assert_eq!(gateway.removed(), vec![rid("1"), rid("2"), rid("3")]);
    assert_eq!(gateway.list_calls().len(), 2, "exactly one refresh after the batch");
    assert_eq!(users.selection().to_vec(), vec![rid("2")]);
    assert_eq!(users.error().map(|e| e.kind()), Some(ErrorKind::Network));
}

#[tokio::test]
async fn test_bulk_update_sends_draft_per_id() {
    let (gateway, users) = users();
    let targets = [rid("4"), rid("5")];

    let report = users
        .bulk_action_report(&targets, BulkAction::Update(status_draft(UserStatus::Suspended)))
        .await;

    assert!(report.all_succeeded());
    let updated = gateway.updated();
    assert_eq!(updated.len(), 2);
    assert_eq!(updated[1].0, rid("5"));
    assert_eq!(updated[1].1.status, Some(UserStatus::Suspended));
}

#[tokio::test]
async fn test_invalid_bulk_update_never_reaches_gateway() {
    let (gateway, users) = users();

    let ok = users
        .bulk_action(&[rid("1")], BulkAction::Update(UserDraft::default()))
        .await;

    assert!(!ok);
    assert!(gateway.updated().is_empty());
    assert!(gateway.list_calls().is_empty());
}

#[tokio::test]
async fn test_create_validation_failure() {
    let (gateway, users) = users();
    let draft = UserDraft {
        email: Some("not-an-email".into()),
        ..UserDraft::default()
    };

    let outcome = users.create(draft).await;

    assert!(!outcome.success);
    assert_eq!(outcome.error_kind, Some(ErrorKind::ValidationFailed));
    assert!(gateway.list_calls().is_empty());
    assert_eq!(users.error(), None);
}

#[tokio::test]
async fn test_created_record_without_id_is_not_cached() {
    let (gateway, users) = users();
    gateway.reply_create(Ok(adminly_api::WireUser::default()));

    let outcome = users.create(status_draft(UserStatus::Active)).await;

    assert!(outcome.success);
    assert!(users.cache().get(&rid("")).is_none());
    assert!(users.cache().is_empty());
}

#[tokio::test]
async fn test_update_returns_normalized_record() {
    let (gateway, users) = users();
    let mut wire = common::wire_user(7);
    wire.status = Some("suspended".into());
    gateway.reply_update(Ok(wire));

    let outcome = users
        .update(&rid("7"), status_draft(UserStatus::Suspended))
        .await;

    assert!(outcome.success);
    let record: User = outcome.record.unwrap();
    assert_eq!(record.status, UserStatus::Suspended);
    assert_eq!(users.cache().get(&rid("7")).unwrap().status, UserStatus::Suspended);
}

#[tokio::test]
async fn test_get_prefers_cache() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1], 1, 1)));
    users.refresh().await;

    let hit = users.get(&rid("1")).await;
    assert_eq!(hit.unwrap().name, "User 1");
    assert!(gateway.gets().is_empty());

    assert!(users.get(&rid("404")).await.is_none());
    assert_eq!(gateway.gets(), vec![rid("404")]);
    assert_eq!(users.error().map(|e| e.kind()), Some(ErrorKind::ServerError));
}

// ── Export ──────────────────────────────────────────────────────────

#[derive(Default)]
struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl ExportSink for MemorySink {
    async fn save(&self, filename: &str, mut stream: ExportStream) -> Result<u64, CoreError> {
        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk?);
        }
        let len = body.len() as u64;
        self.saved.lock().unwrap().push((filename.to_owned(), body));
        Ok(len)
    }
}

#[tokio::test]
async fn test_export_uses_active_filters() {
    let (gateway, users) = users();
    users.set_filter(FilterPatch::new().status("active")).await;
    gateway.reply_export(Ok(vec!["id,name\n", "1,Ada\n"]));
    let sink = MemorySink::default();

    assert!(users.export_current_view(&sink).await);

    let exports = gateway.exports();
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].status.as_deref(), Some("active"));

    let saved = sink.saved.lock().unwrap();
    let (filename, body) = &saved[0];
    assert!(filename.starts_with("users-export-"));
    assert!(filename.ends_with(".csv"));
    assert_eq!(body.as_slice(), b"id,name\n1,Ada\n");
}

#[tokio::test]
async fn test_export_failure_is_recorded() {
    let (gateway, users) = users();
    gateway.reply_export(Err(network_error()));

    assert!(!users.export_current_view(&MemorySink::default()).await);
    assert_eq!(users.error().map(|e| e.kind()), Some(ErrorKind::Network));
}

// ── Disposal ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_response_after_dispose_is_dropped() {
    let (gateway, users) = users();
    let gate = gateway.gate_list();
    let mut updates = users.subscribe();

    let mut refresh = tokio_test::task::spawn(users.refresh());
    assert_pending!(refresh.poll());
    updates.changed().await.unwrap();
    assert!(updates.current().is_loading());

    users.dispose();
    gate.send(Ok(user_page(&[1, 2], 1, 2))).unwrap();
    assert_ready!(refresh.poll());

    assert!(users.is_disposed());
    let snap = users.snapshot();
    assert!(snap.items().is_empty());
    assert!(snap.pagination().is_none());
    assert_eq!(updates.latest().items().len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_cancels_pending_search() {
    let (gateway, users) = users();
    users.search("never");
    users.dispose();

    tokio::time::sleep(Duration::from_secs(1)).await;
    settle().await;

    assert!(gateway.list_calls().is_empty());
    assert_eq!(users.criteria().search, None);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_last_handle_cancels_pending_search() {
    let (gateway, users) = users();
    users.search("orphan");
    drop(users);

    tokio::time::sleep(Duration::from_secs(1)).await;
    settle().await;

    assert!(gateway.list_calls().is_empty());
}

#[tokio::test]
async fn test_mutations_after_dispose_are_refused() {
    let (gateway, users) = users();
    users.dispose();

    assert!(!users.remove(&rid("1")).await);
    assert!(!users.change_page(2).await);
    users.refresh().await;

    assert!(gateway.removed().is_empty());
    assert!(gateway.list_calls().is_empty());
}

#[tokio::test]
async fn test_bulk_action_after_dispose_fails_every_id() {
    let (gateway, users) = users();
    users.dispose();

    let targets = [rid("1"), rid("2")];
    let report = users.bulk_action_report(&targets, BulkAction::Delete).await;
    assert!(report.succeeded.is_empty());
    assert_eq!(
        report.failed.iter().map(|(id, _)| id.clone()).collect::<Vec<_>>(),
        targets.to_vec()
    );

    assert!(!users.bulk_action(&targets, BulkAction::Delete).await);
    assert!(gateway.removed().is_empty());
}

#[tokio::test]
async fn test_selection_is_frozen_after_dispose() {
    let (gateway, users) = users();
    gateway.reply_list(Ok(user_page(&[1, 2], 1, 2)));
    users.refresh().await;
    users.toggle_selection(rid("1"));
    users.dispose();

    assert!(!users.toggle_selection(rid("2")));
    users.select_all([rid("3")]);
    users.select_page();
    users.clear_selection();

    assert_eq!(users.selection().to_vec(), vec![rid("1")]);
}
