#![allow(clippy::unwrap_used, dead_code)]
// Scripted gateway for driving `CollectionController` deterministically.
//
// Each list call pops the next scripted reply. A reply is either ready
// immediately or held behind a oneshot gate, so tests decide exactly when
// (and in what order) responses arrive.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::oneshot;

use adminly_api::{WireId, WirePage, WireUser};
use adminly_core::{
    CollectionConfig, CollectionController, CoreError, ExportStream, FilterCriteria, Gateway,
    Resource, ResourceId, User, UserDraft,
};

pub enum Reply<T> {
    Now(Result<T, CoreError>),
    Gate(oneshot::Receiver<Result<T, CoreError>>),
}

struct Script<R: Resource> {
    lists: Mutex<VecDeque<Reply<WirePage<R::Wire>>>>,
    list_calls: Mutex<Vec<FilterCriteria>>,
    removes: Mutex<VecDeque<Result<(), CoreError>>>,
    removed: Mutex<Vec<ResourceId>>,
    updates: Mutex<VecDeque<Result<R::Wire, CoreError>>>,
    updated: Mutex<Vec<(ResourceId, R::Draft)>>,
    creates: Mutex<VecDeque<Result<R::Wire, CoreError>>>,
    gets: Mutex<Vec<ResourceId>>,
    export: Mutex<Option<Result<Vec<&'static str>, CoreError>>>,
    exports: Mutex<Vec<FilterCriteria>>,
}

/// Cheap-to-clone handle; clones share the script and call log.
pub struct ScriptedGateway<R: Resource> {
    script: Arc<Script<R>>,
}

impl<R: Resource> Clone for ScriptedGateway<R> {
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
        }
    }
}

impl<R: Resource> Default for ScriptedGateway<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ScriptedGateway<R> {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Script {
                lists: Mutex::new(VecDeque::new()),
                list_calls: Mutex::new(Vec::new()),
                removes: Mutex::new(VecDeque::new()),
                removed: Mutex::new(Vec::new()),
                updates: Mutex::new(VecDeque::new()),
                updated: Mutex::new(Vec::new()),
                creates: Mutex::new(VecDeque::new()),
                gets: Mutex::new(Vec::new()),
                export: Mutex::new(None),
                exports: Mutex::new(Vec::new()),
            }),
        }
    }

    // ── Scripting ────────────────────────────────────────────────

    pub fn reply_list(&self, result: Result<WirePage<R::Wire>, CoreError>) {
        self.script.lists.lock().unwrap().push_back(Reply::Now(result));
    }

    /// Queue a held list reply; send on the returned sender to release it.
    pub fn gate_list(&self) -> oneshot::Sender<Result<WirePage<R::Wire>, CoreError>> {
        let (tx, rx) = oneshot::channel();
        self.script.lists.lock().unwrap().push_back(Reply::Gate(rx));
        tx
    }

    pub fn reply_remove(&self, result: Result<(), CoreError>) {
        self.script.removes.lock().unwrap().push_back(result);
    }

    pub fn reply_update(&self, result: Result<R::Wire, CoreError>) {
        self.script.updates.lock().unwrap().push_back(result);
    }

    pub fn reply_create(&self, result: Result<R::Wire, CoreError>) {
        self.script.creates.lock().unwrap().push_back(result);
    }

    pub fn reply_export(&self, result: Result<Vec<&'static str>, CoreError>) {
        *self.script.export.lock().unwrap() = Some(result);
    }

    // ── Inspection ───────────────────────────────────────────────

    pub fn list_calls(&self) -> Vec<FilterCriteria> {
        self.script.list_calls.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<ResourceId> {
        self.script.removed.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<(ResourceId, R::Draft)> {
        self.script.updated.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<ResourceId> {
        self.script.gets.lock().unwrap().clone()
    }

    pub fn exports(&self) -> Vec<FilterCriteria> {
        self.script.exports.lock().unwrap().clone()
    }
}

fn empty_page<T>() -> WirePage<T> {
    WirePage {
        items: Vec::new(),
        page: Some(1),
        limit: None,
        total: Some(0),
    }
}

impl<R: Resource> Gateway<R> for ScriptedGateway<R>
where
    R::Wire: Default,
{
    async fn list(&self, criteria: &FilterCriteria) -> Result<WirePage<R::Wire>, CoreError> {
        self.script.list_calls.lock().unwrap().push(criteria.clone());
        let reply = self.script.lists.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Now(result)) => result,
            Some(Reply::Gate(rx)) => rx.await.unwrap_or_else(|_| {
                Err(CoreError::Network {
                    reason: "gate dropped".into(),
                })
            }),
            None => Ok(empty_page()),
        }
    }

    async fn get(&self, id: &ResourceId) -> Result<R::Wire, CoreError> {
        self.script.gets.lock().unwrap().push(id.clone());
        Err(CoreError::Server {
            message: "not found".into(),
            status: Some(404),
        })
    }

    async fn create(&self, _draft: &R::Draft) -> Result<R::Wire, CoreError> {
        let reply = self.script.creates.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok(R::Wire::default()))
    }

    async fn update(&self, id: &ResourceId, draft: &R::Draft) -> Result<R::Wire, CoreError> {
        self.script
            .updated
            .lock()
            .unwrap()
            .push((id.clone(), draft.clone()));
        let reply = self.script.updates.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok(R::Wire::default()))
    }

    async fn remove(&self, id: &ResourceId) -> Result<(), CoreError> {
        self.script.removed.lock().unwrap().push(id.clone());
        let reply = self.script.removes.lock().unwrap().pop_front();
        reply.unwrap_or(Ok(()))
    }

    async fn export(&self, criteria: &FilterCriteria) -> Result<ExportStream, CoreError> {
        self.script.exports.lock().unwrap().push(criteria.clone());
        let reply = self.script.export.lock().unwrap().take();
        let chunks = reply.unwrap_or_else(|| Ok(Vec::new()))?;
        Ok(stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes()))),
        )
        .boxed())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────

pub type UserGateway = ScriptedGateway<User>;
pub type Users = CollectionController<User, UserGateway>;

pub fn wire_user(id: i64) -> WireUser {
    WireUser {
        id: Some(WireId::Int(id)),
        name: Some(format!("User {id}")),
        email: Some(format!("user{id}@example.com")),
        status: Some("active".into()),
        ..WireUser::default()
    }
}

/// A page of users with the given ids and server totals.
pub fn user_page(ids: &[i64], page: u32, total: u64) -> WirePage<WireUser> {
    WirePage {
        items: ids.iter().copied().map(wire_user).collect(),
        page: Some(page),
        limit: Some(10),
        total: Some(total),
    }
}

pub fn ids(snapshot_items: &[Arc<User>]) -> Vec<String> {
    snapshot_items.iter().map(|u| u.id.to_string()).collect()
}

pub fn users() -> (UserGateway, Users) {
    let gateway = UserGateway::new();
    let controller = CollectionController::new(gateway.clone(), CollectionConfig::default());
    (gateway, controller)
}

pub fn status_draft(status: adminly_core::UserStatus) -> UserDraft {
    UserDraft {
        status: Some(status),
        ..UserDraft::default()
    }
}

pub fn network_error() -> CoreError {
    CoreError::Network {
        reason: "connection refused".into(),
    }
}
