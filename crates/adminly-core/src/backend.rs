// ── Backend facade ──
//
// One authenticated connection to the admin API. Vends a collection
// controller per resource type; controllers of the same type share a
// response cache so a mutation in one view invalidates the others.

use std::sync::Arc;

use tracing::debug;

use adminly_api::transport::{TlsMode, TransportConfig};
use adminly_api::{ApiClient, CredentialProvider};

use crate::config::{BackendConfig, CollectionConfig, TlsVerification};
use crate::controller::CollectionController;
use crate::error::CoreError;
use crate::gateway::HttpGateway;
use crate::model::{Prediction, Transaction, User};
use crate::store::ResponseCache;

pub type UserController = CollectionController<User, HttpGateway<User>>;
pub type TransactionController = CollectionController<Transaction, HttpGateway<Transaction>>;
pub type PredictionController = CollectionController<Prediction, HttpGateway<Prediction>>;

/// Cheaply cloneable handle to a configured backend.
#[derive(Clone)]
pub struct Backend {
    client: Arc<ApiClient>,
    collection: CollectionConfig,
    users: Arc<ResponseCache<User>>,
    transactions: Arc<ResponseCache<Transaction>>,
    predictions: Arc<ResponseCache<Prediction>>,
}

impl Backend {
    /// Build the HTTP client. Does not touch the network.
    pub fn new(
        config: &BackendConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_to_transport(&config.tls),
            timeout: config.timeout,
        };
        let client = ApiClient::new(config.api_url.as_str(), credentials, &transport)?;
        debug!(api_url = %client.base_url(), "backend configured");
        Ok(Self::from_client(client, config.collection))
    }

    /// Wrap an already-built client (tests, custom transports).
    pub fn from_client(client: ApiClient, collection: CollectionConfig) -> Self {
        Self {
            client: Arc::new(client),
            collection,
            users: Arc::new(ResponseCache::new()),
            transactions: Arc::new(ResponseCache::new()),
            predictions: Arc::new(ResponseCache::new()),
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn collection_config(&self) -> CollectionConfig {
        self.collection
    }

    // ── Controllers ──────────────────────────────────────────────

    pub fn users(&self) -> UserController {
        CollectionController::with_cache(
            HttpGateway::new(Arc::clone(&self.client)),
            Arc::clone(&self.users),
            self.collection,
        )
    }

    pub fn transactions(&self) -> TransactionController {
        CollectionController::with_cache(
            HttpGateway::new(Arc::clone(&self.client)),
            Arc::clone(&self.transactions),
            self.collection,
        )
    }

    pub fn predictions(&self) -> PredictionController {
        CollectionController::with_cache(
            HttpGateway::new(Arc::clone(&self.client)),
            Arc::clone(&self.predictions),
            self.collection,
        )
    }

    // ── Caches ───────────────────────────────────────────────────

    pub fn user_cache(&self) -> &Arc<ResponseCache<User>> {
        &self.users
    }

    pub fn transaction_cache(&self) -> &Arc<ResponseCache<Transaction>> {
        &self.transactions
    }

    pub fn prediction_cache(&self) -> &Arc<ResponseCache<Prediction>> {
        &self.predictions
    }

    /// Drop every cached record and page (e.g. after switching profile).
    pub fn clear_caches(&self) {
        self.users.clear();
        self.transactions.clear();
        self.predictions.clear();
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
