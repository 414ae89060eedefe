// ── Runtime configuration ──
//
// These types describe *how* to reach the backend and how each collection
// view behaves. They never touch disk: the CLI (via `adminly-config`)
// constructs a `BackendConfig` and hands it in.

use std::time::Duration;

use url::Url;

/// Default page size when a view does not choose one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Quiet period between the last keystroke and the search refetch.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (local development backends).
    DangerAcceptInvalid,
}

/// Per-view collection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionConfig {
    /// Page size used initially and after `clear_filter`.
    pub default_limit: u32,
    /// Trailing-edge debounce for `search`.
    pub search_debounce: Duration,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

/// Configuration for one backend connection.
///
/// Built by the CLI, passed to [`Backend`](crate::Backend).
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// API root, e.g. `https://admin.example.com/api/admin`.
    pub api_url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout; expiry surfaces as a `Network` error.
    pub timeout: Duration,
    /// Defaults applied to every controller the backend vends.
    pub collection: CollectionConfig,
}

impl BackendConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            collection: CollectionConfig::default(),
        }
    }
}
