//! Collection state and orchestration between `adminly-api` and the
//! dashboard front ends.
//!
//! - **[`CollectionController`]**: one per collection view. Owns filter
//!   and paging state, debounces search, runs the refresh cycle with
//!   last-request-wins ordering, performs mutations and exports, and
//!   publishes a [`CollectionSnapshot`] through a `watch` channel.
//!
//! - **[`Gateway`]**: the network seam. [`HttpGateway`] talks to the REST
//!   API; tests script their own.
//!
//! - **[`ResponseCache`]**: `DashMap`-backed store of normalized records
//!   and list pages, shared by all views of a resource type.
//!
//! - **[`Backend`]**: builds the HTTP client once and vends controllers
//!   for users, transactions and predictions.
//!
//! - **Domain model** ([`model`]): canonical [`User`], [`Transaction`] and
//!   [`Prediction`] records produced by the normalizers in [`convert`].

pub mod backend;
pub mod config;
pub mod controller;
pub mod convert;
pub mod debounce;
pub mod error;
pub mod export;
pub mod gateway;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{Backend, PredictionController, TransactionController, UserController};
pub use config::{BackendConfig, CollectionConfig, TlsVerification};
pub use controller::{CollectionController, CollectionSnapshot, Phase};
pub use debounce::{DebouncedSearch, PendingTask};
pub use error::{CoreError, ErrorKind};
pub use export::{DirectorySink, ExportSink, export_filename};
pub use gateway::{ExportStream, Gateway, HttpGateway};
pub use store::{CachedPage, CollectionStore, ResponseCache};
pub use stream::SnapshotStream;

pub use model::{
    BulkAction, BulkReport, FilterCriteria, FilterPatch, MutationOutcome, PaginationMeta,
    Prediction, PredictionDraft, PredictionStatus, Resource, ResourceId, SelectionSet,
    Transaction, TransactionDraft, TransactionKind, TransactionStatus, User, UserDraft, UserRole,
    UserStatus,
};
