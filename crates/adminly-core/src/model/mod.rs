// ── Canonical domain model ──
//
// The shapes the dashboard works with after normalization. Every managed
// record type implements `Resource`, which is what makes the collection
// controller, gateway and cache generic over users, transactions and
// predictions.

pub mod filter;
pub mod mutation;
pub mod pagination;
pub mod prediction;
pub mod resource_id;
pub mod selection;
pub mod transaction;
pub mod user;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CoreError;

pub use filter::{FilterCriteria, FilterPatch};
pub use mutation::{BulkAction, BulkReport, MutationOutcome};
pub use pagination::PaginationMeta;
pub use prediction::{Prediction, PredictionDraft, PredictionStatus};
pub use resource_id::ResourceId;
pub use selection::SelectionSet;
pub use transaction::{Transaction, TransactionDraft, TransactionKind, TransactionStatus};
pub use user::{User, UserDraft, UserRole, UserStatus};

/// A record type managed through a collection view.
pub trait Resource: Clone + fmt::Debug + Send + Sync + 'static {
    /// Raw shape as the backend sends it.
    type Wire: DeserializeOwned + fmt::Debug + Send + 'static;
    /// Partial payload for create/update.
    type Draft: Serialize + fmt::Debug + Clone + Send + Sync + 'static;

    /// Path segment under the API root (`users`, `transactions`, ...).
    const COLLECTION: &'static str;
    /// Query parameter name for the category filter.
    const CATEGORY_PARAM: &'static str = "category";

    fn id(&self) -> &ResourceId;

    /// Turn a wire record into the canonical shape. Total and
    /// deterministic: missing fields get fixed fallbacks.
    fn normalize(wire: Self::Wire) -> Self;

    /// Reject a draft before it reaches the network.
    fn validate(draft: &Self::Draft) -> Result<(), CoreError>;
}

// ── Shared draft checks ──────────────────────────────────────────────

pub(crate) fn require_not_blank(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(CoreError::validation(field, "must not be blank")),
        _ => Ok(()),
    }
}

pub(crate) fn require_finite(
    field: &str,
    value: Option<f64>,
    min: f64,
) -> Result<(), CoreError> {
    match value {
        Some(v) if !v.is_finite() => Err(CoreError::validation(field, "must be a number")),
        Some(v) if v < min => Err(CoreError::validation(field, format!("must be at least {min}"))),
        _ => Ok(()),
    }
}

pub(crate) fn require_any(field_count: usize) -> Result<(), CoreError> {
    if field_count == 0 {
        Err(CoreError::validation("draft", "nothing to change"))
    } else {
        Ok(())
    }
}
