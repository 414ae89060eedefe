// ── Transaction domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{Resource, ResourceId, require_any, require_finite, require_not_blank};
use crate::error::CoreError;

/// Currency assumed when the backend omits one.
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TransactionKind {
    Deposit,
    #[strum(to_string = "withdrawal", serialize = "withdraw")]
    Withdrawal,
    #[strum(to_string = "stake", serialize = "bet", serialize = "wager")]
    Stake,
    #[strum(to_string = "payout", serialize = "win", serialize = "winning")]
    Payout,
    Refund,
    Bonus,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TransactionStatus {
    #[strum(to_string = "pending", serialize = "processing")]
    Pending,
    #[strum(to_string = "completed", serialize = "success", serialize = "successful")]
    Completed,
    #[strum(to_string = "failed", serialize = "declined")]
    Failed,
    #[strum(to_string = "cancelled", serialize = "canceled", serialize = "reversed")]
    Cancelled,
    Unknown,
}

/// The canonical Transaction type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: ResourceId,
    pub user_id: Option<ResourceId>,
    /// Present when the backend populated the user reference.
    pub user_name: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<ResourceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Transaction {
    type Wire = adminly_api::WireTransaction;
    type Draft = TransactionDraft;

    const COLLECTION: &'static str = "transactions";
    const CATEGORY_PARAM: &'static str = "type";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn normalize(wire: Self::Wire) -> Self {
        Self::from(wire)
    }

    fn validate(draft: &TransactionDraft) -> Result<(), CoreError> {
        let set = [
            draft.user_id.is_some(),
            draft.amount.is_some(),
            draft.currency.is_some(),
            draft.kind.is_some(),
            draft.status.is_some(),
            draft.description.is_some(),
        ];
        require_any(set.iter().filter(|s| **s).count())?;
        require_finite("amount", draft.amount, 0.0)?;
        if draft.amount == Some(0.0) {
            return Err(CoreError::validation("amount", "must be greater than zero"));
        }
        require_not_blank("user_id", draft.user_id.as_ref().map(ResourceId::as_str))?;

        if let Some(ref currency) = draft.currency {
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(CoreError::validation("currency", "must be a three-letter code"));
            }
        }
        if draft.status == Some(TransactionStatus::Unknown) {
            return Err(CoreError::validation("status", "cannot set status to unknown"));
        }
        Ok(())
    }
}
