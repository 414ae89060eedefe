// Raw record shapes as the backend sends them.
//
// Field naming is inconsistent across endpoints (camelCase, snake_case,
// Mongo-style `_id`), ids arrive as numbers or strings, and amounts arrive
// as numbers or decimal strings. Everything is optional here; the
// normalizer in `adminly-core` supplies defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Scalars ─────────────────────────────────────────────────────────

/// An identifier that may be serialized as a JSON number or string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum WireId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            // Integral floats (`42.0`) print without the fraction so that
            // `42`, `42.0` and `"42"` all name the same record.
            Self::Float(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{n:.0}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

/// A numeric value that may arrive as a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum WireNumber {
    Num(f64),
    Text(String),
}

impl WireNumber {
    /// Parse to `f64`; unparseable strings yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Reference to a user embedded in another record: either a bare id or a
/// populated `{ id, name }` object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum WireUserRef {
    Id(WireId),
    Object(WireUserSummary),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WireUserSummary {
    #[serde(default, alias = "_id")]
    pub id: Option<WireId>,
    #[serde(default, alias = "fullName", alias = "username")]
    pub name: Option<String>,
}

// ── Users ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireUser {
    #[serde(alias = "_id", alias = "userId", alias = "user_id")]
    pub id: Option<WireId>,
    #[serde(alias = "fullName", alias = "full_name")]
    pub name: Option<String>,
    pub username: Option<String>,
    #[serde(alias = "emailAddress")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    /// Older endpoints only send this boolean.
    #[serde(alias = "is_active", alias = "active")]
    pub is_active: Option<bool>,
    /// Newer endpoints send a status string instead.
    pub status: Option<String>,
    #[serde(alias = "walletBalance", alias = "wallet_balance")]
    pub balance: Option<WireNumber>,
    #[serde(alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(alias = "updated_at")]
    pub updated_at: Option<String>,
}

// ── Transactions ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireTransaction {
    #[serde(alias = "_id", alias = "transactionId", alias = "transaction_id")]
    pub id: Option<WireId>,
    #[serde(alias = "user_id", alias = "user")]
    pub user_id: Option<WireUserRef>,
    pub amount: Option<WireNumber>,
    pub currency: Option<String>,
    #[serde(rename = "type", alias = "transactionType", alias = "transaction_type", alias = "kind")]
    pub kind: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "ref", alias = "referenceId", alias = "reference_id")]
    pub reference: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(alias = "updated_at")]
    pub updated_at: Option<String>,
}

// ── Predictions ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WirePrediction {
    #[serde(alias = "_id", alias = "predictionId", alias = "prediction_id")]
    pub id: Option<WireId>,
    #[serde(alias = "user_id", alias = "user")]
    pub user_id: Option<WireUserRef>,
    #[serde(alias = "match", alias = "event", alias = "fixture")]
    pub title: Option<String>,
    #[serde(alias = "league", alias = "sport")]
    pub category: Option<String>,
    #[serde(alias = "prediction", alias = "pick", alias = "selection")]
    pub outcome: Option<String>,
    pub odds: Option<WireNumber>,
    #[serde(alias = "amount")]
    pub stake: Option<WireNumber>,
    #[serde(alias = "result")]
    pub status: Option<String>,
    #[serde(alias = "is_settled")]
    pub is_settled: Option<bool>,
    #[serde(alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(alias = "updated_at")]
    pub updated_at: Option<String>,
}
