// ── Wire-to-domain conversions ──
//
// Bridges raw `adminly_api` records into canonical `adminly_core::model`
// types. Each `From` impl reconciles field-name drift, coerces ids and
// numbers, and fills fixed fallbacks for missing data, so the same wire
// input always produces the same canonical value.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use adminly_api::{WireNumber, WirePage, WirePrediction, WireTransaction, WireUser, WireUserRef};

use crate::model::{
    FilterCriteria, PaginationMeta, Prediction, PredictionStatus, Resource, ResourceId,
    Transaction, TransactionKind, TransactionStatus, User, UserRole, UserStatus,
    transaction::DEFAULT_CURRENCY,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a backend timestamp. Accepts RFC 3339, a naive
/// `YYYY-MM-DD HH:MM:SS` (taken as UTC), or a bare date.
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Trimmed, non-empty string or `None`.
fn clean(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == raw.len() {
        Some(raw)
    } else {
        Some(trimmed.to_owned())
    }
}

fn number(raw: Option<&WireNumber>) -> f64 {
    raw.and_then(WireNumber::as_f64)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn parse_enum<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|s| s.trim().parse().ok())
}

/// Split an embedded user reference into `(id, name)`.
fn user_ref(raw: Option<WireUserRef>) -> (Option<ResourceId>, Option<String>) {
    match raw {
        Some(WireUserRef::Id(id)) => (Some(ResourceId::from(id)), None),
        Some(WireUserRef::Object(summary)) => (
            summary.id.map(ResourceId::from).filter(|id| !id.is_empty()),
            clean(summary.name),
        ),
        None => (None, None),
    }
}

// ── User ───────────────────────────────────────────────────────────

fn user_status(status: Option<&str>, is_active: Option<bool>) -> UserStatus {
    if let Some(parsed) = parse_enum(status) {
        return parsed;
    }
    match is_active {
        Some(true) => UserStatus::Active,
        Some(false) => UserStatus::Inactive,
        None => UserStatus::Unknown,
    }
}

impl From<WireUser> for User {
    fn from(w: WireUser) -> Self {
        let username = clean(w.username);
        let email = clean(w.email).unwrap_or_default();
        let name = clean(w.name)
            .or_else(|| username.clone())
            .unwrap_or_else(|| email.clone());

        User {
            id: w.id.map(ResourceId::from).unwrap_or_default(),
            name,
            username,
            email,
            phone: clean(w.phone),
            role: parse_enum(w.role.as_deref()).unwrap_or(UserRole::User),
            status: user_status(w.status.as_deref(), w.is_active),
            balance: number(w.balance.as_ref()),
            created_at: parse_timestamp(w.created_at.as_deref()),
            updated_at: parse_timestamp(w.updated_at.as_deref()),
        }
    }
}

// ── Transaction ────────────────────────────────────────────────────

impl From<WireTransaction> for Transaction {
    fn from(w: WireTransaction) -> Self {
        let (user_id, user_name) = user_ref(w.user_id);

        Transaction {
            id: w.id.map(ResourceId::from).unwrap_or_default(),
            user_id,
            user_name,
            amount: number(w.amount.as_ref()),
            currency: clean(w.currency)
                .map_or_else(|| DEFAULT_CURRENCY.to_owned(), |c| c.to_ascii_uppercase()),
            kind: parse_enum(w.kind.as_deref()).unwrap_or(TransactionKind::Other),
            status: parse_enum(w.status.as_deref()).unwrap_or(TransactionStatus::Unknown),
            reference: clean(w.reference),
            description: clean(w.description),
            created_at: parse_timestamp(w.created_at.as_deref()),
            updated_at: parse_timestamp(w.updated_at.as_deref()),
        }
    }
}

// ── Prediction ─────────────────────────────────────────────────────

fn prediction_status(status: Option<&str>, is_settled: Option<bool>) -> PredictionStatus {
    if let Some(parsed) = parse_enum(status) {
        return parsed;
    }
    match is_settled {
        Some(false) => PredictionStatus::Pending,
        // Settled without a readable result: outcome genuinely unknown.
        Some(true) | None => PredictionStatus::Unknown,
    }
}

impl From<WirePrediction> for Prediction {
    fn from(w: WirePrediction) -> Self {
        let (user_id, user_name) = user_ref(w.user_id);

        Prediction {
            id: w.id.map(ResourceId::from).unwrap_or_default(),
            user_id,
            user_name,
            title: clean(w.title).unwrap_or_default(),
            category: clean(w.category),
            outcome: clean(w.outcome),
            odds: number(w.odds.as_ref()),
            stake: number(w.stake.as_ref()),
            status: prediction_status(w.status.as_deref(), w.is_settled),
            created_at: parse_timestamp(w.created_at.as_deref()),
            updated_at: parse_timestamp(w.updated_at.as_deref()),
        }
    }
}

// ── Pages ──────────────────────────────────────────────────────────

/// Normalize a list response against the criteria that requested it.
///
/// Records without an id cannot be selected or mutated and are dropped.
/// Page and limit fall back to the requested values; a missing total is
/// inferred from the items on this page.
pub fn normalize_page<R: Resource>(
    page: WirePage<R::Wire>,
    requested: &FilterCriteria,
) -> (Vec<R>, PaginationMeta) {
    let received = page.items.len();
    let items: Vec<R> = page
        .items
        .into_iter()
        .map(R::normalize)
        .filter(|item| !item.id().is_empty())
        .collect();
    if items.len() != received {
        debug!(
            collection = R::COLLECTION,
            dropped = received - items.len(),
            "dropped records without an id"
        );
    }

    let page_no = page.page.filter(|p| *p >= 1).unwrap_or(requested.page);
    let limit = page.limit.filter(|l| *l >= 1).unwrap_or(requested.limit);
    let total = page.total.unwrap_or_else(|| {
        u64::from(page_no.saturating_sub(1)) * u64::from(limit) + received as u64
    });

    (items, PaginationMeta::from_totals(page_no, limit, total))
}
