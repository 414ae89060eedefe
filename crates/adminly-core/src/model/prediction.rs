// ── Prediction domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{Resource, ResourceId, require_any, require_finite, require_not_blank};
use crate::error::CoreError;

/// Settlement state of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PredictionStatus {
    #[strum(to_string = "pending", serialize = "open")]
    Pending,
    #[strum(to_string = "won", serialize = "win")]
    Won,
    #[strum(to_string = "lost", serialize = "loss", serialize = "lose")]
    Lost,
    #[strum(to_string = "void", serialize = "cancelled", serialize = "refunded")]
    Void,
    Unknown,
}

impl PredictionStatus {
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Void)
    }
}

/// The canonical Prediction type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: ResourceId,
    pub user_id: Option<ResourceId>,
    pub user_name: Option<String>,
    /// Event or fixture the prediction is on.
    pub title: String,
    /// League or sport.
    pub category: Option<String>,
    /// The pick itself.
    pub outcome: Option<String>,
    pub odds: f64,
    pub stake: f64,
    pub status: PredictionStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Prediction {
    /// Gross return if the pick wins.
    pub fn potential_payout(&self) -> f64 {
        self.stake * self.odds
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stake: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PredictionStatus>,
}

impl Resource for Prediction {
    type Wire = adminly_api::WirePrediction;
    type Draft = PredictionDraft;

    const COLLECTION: &'static str = "predictions";
    const CATEGORY_PARAM: &'static str = "league";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn normalize(wire: Self::Wire) -> Self {
        Self::from(wire)
    }

    fn validate(draft: &PredictionDraft) -> Result<(), CoreError> {
        let set = [
            draft.title.is_some(),
            draft.outcome.is_some(),
            draft.odds.is_some(),
            draft.stake.is_some(),
            draft.status.is_some(),
        ];
        require_any(set.iter().filter(|s| **s).count())?;
        require_not_blank("title", draft.title.as_deref())?;
        require_not_blank("outcome", draft.outcome.as_deref())?;
        require_finite("odds", draft.odds, 1.0)?;
        require_finite("stake", draft.stake, 0.0)?;
        if draft.status == Some(PredictionStatus::Unknown) {
            return Err(CoreError::validation("status", "cannot set status to unknown"));
        }
        Ok(())
    }
}
