//! Prediction presentation.

use tabled::Tabled;

use adminly_core::{Prediction, PredictionStatus};

use crate::output::{Tone, paint};

use super::collection::Presenter;
use super::util::{fmt_money, fmt_time, or_dash};

#[derive(Tabled)]
pub struct PredictionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Event")]
    title: String,
    #[tabled(rename = "Pick")]
    outcome: String,
    #[tabled(rename = "Odds")]
    odds: String,
    #[tabled(rename = "Stake")]
    stake: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn tone(status: PredictionStatus) -> Tone {
    match status {
        PredictionStatus::Won => Tone::Good,
        PredictionStatus::Pending => Tone::Warn,
        PredictionStatus::Lost => Tone::Bad,
        PredictionStatus::Void | PredictionStatus::Unknown => Tone::Neutral,
    }
}

impl Presenter for Prediction {
    type Row = PredictionRow;
    const NOUN: &'static str = "prediction";

    fn row(&self, color: bool) -> PredictionRow {
        PredictionRow {
            id: self.id.to_string(),
            title: self.title.clone(),
            outcome: or_dash(self.outcome.as_deref()),
            odds: format!("{:.2}", self.odds),
            stake: fmt_money(self.stake),
            status: paint(&self.status.to_string(), tone(self.status), color),
        }
    }

    fn detail(&self) -> String {
        let user = self
            .user_name
            .clone()
            .or_else(|| self.user_id.as_ref().map(ToString::to_string));
        [
            format!("ID:       {}", self.id),
            format!("User:     {}", or_dash(user.as_deref())),
            format!("Event:    {}", self.title),
            format!("League:   {}", or_dash(self.category.as_deref())),
            format!("Pick:     {}", or_dash(self.outcome.as_deref())),
            format!("Odds:     {:.2}", self.odds),
            format!("Stake:    {}", fmt_money(self.stake)),
            format!("Payout:   {}", fmt_money(self.potential_payout())),
            format!("Status:   {}", self.status),
            format!("Created:  {}", fmt_time(self.created_at)),
        ]
        .join("\n")
    }
}
