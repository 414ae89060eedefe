//! Transaction presentation.

use tabled::Tabled;

use adminly_core::{Transaction, TransactionStatus};

use crate::output::{Tone, paint};

use super::collection::Presenter;
use super::util::{fmt_money, fmt_time, or_dash};

#[derive(Tabled)]
pub struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn tone(status: TransactionStatus) -> Tone {
    match status {
        TransactionStatus::Completed => Tone::Good,
        TransactionStatus::Pending => Tone::Warn,
        TransactionStatus::Failed | TransactionStatus::Cancelled => Tone::Bad,
        TransactionStatus::Unknown => Tone::Neutral,
    }
}

/// Name when the backend populated it, else the bare id.
fn user_label(tx: &Transaction) -> String {
    tx.user_name
        .clone()
        .or_else(|| tx.user_id.as_ref().map(ToString::to_string))
        .unwrap_or_else(|| "-".into())
}

impl Presenter for Transaction {
    type Row = TransactionRow;
    const NOUN: &'static str = "transaction";

    fn row(&self, color: bool) -> TransactionRow {
        TransactionRow {
            id: self.id.to_string(),
            user: user_label(self),
            kind: self.kind.to_string(),
            amount: format!("{} {}", fmt_money(self.amount), self.currency),
            status: paint(&self.status.to_string(), tone(self.status), color),
            created: fmt_time(self.created_at),
        }
    }

    fn detail(&self) -> String {
        [
            format!("ID:          {}", self.id),
            format!("User:        {}", user_label(self)),
            format!("Type:        {}", self.kind),
            format!("Amount:      {} {}", fmt_money(self.amount), self.currency),
            format!("Status:      {}", self.status),
            format!("Reference:   {}", or_dash(self.reference.as_deref())),
            format!("Description: {}", or_dash(self.description.as_deref())),
            format!("Created:     {}", fmt_time(self.created_at)),
            format!("Updated:     {}", fmt_time(self.updated_at)),
        ]
        .join("\n")
    }
}
