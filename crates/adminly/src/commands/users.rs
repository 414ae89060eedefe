//! User presentation.

use tabled::Tabled;

use adminly_core::{User, UserStatus};

use crate::output::{Tone, paint};

use super::collection::Presenter;
use super::util::{fmt_money, fmt_time, or_dash};

#[derive(Tabled)]
pub struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Joined")]
    joined: String,
}

fn tone(status: UserStatus) -> Tone {
    match status {
        UserStatus::Active => Tone::Good,
        UserStatus::Inactive => Tone::Warn,
        UserStatus::Suspended | UserStatus::Banned => Tone::Bad,
        UserStatus::Unknown => Tone::Neutral,
    }
}

impl Presenter for User {
    type Row = UserRow;
    const NOUN: &'static str = "user";

    fn row(&self, color: bool) -> UserRow {
        UserRow {
            id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.to_string(),
            status: paint(&self.status.to_string(), tone(self.status), color),
            balance: fmt_money(self.balance),
            joined: fmt_time(self.created_at),
        }
    }

    fn detail(&self) -> String {
        [
            format!("ID:       {}", self.id),
            format!("Name:     {}", self.name),
            format!("Username: {}", or_dash(self.username.as_deref())),
            format!("Email:    {}", self.email),
            format!("Phone:    {}", or_dash(self.phone.as_deref())),
            format!("Role:     {}", self.role),
            format!("Status:   {}", self.status),
            format!("Balance:  {}", fmt_money(self.balance)),
            format!("Created:  {}", fmt_time(self.created_at)),
            format!("Updated:  {}", fmt_time(self.updated_at)),
        ]
        .join("\n")
    }
}
