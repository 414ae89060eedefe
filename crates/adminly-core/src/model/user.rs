// ── User domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{Resource, ResourceId, require_any, require_not_blank};
use crate::error::CoreError;

/// Account standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UserStatus {
    #[strum(to_string = "active", serialize = "enabled")]
    Active,
    #[strum(to_string = "inactive", serialize = "disabled")]
    Inactive,
    Suspended,
    #[strum(to_string = "banned", serialize = "blocked")]
    Banned,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UserRole {
    #[strum(to_string = "admin", serialize = "administrator", serialize = "superadmin")]
    Admin,
    Moderator,
    #[strum(to_string = "user", serialize = "customer", serialize = "member")]
    User,
}

/// The canonical User type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: ResourceId,
    /// Display name; falls back to username, then email.
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    pub balance: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Fields an operator may set on create or update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

impl Resource for User {
    type Wire = adminly_api::WireUser;
    type Draft = UserDraft;

    const COLLECTION: &'static str = "users";
    const CATEGORY_PARAM: &'static str = "role";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn normalize(wire: Self::Wire) -> Self {
        Self::from(wire)
    }

    fn validate(draft: &UserDraft) -> Result<(), CoreError> {
        let set = [
            draft.name.is_some(),
            draft.email.is_some(),
            draft.phone.is_some(),
            draft.role.is_some(),
            draft.status.is_some(),
        ];
        require_any(set.iter().filter(|s| **s).count())?;
        require_not_blank("name", draft.name.as_deref())?;

        if let Some(ref email) = draft.email {
            let email = email.trim();
            let valid = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
                && !email.contains(char::is_whitespace);
            if !valid {
                return Err(CoreError::validation("email", "not a valid email address"));
            }
        }
        if draft.status == Some(UserStatus::Unknown) {
            return Err(CoreError::validation("status", "cannot set status to unknown"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn status_parses_aliases_case_insensitively() {
        assert_eq!("Enabled".parse::<UserStatus>().ok(), Some(UserStatus::Active));
        assert_eq!("BLOCKED".parse::<UserStatus>().ok(), Some(UserStatus::Banned));
        assert_eq!(UserStatus::Inactive.to_string(), "inactive");
    }

    #[test]
    fn empty_draft_is_rejected() {
        let err = User::validate(&UserDraft::default()).err();
        assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::ValidationFailed));
    }

    #[test]
    fn bad_email_is_rejected() {
        for email in ["nobody", "a@b", "@x.io", "a b@x.io"] {
            let draft = UserDraft {
                email: Some(email.into()),
                ..UserDraft::default()
            };
            assert!(User::validate(&draft).is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn status_only_draft_is_fine() {
        let draft = UserDraft {
            status: Some(UserStatus::Suspended),
            ..UserDraft::default()
        };
        assert!(User::validate(&draft).is_ok());
    }
}
