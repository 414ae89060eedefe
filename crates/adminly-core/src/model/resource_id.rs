// ── Resource identity ──
//
// The backend hands out ids as JSON numbers on some endpoints and strings
// on others. `ResourceId` is the single canonical form: an opaque string.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use adminly_api::WireId;

/// Canonical identifier for any managed record.
///
/// `42`, `42.0` and `"42"` on the wire all become `ResourceId("42")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.len() == raw.len() {
            Self(raw)
        } else {
            Self(trimmed.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<WireId> for ResourceId {
    fn from(id: WireId) -> Self {
        Self::new(id.to_string())
    }
}

impl From<&WireId> for ResourceId {
    fn from(id: &WireId) -> Self {
        Self::new(id.to_string())
    }
}

impl Borrow<str> for ResourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_coincide() {
        let from_int = ResourceId::from(WireId::Int(42));
        let from_float = ResourceId::from(WireId::Float(42.0));
        let from_text = ResourceId::from(WireId::Text("42".into()));
        assert_eq!(from_int, from_text);
        assert_eq!(from_float, from_text);
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(ResourceId::from("  abc "), ResourceId::from("abc"));
    }

    #[test]
    fn from_str_and_display() {
        let id: ResourceId = "507f1f77bcf86cd799439011".parse().unwrap_or_default();
        assert_eq!(id.to_string(), "507f1f77bcf86cd799439011");
    }
}
