//! Account linking status parsing

use crate::json::{self, Object};
use serde::{Deserialize, Serialize};

/// Outcome of an account linking flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountLinkingStatus {
    Linked,
    Unlinked,
}

impl AccountLinkingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linked => "linked",
            Self::Unlinked => "unlinked",
        }
    }

    /// Exact, case-sensitive match against the platform's wire values.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "linked" => Some(Self::Linked),
            "unlinked" => Some(Self::Unlinked),
            _ => None,
        }
    }
}

/// Parsed `account_linking` object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLinking {
    pub status: AccountLinkingStatus,
    pub authorization_code: Option<String>,
}

/// Parses a raw `account_linking` object.
///
/// Returns `None` when `status` is missing or not one of the two known
/// values. The authorization code is only read for linked accounts; a code
/// sent alongside `unlinked` is ignored.
pub fn parse_account_linking(obj: &Object) -> Option<AccountLinking> {
    let status = json::string(obj, "status").and_then(|s| AccountLinkingStatus::from_wire(&s))?;
    let authorization_code = match status {
        AccountLinkingStatus::Linked => json::string(obj, "authorization_code"),
        AccountLinkingStatus::Unlinked => None,
    };

    Some(AccountLinking {
        status,
        authorization_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Option<AccountLinking> {
        parse_account_linking(value.as_object().unwrap())
    }

    #[test]
    fn test_linked_with_code() {
        let linking = parse(json!({
            "status": "linked",
            "authorization_code": "PASS_THROUGH_AUTHORIZATION_CODE"
        }))
        .unwrap();

        assert_eq!(linking.status, AccountLinkingStatus::Linked);
        assert_eq!(
            linking.authorization_code.as_deref(),
            Some("PASS_THROUGH_AUTHORIZATION_CODE")
        );
    }

    #[test]
    fn test_unlinked_ignores_stray_code() {
        let linking = parse(json!({
            "status": "unlinked",
            "authorization_code": "SHOULD_NOT_BE_READ"
        }))
        .unwrap();

        assert_eq!(linking.status, AccountLinkingStatus::Unlinked);
        assert_eq!(linking.authorization_code, None);
    }

    #[test]
    fn test_status_is_case_sensitive() {
        assert!(parse(json!({ "status": "LINKED" })).is_none());
        assert!(parse(json!({ "status": "pending" })).is_none());
        assert!(parse(json!({})).is_none());
    }
}
