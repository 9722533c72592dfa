//! Referral parsing
//!
//! A referral describes how a user entered the conversation (m.me link, ad,
//! customer chat plugin, ...). It arrives either as a standalone messaging
//! event or nested inside a postback.

use crate::json::{self, Object};
use serde::{Deserialize, Serialize};

/// Entry point information attached to a referral or postback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    /// Entry point, e.g. `SHORTLINK` or `ADS`
    pub source: String,
    /// Referral type, e.g. `OPEN_THREAD`
    #[serde(rename = "type")]
    pub kind: String,
    /// `ref` parameter; ad referrals may omit it
    #[serde(rename = "ref")]
    pub ref_payload: Option<String>,
    pub ad_id: Option<String>,
}

/// Parses a raw `referral` object. Missing `source` and `type` read as empty
/// strings; the referral itself is never dropped.
pub fn parse_referral(obj: &Object) -> Referral {
    Referral {
        source: json::string(obj, "source").unwrap_or_default(),
        kind: json::string(obj, "type").unwrap_or_default(),
        ref_payload: json::string(obj, "ref"),
        ad_id: json::id_string(obj, "ad_id"),
    }
}
