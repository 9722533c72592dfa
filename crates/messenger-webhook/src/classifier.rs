//! Messaging event classification
//!
//! Raw messaging events share fields across shapes: an echo carries `text`,
//! a postback can carry a `referral`, a quick reply is also a text message.
//! [`RULES`] resolves the overlaps by order alone. The first rule whose
//! predicate matches decides the variant; later rules are not consulted.
//!
//! | # | Predicate                       | Variant                 |
//! |---|---------------------------------|-------------------------|
//! | 1 | `message.is_echo == true`       | `MessageEcho`           |
//! | 2 | `message.attachments`           | `AttachmentMessage`     |
//! | 3 | `message.quick_reply.payload`   | `QuickReplyMessage`     |
//! | 4 | `message.text`                  | `TextMessage`           |
//! | 5 | `optin`                         | `OptIn`                 |
//! | 6 | `postback`                      | `Postback`              |
//! | 7 | `referral`                      | `Referral`              |
//! | 8 | `account_linking`               | `AccountLinking`        |
//! | 9 | `read`                          | `MessageRead`           |
//! |10 | `delivery`                      | `MessageDelivered`      |
//! |11 | anything else                   | `Unsupported`           |
//!
//! A key whose value is `null` counts as absent.
//!
//! If a rule matches but its payload is unusable (unknown linking status,
//! missing watermark, ...) the event is `Unsupported`. Classification never
//! fails.

use crate::{
    account_linking::parse_account_linking,
    attachment::parse_attachments,
    events::*,
    json::{self, Object},
    referral::parse_referral,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

/// One entry of the classification table
pub struct Rule {
    pub kind: EventKind,
    matches: fn(&Object) -> bool,
    build: fn(&Object, BaseEvent) -> Option<Event>,
}

/// Classification rules in priority order
pub static RULES: [Rule; 10] = [
    Rule {
        kind: EventKind::MessageEcho,
        matches: |raw| message(raw).is_some_and(|m| json::bool_flag(m, "is_echo")),
        build: build_message_echo,
    },
    Rule {
        kind: EventKind::AttachmentMessage,
        matches: |raw| message(raw).is_some_and(|m| json::present(m, "attachments")),
        build: build_attachment_message,
    },
    Rule {
        kind: EventKind::QuickReplyMessage,
        matches: |raw| message(raw).and_then(parse_quick_reply_payload).is_some(),
        build: build_quick_reply_message,
    },
    Rule {
        kind: EventKind::TextMessage,
        matches: |raw| message(raw).is_some_and(|m| json::present(m, "text")),
        build: build_text_message,
    },
    Rule {
        kind: EventKind::OptIn,
        matches: |raw| json::present(raw, "optin"),
        build: build_opt_in,
    },
    Rule {
        kind: EventKind::Postback,
        matches: |raw| json::present(raw, "postback"),
        build: build_postback,
    },
    Rule {
        kind: EventKind::Referral,
        matches: |raw| json::present(raw, "referral"),
        build: build_referral,
    },
    Rule {
        kind: EventKind::AccountLinking,
        matches: |raw| json::present(raw, "account_linking"),
        build: build_account_linking,
    },
    Rule {
        kind: EventKind::MessageRead,
        matches: |raw| json::present(raw, "read"),
        build: build_message_read,
    },
    Rule {
        kind: EventKind::MessageDelivered,
        matches: |raw| json::present(raw, "delivery"),
        build: build_message_delivered,
    },
];

/// Classifies one raw messaging event.
///
/// Always returns exactly one variant. Shapes that no rule recognizes, and
/// shapes a rule recognizes but cannot read, become [`Event::Unsupported`].
pub fn classify(raw: &Value) -> Event {
    let empty = Object::new();
    let obj = raw.as_object().unwrap_or(&empty);
    let base = parse_base(obj);

    let Some(rule) = RULES.iter().find(|rule| (rule.matches)(obj)) else {
        debug!(sender_id = %base.sender_id, "Unrecognized messaging event shape");
        return Event::Unsupported(UnsupportedEvent { base });
    };

    match (rule.build)(obj, base.clone()) {
        Some(event) => event,
        None => {
            debug!(
                sender_id = %base.sender_id,
                rule = %rule.kind,
                "Malformed messaging event, classified as unsupported"
            );
            Event::Unsupported(UnsupportedEvent { base })
        }
    }
}

/// Reads `sender.id`, `recipient.id` and `timestamp`.
///
/// Absent ids read as empty strings and an absent timestamp as the Unix
/// epoch; delivery receipts in particular are sent without a timestamp.
fn parse_base(raw: &Object) -> BaseEvent {
    BaseEvent {
        sender_id: json::nested_id(raw, "sender").unwrap_or_default(),
        recipient_id: json::nested_id(raw, "recipient").unwrap_or_default(),
        timestamp: json::instant(raw, "timestamp").unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    }
}

fn message(raw: &Object) -> Option<&Object> {
    json::object(raw, "message")
}

fn message_id(message: &Object) -> String {
    json::string(message, "mid").unwrap_or_default()
}

/// Reads `quick_reply.payload` from a message object.
pub fn parse_quick_reply_payload(message: &Object) -> Option<String> {
    json::object(message, "quick_reply").and_then(|q| json::string(q, "payload"))
}

fn build_message_echo(raw: &Object, base: BaseEvent) -> Option<Event> {
    let message = message(raw)?;
    Some(Event::MessageEcho(MessageEchoEvent {
        base,
        message_id: message_id(message),
        app_id: json::id_string(message, "app_id").unwrap_or_default(),
        metadata: json::string(message, "metadata"),
    }))
}

fn build_attachment_message(raw: &Object, base: BaseEvent) -> Option<Event> {
    let message = message(raw)?;
    let attachments = json::array(message, "attachments")?;
    Some(Event::AttachmentMessage(AttachmentMessageEvent {
        base,
        message_id: message_id(message),
        attachments: parse_attachments(attachments),
    }))
}

fn build_quick_reply_message(raw: &Object, base: BaseEvent) -> Option<Event> {
    let message = message(raw)?;
    Some(Event::QuickReplyMessage(QuickReplyMessageEvent {
        base,
        message_id: message_id(message),
        text: json::string(message, "text").unwrap_or_default(),
        payload: parse_quick_reply_payload(message)?,
    }))
}

fn build_text_message(raw: &Object, base: BaseEvent) -> Option<Event> {
    let message = message(raw)?;
    Some(Event::TextMessage(TextMessageEvent {
        base,
        message_id: message_id(message),
        text: json::string(message, "text")?,
    }))
}

fn build_opt_in(raw: &Object, base: BaseEvent) -> Option<Event> {
    let optin = json::object(raw, "optin")?;
    Some(Event::OptIn(OptInEvent {
        base,
        ref_payload: json::string(optin, "ref"),
    }))
}

fn build_postback(raw: &Object, base: BaseEvent) -> Option<Event> {
    let postback = json::object(raw, "postback")?;
    Some(Event::Postback(PostbackEvent {
        base,
        title: json::string(postback, "title").unwrap_or_default(),
        payload: json::string(postback, "payload"),
        referral: json::object(postback, "referral").map(parse_referral),
    }))
}

fn build_referral(raw: &Object, base: BaseEvent) -> Option<Event> {
    let referral = json::object(raw, "referral")?;
    Some(Event::Referral(ReferralEvent {
        base,
        referral: parse_referral(referral),
    }))
}

fn build_account_linking(raw: &Object, base: BaseEvent) -> Option<Event> {
    let linking = parse_account_linking(json::object(raw, "account_linking")?)?;
    Some(Event::AccountLinking(AccountLinkingEvent {
        base,
        status: linking.status,
        authorization_code: linking.authorization_code,
    }))
}

fn build_message_read(raw: &Object, base: BaseEvent) -> Option<Event> {
    let read = json::object(raw, "read")?;
    Some(Event::MessageRead(MessageReadEvent {
        base,
        watermark: json::instant(read, "watermark")?,
    }))
}

fn build_message_delivered(raw: &Object, base: BaseEvent) -> Option<Event> {
    let delivery = json::object(raw, "delivery")?;
    let message_ids = match delivery.get("mids") {
        None | Some(Value::Null) => None,
        Some(Value::Array(mids)) => Some(
            mids.iter()
                .map(|mid| mid.as_str().map(String::from))
                .collect::<Option<Vec<_>>>()?,
        ),
        Some(_) => return None,
    };

    Some(Event::MessageDelivered(MessageDeliveredEvent {
        base,
        watermark: json::instant(delivery, "watermark")?,
        message_ids,
    }))
}
