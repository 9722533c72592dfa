//! Messaging event types
//!
//! Every raw messaging event is classified into exactly one [`Event`]
//! variant. Consumers either `match` on the enum, switch on [`Event::kind`],
//! or use the `is_*` / `as_*` pairs:
//!
//! ```rust,ignore
//! if event.is_quick_reply_message() {
//!     let reply = event.as_quick_reply_message();
//!     handle_payload(&reply.payload);
//! }
//! ```
//!
//! `as_*` panics when called on the wrong variant. That is a caller bug, not
//! a runtime condition, so it is not reported through `Result`.

use crate::{account_linking::AccountLinkingStatus, attachment::Attachment, referral::Referral};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Event kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TextMessage,
    QuickReplyMessage,
    AttachmentMessage,
    MessageEcho,
    OptIn,
    Postback,
    Referral,
    AccountLinking,
    MessageRead,
    MessageDelivered,
    Unsupported,
}

impl EventKind {
    /// Every kind, in declaration order
    pub const ALL: [EventKind; 11] = [
        Self::TextMessage,
        Self::QuickReplyMessage,
        Self::AttachmentMessage,
        Self::MessageEcho,
        Self::OptIn,
        Self::Postback,
        Self::Referral,
        Self::AccountLinking,
        Self::MessageRead,
        Self::MessageDelivered,
        Self::Unsupported,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextMessage => "text_message",
            Self::QuickReplyMessage => "quick_reply_message",
            Self::AttachmentMessage => "attachment_message",
            Self::MessageEcho => "message_echo",
            Self::OptIn => "opt_in",
            Self::Postback => "postback",
            Self::Referral => "referral",
            Self::AccountLinking => "account_linking",
            Self::MessageRead => "message_read",
            Self::MessageDelivered => "message_delivered",
            Self::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes shared by every event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseEvent {
    pub sender_id: String,
    pub recipient_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextMessageEvent {
    #[serde(flatten)]
    pub base: BaseEvent,
    pub message_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickReplyMessageEvent {
    #[serde(flatten)]
    pub base: BaseEvent,
    pub message_id: String,
    pub text: String,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentMessageEvent {
    #[serde(flatten)]
    pub base: BaseEvent,
    pub message_id: String,
    /// Same order and length as the raw `attachments` array
    pub attachments: Vec<Attachment>,
}

/// A message sent by the page itself, echoed back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageEchoEvent {
    #[serde(flatten)]
    pub base: BaseEvent,
    pub message_id: String,
    pub app_id: String,
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptInEvent {
    #[serde(flatten)]
    pub base: BaseEvent,
    pub ref_payload: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostbackEvent {
    #[serde(flatten)]
    pub base: BaseEvent,
    pub title: String,
    pub payload: Option<String>,
    pub referral: Option<Referral>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferralEvent {
    #[serde(flatten)]
    pub base: BaseEvent,
    pub referral: Referral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountLinkingEvent {
    #[serde(flatten)]
    pub base: BaseEvent,
    pub status: AccountLinkingStatus,
    /// Only ever set when `status` is [`AccountLinkingStatus::Linked`]
    pub authorization_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageReadEvent {
    #[serde(flatten)]
    pub base: BaseEvent,
    /// All messages sent before this instant were read
    pub watermark: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageDeliveredEvent {
    #[serde(flatten)]
    pub base: BaseEvent,
    /// All messages sent before this instant were delivered
    pub watermark: DateTime<Utc>,
    /// `None` when the receipt carried no `mids` array, which is not the
    /// same as an empty one
    pub message_ids: Option<Vec<String>>,
}

/// An event shape this crate does not model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsupportedEvent {
    #[serde(flatten)]
    pub base: BaseEvent,
}

/// A classified messaging event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TextMessage(TextMessageEvent),
    QuickReplyMessage(QuickReplyMessageEvent),
    AttachmentMessage(AttachmentMessageEvent),
    MessageEcho(MessageEchoEvent),
    OptIn(OptInEvent),
    Postback(PostbackEvent),
    Referral(ReferralEvent),
    AccountLinking(AccountLinkingEvent),
    MessageRead(MessageReadEvent),
    MessageDelivered(MessageDeliveredEvent),
    Unsupported(UnsupportedEvent),
}

/// Generates the `is_*` predicate and the panicking `as_*` accessor for
/// each variant.
macro_rules! narrowing {
    ($($variant:ident => $is:ident, $as:ident, $ty:ty;)+) => {
        impl Event {
            $(
                pub fn $is(&self) -> bool {
                    matches!(self, Event::$variant(_))
                }

                #[doc = concat!("Narrows to [`", stringify!($ty), "`].")]
                ///
                /// # Panics
                ///
                /// Panics if the event is of any other kind.
                #[track_caller]
                pub fn $as(&self) -> &$ty {
                    match self {
                        Event::$variant(e) => e,
                        other => panic!(
                            "expected {} event, got {} event",
                            EventKind::$variant,
                            other.kind()
                        ),
                    }
                }
            )+
        }
    };
}

narrowing! {
    TextMessage => is_text_message, as_text_message, TextMessageEvent;
    QuickReplyMessage => is_quick_reply_message, as_quick_reply_message, QuickReplyMessageEvent;
    AttachmentMessage => is_attachment_message, as_attachment_message, AttachmentMessageEvent;
    MessageEcho => is_message_echo, as_message_echo, MessageEchoEvent;
    OptIn => is_opt_in, as_opt_in, OptInEvent;
    Postback => is_postback, as_postback, PostbackEvent;
    Referral => is_referral, as_referral, ReferralEvent;
    AccountLinking => is_account_linking, as_account_linking, AccountLinkingEvent;
    MessageRead => is_message_read, as_message_read, MessageReadEvent;
    MessageDelivered => is_message_delivered, as_message_delivered, MessageDeliveredEvent;
    Unsupported => is_unsupported, as_unsupported, UnsupportedEvent;
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::TextMessage(_) => EventKind::TextMessage,
            Event::QuickReplyMessage(_) => EventKind::QuickReplyMessage,
            Event::AttachmentMessage(_) => EventKind::AttachmentMessage,
            Event::MessageEcho(_) => EventKind::MessageEcho,
            Event::OptIn(_) => EventKind::OptIn,
            Event::Postback(_) => EventKind::Postback,
            Event::Referral(_) => EventKind::Referral,
            Event::AccountLinking(_) => EventKind::AccountLinking,
            Event::MessageRead(_) => EventKind::MessageRead,
            Event::MessageDelivered(_) => EventKind::MessageDelivered,
            Event::Unsupported(_) => EventKind::Unsupported,
        }
    }

    /// Predicate by tag; exactly one kind answers `true` for any event.
    pub fn is(&self, kind: EventKind) -> bool {
        self.kind() == kind
    }

    pub fn base(&self) -> &BaseEvent {
        match self {
            Event::TextMessage(e) => &e.base,
            Event::QuickReplyMessage(e) => &e.base,
            Event::AttachmentMessage(e) => &e.base,
            Event::MessageEcho(e) => &e.base,
            Event::OptIn(e) => &e.base,
            Event::Postback(e) => &e.base,
            Event::Referral(e) => &e.base,
            Event::AccountLinking(e) => &e.base,
            Event::MessageRead(e) => &e.base,
            Event::MessageDelivered(e) => &e.base,
            Event::Unsupported(e) => &e.base,
        }
    }

    pub fn sender_id(&self) -> &str {
        &self.base().sender_id
    }

    pub fn recipient_id(&self) -> &str {
        &self.base().recipient_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.base().timestamp
    }
}
