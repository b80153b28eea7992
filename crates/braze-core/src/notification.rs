//! Notification model for the braze framework.
//!
//! A [`Notification`] is one decoded record pushed by the remote service's
//! real-time connection. The connection layer owns wire parsing; by the time
//! a notification reaches the dispatch engine it carries only a category
//! discriminant ([`EventKind`]), an opaque JSON body, and the identifiers
//! the engine needs for routing (sender, thread, community).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Event Kind Classification
// ============================================================================

/// High-level category of an inbound notification.
///
/// This is the discriminant the dispatch engine routes on. Payload kinds the
/// engine does not know about map to [`EventKind::Other`] so that new wire
/// frames never crash dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The connection is established and the bot is ready to receive events.
    Ready,
    /// A chat text message.
    TextMessage,
    /// A member joined a chat thread.
    MemberJoin,
    /// A member left a chat thread.
    MemberLeave,
    /// A connection-level error surfaced by the connection supervisor.
    Error,
    /// Any other notification kind (stickers, media, undocumented frames).
    Other,
}

impl FromStr for EventKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "ready" => EventKind::Ready,
            "text_message" | "message" => EventKind::TextMessage,
            "member_join" => EventKind::MemberJoin,
            "member_leave" => EventKind::MemberLeave,
            "error" => EventKind::Error,
            _ => EventKind::Other,
        })
    }
}

impl EventKind {
    /// Returns the canonical name used in logs and wire payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Ready => "ready",
            EventKind::TextMessage => "text_message",
            EventKind::MemberJoin => "member_join",
            EventKind::MemberLeave => "member_leave",
            EventKind::Error => "error",
            EventKind::Other => "other",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Member
// ============================================================================

/// The member that triggered a notification.
///
/// Only the fields the dispatch engine needs are modeled; the full profile
/// stays in the opaque notification body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Service-assigned user identifier. Also the cooldown invoker key.
    #[serde(rename = "uid")]
    pub id: String,
    /// Display name, if the payload carried one.
    #[serde(default)]
    pub nickname: Option<String>,
}

impl Member {
    /// Creates a member with just an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nickname: None,
        }
    }

    /// Sets the display name.
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }
}

// ============================================================================
// Notification
// ============================================================================

/// One decoded real-time notification.
///
/// The body is deliberately opaque (`serde_json::Value`): the dispatch engine
/// never inspects it beyond the fields mirrored here, and handlers that need
/// more reach into it themselves.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Category discriminant used for routing.
    pub kind: EventKind,
    /// Raw decoded payload as delivered by the connection layer.
    pub body: Value,
    /// The member that caused this notification, if any.
    pub sender: Option<Member>,
    /// Chat thread the notification originated from, if any.
    pub thread_id: Option<String>,
    /// Community the notification belongs to, if any.
    pub community_id: Option<u64>,
    /// Message text for text-message notifications.
    pub content: Option<String>,
    /// Service timestamp in milliseconds since the epoch.
    pub timestamp: i64,
}

impl Notification {
    /// Creates a notification of the given kind with an empty body.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            body: Value::Null,
            sender: None,
            thread_id: None,
            community_id: None,
            content: None,
            timestamp: 0,
        }
    }

    /// Creates a `ready` notification.
    pub fn ready() -> Self {
        Self::new(EventKind::Ready)
    }

    /// Creates a text-message notification.
    pub fn text_message(
        sender: Member,
        thread_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender: Some(sender),
            thread_id: Some(thread_id.into()),
            content: Some(content.into()),
            ..Self::new(EventKind::TextMessage)
        }
    }

    /// Creates a member-join notification.
    pub fn member_join(member: Member, thread_id: impl Into<String>) -> Self {
        Self {
            sender: Some(member),
            thread_id: Some(thread_id.into()),
            ..Self::new(EventKind::MemberJoin)
        }
    }

    /// Creates a member-leave notification.
    pub fn member_leave(member: Member, thread_id: impl Into<String>) -> Self {
        Self {
            sender: Some(member),
            thread_id: Some(thread_id.into()),
            ..Self::new(EventKind::MemberLeave)
        }
    }

    /// Attaches the raw payload body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Sets the community id.
    pub fn with_community(mut self, community_id: u64) -> Self {
        self.community_id = Some(community_id);
        self
    }

    /// Sets the service timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns the sender's user id, if the notification has a sender.
    pub fn sender_id(&self) -> Option<&str> {
        self.sender.as_ref().map(|m| m.id.as_str())
    }

    /// Returns the message text, or an empty string for non-text payloads.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}
