//! Per-dispatch context handed to handlers.
//!
//! One [`Context`] is created for each dispatched notification and dropped
//! when the last handler for that notification returns. It bundles the
//! triggering [`Notification`] with the [`ApiClient`] bound to the
//! originating thread, so handler code can reply without knowing routing
//! identifiers.

use std::sync::Arc;

use tracing::warn;

use crate::client::BoxedClient;
use crate::error::ApiResult;
use crate::notification::{Member, Notification};

/// Ephemeral value object carrying one notification through its handlers.
pub struct Context {
    notification: Notification,
    client: BoxedClient,
}

impl Context {
    /// Creates a context for one dispatch cycle.
    pub fn new(notification: Notification, client: BoxedClient) -> Self {
        Self {
            notification,
            client,
        }
    }

    /// Returns the triggering notification.
    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    /// Returns the member that triggered the notification, if any.
    pub fn member(&self) -> Option<&Member> {
        self.notification.sender.as_ref()
    }

    /// Returns the outbound API client.
    pub fn client(&self) -> &BoxedClient {
        &self.client
    }

    /// Returns the id of the triggering message, if the payload carried one.
    pub fn message_id(&self) -> Option<&str> {
        self.notification.body.get("messageId").and_then(|v| v.as_str())
    }

    /// Replies to the originating thread, fire-and-forget.
    ///
    /// The send is spawned so dispatch never waits on network latency; a
    /// failure is logged and dropped. Use [`send`](Self::send) when the
    /// handler needs the result.
    pub fn reply(&self, content: impl Into<String>) {
        let Some(thread_id) = self.notification.thread_id.clone() else {
            warn!("reply called on a notification without a thread, dropping");
            return;
        };
        let client = Arc::clone(&self.client);
        let community_id = self.notification.community_id;
        let reply_to = self.message_id().map(str::to_owned);
        let content = content.into();

        tokio::spawn(async move {
            if let Err(e) = client
                .send_message(community_id, &thread_id, &content, reply_to.as_deref())
                .await
            {
                warn!(error = %e, thread = %thread_id, "failed to send reply");
            }
        });
    }

    /// Sends a message into the originating thread and awaits the result.
    ///
    /// Unlike [`reply`](Self::reply) this does not mark the message as a
    /// threaded reply and surfaces the API outcome to the caller.
    pub async fn send(&self, content: &str) -> ApiResult<String> {
        let thread_id = self
            .notification
            .thread_id
            .as_deref()
            .ok_or_else(|| crate::error::ApiError::NoThread)?;
        self.client
            .send_message(self.notification.community_id, thread_id, content, None)
            .await
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("kind", &self.notification.kind)
            .field("thread_id", &self.notification.thread_id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Community Context
// ============================================================================

/// Capability handed to scheduled tasks that declared a community parameter.
///
/// The scheduler does not own this; it is injected by the application at
/// start and cloned into each fire.
#[derive(Clone)]
pub struct CommunityContext {
    client: BoxedClient,
    community_id: u64,
}

impl CommunityContext {
    /// Creates a community capability for the given community id.
    pub fn new(client: BoxedClient, community_id: u64) -> Self {
        Self {
            client,
            community_id,
        }
    }

    /// Returns the community id this capability is scoped to.
    pub fn community_id(&self) -> u64 {
        self.community_id
    }

    /// Returns the outbound API client.
    pub fn client(&self) -> &BoxedClient {
        &self.client
    }

    /// Sends a message into a thread of this community.
    pub async fn send_message(&self, thread_id: &str, content: &str) -> ApiResult<String> {
        self.client
            .send_message(Some(self.community_id), thread_id, content, None)
            .await
    }
}

impl std::fmt::Debug for CommunityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommunityContext")
            .field("community_id", &self.community_id)
            .finish_non_exhaustive()
    }
}
