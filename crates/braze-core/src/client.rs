//! Outbound API client trait.
//!
//! The dispatch engine never talks to the remote HTTP surface directly; it
//! only knows the narrow [`ApiClient`] trait. The real implementation (request
//! signing, retry, session handling) lives outside this workspace's scope and
//! is passed in by the application.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiResult;

/// Narrow outbound surface a handler may invoke.
///
/// Implementations are expected to be cheap to clone behind [`BoxedClient`]
/// and safe to call concurrently from handlers and scheduled tasks.
#[async_trait]
pub trait ApiClient: Send + Sync + 'static {
    /// Returns the bot account's own user id.
    ///
    /// Used by the run loop to drop the bot's own echoed messages before
    /// they reach dispatch.
    fn user_id(&self) -> &str;

    /// Sends a chat message into a thread.
    ///
    /// # Arguments
    ///
    /// * `community_id` - Community the thread belongs to.
    /// * `thread_id` - Target chat thread.
    /// * `content` - Message text.
    /// * `reply_to` - Message id to reply to, if this is a threaded reply.
    ///
    /// # Returns
    ///
    /// The id of the created message.
    async fn send_message(
        &self,
        community_id: Option<u64>,
        thread_id: &str,
        content: &str,
        reply_to: Option<&str>,
    ) -> ApiResult<String>;

    /// Calls a raw API action with JSON parameters.
    ///
    /// Escape hatch for operations the trait does not model. Concrete
    /// clients map `action` onto their REST surface.
    async fn call_api(&self, action: &str, params: Value) -> ApiResult<Value>;
}

/// A shared, type-erased API client.
pub type BoxedClient = Arc<dyn ApiClient>;
