//! # Braze Core
//!
//! Foundation types for the braze bot framework.
//!
//! This crate defines the vocabulary shared by the dispatch engine and the
//! runtime:
//!
//! - **Notification model**: decoded real-time records and their category
//!   discriminant ([`Notification`], [`EventKind`], [`Member`])
//! - **Outbound surface**: the narrow API client trait handlers invoke
//!   ([`ApiClient`], [`BoxedClient`])
//! - **Context**: the per-dispatch value object with a bound reply action
//!   ([`Context`], [`CommunityContext`])
//! - **Connection boundary**: the source of decoded notifications
//!   ([`NotificationSource`], [`ChannelSource`])
//! - **Errors**: registration, API, and handler error types
//!
//! Wire parsing, authentication, and the REST surface live behind these
//! traits and are out of scope for this workspace.

pub mod client;
pub mod context;
pub mod error;
pub mod notification;
pub mod source;

pub use client::{ApiClient, BoxedClient};
pub use context::{CommunityContext, Context};
pub use error::{ApiError, ApiResult, HandlerError, RegistryError, RegistryResult};
pub use notification::{EventKind, Member, Notification};
pub use source::{ChannelSource, Liveness, NotificationSource};
