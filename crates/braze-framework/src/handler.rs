//! Handler shapes for the braze framework.
//!
//! Each handler declares its parameter shape as an explicit enum variant
//! chosen at registration, validated once by the registries, and matched on
//! during dispatch, so argument binding is a plain `match` on the hot path.
//!
//! Handlers are async closures returning [`HandlerResult`]; an `Err` is
//! wrapped with the handler's identity and delivered to the error channel by
//! the dispatch engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use braze_framework::EventCallback;
//!
//! let cb = EventCallback::with_message(|ctx, member, text| async move {
//!     if text.contains("hello") {
//!         ctx.reply(format!("hi {}!", member.id));
//!     }
//!     Ok(())
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use braze_core::{CommunityContext, Context, HandlerError, Member};

/// Result type returned by every handler body.
pub type HandlerResult = anyhow::Result<()>;

/// Boxed handler taking no arguments.
pub type BareFn = Arc<dyn Fn() -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Boxed handler taking the dispatch context.
pub type ContextFn = Arc<dyn Fn(Arc<Context>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Boxed handler taking the context and the invoking member.
pub type MemberFn =
    Arc<dyn Fn(Arc<Context>, Member) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Boxed handler taking the context, the invoking member, and the message text.
pub type MessageFn =
    Arc<dyn Fn(Arc<Context>, Member, String) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Boxed command handler taking the context and the remainder string.
pub type RemainderFn =
    Arc<dyn Fn(Arc<Context>, String) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Boxed task handler taking a community capability.
pub type CommunityFn =
    Arc<dyn Fn(CommunityContext) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Boxed error callback. Infallible; errors about error handling go nowhere.
pub type ErrorFn = Arc<dyn Fn(Arc<HandlerError>) -> BoxFuture<'static, ()> + Send + Sync>;

// ============================================================================
// Event Callbacks
// ============================================================================

/// An event handler with its declared parameter shape.
///
/// Which variants a category accepts is validated at registration time by
/// [`EventRegistry::register`](crate::events::EventRegistry::register).
#[derive(Clone)]
pub enum EventCallback {
    /// `|| async { .. }` - allowed for `ready`.
    Bare(BareFn),
    /// `|ctx| async { .. }` - allowed for every category.
    Context(ContextFn),
    /// `|ctx, member| async { .. }` - text, join, and leave categories.
    WithMember(MemberFn),
    /// `|ctx, member, text| async { .. }` - text messages only.
    WithMessage(MessageFn),
}

impl EventCallback {
    /// Wraps a zero-argument async closure.
    pub fn bare<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::Bare(Arc::new(move || Box::pin(f())))
    }

    /// Wraps a context-only async closure.
    pub fn context<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::Context(Arc::new(move |ctx| Box::pin(f(ctx))))
    }

    /// Wraps a context + member async closure.
    pub fn with_member<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<Context>, Member) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::WithMember(Arc::new(move |ctx, member| Box::pin(f(ctx, member))))
    }

    /// Wraps a context + member + message-text async closure.
    pub fn with_message<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<Context>, Member, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::WithMessage(Arc::new(move |ctx, member, text| {
            Box::pin(f(ctx, member, text))
        }))
    }

    /// Short shape name used in registration error messages.
    pub(crate) fn shape_name(&self) -> &'static str {
        match self {
            Self::Bare(_) => "bare",
            Self::Context(_) => "context",
            Self::WithMember(_) => "context+member",
            Self::WithMessage(_) => "context+member+message",
        }
    }
}

// ============================================================================
// Command Callbacks
// ============================================================================

/// A command handler with its declared parameter shape.
///
/// Commands accept either the context alone or the context plus the message
/// remainder after the command token; the shape is fixed when the command
/// is built.
#[derive(Clone)]
pub enum CommandCallback {
    /// `|ctx| async { .. }` - the remainder of the message is ignored.
    Context(ContextFn),
    /// `|ctx, remainder| async { .. }` - receives everything after the token.
    WithRemainder(RemainderFn),
}

impl CommandCallback {
    /// Wraps a context-only async closure.
    pub fn context<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::Context(Arc::new(move |ctx| Box::pin(f(ctx))))
    }

    /// Wraps a context + remainder async closure.
    pub fn with_remainder<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<Context>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::WithRemainder(Arc::new(move |ctx, rest| Box::pin(f(ctx, rest))))
    }
}

// ============================================================================
// Task Callbacks
// ============================================================================

/// A scheduled-task handler with its declared parameter shape.
#[derive(Clone)]
pub enum TaskCallback {
    /// `|| async { .. }` - no arguments.
    Bare(BareFn),
    /// `|community| async { .. }` - receives the injected community capability.
    Community(CommunityFn),
}

impl TaskCallback {
    /// Wraps a zero-argument async closure.
    pub fn bare<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::Bare(Arc::new(move || Box::pin(f())))
    }

    /// Wraps a community-context async closure.
    pub fn community<F, Fut>(f: F) -> Self
    where
        F: Fn(CommunityContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::Community(Arc::new(move |community| Box::pin(f(community))))
    }
}

/// Wraps an error-callback async closure into an [`ErrorFn`].
pub fn error_callback<F, Fut>(f: F) -> ErrorFn
where
    F: Fn(Arc<HandlerError>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |err| Box::pin(f(err)))
}
