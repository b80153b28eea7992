//! # Braze
//!
//! An async event/command dispatch framework for chat bots.
//!
//! ## Overview
//!
//! Braze routes decoded real-time notifications from a chat service to user
//! code: event callbacks keyed by notification category, prefixed text
//! commands with aliases and per-invoker cooldowns, and periodic tasks on
//! their own clock. Handler failures flow to a shared error channel instead
//! of taking down the dispatch loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐     ┌────────────┐     ┌─────────────────────────┐
//! │ NotificationSource │────▶│ Dispatcher │────▶│ event callbacks         │
//! │ (connection layer) │     │            │────▶│ command handlers        │──▶ ApiClient
//! └────────────────────┘     └────────────┘     └─────────────────────────┘
//!                            ┌────────────┐
//!                            │ Scheduler  │────▶ periodic task handlers ──▶ ApiClient
//!                            └────────────┘
//! ```
//!
//! - **braze-core**: notification model, handler context, client trait
//! - **braze-framework**: registries, cooldowns, the dispatcher
//! - **braze-runtime**: bot lifecycle, scheduler, configuration, logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use braze::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = braze::runtime::config::load_config()?;
//!     braze::runtime::logging::init_from_config(&config.logging);
//!
//!     let mut bot = Bot::from_config(config);
//!     bot.command(
//!         Command::new("ping")
//!             .description("Check the bot is alive")
//!             .handler(|ctx| async move {
//!                 ctx.reply("pong");
//!                 Ok(())
//!             }),
//!     )?;
//!     bot.on_member_join(EventCallback::with_member(|ctx, member| async move {
//!         ctx.reply(format!("Welcome, {}!", member.id));
//!         Ok(())
//!     }))?;
//!
//!     bot.run(source, client).await?;
//!     Ok(())
//! }
//! ```

pub use braze_core as core;
pub use braze_framework as framework;
pub use braze_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use braze::prelude::*;
/// ```
pub mod prelude {
    // Bot lifecycle - main entry point
    pub use braze_runtime::{Bot, BrazeConfig};

    // Registration surface
    pub use braze_framework::{Command, EventCallback, HandlerResult, TaskCallback};

    // Notification model and handler context
    pub use braze_core::{
        ApiClient, BoxedClient, CommunityContext, Context, EventKind, Member, Notification,
        NotificationSource,
    };

    // Errors
    pub use braze_core::{ApiError, HandlerError, RegistryError};
    pub use braze_runtime::{RuntimeError, RuntimeResult};
}
