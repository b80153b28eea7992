//! Braze Runtime - Orchestration layer for the Braze bot framework.
//!
//! This crate provides:
//! - Bot lifecycle management ([`Bot`])
//! - The periodic task scheduler ([`TaskScheduler`])
//! - Figment-based configuration loading ([`config`])
//! - Logging configuration ([`logging`])
//!
//! ```ignore
//! use braze_framework::Command;
//! use braze_runtime::{Bot, config, logging};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = config::load_config()?;
//!     logging::init_from_config(&config.logging);
//!
//!     let mut bot = Bot::from_config(config);
//!     bot.command(Command::new("ping").handler(|ctx| async move {
//!         ctx.reply("pong");
//!         Ok(())
//!     }))?;
//!
//!     // Run until Ctrl+C, dispatching notifications from the connection
//!     bot.run(source, client).await?;
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod config;
pub mod error;
pub mod logging;
pub mod scheduler;

// Re-exports
pub use bot::Bot;
pub use config::{BotSettings, BrazeConfig, ConfigError, ConfigLoader, ConfigResult};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use scheduler::TaskScheduler;

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;
