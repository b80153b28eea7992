//! # Braze Framework
//!
//! Registration and dispatch layer for bot applications.
//!
//! This layer provides:
//! - Command registry with aliases, descriptions, and per-invoker cooldowns
//! - Event registry keyed by notification category
//! - The dispatcher that routes decoded notifications command-first
//! - The shared error channel that collects handler failures
//!
//! The framework layer is built on top of core types; the runtime crate
//! wires it to a notification source and drives the consume loop.

pub mod command;
pub mod cooldown;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod handler;

pub use command::{Command, CommandBuilder, CommandRegistry};
pub use cooldown::{CooldownTracker, TimeSource};
pub use dispatcher::Dispatcher;
pub use errors::ErrorChannel;
pub use events::EventRegistry;
pub use handler::{
    CommandCallback, ErrorFn, EventCallback, HandlerResult, TaskCallback, error_callback,
};
