//! Command definitions and the command registry.
//!
//! A [`Command`] is built once at setup time with an explicit builder and is
//! immutable afterwards. The [`CommandRegistry`] keeps names and aliases in
//! one unified key space: registering a command whose name collides with an
//! existing alias (or vice versa) fails with
//! [`RegistryError::DuplicateKey`] and leaves the registry untouched.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use braze_framework::Command;
//!
//! let ping = Command::new("ping")
//!     .description("Check that the bot is alive")
//!     .alias("p")
//!     .cooldown(Duration::from_secs(5))
//!     .handler(|ctx| async move {
//!         ctx.reply("Pong!");
//!         Ok(())
//!     });
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use braze_core::{Context, RegistryError, RegistryResult};

use crate::handler::{CommandCallback, HandlerResult};

// ============================================================================
// Command Definition
// ============================================================================

/// An immutable command definition: key set, cooldown, and handler.
pub struct Command {
    name: String,
    description: Option<String>,
    aliases: Vec<String>,
    cooldown: Duration,
    handler: CommandCallback,
}

impl Command {
    /// Starts building a command with the given name.
    pub fn new(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            description: None,
            aliases: Vec::new(),
            cooldown: Duration::ZERO,
        }
    }

    /// The primary name. Also the cooldown ledger key for this command,
    /// regardless of which alias invoked it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display description, if one was set.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Registered aliases in declaration order.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Minimum time between invocations by the same member. Zero disables
    /// throttling.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub(crate) fn callback(&self) -> &CommandCallback {
        &self.handler
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Command`]. Finished by [`handler`](Self::handler) or
/// [`handler_with_remainder`](Self::handler_with_remainder), which fixes the
/// parameter shape.
pub struct CommandBuilder {
    name: String,
    description: Option<String>,
    aliases: Vec<String>,
    cooldown: Duration,
}

impl CommandBuilder {
    /// Sets the display description. Commands without one are omitted from
    /// the generated help listing.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds one alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds several aliases.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Sets the per-member cooldown.
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Finishes with a context-only handler.
    pub fn handler<F, Fut>(self, f: F) -> Command
    where
        F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.build(CommandCallback::context(f))
    }

    /// Finishes with a handler that also receives the message remainder
    /// (everything after the command token, untrimmed of inner whitespace).
    pub fn handler_with_remainder<F, Fut>(self, f: F) -> Command
    where
        F: Fn(Arc<Context>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.build(CommandCallback::with_remainder(f))
    }

    fn build(self, handler: CommandCallback) -> Command {
        Command {
            name: self.name,
            description: self.description,
            aliases: self.aliases,
            cooldown: self.cooldown,
            handler,
        }
    }
}

// ============================================================================
// Command Registry
// ============================================================================

/// Maps command names and aliases to their definitions.
///
/// Populated during the setup phase, read-only once dispatch starts.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<Command>>,
    /// Unified name/alias key space; values index into `commands`.
    keys: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command, claiming its name and every alias as keys.
    ///
    /// Fails with [`RegistryError::DuplicateKey`] on the first colliding key
    /// without modifying the registry.
    pub fn register(&mut self, command: Command) -> RegistryResult<()> {
        // Validate every key (against the registry and against each other)
        // before claiming any, so a failed registration has no side effects.
        let mut claimed: Vec<&str> = Vec::with_capacity(1 + command.aliases.len());
        for key in std::iter::once(command.name()).chain(command.aliases.iter().map(String::as_str))
        {
            if self.keys.contains_key(key) || claimed.contains(&key) {
                return Err(RegistryError::DuplicateKey {
                    key: key.to_owned(),
                });
            }
            claimed.push(key);
        }

        let index = self.commands.len();
        for key in claimed {
            self.keys.insert(key.to_owned(), index);
        }
        self.commands.push(Arc::new(command));
        Ok(())
    }

    /// Looks up a command by name or alias. O(1) expected.
    pub fn resolve(&self, token: &str) -> Option<Arc<Command>> {
        self.keys
            .get(token)
            .map(|&index| Arc::clone(&self.commands[index]))
    }

    /// Returns whether a name or alias is taken.
    pub fn contains(&self, token: &str) -> bool {
        self.keys.contains_key(token)
    }

    /// Number of registered commands (not keys).
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns whether no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.iter()
    }

    /// Builds the help listing sent in response to the built-in `help`
    /// command. Commands without a description are omitted.
    pub fn help_text(&self) -> String {
        let mut help = String::from("[bcu]Commands\n");
        help.push_str("\n[ic]This is a list of all the commands available on this bot.\n");
        for command in self.commands.iter().filter(|c| c.description.is_some()) {
            help.push_str(&format!(
                "\n[uc]{}\n[ic]{}",
                command.name,
                command.description.as_deref().unwrap_or_default()
            ));
        }
        help.push_str("\n\n[ic]This message was generated automatically.");
        help
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands.len())
            .field("keys", &self.keys.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> CommandBuilder {
        Command::new(name)
    }

    #[test]
    fn resolve_by_name_and_alias_returns_same_command() {
        let mut registry = CommandRegistry::new();
        registry
            .register(noop("ping").alias("p").alias("alive").handler(|_| async { Ok(()) }))
            .unwrap();

        let by_name = registry.resolve("ping").unwrap();
        let by_alias = registry.resolve("p").unwrap();
        let by_alias2 = registry.resolve("alive").unwrap();
        assert!(Arc::ptr_eq(&by_name, &by_alias));
        assert!(Arc::ptr_eq(&by_name, &by_alias2));
    }

    #[test]
    fn resolve_unregistered_token_is_none() {
        let registry = CommandRegistry::new();
        assert!(registry.resolve("nope").is_none());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(noop("ping").handler(|_| async { Ok(()) })).unwrap();
        let err = registry
            .register(noop("ping").handler(|_| async { Ok(()) }))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateKey { key: "ping".into() });
    }

    #[test]
    fn name_colliding_with_existing_alias_is_rejected() {
        let mut registry = CommandRegistry::new();
        registry
            .register(noop("ping").alias("p").handler(|_| async { Ok(()) }))
            .unwrap();
        let err = registry.register(noop("p").handler(|_| async { Ok(()) })).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateKey { key: "p".into() });
    }

    #[test]
    fn alias_colliding_with_existing_name_is_rejected_without_side_effects() {
        let mut registry = CommandRegistry::new();
        registry.register(noop("ping").handler(|_| async { Ok(()) })).unwrap();
        let err = registry
            .register(noop("status").alias("ping").handler(|_| async { Ok(()) }))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateKey { key: "ping".into() });

        // The failed registration must not have claimed any key.
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("status").is_none());
    }

    #[test]
    fn self_colliding_aliases_are_rejected() {
        let mut registry = CommandRegistry::new();
        let err = registry
            .register(noop("ping").alias("p").alias("p").handler(|_| async { Ok(()) }))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateKey { key: "p".into() });
        assert!(registry.is_empty());
    }

    #[test]
    fn help_text_lists_described_commands_only() {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                noop("ping")
                    .description("Check the bot is alive")
                    .handler(|_| async { Ok(()) }),
            )
            .unwrap();
        registry.register(noop("secret").handler(|_| async { Ok(()) })).unwrap();

        let help = registry.help_text();
        assert!(help.contains("ping"));
        assert!(help.contains("Check the bot is alive"));
        assert!(!help.contains("secret"));
    }
}
