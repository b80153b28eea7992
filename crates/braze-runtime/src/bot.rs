//! Bot orchestration: registration surface and the consume loop.
//!
//! A [`Bot`] is built in two phases. During setup, commands, event
//! callbacks, error callbacks, and periodic tasks are registered;
//! registration errors surface immediately so misconfiguration is caught
//! at startup. [`Bot::run`] then freezes the registries, starts the task
//! scheduler, and consumes notifications from the source strictly in
//! arrival order until the source ends or a shutdown signal arrives.
//!
//! # Example
//!
//! ```rust,ignore
//! use braze_framework::{Command, EventCallback};
//! use braze_runtime::Bot;
//!
//! let mut bot = Bot::new();
//! bot.command(Command::new("ping").handler(|ctx| async move {
//!     ctx.reply("pong");
//!     Ok(())
//! }))?;
//! bot.on_ready(EventCallback::bare(|| async {
//!     tracing::info!("connected");
//!     Ok(())
//! }))?;
//! bot.run(source, client).await?;
//! ```

use std::sync::Arc;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace};

use braze_core::{
    BoxedClient, CommunityContext, EventKind, HandlerError, NotificationSource, RegistryResult,
};
use braze_framework::{Command, Dispatcher, EventCallback, TaskCallback, error_callback};

use crate::config::BrazeConfig;
use crate::error::RuntimeResult;
use crate::scheduler::TaskScheduler;

/// A bot instance: configuration, dispatcher, and scheduler.
pub struct Bot {
    config: BrazeConfig,
    dispatcher: Dispatcher,
    scheduler: TaskScheduler,
}

impl Bot {
    /// Creates a bot with default configuration.
    pub fn new() -> Self {
        Self::from_config(BrazeConfig::default())
    }

    /// Creates a bot from a loaded configuration.
    pub fn from_config(config: BrazeConfig) -> Self {
        let dispatcher = Dispatcher::new(config.bot.command_prefix.clone());
        Self {
            config,
            dispatcher,
            scheduler: TaskScheduler::new(),
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &BrazeConfig {
        &self.config
    }

    /// Returns the dispatcher, e.g. to inspect registered commands.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // ========================================================================
    // Registration surface
    // ========================================================================

    /// Registers a command.
    pub fn command(&mut self, command: Command) -> RegistryResult<()> {
        self.dispatcher.register_command(command)
    }

    /// Registers a callback for the `ready` event.
    pub fn on_ready(&mut self, callback: EventCallback) -> RegistryResult<()> {
        self.dispatcher.register_event(EventKind::Ready, callback)
    }

    /// Registers a callback for text messages that match no command.
    pub fn on_text_message(&mut self, callback: EventCallback) -> RegistryResult<()> {
        self.dispatcher
            .register_event(EventKind::TextMessage, callback)
    }

    /// Registers a callback for members joining a thread.
    pub fn on_member_join(&mut self, callback: EventCallback) -> RegistryResult<()> {
        self.dispatcher
            .register_event(EventKind::MemberJoin, callback)
    }

    /// Registers a callback for members leaving a thread.
    pub fn on_member_leave(&mut self, callback: EventCallback) -> RegistryResult<()> {
        self.dispatcher
            .register_event(EventKind::MemberLeave, callback)
    }

    /// Registers a callback for notifications of no recognized category.
    pub fn on_notification(&mut self, callback: EventCallback) -> RegistryResult<()> {
        self.dispatcher.register_event(EventKind::Other, callback)
    }

    /// Registers an error callback on the shared error channel.
    pub fn on_error<F, Fut>(&mut self, f: F)
    where
        F: Fn(Arc<HandlerError>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.dispatcher.register_error_callback(error_callback(f));
    }

    /// Registers a periodic task.
    pub fn task(
        &mut self,
        name: impl Into<String>,
        interval: std::time::Duration,
        callback: TaskCallback,
    ) -> RegistryResult<()> {
        self.scheduler.schedule(name, interval, callback)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Runs the bot until the source ends or a shutdown signal is received.
    pub async fn run<S>(self, source: S, client: BoxedClient) -> RuntimeResult<()>
    where
        S: NotificationSource,
    {
        info!(
            prefix = %self.config.bot.command_prefix,
            "bot is now running, press Ctrl+C to stop"
        );
        self.run_until(source, client, wait_for_shutdown()).await
    }

    /// Runs the bot until the source ends or `shutdown` completes.
    pub async fn run_until<S, F>(
        self,
        mut source: S,
        client: BoxedClient,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        S: NotificationSource,
        F: std::future::Future<Output = ()>,
    {
        let community = self
            .config
            .bot
            .community_id
            .map(|id| CommunityContext::new(client.clone(), id));

        let token = CancellationToken::new();
        let mut tasks = self
            .scheduler
            .start(community, self.dispatcher.error_channel(), token.clone());

        let dispatcher = self.dispatcher;
        let own_id = client.user_id().to_owned();

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested, stopping consume loop");
                    break;
                }
                next = source.next() => {
                    let Some(notification) = next else {
                        info!(liveness = ?source.liveness(), "notification source ended");
                        break;
                    };
                    if notification.kind == EventKind::TextMessage
                        && notification.sender_id() == Some(own_id.as_str())
                    {
                        trace!("ignoring own message");
                        continue;
                    }
                    dispatcher.dispatch(notification, client.clone()).await;
                }
            }
        }

        // Stop new fires; in-flight task handlers run to completion.
        token.cancel();
        while tasks.join_next().await.is_some() {}

        info!("bot stopped");
        Ok(())
    }
}

impl Default for Bot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("dispatcher", &self.dispatcher)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

/// Waits for Ctrl+C or SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to register SIGTERM handler");

        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("Received Ctrl+C, shutting down");
    }
}
