//! Event/command dispatch engine.
//!
//! The [`Dispatcher`] consumes decoded notifications from the connection
//! layer, classifies each one by [`EventKind`], and routes it:
//!
//! 1. `ready` runs every ready callback in registration order.
//! 2. Text messages are matched command-first: if the first token after the
//!    command prefix resolves in the command registry, only that command's
//!    handler runs (subject to the cooldown check); otherwise the message
//!    falls through to every text-message callback.
//! 3. Member join/leave notifications run their category's callbacks.
//! 4. Anything else runs the generic-notification callbacks, or is dropped
//!    silently when none are registered.
//!
//! A handler error never propagates out of [`dispatch`](Dispatcher::dispatch):
//! it is wrapped with the handler's identity and delivered to the error
//! channel. A throttled command invocation is not an error; it is dropped
//! without a trace beyond a debug log.

use std::sync::Arc;

use tracing::{Level, debug, span, trace};

use braze_core::{BoxedClient, Context, EventKind, HandlerError, Notification, RegistryResult};

use crate::command::{Command, CommandRegistry};
use crate::cooldown::CooldownTracker;
use crate::errors::ErrorChannel;
use crate::events::EventRegistry;
use crate::handler::{CommandCallback, ErrorFn, EventCallback};

/// The central dispatcher: registries, cooldown ledger, and error channel.
///
/// Registration methods take `&mut self` and belong to the setup phase;
/// once the bot starts, the dispatcher is shared behind an `Arc` and only
/// [`dispatch`](Self::dispatch) is called. The cooldown ledger is the only
/// state mutated during steady-state operation.
pub struct Dispatcher {
    prefix: String,
    commands: CommandRegistry,
    events: EventRegistry,
    cooldowns: CooldownTracker,
    errors: Arc<ErrorChannel>,
}

impl Dispatcher {
    /// Creates a dispatcher with the given command prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            commands: CommandRegistry::new(),
            events: EventRegistry::new(),
            cooldowns: CooldownTracker::new(),
            errors: Arc::new(ErrorChannel::new()),
        }
    }

    /// Replaces the cooldown tracker, e.g. to inject a test time source.
    pub fn with_cooldown_tracker(mut self, tracker: CooldownTracker) -> Self {
        self.cooldowns = tracker;
        self
    }

    /// Returns the configured command prefix.
    pub fn command_prefix(&self) -> &str {
        &self.prefix
    }

    /// Registers a command. Fails fast on key collisions.
    pub fn register_command(&mut self, command: Command) -> RegistryResult<()> {
        self.commands.register(command)
    }

    /// Registers an event callback for a category.
    pub fn register_event(&mut self, kind: EventKind, callback: EventCallback) -> RegistryResult<()> {
        self.events.register(kind, callback)
    }

    /// Registers an error callback on the shared error channel.
    pub fn register_error_callback(&self, callback: ErrorFn) {
        self.errors.register(callback);
    }

    /// Returns the error channel shared with the task scheduler.
    pub fn error_channel(&self) -> Arc<ErrorChannel> {
        Arc::clone(&self.errors)
    }

    /// Returns the command registry.
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Routes one decoded notification to its handlers.
    ///
    /// Completes when every invoked handler has returned. Never returns an
    /// error and never panics on unknown payload kinds.
    pub async fn dispatch(&self, notification: Notification, client: BoxedClient) {
        let kind = notification.kind;
        let span = span!(Level::DEBUG, "dispatch", kind = %kind);
        let _enter = span.enter();

        match kind {
            EventKind::Error => {
                let message = notification
                    .content
                    .clone()
                    .unwrap_or_else(|| notification.body.to_string());
                self.errors
                    .report(HandlerError::new("connection", anyhow::anyhow!(message)))
                    .await;
            }
            EventKind::TextMessage => {
                let ctx = Arc::new(Context::new(notification, client));
                self.dispatch_text(&ctx).await;
            }
            _ => {
                let ctx = Arc::new(Context::new(notification, client));
                self.run_event_handlers(kind, &ctx).await;
            }
        }
    }

    /// Command-first routing for text messages.
    async fn dispatch_text(&self, ctx: &Arc<Context>) {
        let text = ctx.notification().text().to_owned();

        if let Some(token) = command_token(&text, &self.prefix) {
            if let Some(command) = self.commands.resolve(token) {
                self.invoke_command(&command, token, ctx, &text).await;
                return;
            }

            // Built-in help: only for the bare token, and only when no user
            // command claimed the `help` key.
            if token == "help" && remainder(&text, &self.prefix, token).is_empty() {
                ctx.reply(self.commands.help_text());
                return;
            }

            trace!(token, "no command matched, falling through to text handlers");
        }

        self.run_event_handlers(EventKind::TextMessage, ctx).await;
    }

    async fn invoke_command(&self, command: &Command, token: &str, ctx: &Arc<Context>, text: &str) {
        let invoker = ctx.notification().sender_id().unwrap_or_default().to_owned();
        let cooldown = command.cooldown();

        if self.cooldowns.is_throttled(command.name(), &invoker, cooldown) {
            // Silent drop: no handler call, no error reply.
            debug!(command = command.name(), invoker = %invoker, "invocation throttled");
            return;
        }

        let result = match command.callback() {
            CommandCallback::Context(f) => f(Arc::clone(ctx)).await,
            CommandCallback::WithRemainder(f) => {
                f(Arc::clone(ctx), remainder(text, &self.prefix, token)).await
            }
        };

        if !cooldown.is_zero() {
            self.cooldowns.record(command.name(), &invoker);
        }

        if let Err(e) = result {
            self.errors
                .report(HandlerError::new(format!("command:{}", command.name()), e))
                .await;
        }
    }

    /// Runs every callback registered for a category, in order.
    async fn run_event_handlers(&self, kind: EventKind, ctx: &Arc<Context>) {
        let callbacks = self.events.handlers_for(kind);
        if callbacks.is_empty() {
            trace!(kind = %kind, "no handlers registered, dropping notification");
            return;
        }

        for (index, callback) in callbacks.iter().enumerate() {
            let result = match callback {
                EventCallback::Bare(f) => f().await,
                EventCallback::Context(f) => f(Arc::clone(ctx)).await,
                EventCallback::WithMember(f) => match ctx.member().cloned() {
                    Some(member) => f(Arc::clone(ctx), member).await,
                    None => {
                        debug!(kind = %kind, index, "notification has no member, skipping handler");
                        continue;
                    }
                },
                EventCallback::WithMessage(f) => match ctx.member().cloned() {
                    Some(member) => {
                        f(Arc::clone(ctx), member, ctx.notification().text().to_owned()).await
                    }
                    None => {
                        debug!(kind = %kind, index, "notification has no member, skipping handler");
                        continue;
                    }
                },
            };

            if let Err(e) = result {
                self.errors
                    .report(HandlerError::new(format!("event:{kind}[{index}]"), e))
                    .await;
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("prefix", &self.prefix)
            .field("commands", &self.commands.len())
            .field("event_handlers", &self.events.len())
            .finish_non_exhaustive()
    }
}

/// Extracts the command token: the first whitespace-delimited token directly
/// after the prefix. A message whose stripped content is empty (or starts
/// with whitespace) is never a command.
fn command_token<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let stripped = text.strip_prefix(prefix)?;
    let token = stripped.split_whitespace().next()?;
    // "! ping" is not a command; the token must touch the prefix.
    stripped.starts_with(token).then_some(token)
}

/// Everything after the command token, with the single separating space
/// removed.
fn remainder(text: &str, prefix: &str, token: &str) -> String {
    let rest = &text[prefix.len() + token.len()..];
    rest.strip_prefix(' ').unwrap_or(rest).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::Value;

    use braze_core::{ApiClient, ApiResult, Member};

    use crate::handler::error_callback;

    struct MockClient {
        sent: Mutex<Vec<String>>,
    }

    impl MockClient {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ApiClient for MockClient {
        fn user_id(&self) -> &str {
            "bot"
        }

        async fn send_message(
            &self,
            _community_id: Option<u64>,
            _thread_id: &str,
            content: &str,
            _reply_to: Option<&str>,
        ) -> ApiResult<String> {
            self.sent.lock().push(content.to_owned());
            Ok("m1".to_owned())
        }

        async fn call_api(&self, _action: &str, _params: Value) -> ApiResult<Value> {
            Ok(Value::Null)
        }
    }

    fn text(content: &str) -> Notification {
        Notification::text_message(Member::new("u1"), "t1", content)
    }

    fn counting_command(name: &str, counter: &Arc<AtomicUsize>) -> Command {
        let counter = Arc::clone(counter);
        Command::new(name).handler(move |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    /// Manual clock for cooldown tests.
    fn manual_dispatcher(clock: Arc<Mutex<Instant>>) -> Dispatcher {
        let source = Arc::clone(&clock);
        Dispatcher::new("!").with_cooldown_tracker(CooldownTracker::with_time_source(Arc::new(
            move || *source.lock(),
        )))
    }

    #[tokio::test]
    async fn matched_command_suppresses_text_handlers() {
        let commands = Arc::new(AtomicUsize::new(0));
        let events = Arc::new(AtomicUsize::new(0));

        let mut dispatcher = Dispatcher::new("!");
        dispatcher.register_command(counting_command("ping", &commands)).unwrap();
        let events_clone = Arc::clone(&events);
        dispatcher
            .register_event(
                EventKind::TextMessage,
                EventCallback::context(move |_| {
                    let events = Arc::clone(&events_clone);
                    async move {
                        events.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }),
            )
            .unwrap();

        dispatcher.dispatch(text("!ping"), MockClient::new()).await;

        assert_eq!(commands.load(Ordering::SeqCst), 1);
        assert_eq!(events.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unmatched_text_runs_every_handler_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new("!");

        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            dispatcher
                .register_event(
                    EventKind::TextMessage,
                    EventCallback::with_message(move |_, member, body| {
                        let order = Arc::clone(&order);
                        async move {
                            assert_eq!(member.id, "u1");
                            assert_eq!(body, "hi there");
                            order.lock().push(tag);
                            Ok(())
                        }
                    }),
                )
                .unwrap();
        }

        dispatcher.dispatch(text("hi there"), MockClient::new()).await;
        assert_eq!(*order.lock(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn unknown_command_token_falls_through() {
        let events = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new("!");
        let events_clone = Arc::clone(&events);
        dispatcher
            .register_event(
                EventKind::TextMessage,
                EventCallback::context(move |_| {
                    let events = Arc::clone(&events_clone);
                    async move {
                        events.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }),
            )
            .unwrap();

        dispatcher.dispatch(text("!nope"), MockClient::new()).await;
        // Prefix with no token at all behaves the same way.
        dispatcher.dispatch(text("!"), MockClient::new()).await;
        dispatcher.dispatch(text("! spaced"), MockClient::new()).await;

        assert_eq!(events.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cooldown_throttles_then_releases() {
        let clock = Arc::new(Mutex::new(Instant::now()));
        let mut dispatcher = manual_dispatcher(Arc::clone(&clock));

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        dispatcher
            .register_command(Command::new("ping").cooldown(Duration::from_secs(5)).handler(
                move |_| {
                    let calls = Arc::clone(&calls_clone);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                },
            ))
            .unwrap();

        let client = MockClient::new();
        dispatcher.dispatch(text("!ping"), client.clone()).await; // t=0: runs
        *clock.lock() += Duration::from_secs(3);
        dispatcher.dispatch(text("!ping"), client.clone()).await; // t=3: dropped
        *clock.lock() += Duration::from_secs(3);
        dispatcher.dispatch(text("!ping"), client.clone()).await; // t=6: runs

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_cooldown_never_throttles() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new("!");
        dispatcher.register_command(counting_command("ping", &calls)).unwrap();

        let client = MockClient::new();
        for _ in 0..3 {
            dispatcher.dispatch(text("!ping"), client.clone()).await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cooldown_is_per_invoker() {
        let clock = Arc::new(Mutex::new(Instant::now()));
        let mut dispatcher = manual_dispatcher(clock);

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        dispatcher
            .register_command(Command::new("ping").cooldown(Duration::from_secs(5)).handler(
                move |_| {
                    let calls = Arc::clone(&calls_clone);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                },
            ))
            .unwrap();

        let client = MockClient::new();
        let from = |id: &str| Notification::text_message(Member::new(id), "t1", "!ping");
        dispatcher.dispatch(from("u1"), client.clone()).await;
        dispatcher.dispatch(from("u2"), client.clone()).await;
        dispatcher.dispatch(from("u1"), client.clone()).await; // throttled

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn handler_error_reaches_every_error_callback() {
        let mut dispatcher = Dispatcher::new("!");
        dispatcher
            .register_command(
                Command::new("boom").handler(|_| async { Err(anyhow::anyhow!("kaput")) }),
            )
            .unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            dispatcher.register_error_callback(error_callback(move |err| {
                let seen = Arc::clone(&seen);
                async move {
                    assert_eq!(err.origin, "command:boom");
                    assert_eq!(err.source.to_string(), "kaput");
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }

        // Must return normally despite the failing handler.
        dispatcher.dispatch(text("!boom"), MockClient::new()).await;
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn redispatching_the_same_payload_invokes_twice() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new("!");
        dispatcher.register_command(counting_command("ping", &calls)).unwrap();

        let client = MockClient::new();
        let payload = text("!ping");
        dispatcher.dispatch(payload.clone(), client.clone()).await;
        dispatcher.dispatch(payload, client).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn remainder_is_bound_for_one_parameter_commands() {
        let captured = Arc::new(Mutex::new(String::new()));
        let captured_clone = Arc::clone(&captured);

        let mut dispatcher = Dispatcher::new("!");
        dispatcher
            .register_command(Command::new("say").handler_with_remainder(move |_, rest| {
                let captured = Arc::clone(&captured_clone);
                async move {
                    *captured.lock() = rest;
                    Ok(())
                }
            }))
            .unwrap();

        dispatcher
            .dispatch(text("!say hello  world"), MockClient::new())
            .await;
        assert_eq!(*captured.lock(), "hello  world");
    }

    #[tokio::test]
    async fn ready_runs_all_ready_handlers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new("!");

        let bare = Arc::clone(&calls);
        dispatcher
            .register_event(
                EventKind::Ready,
                EventCallback::bare(move || {
                    let calls = Arc::clone(&bare);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }),
            )
            .unwrap();
        let with_ctx = Arc::clone(&calls);
        dispatcher
            .register_event(
                EventKind::Ready,
                EventCallback::context(move |_| {
                    let calls = Arc::clone(&with_ctx);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }),
            )
            .unwrap();

        dispatcher.dispatch(Notification::ready(), MockClient::new()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn member_join_binds_the_member() {
        let joined = Arc::new(Mutex::new(String::new()));
        let joined_clone = Arc::clone(&joined);

        let mut dispatcher = Dispatcher::new("!");
        dispatcher
            .register_event(
                EventKind::MemberJoin,
                EventCallback::with_member(move |_, member| {
                    let joined = Arc::clone(&joined_clone);
                    async move {
                        *joined.lock() = member.id;
                        Ok(())
                    }
                }),
            )
            .unwrap();

        dispatcher
            .dispatch(
                Notification::member_join(Member::new("newcomer"), "t1"),
                MockClient::new(),
            )
            .await;
        assert_eq!(*joined.lock(), "newcomer");
    }

    #[tokio::test]
    async fn error_kind_notification_goes_to_the_error_channel() {
        let dispatcher = Dispatcher::new("!");
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        dispatcher.register_error_callback(error_callback(move |err| {
            let seen = Arc::clone(&seen_clone);
            async move {
                assert_eq!(err.origin, "connection");
                seen.fetch_add(1, Ordering::SeqCst);
            }
        }));

        let mut notification = Notification::new(EventKind::Error);
        notification.content = Some("socket dropped".to_owned());
        dispatcher.dispatch(notification, MockClient::new()).await;

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_kind_without_handlers_is_dropped_silently() {
        let dispatcher = Dispatcher::new("!");
        dispatcher
            .dispatch(Notification::new(EventKind::Other), MockClient::new())
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn bare_help_replies_with_the_command_listing() {
        let mut dispatcher = Dispatcher::new("!");
        dispatcher
            .register_command(
                Command::new("ping")
                    .description("Check the bot is alive")
                    .handler(|_| async { Ok(()) }),
            )
            .unwrap();

        let client = MockClient::new();
        dispatcher.dispatch(text("!help"), client.clone()).await;

        // The reply is fire-and-forget; let the spawned send run.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let sent = client.sent.lock();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("ping"));
    }

    #[tokio::test]
    async fn user_help_command_overrides_the_builtin() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new("!");
        dispatcher.register_command(counting_command("help", &calls)).unwrap();

        let client = MockClient::new();
        dispatcher.dispatch(text("!help"), client.clone()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(client.sent.lock().is_empty());
    }

    #[test]
    fn command_token_requires_adjacency_and_content() {
        assert_eq!(command_token("!ping", "!"), Some("ping"));
        assert_eq!(command_token("!ping pong", "!"), Some("ping"));
        assert_eq!(command_token("! ping", "!"), None);
        assert_eq!(command_token("!", "!"), None);
        assert_eq!(command_token("ping", "!"), None);
    }

    #[test]
    fn remainder_drops_one_separator_space() {
        assert_eq!(remainder("!say hello world", "!", "say"), "hello world");
        assert_eq!(remainder("!say", "!", "say"), "");
        assert_eq!(remainder("!say  padded", "!", "say"), " padded");
    }
}
