//! Periodic task scheduler.
//!
//! Each scheduled task runs on its own drift-free clock: fire times are
//! `start + n * interval`, independent of how long the handler takes. A
//! handler that overruns its interval never overlaps itself; the missed
//! fires are skipped and the task resumes on its original grid. Handler
//! errors go to the shared error channel and never stop the schedule.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use braze_core::{CommunityContext, HandlerError, RegistryError, RegistryResult};
use braze_framework::{ErrorChannel, TaskCallback};

/// One periodic job.
struct ScheduledTask {
    name: String,
    interval: Duration,
    callback: TaskCallback,
}

/// Holds registered tasks until the bot starts, then spawns one timer loop
/// per task.
#[derive(Default)]
pub struct TaskScheduler {
    tasks: Vec<ScheduledTask>,
}

impl TaskScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a periodic task. The interval must be positive.
    pub fn schedule(
        &mut self,
        name: impl Into<String>,
        interval: Duration,
        callback: TaskCallback,
    ) -> RegistryResult<()> {
        if interval.is_zero() {
            return Err(RegistryError::InvalidSignature {
                category: "task",
                reason: "interval must be positive",
            });
        }
        self.tasks.push(ScheduledTask {
            name: name.into(),
            interval,
            callback,
        });
        Ok(())
    }

    /// Returns the number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if no tasks are registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Spawns every task's timer loop.
    ///
    /// `community` is the capability handed to community-scoped tasks; when
    /// it is `None`, such tasks are not started at all. Cancelling the token
    /// stops new fires; an in-flight handler runs to completion before its
    /// loop exits.
    pub fn start(
        self,
        community: Option<CommunityContext>,
        errors: Arc<ErrorChannel>,
        shutdown: CancellationToken,
    ) -> JoinSet<()> {
        let mut set = JoinSet::new();

        for task in self.tasks {
            let context = match &task.callback {
                TaskCallback::Bare(_) => None,
                TaskCallback::Community(_) => match community.clone() {
                    Some(ctx) => Some(ctx),
                    None => {
                        warn!(
                            task = %task.name,
                            "task requires a community context but none is configured, skipping"
                        );
                        continue;
                    }
                },
            };
            set.spawn(run_task(task, context, Arc::clone(&errors), shutdown.clone()));
        }

        set
    }
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

/// Timer loop for one task.
async fn run_task(
    task: ScheduledTask,
    community: Option<CommunityContext>,
    errors: Arc<ErrorChannel>,
    shutdown: CancellationToken,
) {
    let mut next = Instant::now() + task.interval;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(task = %task.name, "scheduler shutting down");
                return;
            }
            _ = time::sleep_until(next) => {}
        }

        let result = match &task.callback {
            TaskCallback::Bare(f) => f().await,
            TaskCallback::Community(f) => {
                // Presence was checked before spawning.
                let Some(ctx) = community.clone() else { return };
                f(ctx).await
            }
        };

        if let Err(e) = result {
            errors
                .report(HandlerError::new(format!("task:{}", task.name), e))
                .await;
        }

        // Stay on the original grid; drop fires the handler ran through.
        next += task.interval;
        let now = Instant::now();
        while next <= now {
            next += task.interval;
        }
    }
}
