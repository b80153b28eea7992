//! Error channel: fan-out of handler failures to registered callbacks.
//!
//! Both the dispatch path and the task scheduler report through one shared
//! [`ErrorChannel`]. Every registered callback sees every reported error,
//! in registration order. With no callbacks registered the error is logged
//! and swallowed; it never propagates out of `dispatch` or stops a loop.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::error;

use braze_core::HandlerError;

use crate::handler::ErrorFn;

/// Shared sink for [`HandlerError`]s.
#[derive(Default)]
pub struct ErrorChannel {
    callbacks: RwLock<Vec<ErrorFn>>,
}

impl ErrorChannel {
    /// Creates an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an error callback. Setup-phase operation.
    pub fn register(&self, callback: ErrorFn) {
        self.callbacks.write().push(callback);
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Returns whether no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }

    /// Delivers one error to every registered callback, in order.
    pub async fn report(&self, err: HandlerError) {
        let callbacks: Vec<ErrorFn> = self.callbacks.read().clone();
        if callbacks.is_empty() {
            error!(origin = %err.origin, error = %err.source, "unhandled handler error");
            return;
        }

        let err = Arc::new(err);
        for callback in callbacks {
            callback(Arc::clone(&err)).await;
        }
    }
}

impl std::fmt::Debug for ErrorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("callbacks", &self.len())
            .finish()
    }
}
