//! Event registry: ordered callback lists per notification category.
//!
//! Unlike commands there is no uniqueness constraint; several independent
//! pieces of application code may each listen to `member_join`. Callbacks
//! run in registration order, and an empty list is a normal no-op case.

use std::collections::HashMap;

use braze_core::{EventKind, RegistryError, RegistryResult};

use crate::handler::EventCallback;

/// Maps event categories to ordered lists of callbacks.
///
/// Populated during the setup phase, read-only once dispatch starts.
#[derive(Default)]
pub struct EventRegistry {
    handlers: HashMap<EventKind, Vec<EventCallback>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback to the category's list.
    ///
    /// The declared parameter shape is validated here, once, against what
    /// the category can bind at dispatch time; an unsupported shape fails
    /// with [`RegistryError::InvalidSignature`].
    pub fn register(&mut self, kind: EventKind, callback: EventCallback) -> RegistryResult<()> {
        let allowed = match (kind, &callback) {
            (EventKind::Ready, EventCallback::Bare(_) | EventCallback::Context(_)) => true,
            (EventKind::Ready, _) => false,
            (EventKind::TextMessage, EventCallback::Bare(_)) => false,
            (EventKind::TextMessage, _) => true,
            (
                EventKind::MemberJoin | EventKind::MemberLeave,
                EventCallback::Context(_) | EventCallback::WithMember(_),
            ) => true,
            (EventKind::MemberJoin | EventKind::MemberLeave, _) => false,
            (EventKind::Other, EventCallback::Context(_)) => true,
            (EventKind::Other, _) => false,
            // Error notifications go to the error channel, not this registry.
            (EventKind::Error, _) => false,
        };

        if !allowed {
            return Err(RegistryError::InvalidSignature {
                category: kind.as_str(),
                reason: match kind {
                    EventKind::Error => "error callbacks are registered on the error channel",
                    _ => shape_reason(&callback),
                },
            });
        }

        self.handlers.entry(kind).or_default().push(callback);
        Ok(())
    }

    /// Returns the category's callbacks in registration order.
    pub fn handlers_for(&self, kind: EventKind) -> &[EventCallback] {
        self.handlers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of registered callbacks across all categories.
    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    /// Returns whether no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn shape_reason(callback: &EventCallback) -> &'static str {
    match callback {
        EventCallback::Bare(_) => "bare handlers are only allowed for ready",
        EventCallback::WithMember(_) => "member binding is not available for this category",
        EventCallback::WithMessage(_) => "message binding is only available for text messages",
        EventCallback::Context(_) => "context handlers are allowed here",
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("callbacks", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_order_is_preserved() {
        let mut registry = EventRegistry::new();
        for _ in 0..3 {
            registry
                .register(EventKind::TextMessage, EventCallback::context(|_| async { Ok(()) }))
                .unwrap();
        }
        assert_eq!(registry.handlers_for(EventKind::TextMessage).len(), 3);
    }

    #[test]
    fn empty_category_yields_empty_slice() {
        let registry = EventRegistry::new();
        assert!(registry.handlers_for(EventKind::MemberJoin).is_empty());
    }

    #[test]
    fn message_shape_is_rejected_for_member_join() {
        let mut registry = EventRegistry::new();
        let err = registry
            .register(
                EventKind::MemberJoin,
                EventCallback::with_message(|_, _, _| async { Ok(()) }),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSignature { category: "member_join", .. }));
    }

    #[test]
    fn bare_shape_is_only_valid_for_ready() {
        let mut registry = EventRegistry::new();
        registry
            .register(EventKind::Ready, EventCallback::bare(|| async { Ok(()) }))
            .unwrap();
        assert!(
            registry
                .register(EventKind::TextMessage, EventCallback::bare(|| async { Ok(()) }))
                .is_err()
        );
    }

    #[test]
    fn error_category_is_not_registrable() {
        let mut registry = EventRegistry::new();
        assert!(
            registry
                .register(EventKind::Error, EventCallback::context(|_| async { Ok(()) }))
                .is_err()
        );
    }
}
