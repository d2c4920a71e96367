//! Session registry port
//!
//! A narrow get/set slot holding the chat session other components should
//! talk to right now. Injected wherever it is needed rather than kept as a
//! process global.

use crate::ports::chat_session::ChatSession;
use std::sync::{Arc, PoisonError, RwLock};

/// Holds at most one "current" chat session. Last write wins.
pub trait SessionRegistry: Send + Sync {
    /// Replace the current session. The previous one is not closed.
    fn set_current(&self, session: Arc<dyn ChatSession>);

    /// The current session, or `None` if nothing was registered.
    fn current(&self) -> Option<Arc<dyn ChatSession>>;

    /// Clear the slot only if it still holds `session`. Returns whether it did.
    fn clear_if_current(&self, session: &Arc<dyn ChatSession>) -> bool;
}

/// `RwLock`-backed registry used by default.
#[derive(Default)]
pub struct InMemorySessionRegistry {
    current: RwLock<Option<Arc<dyn ChatSession>>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRegistry for InMemorySessionRegistry {
    fn set_current(&self, session: Arc<dyn ChatSession>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    fn current(&self) -> Option<Arc<dyn ChatSession>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear_if_current(&self, session: &Arc<dyn ChatSession>) -> bool {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let is_current = slot.as_ref().is_some_and(|c| same_session(c, session));
        if is_current {
            *slot = None;
        }
        is_current
    }
}

/// Identity comparison for trait-object sessions (data pointer only).
pub fn same_session(a: &Arc<dyn ChatSession>, b: &Arc<dyn ChatSession>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_session::{CloseHandler, SessionIoError, SessionOpenError};
    use async_trait::async_trait;

    struct StubSession(&'static str);

    #[async_trait]
    impl ChatSession for StubSession {
        fn contact_id(&self) -> &str {
            self.0
        }

        fn connection_id(&self) -> &str {
            self.0
        }

        fn on_close(&self, _handler: CloseHandler) {}

        async fn open(&self) -> Result<(), SessionOpenError> {
            Ok(())
        }

        async fn send_message(&self, _content: &str) -> Result<(), SessionIoError> {
            Ok(())
        }

        async fn close(&self) -> Result<(), SessionIoError> {
            Ok(())
        }
    }

    #[test]
    fn test_empty_registry_returns_none() {
        let registry = InMemorySessionRegistry::new();
        assert!(registry.current().is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let registry = InMemorySessionRegistry::new();
        let first: Arc<dyn ChatSession> = Arc::new(StubSession("first"));
        let second: Arc<dyn ChatSession> = Arc::new(StubSession("second"));

        registry.set_current(Arc::clone(&first));
        registry.set_current(Arc::clone(&second));

        let current = registry.current().unwrap();
        assert!(same_session(&current, &second));
        assert_eq!(current.contact_id(), "second");
    }

    #[test]
    fn test_clear_if_current_ignores_other_session() {
        let registry = InMemorySessionRegistry::new();
        let first: Arc<dyn ChatSession> = Arc::new(StubSession("first"));
        let second: Arc<dyn ChatSession> = Arc::new(StubSession("second"));

        registry.set_current(Arc::clone(&second));
        assert!(!registry.clear_if_current(&first));
        assert!(registry.current().is_some());

        assert!(registry.clear_if_current(&second));
        assert!(registry.current().is_none());
    }
}
