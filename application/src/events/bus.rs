//! Typed publish/subscribe registry.
//!
//! Each [`Topic`] fixes its payload type, so a handler registered for
//! [`EndChat`](super::topics::EndChat) can never receive an `initChat`
//! payload. Handlers run synchronously, in subscription order, on the
//! thread that calls [`EventBus::trigger`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// A named event channel with a fixed payload type.
pub trait Topic: 'static {
    type Payload: Send + Sync + 'static;

    /// Topic name used in logs.
    const NAME: &'static str;
}

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

struct Listener {
    id: SubscriptionId,
    /// Holds a `Handler<T::Payload>` for the topic this listener is filed under.
    handler: Box<dyn Any + Send + Sync>,
}

/// Registry of handlers organized by topic.
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<TypeId, Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn listeners(&self) -> MutexGuard<'_, HashMap<TypeId, Vec<Listener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler for topic `T`.
    pub fn on<T, F>(&self, handler: F) -> SubscriptionId
    where
        T: Topic,
        F: Fn(&T::Payload) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handler: Handler<T::Payload> = Arc::new(handler);
        self.listeners()
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Listener {
                id,
                handler: Box::new(handler),
            });
        trace!("Subscribed {:?} to {}", id, T::NAME);
        id
    }

    /// Remove a handler. Returns `false` if it was not subscribed.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners();
        for list in listeners.values_mut() {
            if let Some(pos) = list.iter().position(|l| l.id == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Deliver `payload` to every handler of `T`; returns how many ran.
    ///
    /// Handlers are snapshotted before delivery, so a handler may subscribe,
    /// unsubscribe or trigger further events without deadlocking.
    pub fn trigger<T: Topic>(&self, payload: &T::Payload) -> usize {
        let handlers: Vec<Handler<T::Payload>> = self
            .listeners()
            .get(&TypeId::of::<T>())
            .map(|list| {
                list.iter()
                    .filter_map(|l| l.handler.downcast_ref::<Handler<T::Payload>>())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        trace!("Triggering {} for {} handler(s)", T::NAME, handlers.len());
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    /// Number of handlers currently subscribed to `T`.
    pub fn listener_count<T: Topic>(&self) -> usize {
        self.listeners()
            .get(&TypeId::of::<T>())
            .map_or(0, Vec::len)
    }

    /// Remove every handler.
    pub fn clear(&self) {
        self.listeners().clear();
    }
}
