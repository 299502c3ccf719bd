//! Single-event broadcast primitive.
//!
//! Subscribers register a callback and receive every [`ChangeNotifier::fire`]
//! synchronously, in registration order. Dispatch iterates over a snapshot of
//! the subscriber list, so a callback may unsubscribe anything — including
//! itself — without corrupting the iteration in progress.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type Callback = Arc<dyn Fn() + Send + Sync + 'static>;

type Registry = Arc<Mutex<Vec<(u64, Callback)>>>;

#[derive(Clone, Default)]
pub struct ChangeNotifier {
    subscribers: Registry,
    next_id: Arc<AtomicU64>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. The returned [`Subscription`] keeps the
    /// registration alive; dropping it unsubscribes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers
            .lock()
            .unwrap()
            .push((id, Arc::new(callback)));
        Subscription {
            id,
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Invoke every currently registered callback, synchronously, in
    /// registration order.
    pub fn fire(&self) {
        let callbacks: Vec<Callback> = {
            let subscribers = self.subscribers.lock().unwrap();
            subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for callback in callbacks {
            callback();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

/// Handle to one registration. Unsubscribes on [`Subscription::unsubscribe`]
/// or on drop, whichever comes first.
pub struct Subscription {
    id: u64,
    subscribers: Registry,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|(id, _)| *id != self.id);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
