use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use futures::Stream;
use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use parking_lot::Mutex;

struct Listeners<T> {
    next_id: AtomicU64,
    senders: Mutex<Vec<(u64, UnboundedSender<T>)>>,
}

/// Multicast notification source.
///
/// Each [`Subscription`] gets its own unbounded queue, so a slow listener
/// never holds up `fire` or the other listeners.
pub struct EventEmitter<T> {
    listeners: Arc<Listeners<T>>,
}

impl<T: Clone> EventEmitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Listeners {
                next_id: AtomicU64::new(0),
                senders: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn subscribe(&self) -> Subscription<T> {
        let (sender, receiver) = mpsc::unbounded();
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.senders.lock().push((id, sender));

        Subscription {
            id,
            receiver,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Delivers `value` to every live subscriber, dropping the ones that hung up.
    pub fn fire(&self, value: T) {
        self.listeners
            .senders
            .lock()
            .retain(|(_, sender)| sender.unbounded_send(value.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.senders.lock().len()
    }
}

impl<T: Clone> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

/// A listener registration. Dropping it unsubscribes.
pub struct Subscription<T> {
    id: u64,
    receiver: UnboundedReceiver<T>,
    listeners: std::sync::Weak<Listeners<T>>,
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        Pin::new(&mut self.get_mut().receiver).poll_next(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.senders.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[compio::test]
    async fn test_every_subscriber_receives() {
        let emitter = EventEmitter::new();
        let mut first = emitter.subscribe();
        let mut second = emitter.subscribe();

        emitter.fire(7u32);

        assert_eq!(first.next().await, Some(7));
        assert_eq!(second.next().await, Some(7));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let emitter = EventEmitter::<u32>::new();
        let subscription = emitter.subscribe();
        assert_eq!(emitter.subscriber_count(), 1);

        drop(subscription);
        assert_eq!(emitter.subscriber_count(), 0);
    }

    #[test]
    fn test_fire_without_subscribers_is_noop() {
        let emitter = EventEmitter::<&str>::new();
        emitter.fire("nobody listens");
        assert_eq!(emitter.subscriber_count(), 0);
    }

    #[compio::test]
    async fn test_subscription_ends_when_emitter_is_gone() {
        let emitter = EventEmitter::<u32>::new();
        let mut subscription = emitter.subscribe();
        emitter.fire(1);
        drop(emitter);

        assert_eq!(subscription.next().await, Some(1));
        assert_eq!(subscription.next().await, None);
    }
}
