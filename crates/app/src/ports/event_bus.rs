//! Event bus port — publish/subscribe for cube events.

use maxcube_domain::event::CubeEvent;

/// Publishes cube events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers. Never blocks.
    fn publish(&self, event: CubeEvent);
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: CubeEvent) {
        (**self).publish(event);
    }
}
