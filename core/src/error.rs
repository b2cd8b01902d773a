use event_api::TopicError;
use thiserror::Error;

use crate::events::SubscriptionId;

/// Error returned by a subscriber to signal that it could not handle an event.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One failed delivery collected under [`DeliveryPolicy::Isolate`].
///
/// [`DeliveryPolicy::Isolate`]: crate::config::DeliveryPolicy::Isolate
#[derive(Debug)]
pub struct HandlerFailure {
    pub subscription: SubscriptionId,
    pub subscriber: String,
    pub error: HandlerError,
}

#[derive(Debug, Error)]
pub enum BusError {
    #[error("invalid topic: {0}")]
    InvalidTopic(#[from] TopicError),
    #[error("topic is {len} characters long, limit is {max}")]
    TopicTooLong { len: usize, max: usize },
    #[error("subscriber {subscription} failed on event {event_id} ({topic}): {source}")]
    Handler {
        topic: String,
        event_id: String,
        subscription: SubscriptionId,
        #[source]
        source: HandlerError,
    },
    #[error("{} subscriber(s) failed on event {event_id} ({topic})", failures.len())]
    Delivery {
        topic: String,
        event_id: String,
        failures: Vec<HandlerFailure>,
    },
}
