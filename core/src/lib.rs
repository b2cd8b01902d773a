pub mod codec;
pub mod config;
pub mod consumers;
pub mod error;
pub mod events;

pub use config::{BusConfig, DeliveryPolicy};
pub use error::{BusError, HandlerError, HandlerFailure};
pub use event_api::{Event, Payload, Topic, TopicError};
pub use events::{EventBus, Subscriber, SubscriptionId};
