use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use event_api::{Event, Payload, Topic};
use parking_lot::RwLock;
use tracing::{debug, error, trace};

use crate::{
    config::{BusConfig, DeliveryPolicy},
    error::{BusError, HandlerError, HandlerFailure},
};

/// Something that reacts to events published on a topic.
///
/// Closures of the form `Fn(&Event) -> Result<(), HandlerError>` implement
/// this trait, so most callers never name it.
pub trait Subscriber: Send + Sync {
    fn on_event(&self, event: &Event) -> Result<(), HandlerError>;

    /// Name used in logs and failure reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Subscriber for F
where
    F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync,
{
    fn on_event(&self, event: &Event) -> Result<(), HandlerError> {
        self(event)
    }
}

/// Handle identifying a single registration, returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone)]
struct Registration {
    id: SubscriptionId,
    subscriber: Arc<dyn Subscriber>,
}

/// Topic-keyed bus that fans each published event out to its subscribers,
/// synchronously and in registration order.
///
/// The bus is `Send + Sync`; share it as `Arc<EventBus>`. No lock is held
/// while subscribers run, so a subscriber may itself subscribe or publish.
pub struct EventBus {
    config: BusConfig,
    subscribers: RwLock<HashMap<Topic, Vec<Registration>>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self {
            config,
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Subscribe a closure to a topic.
    ///
    /// Registering the same handler twice is allowed and makes it run twice
    /// per event.
    pub fn subscribe<F>(&self, topic: &str, handler: F) -> Result<SubscriptionId, BusError>
    where
        F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.subscribe_shared(topic, Arc::new(handler))
    }

    /// Subscribe a [`Subscriber`] implementation to a topic.
    pub fn subscribe_with<S>(&self, topic: &str, subscriber: S) -> Result<SubscriptionId, BusError>
    where
        S: Subscriber + 'static,
    {
        self.subscribe_shared(topic, Arc::new(subscriber))
    }

    /// Subscribe an already shared handler, e.g. to register one instance on
    /// several topics.
    pub fn subscribe_shared(
        &self,
        topic: &str,
        subscriber: Arc<dyn Subscriber>,
    ) -> Result<SubscriptionId, BusError> {
        let topic = self.topic(topic)?;
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(%topic, subscription = %id, subscriber = subscriber.name(), "subscribed");
        self.subscribers
            .write()
            .entry(topic)
            .or_default()
            .push(Registration { id, subscriber });
        Ok(id)
    }

    /// Remove a registration. Returns `false` if it was already gone.
    ///
    /// A publish that is already running keeps delivering to the
    /// subscriber list it started with.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        for (topic, list) in subscribers.iter_mut() {
            if let Some(pos) = list.iter().position(|r| r.id == id) {
                list.remove(pos);
                debug!(%topic, subscription = %id, "unsubscribed");
                return true;
            }
        }
        false
    }

    /// Publish an event and deliver it to every current subscriber of `topic`.
    ///
    /// Returns the constructed event. Under [`DeliveryPolicy::FailFast`] the
    /// first failing subscriber aborts delivery to the rest.
    pub fn publish(&self, topic: &str, event_type: &str, data: Payload) -> Result<Event, BusError> {
        let topic = self.topic(topic)?;
        let event = Event::new(topic, event_type, data);
        let snapshot = self.snapshot(event.topic());
        debug!(
            topic = %event.topic(),
            event_id = event.event_id(),
            event_type = event.event_type(),
            subscribers = snapshot.len(),
            "publishing"
        );

        let mut failures = Vec::new();
        for reg in &snapshot {
            trace!(subscription = %reg.id, event_id = event.event_id(), "delivering");
            let Err(err) = reg.subscriber.on_event(&event) else {
                continue;
            };
            match self.config.delivery {
                DeliveryPolicy::FailFast => {
                    debug!(subscription = %reg.id, event_id = event.event_id(), "delivery aborted");
                    return Err(BusError::Handler {
                        topic: event.topic().to_string(),
                        event_id: event.event_id().to_string(),
                        subscription: reg.id,
                        source: err,
                    });
                }
                DeliveryPolicy::Isolate => {
                    error!(
                        topic = %event.topic(),
                        event_id = event.event_id(),
                        subscription = %reg.id,
                        subscriber = reg.subscriber.name(),
                        "subscriber failed: {err}"
                    );
                    failures.push(HandlerFailure {
                        subscription: reg.id,
                        subscriber: reg.subscriber.name().to_string(),
                        error: err,
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(event)
        } else {
            Err(BusError::Delivery {
                topic: event.topic().to_string(),
                event_id: event.event_id().to_string(),
                failures,
            })
        }
    }

    /// Number of registrations on a topic, duplicates included.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        let Ok(topic) = Topic::new(topic) else {
            return 0;
        };
        self.subscribers.read().get(&topic).map_or(0, Vec::len)
    }

    /// Topics the bus has seen a subscription for, sorted.
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.subscribers.read().keys().cloned().collect();
        topics.sort();
        topics
    }

    fn topic(&self, name: &str) -> Result<Topic, BusError> {
        let topic = Topic::new(name)?;
        if let Some(max) = self.config.max_topic_len {
            let len = topic.char_len();
            if len > max {
                return Err(BusError::TopicTooLong { len, max });
            }
        }
        Ok(topic)
    }

    fn snapshot(&self, topic: &Topic) -> Vec<Registration> {
        self.subscribers.read().get(topic).cloned().unwrap_or_default()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
