use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Opaque key-value payload carried by an [`Event`].
pub type Payload = Map<String, Value>;

/// Reasons a topic name is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopicError {
    #[error("topic name is empty")]
    Empty,
}

/// Name of a logical event stream, e.g. `user-events`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Wrap a topic name. Any non-empty string is accepted as-is.
    pub fn new(name: impl Into<String>) -> Result<Self, TopicError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TopicError::Empty);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the name in characters.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl TryFrom<String> for Topic {
    type Error = TopicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Topic::new(value)
    }
}

impl TryFrom<&str> for Topic {
    type Error = TopicError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Topic::new(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable record of something that happened on a topic.
///
/// Fields are only reachable through accessors, so an event cannot change
/// after it has been built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    event_id: String,
    event_type: String,
    timestamp: SystemTime,
    topic: Topic,
    data: Payload,
}

impl Event {
    /// Build a new event stamped with a fresh id and the current time.
    pub fn new(topic: Topic, event_type: impl Into<String>, data: Payload) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            timestamp: SystemTime::now(),
            topic,
            data,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Milliseconds since the Unix epoch, zero for clocks set before it.
    pub fn timestamp_ms(&self) -> u128 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn data(&self) -> &Payload {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn topic_rejects_only_empty_names() {
        assert_eq!(Topic::new(""), Err(TopicError::Empty));
        assert_eq!(Topic::new("user-events").unwrap().as_str(), "user-events");
        assert_eq!(Topic::new("   ").unwrap().as_str(), "   ");
        assert_eq!(Topic::new("user events\t").unwrap().as_str(), "user events\t");
    }

    #[test]
    fn char_len_counts_characters() {
        assert_eq!(Topic::new("größe").unwrap().char_len(), 5);
    }

    #[test]
    fn event_ids_are_unique() {
        let topic = Topic::new("t").unwrap();
        let a = Event::new(topic.clone(), "Ping", Payload::new());
        let b = Event::new(topic, "Ping", Payload::new());
        assert_ne!(a.event_id(), b.event_id());
    }

    #[test]
    fn event_keeps_payload_untouched() {
        let data = payload(json!({"email": "a@x.com", "nested": {"n": 1}}));
        let event = Event::new(Topic::new("user-events").unwrap(), "UserRegistered", data.clone());
        assert_eq!(event.data(), &data);
        assert_eq!(event.event_type(), "UserRegistered");
        assert_eq!(event.topic().as_str(), "user-events");
        assert!(event.timestamp_ms() > 0);
    }

    #[test]
    fn deserializing_invalid_topic_fails() {
        let raw = json!({
            "event_id": "1",
            "event_type": "Ping",
            "timestamp": {"secs_since_epoch": 1, "nanos_since_epoch": 0},
            "topic": "",
            "data": {}
        });
        assert!(serde_json::from_value::<Event>(raw).is_err());
    }
}
