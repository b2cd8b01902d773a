use event_api::Event;
use tracing::{debug, error, info, trace, warn};

use crate::{error::HandlerError, events::Subscriber};

/// Severity used by [`LogSubscriber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Level {
    /// Parse a level name, case-insensitively. Unknown names map to `Info`.
    pub fn from_name(level: &str) -> Self {
        match level.to_ascii_uppercase().as_str() {
            "ERROR" => Self::Error,
            "WARN" => Self::Warn,
            "DEBUG" => Self::Debug,
            "TRACE" => Self::Trace,
            _ => Self::Info,
        }
    }
}

/// Writes every event it receives through `tracing`.
#[derive(Debug, Clone)]
pub struct LogSubscriber {
    level: Level,
}

impl LogSubscriber {
    pub fn new(level: &str) -> Self {
        Self {
            level: Level::from_name(level),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for LogSubscriber {
    fn default() -> Self {
        Self { level: Level::Info }
    }
}

impl Subscriber for LogSubscriber {
    fn on_event(&self, event: &Event) -> Result<(), HandlerError> {
        let topic = event.topic().as_str();
        let id = event.event_id();
        let kind = event.event_type();
        let data = serde_json::to_string(event.data())?;
        match self.level {
            Level::Error => error!(topic, event_id = id, "{kind} {data}"),
            Level::Warn => warn!(topic, event_id = id, "{kind} {data}"),
            Level::Info => info!(topic, event_id = id, "{kind} {data}"),
            Level::Debug => debug!(topic, event_id = id, "{kind} {data}"),
            Level::Trace => trace!(topic, event_id = id, "{kind} {data}"),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(Level::from_name("warn"), Level::Warn);
        assert_eq!(Level::from_name("ERROR"), Level::Error);
        assert_eq!(Level::from_name("Trace"), Level::Trace);
        assert_eq!(Level::from_name("loud"), Level::Info);
        assert_eq!(LogSubscriber::new("debug").level(), Level::Debug);
    }
}
