use std::sync::Arc;

use event_api::Event;
use parking_lot::Mutex;

use crate::{error::HandlerError, events::Subscriber};

/// Keeps a copy of every event delivered to it.
///
/// Clones share the same store, so one clone can be subscribed while
/// another is inspected.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far, in delivery order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Subscriber for Recorder {
    fn on_event(&self, event: &Event) -> Result<(), HandlerError> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recorder"
    }
}
