use event_api::Event;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing::debug;

use crate::{
    error::BusError,
    events::{EventBus, SubscriptionId},
};

/// Subscribe to a topic, returning a receiver for its events.
///
/// Lets async consumers read events off a channel while the bus stays
/// synchronous. Once the receiver is dropped further sends are skipped;
/// unsubscribe with the returned id to drop the registration itself.
pub fn subscribe_channel(
    bus: &EventBus,
    topic: &str,
) -> Result<(SubscriptionId, UnboundedReceiver<Event>), BusError> {
    let (tx, rx) = unbounded_channel();
    let id = bus.subscribe(topic, move |event| {
        if tx.send(event.clone()).is_err() {
            debug!(event_id = event.event_id(), "channel receiver dropped");
        }
        Ok(())
    })?;
    Ok((id, rx))
}
