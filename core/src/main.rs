use std::{io, sync::Arc};

use anyhow::Result;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use eventbus::{
    codec::JsonLinesSink,
    consumers::{subscribe_channel, LogSubscriber},
    BusConfig, Event, EventBus, HandlerError,
};

const USER_EVENTS: &str = "user-events";

#[tokio::main]
async fn main() -> Result<()> {
    let config = BusConfig::load(None)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(io::stderr)
        .init();

    let bus = Arc::new(EventBus::with_config(config));

    bus.subscribe(USER_EVENTS, send_welcome_email)?;
    bus.subscribe_with(USER_EVENTS, LogSubscriber::new("info"))?;
    bus.subscribe_with(USER_EVENTS, JsonLinesSink::new(io::stdout()))?;

    let (analytics_id, mut analytics) = subscribe_channel(&bus, USER_EVENTS)?;
    let analytics_task = tokio::spawn(async move {
        let mut seen = 0usize;
        while let Some(event) = analytics.recv().await {
            seen += 1;
            info!(event_type = event.event_type(), seen, "analytics recorded event");
        }
        seen
    });

    let event = bus.publish(
        USER_EVENTS,
        "UserRegistered",
        json!({"user_id": 1, "email": "user@example.com"})
            .as_object()
            .cloned()
            .unwrap_or_default(),
    )?;
    info!(event_id = event.event_id(), "published");

    // dropping the registration closes the analytics channel
    bus.unsubscribe(analytics_id);
    let seen = analytics_task.await?;
    if seen == 0 {
        warn!("analytics saw no events");
    }
    Ok(())
}

fn send_welcome_email(event: &Event) -> Result<(), HandlerError> {
    let email = event
        .data()
        .get("email")
        .and_then(|v| v.as_str())
        .ok_or("event has no email address")?;
    info!(to = email, "sending welcome email");
    Ok(())
}
