//! Event logger — turns every cube event into a log line.

use tokio::sync::broadcast;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use maxcube_domain::event::CubeEvent;
use maxcube_domain::registry::Registry;

fn log_update(registry: &Registry) {
    tracing::info!(
        rooms = registry.rooms().len(),
        devices = registry.device_count(),
        "registry updated"
    );
    for device in registry.devices() {
        tracing::debug!(
            address = %device.address(),
            kind = %device.device_type(),
            name = %device.name,
            room = device.room_id,
            setpoint = ?device.setpoint,
            actual = ?device.actual_temperature,
            mode = ?device.mode,
            window = ?device.state,
            "device"
        );
    }
    match serde_json::to_string(registry) {
        Ok(json) => tracing::trace!(%json, "registry snapshot"),
        Err(err) => tracing::warn!(%err, "failed to serialize registry snapshot"),
    }
}

/// Log one event.
pub fn log_event(event: &CubeEvent) {
    match event {
        CubeEvent::Connected => tracing::info!("cube connected"),
        CubeEvent::Disconnected => tracing::info!("cube disconnected"),
        CubeEvent::Error(err) => tracing::warn!(error = %err, "cube connection error"),
        CubeEvent::Update(registry) => log_update(registry),
        CubeEvent::Status(status) => tracing::info!(
            duty_cycle = status.duty_cycle,
            memory_slots = status.memory_slots,
            "cube status"
        ),
        CubeEvent::Response(ack) => tracing::debug!(
            accepted = ack.accepted,
            duty_cycle = ack.duty_cycle,
            free_memory_slots = ack.free_memory_slots,
            "command acknowledged"
        ),
    }
}

/// Log every event until the session goes away.
pub async fn log_events(events: broadcast::Receiver<CubeEvent>) {
    let mut stream = BroadcastStream::new(events);
    while let Some(next) = stream.next().await {
        match next {
            Ok(event) => log_event(&event),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event logger lagged, some events were dropped");
            }
        }
    }
}
