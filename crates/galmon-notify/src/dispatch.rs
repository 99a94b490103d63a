use crate::NotificationChannel;
use galmon_common::types::AlertEvent;

/// Fans alert events out to every registered channel.
pub struct Dispatcher {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Sends each event to all channels. The returned flags line up
    /// with `events`; an event counts as delivered when at least one
    /// channel accepted it. Failures are logged, never retried.
    pub async fn dispatch(&self, events: &[AlertEvent]) -> Vec<bool> {
        let mut delivered = Vec::with_capacity(events.len());
        for event in events {
            let message = format_event(event);
            let mut sent = false;
            for channel in &self.channels {
                match channel.send(&message).await {
                    Ok(()) => sent = true,
                    Err(error) => {
                        tracing::warn!(
                            channel = channel.channel_name(),
                            host = %event.host,
                            kind = %event.kind,
                            error = %error,
                            "Alert delivery failed"
                        );
                    }
                }
            }
            delivered.push(sent);
        }
        delivered
    }
}

/// Renders one alert event as an HTML message.
pub fn format_event(event: &AlertEvent) -> String {
    format!(
        "<b>Galera Alert</b>\nNode: <code>{}</code>\nRule: {}\nReason: {}\nSeverity: {}\nTime: {}",
        event.host,
        event.kind,
        event.reason,
        event.severity,
        event.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
