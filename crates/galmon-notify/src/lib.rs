//! Alert delivery to external messaging services.
//!
//! Events from the rule engine are formatted once and fanned out to
//! every active [`NotificationChannel`].

pub mod dispatch;
pub mod telegram;


use anyhow::Result;
use async_trait::async_trait;

pub use dispatch::Dispatcher;
pub use telegram::{TelegramChannel, TelegramConfig};

/// A delivery channel for alert messages.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers one formatted message through this channel.
    async fn send(&self, message: &str) -> Result<()>;

    /// Returns the channel type name (e.g. `"telegram"`).
    fn channel_name(&self) -> &str;
}
