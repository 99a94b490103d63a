use crate::NotificationChannel;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Telegram bot settings from the `[telegram]` config section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
}

impl TelegramConfig {
    /// Active means enabled with both a bot token and a chat id set.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

/// Sends alert messages through the Telegram bot API.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramChannel {
    /// Builds the channel when the config is active, `None` otherwise.
    pub fn from_config(config: &TelegramConfig) -> Option<Self> {
        if !config.is_active() {
            return None;
        }
        Some(Self {
            config: config.clone(),
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    async fn send(&self, message: &str) -> Result<()> {
        let url = format!("{API_BASE}/bot{}/sendMessage", self.config.bot_token);
        let payload = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": message,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .timeout(SEND_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            anyhow::bail!("Telegram API returned status {status}");
        }
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "telegram"
    }
}
