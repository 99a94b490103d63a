use crate::config::BalancerConfig;
use crate::error::{BalancerError, Result};
use crate::ExportFetcher;
use async_trait::async_trait;
use galmon_common::types::is_placeholder_credential;
use std::time::Duration;

/// HTTP client for the balancer's stats export and admin form.
pub struct BalancerClient {
    config: BalancerConfig,
    client: reqwest::Client,
}

impl BalancerClient {
    pub fn new(config: BalancerConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn check_config(&self) -> Result<()> {
        if is_placeholder_credential(&self.config.password) {
            return Err(BalancerError::PlaceholderCredentials);
        }
        Ok(())
    }

    /// POSTs one admin form action. The form answers 200 directly or
    /// redirects back to the stats page (302/303).
    async fn admin_post(&self, form: &[(&str, &str)]) -> Result<()> {
        self.check_config()?;
        let response = self
            .client
            .post(self.config.admin_url())
            .basic_auth(&self.config.username, Some(&self.config.password))
            .form(form)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await?;

        let status = response.status().as_u16();
        if matches!(status, 200 | 302 | 303) {
            Ok(())
        } else {
            Err(BalancerError::UnexpectedStatus { status })
        }
    }

    /// Puts a backend server back into rotation.
    pub async fn enable_server(&self, server: &str) -> Result<()> {
        self.admin_post(&[
            ("b", &self.config.backend),
            ("s", server),
            ("action", "enable"),
        ])
        .await?;
        tracing::info!(server, "Enabled balancer server");
        Ok(())
    }

    /// Takes a backend server out of rotation (MAINT).
    pub async fn disable_server(&self, server: &str) -> Result<()> {
        self.admin_post(&[
            ("b", &self.config.backend),
            ("s", server),
            ("action", "disable"),
        ])
        .await?;
        tracing::info!(server, "Disabled balancer server");
        Ok(())
    }

    /// Sets a server's load balancing weight (0 to 256).
    pub async fn set_weight(&self, server: &str, weight: i64) -> Result<()> {
        if !(0..=256).contains(&weight) {
            return Err(BalancerError::WeightOutOfRange(weight));
        }
        let w = weight.to_string();
        self.admin_post(&[
            ("b", &self.config.backend),
            ("s", server),
            ("action", "set weight"),
            ("w", &w),
        ])
        .await?;
        tracing::info!(server, weight, "Set balancer server weight");
        Ok(())
    }

    /// Runs the configured restart command and waits for it to exit.
    pub async fn restart(&self) -> Result<()> {
        let (program, args) = split_command(&self.config.restart_command)?;
        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await?;

        if output.status.success() {
            tracing::info!(command = %self.config.restart_command, "Restarted balancer");
            Ok(())
        } else {
            Err(BalancerError::RestartFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl ExportFetcher for BalancerClient {
    async fn fetch_export(&self) -> Result<String> {
        self.check_config()?;
        let response = self
            .client
            .get(&self.config.stats_url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BalancerError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

pub(crate) fn split_command(command: &str) -> Result<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next().ok_or(BalancerError::EmptyRestartCommand)?;
    Ok((program, parts.collect()))
}
