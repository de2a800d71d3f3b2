//! Readiness probing

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// A single readiness check against a deployed stack
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn check(&self) -> bool;

    fn target(&self) -> String;
}

/// Succeeds when `url` answers with a 2xx/3xx status
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ReadinessProbe for HttpProbe {
    async fn check(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!(url = %self.url, status = %status, "Readiness probe response");
                status.is_success() || status.is_redirection()
            }
            Err(e) => {
                debug!(url = %self.url, error = %e, "Readiness probe failed");
                false
            }
        }
    }

    fn target(&self) -> String {
        self.url.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessOutcome {
    pub ready: bool,
    pub attempts: u32,
}

/// Probe up to `max_attempts` times with a fixed `interval` between attempts.
///
/// Stops at the first success; never sleeps after the final attempt.
pub async fn poll_readiness(
    probe: &dyn ReadinessProbe,
    interval: Duration,
    max_attempts: u32,
) -> ReadinessOutcome {
    for attempt in 1..=max_attempts {
        if probe.check().await {
            info!(attempt, target = %probe.target(), "Stack is ready");
            return ReadinessOutcome {
                ready: true,
                attempts: attempt,
            };
        }
        debug!(attempt, max_attempts, "Stack not ready yet");
        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }

    ReadinessOutcome {
        ready: false,
        attempts: max_attempts,
    }
}
