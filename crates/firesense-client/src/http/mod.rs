// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP polling layer for sensor station feeds.
//!
//! Provides a poller handle that fetches the station endpoint on a fixed
//! interval with endpoint hot-reload and graceful shutdown. A failed or
//! malformed poll is logged and skipped; the next tick tries again. There
//! is no retry or backoff policy beyond the interval itself.

use std::time::Duration;

use log::{info, warn};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::protocol::{ParseError, SensorFrame};

/// Default station endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";

/// Errors produced by a single poll attempt.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Configuration for the polling loop.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Station endpoint URL.
    pub endpoint: String,
    /// Interval between polls.
    pub interval: Duration,
    /// Optional per-request timeout. `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
    /// Channel buffer size for emitted events.
    pub buffer_size: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            interval: Duration::from_millis(500),
            request_timeout: None,
            buffer_size: 64,
        }
    }
}

/// Health of the feed link as seen by the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Polling has started but no frame has arrived yet.
    Polling,
    /// The most recent poll returned a valid frame.
    Receiving,
    /// The most recent poll failed.
    Error(String),
}

/// Events emitted by the poller.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// Link health changed. Emitted on edges, not on every tick.
    StateChanged(LinkState),
    /// A valid frame was received.
    FrameReceived(SensorFrame),
}

/// Handle to a managed polling task.
///
/// The poll loop runs in a background task until shut down. Use `recv()`
/// to receive events and `set_endpoint()` to retarget the station at
/// runtime.
pub struct Poller {
    event_rx: mpsc::Receiver<PollEvent>,
    endpoint_tx: watch::Sender<String>,
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("cancel_token", &self.cancel_token)
            .finish_non_exhaustive()
    }
}

impl Poller {
    /// Spawn a new polling task with the given configuration.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(config: PollerConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.buffer_size);
        let (endpoint_tx, endpoint_rx) = watch::channel(config.endpoint.clone());
        let cancel_token = CancellationToken::new();

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().unwrap_or_default();

        let task_cancel = cancel_token.clone();
        let interval = config.interval;

        tokio::spawn(async move {
            poll_loop(http, event_tx, endpoint_rx, task_cancel, interval).await;
        });

        Self {
            event_rx,
            endpoint_tx,
            cancel_token,
        }
    }

    /// Receive the next event from the poller.
    ///
    /// Returns `None` if the poller has been shut down.
    pub async fn recv(&mut self) -> Option<PollEvent> {
        self.event_rx.recv().await
    }

    /// Change the station endpoint.
    ///
    /// Takes effect on the next tick.
    pub fn set_endpoint(&self, endpoint: String) {
        let _ = self.endpoint_tx.send(endpoint);
    }

    /// Get the current station endpoint.
    #[must_use]
    pub fn current_endpoint(&self) -> String {
        self.endpoint_tx.borrow().clone()
    }

    /// Shut down the poller.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn poll_loop(
    http: reqwest::Client,
    event_tx: mpsc::Sender<PollEvent>,
    mut endpoint_rx: watch::Receiver<String>,
    cancel_token: CancellationToken,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    if event_tx
        .send(PollEvent::StateChanged(LinkState::Polling))
        .await
        .is_err()
    {
        return; // Receiver dropped
    }

    let mut link_ok: Option<bool> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let endpoint = endpoint_rx.borrow_and_update().clone();

                match fetch_frame(&http, &endpoint).await {
                    Ok(frame) => {
                        if link_ok != Some(true) {
                            info!("Receiving frames from {}", endpoint);
                            if event_tx
                                .send(PollEvent::StateChanged(LinkState::Receiving))
                                .await
                                .is_err()
                            {
                                return;
                            }
                            link_ok = Some(true);
                        }

                        if event_tx.send(PollEvent::FrameReceived(frame)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        // Stale-data policy: log, report the edge, try again next tick
                        warn!("Poll of {} failed: {}", endpoint, e);

                        if link_ok != Some(false) {
                            if event_tx
                                .send(PollEvent::StateChanged(LinkState::Error(e.to_string())))
                                .await
                                .is_err()
                            {
                                return;
                            }
                            link_ok = Some(false);
                        }
                    }
                }
            }

            _ = endpoint_rx.changed() => {
                let new_endpoint = endpoint_rx.borrow_and_update().clone();
                info!("Station endpoint changed to {}", new_endpoint);
                link_ok = None;
                ticker.reset();
            }

            () = cancel_token.cancelled() => {
                info!("Poller cancelled");
                return;
            }
        }
    }
}

async fn fetch_frame(http: &reqwest::Client, endpoint: &str) -> Result<SensorFrame, PollError> {
    let response = http.get(endpoint).send().await?.error_for_status()?;
    let body = response.bytes().await?;
    Ok(SensorFrame::parse(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PollerConfig::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:5000");
        assert_eq!(config.interval, Duration::from_millis(500));
        assert!(config.request_timeout.is_none());
    }

    #[tokio::test]
    async fn test_endpoint_hot_reload() {
        let poller = Poller::spawn(PollerConfig::default());
        assert_eq!(poller.current_endpoint(), DEFAULT_ENDPOINT);

        poller.set_endpoint("http://10.0.0.7:5000".to_string());
        assert_eq!(poller.current_endpoint(), "http://10.0.0.7:5000");

        poller.shutdown();
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_error_state() {
        // Nothing listens on this port; the first tick must surface an
        // Error edge after the initial Polling state.
        let mut poller = Poller::spawn(PollerConfig {
            endpoint: "http://127.0.0.1:1".to_string(),
            interval: Duration::from_millis(10),
            ..Default::default()
        });

        assert!(matches!(
            poller.recv().await,
            Some(PollEvent::StateChanged(LinkState::Polling))
        ));
        assert!(matches!(
            poller.recv().await,
            Some(PollEvent::StateChanged(LinkState::Error(_)))
        ));

        poller.shutdown();
    }
}
