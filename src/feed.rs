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

//! Sensor feed lifecycle management.
//!
//! Owns the background polling task, drains its events into the shared
//! monitor and system status, and supports endpoint hot-reload and
//! graceful shutdown.

use log::info;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use firesense_client::{
    LinkState, MonitorConfig, PollEvent, Poller, PollerConfig, SensorMonitor,
};

use crate::config::AppConfig;
use crate::status::{FeedHealth, SharedSystemStatus};

/// Manages the sensor feed connection with lifecycle control
pub struct FeedManager {
    /// Shared reading state, written only by the feed task
    monitor: Arc<Mutex<SensorMonitor>>,

    /// Watch sender for hot-reloading the station endpoint
    endpoint_tx: watch::Sender<String>,

    /// Cancellation token for clean shutdown
    cancel_token: CancellationToken,

    /// System status tracker
    status: SharedSystemStatus,
}

impl FeedManager {
    /// Start the feed in a background thread with its own tokio runtime
    pub fn start(config: &AppConfig, status: SharedSystemStatus) -> Self {
        let monitor = Arc::new(Mutex::new(SensorMonitor::new(MonitorConfig {
            history_retention_secs: config.history_retention_secs,
            ..Default::default()
        })));

        let (endpoint_tx, endpoint_rx) = watch::channel(config.sensor_endpoint.clone());
        let cancel_token = CancellationToken::new();

        status
            .lock()
            .unwrap()
            .set_endpoint(config.sensor_endpoint.clone());

        info!(
            "Starting sensor feed: {} every {}ms",
            config.sensor_endpoint, config.poll_interval_ms
        );

        let poller_config = PollerConfig {
            endpoint: config.sensor_endpoint.clone(),
            interval: Duration::from_millis(config.poll_interval_ms),
            ..Default::default()
        };

        let task_monitor = monitor.clone();
        let task_status = status.clone();
        let task_cancel = cancel_token.clone();

        // Spawn feed task
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(run_feed(
                poller_config,
                endpoint_rx,
                task_monitor,
                task_status,
                task_cancel,
            ));
        });

        Self {
            monitor,
            endpoint_tx,
            cancel_token,
            status,
        }
    }

    /// Get the shared reading monitor
    pub fn monitor(&self) -> Arc<Mutex<SensorMonitor>> {
        self.monitor.clone()
    }

    /// Update the station endpoint (hot-reload)
    pub fn set_endpoint(&self, endpoint: String) {
        info!("Updating station endpoint to {}", endpoint);
        self.status.lock().unwrap().set_endpoint(endpoint.clone());
        let _ = self.endpoint_tx.send(endpoint);
    }

    /// Get the current station endpoint
    #[must_use]
    pub fn current_endpoint(&self) -> String {
        self.endpoint_tx.borrow().clone()
    }
}

impl Drop for FeedManager {
    fn drop(&mut self) {
        info!("Shutting down FeedManager");
        self.cancel_token.cancel();
    }
}

async fn run_feed(
    poller_config: PollerConfig,
    mut endpoint_rx: watch::Receiver<String>,
    monitor: Arc<Mutex<SensorMonitor>>,
    status: SharedSystemStatus,
    cancel_token: CancellationToken,
) {
    let mut poller = Poller::spawn(poller_config);

    loop {
        tokio::select! {
            event = poller.recv() => {
                match event {
                    Some(PollEvent::FrameReceived(frame)) => {
                        // Scope lock to drop before the next await
                        {
                            let mut monitor_lock = monitor.lock()
                                .expect("Sensor monitor mutex poisoned");
                            monitor_lock.apply_frame(frame);
                        }

                        status.lock().unwrap().record_sample();
                    }
                    Some(PollEvent::StateChanged(state)) => {
                        let mut status_lock = status.lock().unwrap();
                        match state {
                            LinkState::Polling => status_lock.set_feed_health(FeedHealth::Polling),
                            LinkState::Receiving => status_lock.set_feed_health(FeedHealth::Receiving),
                            LinkState::Error(message) => status_lock.set_feed_error(message),
                        }
                    }
                    None => {
                        info!("Poller channel closed");
                        return;
                    }
                }
            }

            // Forward endpoint changes to the poller
            _ = endpoint_rx.changed() => {
                let endpoint = endpoint_rx.borrow_and_update().clone();
                poller.set_endpoint(endpoint);
            }

            () = cancel_token.cancelled() => {
                info!("Feed cancelled");
                poller.shutdown();
                return;
            }
        }
    }
}
