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

//! Client library for fire-watch sensor station feeds.
//!
//! This library provides a modular architecture for polling and
//! interpreting readings from a station that serves flame, temperature,
//! humidity, and carbon monoxide data as JSON. It supports multiple layers
//! that can be used independently or composed together:
//!
//! - **Protocol layer**: frame decoding for the station's JSON body
//! - **Classify layer**: threshold-based three-tier severity classification
//! - **HTTP layer**: fixed-interval polling with endpoint hot-reload and
//!   graceful shutdown
//! - **Monitor layer**: reading state, sample history, and alarm events
//!
//! # Quick Start
//!
//! Use the [`Client`] type for full-stack operation:
//!
//! ```no_run
//! use firesense_client::{Client, ClientConfig, PollerConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut client = Client::spawn(ClientConfig {
//!         poller: PollerConfig {
//!             endpoint: "http://127.0.0.1:5000".to_string(),
//!             interval: Duration::from_millis(500),
//!             ..Default::default()
//!         },
//!         ..Default::default()
//!     });
//!
//!     while client.process_next().await {
//!         let reading = client.reading();
//!         println!(
//!             "{:.1} °C / {:.1}% RH / {:.1} ppm CO",
//!             reading.temperature_c, reading.humidity_pct, reading.co_ppm
//!         );
//!     }
//! }
//! ```
//!
//! # Using Individual Layers
//!
//! ## Protocol Layer Only
//!
//! ```
//! use firesense_client::protocol::SensorFrame;
//!
//! let body = br#"{"flame": false, "temp": 24.5, "hum": 51.0, "co": 2.0}"#;
//! let frame = SensorFrame::parse(body).unwrap();
//! assert_eq!(frame.temp, 24.5);
//! ```
//!
//! ## Classify Layer Only
//!
//! ```
//! use firesense_client::classify::{temperature_severity, Severity};
//!
//! let severity = temperature_severity(48.0);
//! assert_eq!(severity, Severity::Danger);
//! assert_eq!(severity.temperature_label(), "CRITICAL");
//! ```

pub mod classify;
pub mod http;
pub mod monitor;
pub mod protocol;

use std::sync::{Arc, RwLock};

pub use classify::{celsius_to_fahrenheit, Severity, Thresholds};
pub use http::{LinkState, PollError, PollEvent, Poller, PollerConfig};
pub use monitor::{MonitorConfig, MonitorEvent, Reading, ReadingSample, SensorMonitor};
pub use protocol::{ParseError, SensorFrame};

use tokio::sync::broadcast;

/// Configuration for the full-stack client.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Polling configuration.
    pub poller: PollerConfig,
    /// Monitor configuration.
    pub monitor: MonitorConfig,
}

/// Full-stack sensor client that wires all layers together.
///
/// The client polls the station endpoint on a fixed interval, decodes
/// frames, and maintains reading state in a monitor.
pub struct Client {
    monitor: Arc<RwLock<SensorMonitor>>,
    poller: Poller,
    link_state: Arc<RwLock<LinkState>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("poller", &self.poller)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Spawn a new client with the given configuration.
    ///
    /// This starts the background polling task. Must be called from within
    /// a tokio runtime.
    #[must_use]
    pub fn spawn(config: ClientConfig) -> Self {
        let monitor = Arc::new(RwLock::new(SensorMonitor::new(config.monitor)));
        let poller = Poller::spawn(config.poller);
        let link_state = Arc::new(RwLock::new(LinkState::Polling));

        Self {
            monitor,
            poller,
            link_state,
        }
    }

    /// Process the next event from the poller.
    ///
    /// Returns `false` once the poller has shut down:
    ///
    /// ```no_run
    /// # use firesense_client::{Client, ClientConfig};
    /// # async fn example() {
    /// let mut client = Client::spawn(ClientConfig::default());
    /// while client.process_next().await {}
    /// # }
    /// ```
    pub async fn process_next(&mut self) -> bool {
        let event = match self.poller.recv().await {
            Some(event) => event,
            None => return false,
        };

        match event {
            PollEvent::StateChanged(state) => {
                if let Ok(mut s) = self.link_state.write() {
                    *s = state;
                }
            }
            PollEvent::FrameReceived(frame) => {
                if let Ok(mut monitor) = self.monitor.write() {
                    monitor.apply_frame(frame);
                }
            }
        }

        true
    }

    /// Get a snapshot of the current readings.
    #[must_use]
    pub fn reading(&self) -> Reading {
        self.monitor
            .read()
            .map(|m| m.reading())
            .unwrap_or_default()
    }

    /// Total frames accepted since startup.
    #[must_use]
    pub fn samples_received(&self) -> u64 {
        self.monitor.read().map(|m| m.samples_received()).unwrap_or(0)
    }

    /// Subscribe to monitor events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.monitor
            .read()
            .map(|m| m.subscribe())
            .unwrap_or_else(|_| {
                let (tx, rx) = broadcast::channel(1);
                drop(tx);
                rx
            })
    }

    /// Get the current link state.
    #[must_use]
    pub fn link_state(&self) -> LinkState {
        self.link_state
            .read()
            .map(|s| s.clone())
            .unwrap_or(LinkState::Polling)
    }

    /// Change the station endpoint.
    ///
    /// Takes effect on the next poll tick.
    pub fn set_endpoint(&self, endpoint: String) {
        self.poller.set_endpoint(endpoint);
    }

    /// Get the current station endpoint.
    #[must_use]
    pub fn current_endpoint(&self) -> String {
        self.poller.current_endpoint()
    }

    /// Shut down the client.
    pub fn shutdown(&self) {
        self.poller.shutdown();
    }
}
