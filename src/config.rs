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

//! Application configuration management.
//!
//! This module handles persistent configuration storage using TOML format.
//! It covers the sensor station endpoint, poll cadence, camera stream, and
//! UI preferences. Every field carries a serde default so configs written
//! by older builds keep loading.

use serde::{Deserialize, Serialize};

/// Default sensor station endpoint
pub const DEFAULT_SENSOR_ENDPOINT: &str = "http://127.0.0.1:5000";

/// Default camera stream URL for the station's drone feed
pub const DEFAULT_CAMERA_URL: &str = "rtsp://127.0.0.1:8554/drone";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Sensor station endpoint URL
    #[serde(default = "default_sensor_endpoint")]
    pub sensor_endpoint: String,

    /// Sensor poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Camera stream URL
    #[serde(default = "default_camera_url")]
    pub camera_url: String,

    /// Location caption shown over the camera feed
    #[serde(default = "default_camera_location")]
    pub camera_location_label: String,

    /// Status pane visible on startup
    #[serde(default = "default_true")]
    pub status_pane_visible: bool,

    /// Trend plot window visible on startup
    #[serde(default)]
    pub show_trends: bool,

    /// Reading history retention in seconds (trend plots)
    #[serde(default = "default_history_retention_secs")]
    pub history_retention_secs: i64,
}

// Default value functions for serde
fn default_sensor_endpoint() -> String {
    DEFAULT_SENSOR_ENDPOINT.to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_camera_url() -> String {
    DEFAULT_CAMERA_URL.to_string()
}

fn default_camera_location() -> String {
    "Sector A-7, Grid 23.4°N, 45.6°W".to_string()
}

fn default_true() -> bool {
    true
}

fn default_history_retention_secs() -> i64 {
    600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sensor_endpoint: default_sensor_endpoint(),
            poll_interval_ms: default_poll_interval_ms(),
            camera_url: default_camera_url(),
            camera_location_label: default_camera_location(),
            status_pane_visible: true,
            show_trends: false,
            history_retention_secs: default_history_retention_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load("emberwatch-desktop", "config")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store("emberwatch-desktop", "config", self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path("emberwatch-desktop", "config")
    }
}
