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

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Health of the sensor feed link
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedHealth {
    Idle,
    Polling,
    Receiving,
    Error,
}

/// Diagnostic message with timestamp
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub timestamp: DateTime<Utc>,
    pub level: DiagnosticLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// System status tracking all metrics and diagnostics
pub struct SystemStatus {
    // Feed link status
    pub feed_health: FeedHealth,
    pub endpoint: String,
    pub last_error: Option<String>,
    pub receiving_since: Option<DateTime<Utc>>,
    pub healthy_uptime_seconds: u64,

    // Sample statistics
    pub total_samples: u64,
    pub last_sample_at: Option<DateTime<Utc>>,

    // Sample rate (for sparkline visualization)
    pub samples_per_second: f64,
    pub sample_history: VecDeque<(DateTime<Utc>, u32)>, // Last 60 seconds of sample counts

    // Camera status
    pub camera_active: bool,

    // Diagnostic messages (keep last 50)
    pub diagnostics: VecDeque<DiagnosticMessage>,
    max_diagnostics: usize,
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemStatus {
    pub fn new() -> Self {
        Self {
            feed_health: FeedHealth::Idle,
            endpoint: String::new(),
            last_error: None,
            receiving_since: None,
            healthy_uptime_seconds: 0,

            total_samples: 0,
            last_sample_at: None,

            samples_per_second: 0.0,
            sample_history: VecDeque::with_capacity(60),

            camera_active: false,

            diagnostics: VecDeque::with_capacity(50),
            max_diagnostics: 50,
        }
    }

    /// Update feed link health
    pub fn set_feed_health(&mut self, health: FeedHealth) {
        let changed = self.feed_health != health;
        self.feed_health = health;

        if !changed {
            return;
        }

        match health {
            FeedHealth::Polling => {
                self.add_diagnostic(
                    DiagnosticLevel::Info,
                    format!("Polling {}...", self.endpoint),
                );
            }
            FeedHealth::Receiving => {
                self.receiving_since = Some(Utc::now());
                self.last_error = None;
                self.add_diagnostic(
                    DiagnosticLevel::Info,
                    format!("Receiving frames from {}", self.endpoint),
                );
            }
            FeedHealth::Idle => {
                self.receiving_since = None;
                self.healthy_uptime_seconds = 0;
                self.add_diagnostic(DiagnosticLevel::Warning, "Sensor feed stopped".to_string());
            }
            FeedHealth::Error => {
                self.receiving_since = None;
                self.healthy_uptime_seconds = 0;
            }
        }
    }

    /// Record a feed error
    pub fn set_feed_error(&mut self, error: String) {
        self.set_feed_health(FeedHealth::Error);
        self.last_error = Some(error.clone());
        self.add_diagnostic(DiagnosticLevel::Error, format!("Poll failed: {}", error));
    }

    /// Record an accepted sample for rate tracking
    pub fn record_sample(&mut self) {
        let now = Utc::now();
        self.total_samples += 1;
        self.last_sample_at = Some(now);

        // Find or create entry for the current second
        if let Some((last_time, count)) = self.sample_history.back_mut() {
            if (now - *last_time).num_milliseconds() < 1000 {
                *count += 1;
            } else {
                self.sample_history.push_back((now, 1));
            }
        } else {
            self.sample_history.push_back((now, 1));
        }

        // Remove entries older than 60 seconds
        while let Some((timestamp, _)) = self.sample_history.front() {
            if (now - *timestamp).num_seconds() > 60 {
                self.sample_history.pop_front();
            } else {
                break;
            }
        }

        // Average sample rate over the last 10 seconds
        let ten_secs_ago = now - chrono::Duration::seconds(10);
        let recent_samples: u32 = self
            .sample_history
            .iter()
            .filter(|(timestamp, _)| *timestamp >= ten_secs_ago)
            .map(|(_, count)| count)
            .sum();

        let recent_duration = self
            .sample_history
            .iter()
            .filter(|(timestamp, _)| *timestamp >= ten_secs_ago)
            .count() as f64;

        if recent_duration > 0.0 {
            self.samples_per_second = f64::from(recent_samples) / recent_duration;
        }
    }

    /// Set the displayed endpoint
    pub fn set_endpoint(&mut self, endpoint: String) {
        self.endpoint = endpoint;
    }

    /// Set camera pipeline status
    pub fn set_camera_active(&mut self, active: bool) {
        if self.camera_active != active {
            self.camera_active = active;
            let message = if active {
                "Camera stream active"
            } else {
                "Camera stream inactive"
            };
            self.add_diagnostic(DiagnosticLevel::Info, message.to_string());
        }
    }

    /// Add a diagnostic message
    pub fn add_diagnostic(&mut self, level: DiagnosticLevel, message: String) {
        let diagnostic = DiagnosticMessage {
            timestamp: Utc::now(),
            level,
            message,
        };

        self.diagnostics.push_back(diagnostic);

        // Keep only the last N messages
        while self.diagnostics.len() > self.max_diagnostics {
            self.diagnostics.pop_front();
        }
    }

    /// Update healthy-streak uptime
    pub fn update_uptime(&mut self) {
        if self.feed_health == FeedHealth::Receiving {
            if let Some(since) = self.receiving_since {
                self.healthy_uptime_seconds = (Utc::now() - since).num_seconds() as u64;
            }
        }
    }

    /// Seconds since the last accepted sample
    #[must_use]
    pub fn seconds_since_sample(&self) -> Option<i64> {
        self.last_sample_at.map(|t| (Utc::now() - t).num_seconds())
    }
}

/// Thread-safe wrapper for SystemStatus
pub type SharedSystemStatus = Arc<Mutex<SystemStatus>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_clears_uptime() {
        let mut status = SystemStatus::new();
        status.set_feed_health(FeedHealth::Receiving);
        assert!(status.receiving_since.is_some());

        status.set_feed_error("connection refused".to_string());
        assert_eq!(status.feed_health, FeedHealth::Error);
        assert!(status.receiving_since.is_none());
        assert_eq!(status.last_error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_recovery_clears_error() {
        let mut status = SystemStatus::new();
        status.set_feed_error("timed out".to_string());
        status.set_feed_health(FeedHealth::Receiving);
        assert!(status.last_error.is_none());
    }

    #[test]
    fn test_diagnostics_bounded() {
        let mut status = SystemStatus::new();
        for i in 0..80 {
            status.add_diagnostic(DiagnosticLevel::Info, format!("message {}", i));
        }
        assert_eq!(status.diagnostics.len(), 50);
        assert_eq!(status.diagnostics.back().unwrap().message, "message 79");
    }

    #[test]
    fn test_record_sample_counts() {
        let mut status = SystemStatus::new();
        status.record_sample();
        status.record_sample();
        assert_eq!(status.total_samples, 2);
        assert!(status.last_sample_at.is_some());
    }
}
