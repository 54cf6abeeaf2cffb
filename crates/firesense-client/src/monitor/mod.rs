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

//! Reading state management.
//!
//! This module maintains the latest sensor readings from polled frames and
//! emits change events on alarm edges. It keeps a bounded history of
//! samples for trend rendering.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::sync::broadcast;

use crate::classify::CO_THRESHOLDS;
use crate::protocol::SensorFrame;

/// One timestamped history sample.
#[derive(Debug, Clone, Copy)]
pub struct ReadingSample {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub co_ppm: f64,
}

/// Snapshot of the current readings.
///
/// Fields start at zero/false and are overwritten in place by each
/// accepted frame; a failed poll leaves them untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature_c: f64,
    /// Relative humidity in percent.
    pub humidity_pct: f64,
    /// Carbon monoxide in ppm.
    pub co_ppm: f64,
    /// Flame sensor tripped.
    pub fire_detected: bool,
    /// Timestamp of the last accepted frame.
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for Reading {
    fn default() -> Self {
        Self {
            temperature_c: 0.0,
            humidity_pct: 0.0,
            co_ppm: 0.0,
            fire_detected: false,
            last_update: None,
        }
    }
}

/// Events emitted by the monitor when reading state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// A frame was accepted and the readings were overwritten.
    ReadingUpdated,
    /// The flame sensor transitioned to tripped.
    FireAlarmRaised,
    /// The flame sensor transitioned back to clear.
    FireAlarmCleared,
    /// Carbon monoxide rose above the warning threshold.
    CoAlarmRaised,
    /// Carbon monoxide fell back below the warning threshold.
    CoAlarmCleared,
}

/// Configuration for the reading monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// History retention window in seconds.
    pub history_retention_secs: i64,
    /// Broadcast channel capacity for events.
    pub event_channel_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_retention_secs: 600,
            event_channel_capacity: 256,
        }
    }
}

/// Sensor monitor that maintains reading state and emits events.
pub struct SensorMonitor {
    reading: Reading,
    co_alarm: bool,
    samples_received: u64,
    history: VecDeque<ReadingSample>,
    history_retention_secs: i64,
    event_tx: broadcast::Sender<MonitorEvent>,
}

impl std::fmt::Debug for SensorMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorMonitor")
            .field("reading", &self.reading)
            .field("samples_received", &self.samples_received)
            .field("history_len", &self.history.len())
            .finish()
    }
}

impl SensorMonitor {
    /// Create a new monitor with the given configuration.
    #[must_use]
    pub fn new(config: MonitorConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity);

        Self {
            reading: Reading::default(),
            co_alarm: false,
            samples_received: 0,
            history: VecDeque::new(),
            history_retention_secs: config.history_retention_secs,
            event_tx,
        }
    }

    /// Apply an accepted frame, overwriting the current readings.
    pub fn apply_frame(&mut self, frame: SensorFrame) {
        let now = Utc::now();

        let fire_was = self.reading.fire_detected;
        let co_was = self.co_alarm;

        self.reading = Reading {
            temperature_c: frame.temp,
            humidity_pct: frame.hum,
            co_ppm: frame.co,
            fire_detected: frame.flame,
            last_update: Some(now),
        };
        self.co_alarm = frame.co > CO_THRESHOLDS.warning;
        self.samples_received += 1;

        self.history.push_back(ReadingSample {
            timestamp: now,
            temperature_c: frame.temp,
            humidity_pct: frame.hum,
            co_ppm: frame.co,
        });
        self.trim_history(now);

        let _ = self.event_tx.send(MonitorEvent::ReadingUpdated);

        if frame.flame && !fire_was {
            warn!("Fire alarm raised");
            let _ = self.event_tx.send(MonitorEvent::FireAlarmRaised);
        } else if !frame.flame && fire_was {
            info!("Fire alarm cleared");
            let _ = self.event_tx.send(MonitorEvent::FireAlarmCleared);
        }

        if self.co_alarm && !co_was {
            warn!("CO alarm raised at {:.1} ppm", frame.co);
            let _ = self.event_tx.send(MonitorEvent::CoAlarmRaised);
        } else if !self.co_alarm && co_was {
            info!("CO alarm cleared at {:.1} ppm", frame.co);
            let _ = self.event_tx.send(MonitorEvent::CoAlarmCleared);
        }
    }

    fn trim_history(&mut self, now: DateTime<Utc>) {
        while let Some(sample) = self.history.front() {
            if (now - sample.timestamp).num_seconds() > self.history_retention_secs {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Get a snapshot of the current readings.
    #[must_use]
    pub fn reading(&self) -> Reading {
        self.reading
    }

    /// Whether the flame sensor is currently tripped.
    #[must_use]
    pub fn fire_detected(&self) -> bool {
        self.reading.fire_detected
    }

    /// Whether carbon monoxide is above the warning threshold.
    #[must_use]
    pub fn co_alarm(&self) -> bool {
        self.co_alarm
    }

    /// Total frames accepted since startup.
    #[must_use]
    pub fn samples_received(&self) -> u64 {
        self.samples_received
    }

    /// Seconds since the last accepted frame, if any.
    #[must_use]
    pub fn seconds_since_update(&self) -> Option<i64> {
        self.reading
            .last_update
            .map(|t| (Utc::now() - t).num_seconds())
    }

    /// The retained sample history, oldest first.
    #[must_use]
    pub fn history(&self) -> &VecDeque<ReadingSample> {
        &self.history
    }

    /// Subscribe to monitor events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }
}

impl Default for SensorMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(flame: bool, temp: f64, hum: f64, co: f64) -> SensorFrame {
        SensorFrame {
            flame,
            temp,
            hum,
            co,
        }
    }

    #[test]
    fn test_apply_frame_overwrites_readings() {
        let mut monitor = SensorMonitor::default();
        assert_eq!(monitor.reading(), Reading::default());

        monitor.apply_frame(frame(true, 50.0, 90.0, 60.0));

        let reading = monitor.reading();
        assert!(reading.fire_detected);
        assert_eq!(reading.temperature_c, 50.0);
        assert_eq!(reading.humidity_pct, 90.0);
        assert_eq!(reading.co_ppm, 60.0);
        assert!(reading.last_update.is_some());
        assert_eq!(monitor.samples_received(), 1);
    }

    #[test]
    fn test_fire_alarm_edges() {
        let mut monitor = SensorMonitor::default();
        let mut events = monitor.subscribe();

        monitor.apply_frame(frame(true, 20.0, 40.0, 0.0));
        monitor.apply_frame(frame(true, 21.0, 40.0, 0.0));
        monitor.apply_frame(frame(false, 21.0, 40.0, 0.0));

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }

        // Raised exactly once despite two consecutive flame frames
        assert_eq!(
            seen.iter()
                .filter(|e| **e == MonitorEvent::FireAlarmRaised)
                .count(),
            1
        );
        assert_eq!(
            seen.iter()
                .filter(|e| **e == MonitorEvent::FireAlarmCleared)
                .count(),
            1
        );
    }

    #[test]
    fn test_co_alarm_threshold() {
        let mut monitor = SensorMonitor::default();

        monitor.apply_frame(frame(false, 20.0, 40.0, 30.0));
        assert!(!monitor.co_alarm());

        monitor.apply_frame(frame(false, 20.0, 40.0, 30.5));
        assert!(monitor.co_alarm());

        monitor.apply_frame(frame(false, 20.0, 40.0, 12.0));
        assert!(!monitor.co_alarm());
    }

    #[test]
    fn test_co_alarm_edge_events() {
        let mut monitor = SensorMonitor::default();
        let mut events = monitor.subscribe();

        monitor.apply_frame(frame(false, 20.0, 40.0, 45.0));
        monitor.apply_frame(frame(false, 20.0, 40.0, 55.0));
        monitor.apply_frame(frame(false, 20.0, 40.0, 5.0));

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }

        // 45 then 55 ppm are both above warning: one raise, then one clear
        assert_eq!(
            seen.iter()
                .filter(|e| **e == MonitorEvent::CoAlarmRaised)
                .count(),
            1
        );
        assert_eq!(
            seen.iter()
                .filter(|e| **e == MonitorEvent::CoAlarmCleared)
                .count(),
            1
        );
    }

    #[test]
    fn test_alert_frame_drives_all_alarms_and_labels() {
        let body = br#"{"flame": true, "temp": 50, "hum": 90, "co": 60}"#;
        let frame = SensorFrame::parse(body).unwrap();

        let mut monitor = SensorMonitor::default();
        monitor.apply_frame(frame);

        assert!(monitor.fire_detected());
        assert!(monitor.co_alarm());

        let reading = monitor.reading();
        assert_eq!(
            crate::classify::temperature_severity(reading.temperature_c).temperature_label(),
            "CRITICAL"
        );
        assert_eq!(
            crate::classify::humidity_severity(reading.humidity_pct).humidity_label(),
            "VERY HIGH"
        );
        assert_eq!(
            crate::classify::co_severity(reading.co_ppm).co_label(),
            "DANGER"
        );
    }

    #[test]
    fn test_history_accumulates() {
        let mut monitor = SensorMonitor::default();

        for i in 0..5 {
            monitor.apply_frame(frame(false, 20.0 + f64::from(i), 40.0, 0.0));
        }

        assert_eq!(monitor.history().len(), 5);
        assert_eq!(monitor.history().back().unwrap().temperature_c, 24.0);
    }

    #[test]
    fn test_history_trimmed_by_retention() {
        let mut monitor = SensorMonitor::new(MonitorConfig {
            history_retention_secs: 0,
            ..Default::default()
        });

        monitor.apply_frame(frame(false, 20.0, 40.0, 0.0));
        std::thread::sleep(std::time::Duration::from_millis(1100));
        monitor.apply_frame(frame(false, 21.0, 40.0, 0.0));

        // Retention of zero seconds keeps only same-second samples
        assert_eq!(monitor.history().len(), 1);
        assert_eq!(monitor.history().front().unwrap().temperature_c, 21.0);
    }
}
