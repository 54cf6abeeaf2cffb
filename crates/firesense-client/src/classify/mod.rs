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

//! Severity classification for sensor readings.
//!
//! Each reading maps onto a three-level ordinal severity by comparison
//! against a pair of thresholds. Boundaries are strict: a reading exactly
//! at a threshold stays in the lower tier.

/// A warning/danger threshold pair for one reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Above this the reading is elevated.
    pub warning: f64,
    /// Above this the reading is dangerous.
    pub danger: f64,
}

/// Temperature thresholds in degrees Celsius.
pub const TEMPERATURE_THRESHOLDS: Thresholds = Thresholds {
    warning: 35.0,
    danger: 45.0,
};

/// Relative humidity thresholds in percent.
pub const HUMIDITY_THRESHOLDS: Thresholds = Thresholds {
    warning: 70.0,
    danger: 85.0,
};

/// Carbon monoxide thresholds in ppm.
pub const CO_THRESHOLDS: Thresholds = Thresholds {
    warning: 30.0,
    danger: 50.0,
};

/// Three-level ordinal severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Reading is within the safe band.
    Normal,
    /// Reading is above the warning threshold.
    Warning,
    /// Reading is above the danger threshold.
    Danger,
}

impl Severity {
    /// Classify a reading against a threshold pair.
    #[must_use]
    pub fn of(value: f64, thresholds: Thresholds) -> Self {
        if value > thresholds.danger {
            Self::Danger
        } else if value > thresholds.warning {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    /// Badge text for a temperature reading at this severity.
    #[must_use]
    pub const fn temperature_label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "HIGH",
            Self::Danger => "CRITICAL",
        }
    }

    /// Badge text for a humidity reading at this severity.
    #[must_use]
    pub const fn humidity_label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "HIGH",
            Self::Danger => "VERY HIGH",
        }
    }

    /// Badge text for a carbon monoxide reading at this severity.
    #[must_use]
    pub const fn co_label(self) -> &'static str {
        match self {
            Self::Normal => "SAFE",
            Self::Warning => "WARNING",
            Self::Danger => "DANGER",
        }
    }
}

/// Classify a temperature reading in degrees Celsius.
#[must_use]
pub fn temperature_severity(celsius: f64) -> Severity {
    Severity::of(celsius, TEMPERATURE_THRESHOLDS)
}

/// Classify a relative humidity reading in percent.
#[must_use]
pub fn humidity_severity(percent: f64) -> Severity {
    Severity::of(percent, HUMIDITY_THRESHOLDS)
}

/// Classify a carbon monoxide reading in ppm.
#[must_use]
pub fn co_severity(ppm: f64) -> Severity {
    Severity::of(ppm, CO_THRESHOLDS)
}

/// Convert a Celsius reading to Fahrenheit for secondary display.
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_tiers() {
        assert_eq!(temperature_severity(20.0), Severity::Normal);
        assert_eq!(temperature_severity(35.0), Severity::Normal);
        assert_eq!(temperature_severity(35.1), Severity::Warning);
        assert_eq!(temperature_severity(45.0), Severity::Warning);
        assert_eq!(temperature_severity(45.1), Severity::Danger);
        assert_eq!(temperature_severity(50.0), Severity::Danger);
    }

    #[test]
    fn test_temperature_labels() {
        assert_eq!(temperature_severity(20.0).temperature_label(), "NORMAL");
        assert_eq!(temperature_severity(40.0).temperature_label(), "HIGH");
        assert_eq!(temperature_severity(50.0).temperature_label(), "CRITICAL");
    }

    #[test]
    fn test_humidity_tiers() {
        assert_eq!(humidity_severity(50.0), Severity::Normal);
        assert_eq!(humidity_severity(70.0), Severity::Normal);
        assert_eq!(humidity_severity(75.0), Severity::Warning);
        assert_eq!(humidity_severity(85.0), Severity::Warning);
        assert_eq!(humidity_severity(90.0), Severity::Danger);
    }

    #[test]
    fn test_humidity_labels() {
        assert_eq!(humidity_severity(50.0).humidity_label(), "NORMAL");
        assert_eq!(humidity_severity(80.0).humidity_label(), "HIGH");
        assert_eq!(humidity_severity(90.0).humidity_label(), "VERY HIGH");
    }

    #[test]
    fn test_co_tiers() {
        assert_eq!(co_severity(0.0), Severity::Normal);
        assert_eq!(co_severity(30.0), Severity::Normal);
        assert_eq!(co_severity(40.0), Severity::Warning);
        assert_eq!(co_severity(50.0), Severity::Warning);
        assert_eq!(co_severity(60.0), Severity::Danger);
    }

    #[test]
    fn test_co_labels() {
        assert_eq!(co_severity(10.0).co_label(), "SAFE");
        assert_eq!(co_severity(40.0).co_label(), "WARNING");
        assert_eq!(co_severity(60.0).co_label(), "DANGER");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Normal < Severity::Warning);
        assert!(Severity::Warning < Severity::Danger);
    }

    #[test]
    fn test_fahrenheit_conversion() {
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < f64::EPSILON);
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < f64::EPSILON);
        // 50.0 °C reads as 122.0 °F on the dashboard
        assert_eq!(format!("{:.1}", celsius_to_fahrenheit(50.0)), "122.0");
        assert_eq!(format!("{:.1}", celsius_to_fahrenheit(36.6)), "97.9");
    }
}
