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

//! Wire format for sensor station frames.
//!
//! A fire-watch station answers `GET /` with a single flat JSON object
//! carrying the four live readings. This module defines that shape and
//! the typed errors produced when a body does not match it. Unknown
//! extra fields are ignored; a missing field is an error.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while decoding a frame body.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty frame body")]
    EmptyBody,

    #[error("invalid frame body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

/// One sensor frame as returned by the station endpoint.
///
/// Field names match the wire format exactly:
/// `{"flame": false, "temp": 24.1, "hum": 48.0, "co": 3.2}`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SensorFrame {
    /// Flame sensor tripped.
    pub flame: bool,
    /// Temperature in degrees Celsius.
    pub temp: f64,
    /// Relative humidity in percent.
    pub hum: f64,
    /// Carbon monoxide concentration in ppm.
    pub co: f64,
}

impl SensorFrame {
    /// Decode a frame from a raw response body.
    pub fn parse(body: &[u8]) -> Result<Self, ParseError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ParseError::EmptyBody);
        }

        Ok(serde_json::from_slice(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_frame() {
        let body = br#"{"flame": true, "temp": 50.0, "hum": 90.0, "co": 60.0}"#;
        let frame = SensorFrame::parse(body).unwrap();

        assert!(frame.flame);
        assert_eq!(frame.temp, 50.0);
        assert_eq!(frame.hum, 90.0);
        assert_eq!(frame.co, 60.0);
    }

    #[test]
    fn test_parse_integer_readings() {
        // Station firmware sends whole numbers without a decimal point
        let frame = SensorFrame::parse(br#"{"flame": false, "temp": 24, "hum": 48, "co": 0}"#).unwrap();
        assert!(!frame.flame);
        assert_eq!(frame.temp, 24.0);
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let body = br#"{"flame": false, "temp": 21.5, "hum": 40.0, "co": 1.0, "uptime": 9000}"#;
        let frame = SensorFrame::parse(body).unwrap();
        assert_eq!(frame.temp, 21.5);
    }

    #[test]
    fn test_parse_missing_field() {
        let body = br#"{"flame": false, "temp": 21.5, "hum": 40.0}"#;
        assert!(matches!(
            SensorFrame::parse(body),
            Err(ParseError::InvalidBody(_))
        ));
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(matches!(SensorFrame::parse(b""), Err(ParseError::EmptyBody)));
        assert!(matches!(SensorFrame::parse(b"  \n"), Err(ParseError::EmptyBody)));
    }

    #[test]
    fn test_parse_non_json_body() {
        assert!(matches!(
            SensorFrame::parse(b"<html>502 Bad Gateway</html>"),
            Err(ParseError::InvalidBody(_))
        ));
    }
}
