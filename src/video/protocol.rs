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

//! Camera streaming protocol types.
//!
//! Defines the stream protocols supported by the camera panel and the
//! `CameraLink` abstraction for the station's fixed drone feed.
//!
//! Supported protocols:
//! - RTSP (Real Time Streaming Protocol)
//! - HLS (HTTP Live Streaming)
//! - MJPEG (Motion JPEG over HTTP)
//! - HTTP (Direct HTTP video streams)

use serde::{Deserialize, Serialize};

/// Camera streaming protocol identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamProtocol {
    /// Real Time Streaming Protocol (rtsp://)
    /// Common for IP cameras and drone gimbals
    RTSP,

    /// HTTP Live Streaming (https://.../*.m3u8)
    HLS,

    /// Motion JPEG over HTTP
    /// Common for low-latency station cameras
    MJPEG,

    /// Direct HTTP stream (http:// or https://)
    HTTP,
}

impl StreamProtocol {
    /// Automatically detect protocol from URL
    /// Falls back to HTTP if unable to determine
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_lowercase();

        if lower.starts_with("rtsp://") {
            Self::RTSP
        } else if lower.ends_with(".m3u8") || lower.contains("/hls/") {
            Self::HLS
        } else if lower.contains("mjpg") || lower.contains("mjpeg") {
            Self::MJPEG
        } else {
            Self::HTTP
        }
    }

    /// Get human-readable name for this protocol
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RTSP => "RTSP",
            Self::HLS => "HLS",
            Self::MJPEG => "MJPEG",
            Self::HTTP => "HTTP",
        }
    }
}

/// A camera stream link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraLink {
    /// The URL of the camera stream
    pub url: String,

    /// The streaming protocol used
    pub protocol: StreamProtocol,
}

impl CameraLink {
    /// Create a new camera link with automatic protocol detection
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let protocol = StreamProtocol::from_url(&url);

        Self { url, protocol }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_detection() {
        assert_eq!(
            StreamProtocol::from_url("rtsp://192.168.1.100:554/stream"),
            StreamProtocol::RTSP
        );
        assert_eq!(
            StreamProtocol::from_url("https://example.com/stream.m3u8"),
            StreamProtocol::HLS
        );
        assert_eq!(
            StreamProtocol::from_url("http://camera.local/video.mjpg"),
            StreamProtocol::MJPEG
        );
        assert_eq!(
            StreamProtocol::from_url("https://example.com/video.mp4"),
            StreamProtocol::HTTP
        );
    }

    #[test]
    fn test_link_detects_protocol() {
        let link = CameraLink::new("rtsp://127.0.0.1:8554/drone");
        assert_eq!(link.protocol, StreamProtocol::RTSP);
        assert_eq!(link.protocol.name(), "RTSP");
    }
}
