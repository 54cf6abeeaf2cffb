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

//! Camera stream decoding and the dashboard camera panel.
//!
//! Architecture:
//! - GStreamer pipeline decodes the stream off the UI thread
//! - Latest decoded frame stored in Arc<Mutex<Option<CameraFrame>>>
//! - Main thread reads the frame for texture upload to the GPU
//!
//! The feed is never negotiated or health-checked; pipeline errors are
//! rendered inside the panel and nowhere else.

use super::protocol::{CameraLink, StreamProtocol};
use gstreamer::{self as gst, prelude::*};
use gstreamer_app as gst_app;
use log::{error, info};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Initialize GStreamer library (must be called once at application startup)
///
/// # Errors
/// Returns error if GStreamer initialization fails
pub fn init_gstreamer() -> Result<(), String> {
    gst::init().map_err(|e| format!("Failed to initialize GStreamer: {}", e))?;
    Ok(())
}

/// Current playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Stream is stopped/not playing
    Stopped,
    /// Stream is buffering
    Buffering,
    /// Stream is playing
    Playing,
    /// An error occurred
    Error,
}

/// A decoded video frame ready for rendering
#[derive(Clone)]
pub struct CameraFrame {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp when this frame was captured
    pub timestamp: Instant,
}

impl CameraFrame {
    /// Convert this frame to an egui ColorImage for texture upload
    #[must_use]
    pub fn to_color_image(&self) -> egui::ColorImage {
        let pixels: Vec<egui::Color32> = self
            .data
            .chunks_exact(4)
            .map(|rgba| egui::Color32::from_rgba_premultiplied(rgba[0], rgba[1], rgba[2], rgba[3]))
            .collect();

        egui::ColorImage {
            size: [self.width as usize, self.height as usize],
            source_size: egui::vec2(self.width as f32, self.height as f32),
            pixels,
        }
    }
}

/// Camera stream decoder using GStreamer
pub struct CameraStream {
    /// The camera link being played
    link: CameraLink,

    /// GStreamer pipeline
    pipeline: gst::Pipeline,

    /// Latest decoded frame (shared with rendering thread)
    current_frame: Arc<Mutex<Option<CameraFrame>>>,

    /// Current playback state
    state: Arc<Mutex<PlaybackState>>,

    /// Error message if in error state
    error_message: Arc<Mutex<Option<String>>>,
}

impl CameraStream {
    /// Create a new camera stream from a CameraLink
    ///
    /// # Errors
    /// Returns error if pipeline creation fails
    pub fn new(link: CameraLink) -> Result<Self, String> {
        let pipeline_desc = Self::build_pipeline_string(&link);

        let pipeline = gst::parse::launch(&pipeline_desc)
            .map_err(|e| format!("Failed to create GStreamer pipeline: {}", e))?
            .downcast::<gst::Pipeline>()
            .map_err(|_| "Created element is not a pipeline".to_string())?;

        let current_frame = Arc::new(Mutex::new(None));
        let state = Arc::new(Mutex::new(PlaybackState::Stopped));
        let error_message = Arc::new(Mutex::new(None));

        // Set up app sink to extract frames
        let appsink = pipeline
            .by_name("sink")
            .ok_or("Failed to get appsink from pipeline")?
            .downcast::<gst_app::AppSink>()
            .map_err(|_| "Sink element is not an AppSink".to_string())?;

        let frame_clone = current_frame.clone();

        appsink.set_callbacks(
            gst_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let sample = appsink.pull_sample().map_err(|_| gst::FlowError::Error)?;

                    if let Some(buffer) = sample.buffer() {
                        if let Some(caps) = sample.caps() {
                            // Extract video dimensions from caps
                            let s = caps.structure(0).ok_or(gst::FlowError::Error)?;
                            let width = s.get::<i32>("width").ok().ok_or(gst::FlowError::Error)? as u32;
                            let height = s.get::<i32>("height").ok().ok_or(gst::FlowError::Error)? as u32;

                            // Map buffer for reading
                            let map = buffer.map_readable().map_err(|_| gst::FlowError::Error)?;
                            let data = map.as_slice().to_vec();

                            let frame = CameraFrame {
                                data,
                                width,
                                height,
                                timestamp: Instant::now(),
                            };

                            if let Ok(mut current) = frame_clone.lock() {
                                *current = Some(frame);
                            }
                        }
                    }

                    Ok(gst::FlowSuccess::Ok)
                })
                .build(),
        );

        Ok(Self {
            link,
            pipeline,
            current_frame,
            state,
            error_message,
        })
    }

    /// Build the GStreamer pipeline string for a given protocol
    fn build_pipeline_string(link: &CameraLink) -> String {
        match link.protocol {
            StreamProtocol::RTSP => {
                format!(
                    "rtspsrc location={} latency=200 protocols=tcp ! decodebin ! queue ! \
                     videoconvert ! video/x-raw,format=RGBA ! appsink name=sink max-buffers=1 drop=true",
                    link.url
                )
            }
            StreamProtocol::HLS => {
                format!(
                    "souphttpsrc location={} ! hlsdemux ! tsdemux ! h264parse ! \
                     avdec_h264 ! videoconvert ! video/x-raw,format=RGBA ! \
                     appsink name=sink max-buffers=1 drop=true",
                    link.url
                )
            }
            StreamProtocol::MJPEG => {
                format!(
                    "souphttpsrc location={} ! multipartdemux ! jpegdec ! videoconvert ! \
                     video/x-raw,format=RGBA ! appsink name=sink max-buffers=1 drop=true",
                    link.url
                )
            }
            StreamProtocol::HTTP => {
                format!(
                    "souphttpsrc location={} ! decodebin ! videoconvert ! \
                     video/x-raw,format=RGBA ! appsink name=sink max-buffers=1 drop=true",
                    link.url
                )
            }
        }
    }

    /// Start playing the stream
    ///
    /// # Errors
    /// Returns error if playback cannot be started
    pub fn play(&mut self) -> Result<(), String> {
        info!("Starting camera playback: {}", self.link.url);

        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| format!("Failed to start playback: {}", e))?;

        *self.state.lock()
            .map_err(|_| "Failed to lock state mutex".to_string())? = PlaybackState::Playing;

        Ok(())
    }

    /// Get the current playback state
    #[must_use]
    pub fn get_state(&self) -> PlaybackState {
        self.state.lock().map_or(PlaybackState::Error, |s| *s)
    }

    /// Get the latest decoded frame
    #[must_use]
    pub fn get_frame(&self) -> Option<CameraFrame> {
        self.current_frame.lock().ok()?.clone()
    }

    /// Get the camera link being played
    #[must_use]
    pub fn link(&self) -> &CameraLink {
        &self.link
    }

    /// Get current error message if in error state
    #[must_use]
    pub fn get_error(&self) -> Option<String> {
        self.error_message.lock().ok()?.clone()
    }

    /// Check for pipeline errors and update state accordingly
    pub fn update_state(&mut self) {
        if let Some(bus) = self.pipeline.bus() {
            // Process all pending messages
            while let Some(msg) = bus.pop() {
                use gst::MessageView;

                match msg.view() {
                    MessageView::Error(err) => {
                        let error_msg = format!(
                            "GStreamer error: {} ({})",
                            err.error(),
                            err.debug().unwrap_or_else(|| "No debug info".into())
                        );

                        error!("Camera: {}", error_msg);

                        if let Ok(mut state) = self.state.lock() {
                            *state = PlaybackState::Error;
                        }
                        if let Ok(mut error) = self.error_message.lock() {
                            *error = Some(error_msg);
                        }
                    }
                    MessageView::Eos(_) => {
                        if let Ok(mut state) = self.state.lock() {
                            *state = PlaybackState::Stopped;
                        }
                    }
                    MessageView::Buffering(buffering) => {
                        let percent = buffering.percent();
                        if percent < 100 {
                            if let Ok(mut state) = self.state.lock() {
                                *state = PlaybackState::Buffering;
                            }
                        } else if let Ok(mut state) = self.state.lock() {
                            *state = PlaybackState::Playing;
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

impl std::fmt::Debug for CameraStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraStream")
            .field("link", &self.link)
            .field("state", &self.get_state())
            .finish_non_exhaustive()
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        // Tear down pipeline when stream is dropped
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}

/// Camera feed panel embedded in the dashboard
pub struct CameraPanel {
    /// The camera stream, if the pipeline came up
    stream: Option<CameraStream>,

    /// Current video texture
    texture: Option<egui::TextureHandle>,

    /// Error from stream creation, shown in place of frames
    init_error: Option<String>,
}

impl std::fmt::Debug for CameraPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraPanel")
            .field("stream", &self.stream)
            .field("init_error", &self.init_error)
            .finish_non_exhaustive()
    }
}

impl CameraPanel {
    /// Create a panel for the given camera URL and auto-start playback
    #[must_use]
    pub fn new(url: &str) -> Self {
        let link = CameraLink::new(url);

        match CameraStream::new(link) {
            Ok(mut stream) => {
                let init_error = stream.play().err();
                Self {
                    stream: Some(stream),
                    texture: None,
                    init_error,
                }
            }
            Err(e) => {
                error!("Failed to open camera stream {}: {}", url, e);
                Self {
                    stream: None,
                    texture: None,
                    init_error: Some(e),
                }
            }
        }
    }

    /// Create a panel with no stream, showing only the given reason
    #[must_use]
    pub fn disabled(reason: String) -> Self {
        Self {
            stream: None,
            texture: None,
            init_error: Some(reason),
        }
    }

    /// Whether frames are currently flowing
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.stream
            .as_ref()
            .and_then(CameraStream::get_frame)
            .map_or(false, |frame| frame.timestamp.elapsed() < Duration::from_secs(2))
    }

    /// Render the camera feed area with its overlays
    pub fn render(
        &mut self,
        ui: &mut egui::Ui,
        location_label: &str,
        clock_text: &str,
        fire_active: bool,
    ) {
        if let Some(ref mut stream) = self.stream {
            stream.update_state();
        }

        // 16:9 video area sized to the available width
        let width = ui.available_width();
        let height = width * 9.0 / 16.0;
        let (rect, _response) =
            ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
        let painter = ui.painter_at(rect);

        painter.rect_filled(rect, 4.0, egui::Color32::from_rgb(20, 22, 25));

        // Update texture if we have a recent frame
        if let Some(frame) = self.stream.as_ref().and_then(CameraStream::get_frame) {
            if frame.timestamp.elapsed() < Duration::from_secs(1) {
                let color_image = frame.to_color_image();

                if let Some(ref mut texture) = self.texture {
                    texture.set(color_image, egui::TextureOptions::LINEAR);
                } else {
                    self.texture = Some(ui.ctx().load_texture(
                        "camera_frame",
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
            }
        }

        if let Some(ref texture) = self.texture {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        } else {
            // Placeholder with stream status
            let status_text = match (&self.stream, &self.init_error) {
                (_, Some(error)) => error.clone(),
                (Some(stream), None) => match stream.get_state() {
                    PlaybackState::Stopped => "Stopped".to_string(),
                    PlaybackState::Buffering => "Buffering...".to_string(),
                    PlaybackState::Playing => "Connecting to camera...".to_string(),
                    PlaybackState::Error => stream
                        .get_error()
                        .unwrap_or_else(|| "Camera error".to_string()),
                },
                (None, None) => "No camera stream".to_string(),
            };

            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                status_text,
                egui::FontId::proportional(14.0),
                egui::Color32::from_rgb(200, 200, 200),
            );
        }

        // Location overlay (top-left)
        draw_overlay_box(
            &painter,
            rect.left_top() + egui::vec2(12.0, 12.0),
            egui::Align2::LEFT_TOP,
            &format!("📍 {}", location_label),
        );

        // Clock overlay (top-right)
        draw_overlay_box(
            &painter,
            rect.right_top() + egui::vec2(-12.0, 12.0),
            egui::Align2::RIGHT_TOP,
            clock_text,
        );

        // Fire overlay (pulsing, centered)
        if fire_active {
            let t = ui.input(|i| i.time);
            let pulse = ((t * std::f64::consts::TAU).sin() * 0.5 + 0.5) as f32;
            let alpha = (80.0 + pulse * 175.0) as u8;

            painter.rect_filled(
                rect,
                4.0,
                egui::Color32::from_rgba_unmultiplied(255, 40, 40, 40),
            );

            let text = "🔥 FIRE DETECTED";
            let galley = painter.layout_no_wrap(
                text.to_string(),
                egui::FontId::proportional(18.0),
                egui::Color32::WHITE,
            );
            let padding = egui::vec2(16.0, 8.0);
            let box_rect =
                egui::Rect::from_center_size(rect.center(), galley.size() + padding * 2.0);
            painter.rect_filled(
                box_rect,
                6.0,
                egui::Color32::from_rgba_unmultiplied(200, 30, 30, alpha),
            );
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                text,
                egui::FontId::proportional(18.0),
                egui::Color32::WHITE,
            );
        }
    }

    /// Protocol name of the configured stream, for the card footer
    #[must_use]
    pub fn protocol_name(&self) -> Option<&'static str> {
        self.stream.as_ref().map(|s| s.link().protocol.name())
    }
}

fn draw_overlay_box(
    painter: &egui::Painter,
    anchor_pos: egui::Pos2,
    anchor: egui::Align2,
    text: &str,
) {
    let galley = painter.layout_no_wrap(
        text.to_string(),
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );

    let padding = egui::vec2(8.0, 4.0);
    let box_rect = anchor.anchor_size(anchor_pos, galley.size() + padding * 2.0);

    painter.rect_filled(
        box_rect,
        4.0,
        egui::Color32::from_rgba_unmultiplied(0, 0, 0, 180),
    );
    painter.text(
        box_rect.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );
}
