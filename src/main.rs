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

mod config;
mod dashboard;
mod feed;
mod status;
mod status_pane;
mod trend_pane;
mod video;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use eframe::egui;
use log::{error, info, warn};
use mimalloc::MiMalloc;

use firesense_client::{ReadingSample, SensorMonitor};

use config::AppConfig;
use feed::FeedManager;
use status::{SharedSystemStatus, SystemStatus};
use status_pane::StatusPane;
use trend_pane::TrendPane;
use video::CameraPanel;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "emberwatch-desktop", version, about = "Fire-watch station monitoring dashboard")]
struct Args {
    /// Sensor station endpoint URL (overrides config)
    #[arg(long)]
    endpoint: Option<String>,

    /// Camera stream URL (overrides config)
    #[arg(long)]
    camera_url: Option<String>,

    /// Poll interval in milliseconds (overrides config)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Print the config file path and exit
    #[arg(long)]
    config_path: bool,
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.config_path {
        match AppConfig::get_config_path() {
            Ok(path) => println!("{}", path.display()),
            Err(e) => eprintln!("Failed to resolve config path: {}", e),
        }
        return Ok(());
    }

    let mut app_config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    // Session-only CLI overrides, not persisted
    if let Some(endpoint) = args.endpoint {
        app_config.sensor_endpoint = endpoint;
    }
    if let Some(camera_url) = args.camera_url {
        app_config.camera_url = camera_url;
    }
    if let Some(interval_ms) = args.interval_ms {
        app_config.poll_interval_ms = interval_ms.max(1);
    }

    let gstreamer_ready = match video::player::init_gstreamer() {
        Ok(()) => true,
        Err(e) => {
            error!("{}", e);
            false
        }
    };

    info!("Starting EmberWatch Desktop");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_title("EmberWatch Desktop"),
        ..Default::default()
    };

    eframe::run_native(
        "EmberWatch Desktop",
        options,
        Box::new(move |_cc| Ok(Box::new(EmberwatchApp::new(app_config, gstreamer_ready)))),
    )
}

struct EmberwatchApp {
    config: AppConfig,
    status: SharedSystemStatus,
    feed: FeedManager,
    monitor: Arc<Mutex<SensorMonitor>>,
    camera: CameraPanel,
    status_pane: StatusPane,
    trend_pane: TrendPane,

    settings_open: bool,
    endpoint_edit: String,

    // Header telemetry; present in the station uplink but not carried by
    // the sensor frame, so these stay at their initial values
    battery_percent: f64,
    signal_bars: u8,
    is_online: bool,
}

impl EmberwatchApp {
    fn new(config: AppConfig, gstreamer_ready: bool) -> Self {
        let status: SharedSystemStatus = Arc::new(Mutex::new(SystemStatus::new()));

        let feed = FeedManager::start(&config, status.clone());
        let monitor = feed.monitor();

        let camera = if gstreamer_ready {
            CameraPanel::new(&config.camera_url)
        } else {
            CameraPanel::disabled("GStreamer unavailable".to_string())
        };

        let status_pane = StatusPane::new(config.status_pane_visible);
        let trend_pane = TrendPane::new(config.show_trends);
        let endpoint_edit = config.sensor_endpoint.clone();

        Self {
            config,
            status,
            feed,
            monitor,
            camera,
            status_pane,
            trend_pane,
            settings_open: false,
            endpoint_edit,
            battery_percent: 0.0,
            signal_bars: 0,
            is_online: true,
        }
    }

    fn save_config(&mut self) {
        if let Err(e) = self.config.save() {
            warn!("Failed to save config: {}", e);
        }
    }

    fn draw_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.settings_open;
        let mut apply_endpoint = false;

        egui::Window::new("Settings")
            .default_width(340.0)
            .resizable(false)
            .collapsible(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("Sensor station endpoint")
                    .color(egui::Color32::from_rgb(180, 185, 190))
                    .size(11.0));

                ui.horizontal(|ui| {
                    ui.add(egui::TextEdit::singleline(&mut self.endpoint_edit)
                        .desired_width(240.0));

                    let changed = self.endpoint_edit != self.feed.current_endpoint();
                    if ui.add_enabled(changed, egui::Button::new("Apply")).clicked() {
                        apply_endpoint = true;
                    }
                });

                ui.add_space(4.0);
                ui.label(egui::RichText::new(format!(
                    "Polling every {}ms", self.config.poll_interval_ms))
                    .color(egui::Color32::from_rgb(140, 145, 150))
                    .size(10.0));

                if let Ok(path) = AppConfig::get_config_path() {
                    ui.label(egui::RichText::new(format!("Config: {}", path.display()))
                        .color(egui::Color32::from_rgb(120, 125, 130))
                        .size(9.0)
                        .monospace());
                }
            });

        self.settings_open = open;

        if apply_endpoint {
            let endpoint = self.endpoint_edit.trim().to_string();
            self.feed.set_endpoint(endpoint.clone());
            self.config.sensor_endpoint = endpoint;
            self.save_config();
        }
    }

    fn draw_camera_card(&mut self, ui: &mut egui::Ui, fire_active: bool, clock_text: &str) {
        dashboard::card_frame(ui).show(ui, |ui| {
            ui.set_width(ui.available_width());

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("📹").size(13.0));
                ui.label(egui::RichText::new("Live Video Feed")
                    .color(egui::Color32::from_rgb(210, 220, 230))
                    .size(12.0)
                    .strong());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (text, color) = if self.is_online {
                        ("LIVE", egui::Color32::from_rgb(70, 160, 90))
                    } else {
                        ("OFFLINE", egui::Color32::from_rgb(200, 55, 55))
                    };
                    dashboard::draw_badge(ui, text, color);
                });
            });

            ui.add_space(4.0);

            self.camera.render(
                ui,
                &self.config.camera_location_label,
                clock_text,
                fire_active,
            );

            if let Some(protocol) = self.camera.protocol_name() {
                ui.add_space(2.0);
                ui.label(egui::RichText::new(format!("Protocol: {}", protocol))
                    .color(egui::Color32::from_rgb(130, 135, 140))
                    .size(9.0));
            }
        });
    }
}

impl eframe::App for EmberwatchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll cadence drives the repaint; the clock overlay only needs
        // second resolution
        ctx.request_repaint_after(Duration::from_millis(500));

        // Snapshot reading state with a single lock, released before rendering
        let (reading, co_alarm, history): (_, _, Vec<ReadingSample>) = {
            let monitor = self.monitor.lock().expect("Sensor monitor mutex poisoned");
            let history = if self.trend_pane.visible {
                monitor.history().iter().copied().collect()
            } else {
                Vec::new()
            };
            (monitor.reading(), monitor.co_alarm(), history)
        };

        let camera_active = self.camera.is_active();
        {
            let mut status = self.status.lock().unwrap();
            status.update_uptime();
            status.set_camera_active(camera_active);
        }

        let clock_text = chrono::Local::now().format("%H:%M:%S").to_string();

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::new()
                .fill(egui::Color32::from_rgb(24, 27, 31))
                .inner_margin(egui::Margin::symmetric(12, 8)))
            .show(ctx, |ui| {
                dashboard::draw_header(
                    ui,
                    self.is_online,
                    self.signal_bars,
                    self.battery_percent,
                );

                ui.add_space(2.0);
                ui.horizontal(|ui| {
                    if ui.small_button("📈 Trends").clicked() {
                        self.trend_pane.visible = !self.trend_pane.visible;
                    }
                    if ui.small_button("⚙ Settings").clicked() {
                        self.settings_open = !self.settings_open;
                    }
                });
            });

        egui::TopBottomPanel::bottom("system_strip")
            .frame(egui::Frame::new()
                .fill(egui::Color32::from_rgb(24, 27, 31))
                .inner_margin(egui::Margin::symmetric(12, 6)))
            .show(ctx, |ui| {
                dashboard::draw_system_strip(ui, self.battery_percent, camera_active);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::new()
                .fill(egui::Color32::from_rgb(32, 36, 41))
                .inner_margin(egui::Margin::same(12)))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    dashboard::draw_alerts(ui, reading.fire_detected, co_alarm);

                    // Camera takes two thirds, sensor column the rest
                    let spacing = 8.0;
                    let camera_width = (ui.available_width() - spacing) * 0.66;

                    ui.horizontal_top(|ui| {
                        ui.vertical(|ui| {
                            ui.set_width(camera_width);
                            self.draw_camera_card(ui, reading.fire_detected, &clock_text);
                        });

                        ui.vertical(|ui| {
                            ui.set_width(ui.available_width());
                            dashboard::draw_fire_card(ui, reading.fire_detected);
                            ui.add_space(spacing);
                            dashboard::draw_co_card(ui, reading.co_ppm);
                        });
                    });

                    ui.add_space(spacing);

                    ui.columns(2, |cols| {
                        dashboard::draw_temperature_card(&mut cols[0], reading.temperature_c);
                        dashboard::draw_humidity_card(&mut cols[1], reading.humidity_pct);
                    });
                });
            });

        // Floating panes
        {
            let status = self.status.lock().unwrap();
            self.status_pane.render(ctx, &status);
        }
        self.trend_pane.render(ctx, &history);
        self.draw_settings_window(ctx);

        // Persist pane visibility changes
        if self.status_pane.visible != self.config.status_pane_visible
            || self.trend_pane.visible != self.config.show_trends
        {
            self.config.status_pane_visible = self.status_pane.visible;
            self.config.show_trends = self.trend_pane.visible;
            self.save_config();
        }
    }
}
