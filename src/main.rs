#![windows_subsystem = "windows"]
//! Vehicle Gallery - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;
mod assets;
mod catalog;
mod constants;
mod download;
mod error;
mod gallery;
mod settings;
mod theme;
mod types;
mod ui;
mod utils;

use app::App;
use constants::*;
use eframe::egui;
use egui_phosphor::regular as icons;
use tracing::{error, info};
use utils::get_data_dir;

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "vehicle-gallery.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vehicle_gallery=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> eframe::Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir).ok();

    // Guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "Vehicle Gallery starting");

    let mut settings = settings::Settings::load(&data_dir);
    // First argument overrides the saved source for this run
    if let Some(source) = std::env::args().nth(1) {
        info!(source = %source, "Source given on command line");
        settings.source = source;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("gallery-worker")
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            return Ok(());
        }
    };

    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(1280.0, 800.0)))
        .with_min_inner_size([720.0, 480.0])
        .with_title(APP_NAME);

    let needs_center = win_pos.is_none();
    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| {
            let mut app = App::new(cc, settings, data_dir, runtime);
            app.needs_center = needs_center;
            Ok(Box::new(app))
        }),
    )
}

// ============================================================================
// MAIN UPDATE LOOP
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        self.images.poll(ctx);
        self.poll_catalog();
        self.handle_keys(ctx);

        let popup_open = ctx.memory(|m| m.any_popup_open());
        self.control_rects.clear();

        let top = egui::TopBottomPanel::top("top_bar")
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::symmetric(theme::SPACING_XL as i8, theme::SPACING_MD as i8)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!("{}  {}", icons::CAR, APP_NAME))
                            .size(theme::FONT_TITLE)
                            .strong()
                            .color(theme::TEXT_PRIMARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let gear = if self.show_settings { icons::X } else { icons::GEAR };
                        if ui.add(theme::button(gear)).on_hover_text("Settings").clicked() {
                            self.show_settings = !self.show_settings;
                            self.source_input = self.settings.source.clone();
                            self.variant_input = self.settings.variant;
                        }
                        let selected = self
                            .gallery
                            .as_ref()
                            .map(|g| g.selection().total())
                            .unwrap_or(0);
                        if selected > 0 {
                            ui.label(
                                egui::RichText::new(format!("{} selected  ·  Esc to clear", selected))
                                    .color(theme::ACCENT),
                            );
                        }
                    });
                });
            });
        self.control_rects.push(top.response.rect);

        if !self.download_jobs.is_empty() {
            let bottom = egui::TopBottomPanel::bottom("download_status")
                .frame(
                    egui::Frame::new()
                        .fill(theme::BG_ELEVATED)
                        .inner_margin(egui::Margin::symmetric(theme::SPACING_XL as i8, theme::SPACING_SM as i8)),
                )
                .show(ctx, |ui| self.render_download_status(ui));
            self.control_rects.push(bottom.response.rect);
        }

        self.render_settings_panel(ctx);

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::same(theme::SPACING_XL as i8)),
            )
            .show(ctx, |ui| self.render_gallery(ui, ctx));

        self.render_lightbox(ctx);
        self.handle_pointer(ctx, popup_open);
        self.render_drag_band(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application shutting down");
        self.save_settings();
    }
}
