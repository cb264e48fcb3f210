//! Download jobs and the status bar

use super::App;
use crate::download::spawn_download;
use crate::gallery::DownloadRequest;
use crate::theme;
use crate::types::*;
use crate::utils::format_bytes;
use eframe::egui;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Finished jobs kept for the status bar
const MAX_FINISHED_JOBS: usize = 3;

impl App {
    pub(crate) fn start_download(&mut self, ctx: &egui::Context, request: DownloadRequest) {
        let state = Arc::new(Mutex::new(DownloadState {
            archive_name: request.archive_name.clone(),
            status: Some(DownloadStatus::Fetching { done: 0, total: request.entries.len() }),
            ..DownloadState::default()
        }));
        self.download_jobs.push(state.clone());
        self.prune_finished_jobs();

        spawn_download(
            &self.runtime,
            self.source.clone(),
            request,
            self.download_path.clone(),
            state,
            ctx.clone(),
        );
    }

    fn prune_finished_jobs(&mut self) {
        let finished = self
            .download_jobs
            .iter()
            .filter(|job| !job.lock().unwrap().is_running())
            .count();
        let mut excess = finished.saturating_sub(MAX_FINISHED_JOBS);
        self.download_jobs.retain(|job| {
            if excess > 0 && !job.lock().unwrap().is_running() {
                excess -= 1;
                false
            } else {
                true
            }
        });
    }

    /// One line per recent archive job. Failures stay in the log only.
    pub(crate) fn render_download_status(&mut self, ui: &mut egui::Ui) {
        let mut open_folder = false;

        for job in &self.download_jobs {
            let s = job.lock().unwrap();
            let Some(status) = &s.status else { continue };
            if *status == DownloadStatus::Failed {
                continue;
            }
            ui.horizontal(|ui| {
                match status {
                    DownloadStatus::Fetching { done, total } => {
                        ui.spinner();
                        ui.label(
                            egui::RichText::new(format!("{}  {}/{}", s.archive_name, done, total))
                                .color(theme::TEXT_SECONDARY),
                        );
                    }
                    DownloadStatus::Packing => {
                        ui.spinner();
                        ui.label(
                            egui::RichText::new(format!("Packing {}", s.archive_name))
                                .color(theme::TEXT_SECONDARY),
                        );
                    }
                    DownloadStatus::Saved(path) => {
                        ui.label(
                            egui::RichText::new(egui_phosphor::regular::CHECK_CIRCLE)
                                .color(theme::STATUS_SUCCESS),
                        );
                        ui.label(
                            egui::RichText::new(format!(
                                "{}  ({} files, {})",
                                path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
                                s.fetched,
                                format_bytes(s.total_bytes)
                            ))
                            .color(theme::TEXT_SECONDARY),
                        );
                        if ui
                            .add(theme::button(format!("{}  Show in folder", egui_phosphor::regular::FOLDER_OPEN)))
                            .clicked()
                        {
                            open_folder = true;
                        }
                    }
                    DownloadStatus::Failed => {}
                }
            });
        }

        if open_folder {
            if let Err(e) = open::that(&self.download_path) {
                warn!(error = %e, path = %self.download_path.display(), "Failed to open download folder");
            }
        }
    }
}
