//! YouTube mp3 Downloader: paste a video URL, pick a folder, save the audio.

// Settings file (config.toml)
mod config;
// Folder/URL state and the download attempt
mod controller;
// yt-dlp runner (external audio source)
mod downloader;
// Error kinds shown in popups
mod error;
// Subscriber setup for tracing
mod logging;
// Events and status shared between the UI and the download task
mod model;
// yt-dlp output line parsing
mod progress;
// Visuals, including the hover color
mod theme;
// Thumbnail preview of the entered video
mod thumbnail;

use std::path::PathBuf;

use config::AppConfig;
use controller::{DownloadController, NativeFolderPicker};
use downloader::YtDlp;
use error::DownloadError;
use model::{DownloadEvent, DownloadStatus};

// eframe/egui for GUI application framework
use eframe::{App, Frame, egui};
use egui::{ColorImage, CursorIcon, RichText, TextureOptions};
// Native message boxes for the outcome popups
use rfd::{MessageButtons, MessageDialog, MessageLevel};
use tokio::{
    runtime::Runtime,
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};

const TITLE: &str = "YouTube mp3 Downloader";

/// Program entry point: logging, config, runtime, then the window
fn main() -> anyhow::Result<()> {
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {e:#}");
    }

    let cfg = config::load();
    tracing::info!("starting with {cfg:?}");
    let runtime = Runtime::new()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size([440.0, 560.0])
            .with_min_inner_size([400.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        options,
        Box::new(move |cc| {
            theme::apply_theme(&cc.egui_ctx, cfg.dark_mode);
            Box::new(DownloaderApp::new(cfg, runtime))
        }),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}

/// Application state for the GUI
struct DownloaderApp {
    /// Runs the download and thumbnail tasks off the UI thread
    runtime: Runtime,
    /// URL text and selected folder
    controller: DownloadController,
    source: YtDlp,
    status: DownloadStatus,
    /// Sender cloned into each download task
    events_tx: UnboundedSender<DownloadEvent>,
    events_rx: UnboundedReceiver<DownloadEvent>,
    show_thumbnail: bool,
    /// Video id whose thumbnail should be on screen
    preview_id: Option<String>,
    preview: Option<egui::TextureHandle>,
    thumbnail_tx: UnboundedSender<(String, ColorImage)>,
    thumbnail_rx: UnboundedReceiver<(String, ColorImage)>,
}

impl DownloaderApp {
    fn new(cfg: AppConfig, runtime: Runtime) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        let (thumbnail_tx, thumbnail_rx) = unbounded_channel();
        Self {
            runtime,
            controller: DownloadController::new(cfg.default_folder.clone(), cfg.extension()),
            source: YtDlp::from_config(&cfg),
            status: DownloadStatus::Idle,
            events_tx,
            events_rx,
            show_thumbnail: cfg.show_thumbnail,
            preview_id: None,
            preview: None,
            thumbnail_tx,
            thumbnail_rx,
        }
    }

    /// Spawns the single download attempt. Validation runs on the task too,
    /// so every outcome comes back through `events_rx`; the busy status keeps
    /// the frame loop polling until it does.
    fn start_download(&mut self) {
        self.status = DownloadStatus::Downloading { progress: 0.0 };
        controller::spawn_attempt(
            self.runtime.handle(),
            self.controller.clone(),
            self.source.clone(),
            self.events_tx.clone(),
        );
    }

    /// Fetches the thumbnail when the URL box names a different video.
    fn refresh_preview(&mut self, ctx: &egui::Context) {
        if !self.show_thumbnail {
            return;
        }
        let id = thumbnail::extract_video_id(&self.controller.video_url);
        if id == self.preview_id {
            return;
        }
        self.preview = None;
        self.preview_id = id.clone();

        let Some(id) = id else { return };
        let tx = self.thumbnail_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn_blocking(move || {
            if let Some(img) = thumbnail::fetch_thumbnail(&id) {
                let _ = tx.send((id, img));
                ctx.request_repaint();
            }
        });
    }

    fn poll_channels(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                DownloadEvent::Progress(p) => self.status.advance(p),
                DownloadEvent::Finished(result) => {
                    self.status = DownloadStatus::Idle;
                    show_outcome(&result);
                }
            }
        }

        while let Ok((id, img)) = self.thumbnail_rx.try_recv() {
            // Drop results for a URL that has since been edited away
            if self.preview_id.as_deref() == Some(id.as_str()) {
                self.preview = Some(ctx.load_texture(&id, img, TextureOptions::default()));
            }
        }
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for DownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_channels(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("YouTube Video URL:").size(14.0));

                let edit = egui::TextEdit::multiline(&mut self.controller.video_url)
                    .desired_rows(8)
                    .desired_width(f32::INFINITY)
                    .hint_text("https://www.youtube.com/watch?v=…");
                if ui.add(edit).changed() {
                    self.refresh_preview(ctx);
                }

                ui.add_space(10.0);
                if ui
                    .button("Select Folder")
                    .on_hover_cursor(CursorIcon::PointingHand)
                    .clicked()
                {
                    self.controller.select_folder(&NativeFolderPicker);
                }
                let folder = self
                    .controller
                    .folder_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "No folder selected".to_string());
                ui.label(RichText::new(folder).weak());

                ui.add_space(10.0);
                let busy = self.status.is_busy();
                if ui
                    .add_enabled(!busy, egui::Button::new("Download"))
                    .on_hover_cursor(CursorIcon::PointingHand)
                    .clicked()
                {
                    self.start_download();
                }

                if let DownloadStatus::Downloading { progress } = self.status {
                    ui.add(egui::ProgressBar::new(progress).show_percentage());
                }

                if let Some(tex) = &self.preview {
                    ui.add_space(10.0);
                    ui.add(egui::Image::new(tex).max_width(240.0));
                }
            });
        });

        if self.status.is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

/// Success or error popup for a finished (or refused) attempt.
fn show_outcome(result: &Result<PathBuf, DownloadError>) {
    let (level, title, text) = match result {
        Ok(_) => (MessageLevel::Info, "Successful!", "Video downloaded.".to_string()),
        Err(e) => (MessageLevel::Error, "Error!", e.user_message()),
    };
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(&text)
        .set_buttons(MessageButtons::Ok)
        .show();
}
