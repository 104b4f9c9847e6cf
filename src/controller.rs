//! State behind the two buttons: the chosen folder, the URL text, and the
//! single download attempt each press of "Download" makes.

use std::fs;
use std::path::{Path, PathBuf};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::downloader::AudioSource;
use crate::error::DownloadError;
use crate::model::DownloadEvent;

/// Asks the user for a directory.
pub trait FolderPicker {
    /// `None` when the user cancels.
    fn pick_folder(&self, start: Option<&Path>) -> Option<PathBuf>;
}

/// Native OS folder dialog.
pub struct NativeFolderPicker;

impl FolderPicker for NativeFolderPicker {
    fn pick_folder(&self, start: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().set_title("Select Folder");
        if let Some(dir) = start {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_folder()
    }
}

/// Owns the URL text box contents and the selected folder.
#[derive(Debug, Clone)]
pub struct DownloadController {
    /// Raw text of the URL box
    pub video_url: String,
    /// `None` until a folder has been picked
    folder_path: Option<PathBuf>,
    /// Extension the downloaded file is renamed to
    extension: String,
}

impl DownloadController {
    pub fn new(folder_path: Option<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            video_url: String::new(),
            folder_path: folder_path.filter(|p| !p.as_os_str().is_empty()),
            extension: extension.into(),
        }
    }

    pub fn folder_path(&self) -> Option<&Path> {
        self.folder_path.as_deref()
    }

    /// Opens the picker. A cancelled dialog keeps the previous folder.
    /// Returns whether the folder changed.
    pub fn select_folder(&mut self, picker: &impl FolderPicker) -> bool {
        match picker.pick_folder(self.folder_path()) {
            Some(folder) => {
                info!("download folder set to {}", folder.display());
                self.folder_path = Some(folder);
                true
            }
            None => false,
        }
    }

    /// Validates the current state into a self-contained request.
    /// The folder is checked before the URL.
    pub fn request(&self) -> Result<AudioRequest, DownloadError> {
        let folder = self.folder_path.clone().ok_or(DownloadError::MissingFolder)?;
        let url = self.video_url.trim();
        if url.is_empty() {
            return Err(DownloadError::MissingUrl);
        }
        Ok(AudioRequest {
            url: url.to_string(),
            folder,
            extension: self.extension.clone(),
        })
    }

    /// One full attempt: validate, fetch the audio-only stream, rename.
    pub async fn download_audio<S: AudioSource>(
        &self,
        source: &S,
        events: &UnboundedSender<DownloadEvent>,
    ) -> Result<PathBuf, DownloadError> {
        self.request()?.run(source, events).await
    }
}

/// Runs one attempt on `runtime`. The attempt gets a task of its own so that
/// `Finished` is sent even when it panics.
pub fn spawn_attempt<S: AudioSource + 'static>(
    runtime: &Handle,
    controller: DownloadController,
    source: S,
    events: UnboundedSender<DownloadEvent>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        let tx = events.clone();
        let attempt = tokio::spawn(async move { controller.download_audio(&source, &tx).await });
        let result = match attempt.await {
            Ok(result) => result,
            Err(e) => {
                error!("download task failed: {e}");
                Err(DownloadError::Aborted(e.to_string()))
            }
        };
        let _ = events.send(DownloadEvent::Finished(result));
    })
}

/// Everything a download needs, detached from the UI state so it can run on
/// another task.
#[derive(Debug, Clone)]
pub struct AudioRequest {
    pub url: String,
    pub folder: PathBuf,
    pub extension: String,
}

impl AudioRequest {
    pub async fn run<S: AudioSource>(
        self,
        source: &S,
        events: &UnboundedSender<DownloadEvent>,
    ) -> Result<PathBuf, DownloadError> {
        info!("downloading audio of {} into {}", self.url, self.folder.display());
        let result = match source.fetch_audio(&self.url, &self.folder, events).await {
            Ok(out_file) => rename_extension(&out_file, &self.extension),
            Err(e) => Err(e.into()),
        };
        match &result {
            Ok(path) => info!("saved {}", path.display()),
            Err(e) => error!("download of {} failed: {e}", self.url),
        }
        result
    }
}

/// Swaps the file's extension for `extension`. The contents are untouched.
pub fn rename_extension(path: &Path, extension: &str) -> Result<PathBuf, DownloadError> {
    let new_file = path.with_extension(extension);
    if new_file == path {
        return Ok(new_file);
    }
    fs::rename(path, &new_file).map_err(|source| DownloadError::Rename {
        from: path.to_path_buf(),
        to: new_file.clone(),
        source,
    })?;
    Ok(new_file)
}
