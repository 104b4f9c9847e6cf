//! Error types for a download attempt.

use std::path::PathBuf;

use thiserror::Error;

/// Headline shown for every failure that is not a validation error.
pub const GENERIC_FAILURE: &str = "Something went wrong!";

/// Why a single press of "Download" did not produce an audio file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// No destination folder has been chosen yet.
    #[error("Please select folder first!")]
    MissingFolder,
    /// A folder is set but the URL box is empty.
    #[error("Please enter the video url!")]
    MissingUrl,
    /// yt-dlp could not produce the audio stream.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The downloaded file could not be renamed to the audio extension.
    #[error("could not rename {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The download task ended without producing a result (it panicked).
    #[error("download stopped unexpectedly: {0}")]
    Aborted(String),
}

impl DownloadError {
    pub fn is_validation(&self) -> bool {
        matches!(self, DownloadError::MissingFolder | DownloadError::MissingUrl)
    }

    /// Text for the error popup. Validation errors show their own message,
    /// everything else gets the generic headline followed by the detail.
    pub fn user_message(&self) -> String {
        if self.is_validation() {
            self.to_string()
        } else {
            format!("{GENERIC_FAILURE}\n\n{self}")
        }
    }
}

/// Failures of the external audio source (yt-dlp).
#[derive(Debug, Error)]
pub enum SourceError {
    /// No usable binary: not configured, not on PATH, auto-install disabled.
    #[error("yt-dlp was not found; install it or set `ytdlp_path` in config.toml")]
    NotFound,
    #[error("could not download yt-dlp: {0}")]
    Install(#[from] reqwest::Error),
    #[error("could not start yt-dlp at {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o error talking to yt-dlp: {0}")]
    Io(#[from] std::io::Error),
    /// yt-dlp ran but exited non-zero; carries its last diagnostic line.
    #[error("yt-dlp failed ({status}): {message}")]
    Failed { status: String, message: String },
    /// yt-dlp exited cleanly without reporting where it wrote the file.
    #[error("yt-dlp did not report a downloaded file")]
    NoOutput,
}

/// Problems reading `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory for this user")]
    NoConfigDir,
    #[error("config i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_show_their_own_text() {
        assert_eq!(
            DownloadError::MissingFolder.user_message(),
            "Please select folder first!"
        );
        assert_eq!(
            DownloadError::MissingUrl.user_message(),
            "Please enter the video url!"
        );
    }

    #[test]
    fn other_errors_lead_with_generic_headline() {
        let err = DownloadError::from(SourceError::Failed {
            status: "exit status: 1".into(),
            message: "ERROR: Video unavailable".into(),
        });
        assert!(!err.is_validation());
        let msg = err.user_message();
        assert!(msg.starts_with(GENERIC_FAILURE));
        assert!(msg.contains("Video unavailable"));
    }
}
