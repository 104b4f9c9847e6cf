use std::path::PathBuf;

use crate::error::DownloadError;

/// Messages sent from a running download attempt back to the UI.
#[derive(Debug)]
pub enum DownloadEvent {
    /// Fraction of the audio stream received (0.0 to 1.0)
    Progress(f32),
    /// The attempt is over: the renamed audio file, or why it failed
    Finished(Result<PathBuf, DownloadError>),
}

/// Represents the current state of the Download button
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DownloadStatus {
    /// Nothing running; a new attempt may start
    Idle,
    /// An attempt is in flight
    Downloading { progress: f32 },
}

impl DownloadStatus {
    pub fn is_busy(&self) -> bool {
        matches!(self, DownloadStatus::Downloading { .. })
    }

    /// Applies a progress update; progress never moves backwards.
    pub fn advance(&mut self, prog: f32) {
        if let DownloadStatus::Downloading { progress } = self {
            if prog > *progress {
                *progress = prog;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_only_increases_while_downloading() {
        let mut status = DownloadStatus::Downloading { progress: 0.0 };
        status.advance(0.4);
        status.advance(0.2);
        assert_eq!(status, DownloadStatus::Downloading { progress: 0.4 });

        let mut idle = DownloadStatus::Idle;
        idle.advance(0.9);
        assert_eq!(idle, DownloadStatus::Idle);
        assert!(!idle.is_busy());
    }
}
