//! yt-dlp as the audio source: locating or installing the binary, running it
//! with an audio-only format, and reporting progress and the written file.

use std::{
    ffi::OsString,
    future::Future,
    path::{Path, PathBuf},
    process::Stdio,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::Command,
    sync::mpsc::UnboundedSender,
};
use tracing::{debug, info, warn};

use crate::config::{APP_DIR, AppConfig};
use crate::error::SourceError;
use crate::model::DownloadEvent;
use crate::progress::{PROGRESS_PREFIX, SAVED_PREFIX, parse_progress_from_line, parse_saved_path};

const BIN: &str = if cfg!(target_os = "windows") { "yt-dlp.exe" } else { "yt-dlp" };

const RELEASE_URL: &str = if cfg!(target_os = "windows") {
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp.exe"
} else if cfg!(target_os = "macos") {
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp_macos"
} else if cfg!(target_arch = "aarch64") {
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp_linux_aarch64"
} else {
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp_linux"
};

/// Something that can turn a video URL into an audio file on disk.
pub trait AudioSource: Send + Sync {
    /// Downloads the audio-only stream of `url` into `folder` and returns the
    /// path of the file it wrote. Progress goes to `events`.
    fn fetch_audio(
        &self,
        url: &str,
        folder: &Path,
        events: &UnboundedSender<DownloadEvent>,
    ) -> impl Future<Output = Result<PathBuf, SourceError>> + Send;
}

/// Runs the yt-dlp executable as a child process.
#[derive(Debug, Clone)]
pub struct YtDlp {
    /// Binary from config; skips lookup and install when set
    configured: Option<PathBuf>,
    auto_install: bool,
    /// Where an installed copy lives (`<data dir>/yt-mp3-downloader/bin`)
    managed_dir: Option<PathBuf>,
}

impl YtDlp {
    pub fn from_config(cfg: &AppConfig) -> Self {
        if let Some(path) = &cfg.ytdlp_path {
            return Self::with_binary(path.clone());
        }
        Self {
            configured: None,
            auto_install: cfg.auto_install_ytdlp,
            managed_dir: dirs::data_dir().map(|d| d.join(APP_DIR).join("bin")),
        }
    }

    /// Always use `path`, no lookup.
    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            configured: Some(path.into()),
            auto_install: false,
            managed_dir: None,
        }
    }

    /// Configured path, then `PATH`, then the managed copy, then install.
    async fn binary(&self) -> Result<PathBuf, SourceError> {
        if let Some(path) = &self.configured {
            return Ok(path.clone());
        }

        let on_path = Command::new(BIN)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false);
        if on_path {
            return Ok(PathBuf::from(BIN));
        }

        let Some(dir) = &self.managed_dir else {
            return Err(SourceError::NotFound);
        };
        let managed = dir.join(BIN);
        if managed.exists() {
            return Ok(managed);
        }
        if !self.auto_install {
            return Err(SourceError::NotFound);
        }
        install(dir).await
    }

    async fn run(
        &self,
        url: &str,
        folder: &Path,
        events: &UnboundedSender<DownloadEvent>,
    ) -> Result<PathBuf, SourceError> {
        let bin = self.binary().await?;
        info!("running {} for {url}", bin.display());

        let mut child = Command::new(&bin)
            .args(build_args(url, folder))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SourceError::Spawn {
                path: bin.clone(),
                source,
            })?;

        let (Some(out), Some(err)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(SourceError::NoOutput);
        };
        let (saved, err_lines) = tokio::try_join!(scan_lines(out, events), scan_lines(err, events))?;
        let status = child.wait().await?;

        if !status.success() {
            let message = summarize_stderr(&err_lines);
            warn!("yt-dlp exited with {status}: {message}");
            return Err(SourceError::Failed {
                status: status.to_string(),
                message,
            });
        }

        saved
            .path
            .or(err_lines.path)
            .ok_or(SourceError::NoOutput)
    }
}

impl AudioSource for YtDlp {
    fn fetch_audio(
        &self,
        url: &str,
        folder: &Path,
        events: &UnboundedSender<DownloadEvent>,
    ) -> impl Future<Output = Result<PathBuf, SourceError>> + Send {
        self.run(url, folder, events)
    }
}

/// Command line for an audio-only download of `url` into `folder`.
pub fn build_args(url: &str, folder: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-f",
        "bestaudio",
        "--no-playlist",
        "--newline",
        "--progress",
        "--no-colors",
        "--encoding",
        "utf-8",
    ]
    .iter()
    .map(OsString::from)
    .collect();

    args.push("--progress-template".into());
    args.push(format!("download:{PROGRESS_PREFIX}%(progress._percent_str)s").into());
    args.push("--print".into());
    args.push(format!("after_move:{SAVED_PREFIX}%(filepath)s").into());

    args.push("-P".into());
    args.push(folder.as_os_str().to_owned());
    args.push("-o".into());
    args.push("%(title)s.%(ext)s".into());

    args.push("--".into());
    args.push(url.into());
    args
}

#[derive(Debug, Default)]
struct Scanned {
    path: Option<PathBuf>,
    /// Non-progress lines, oldest first
    lines: Vec<String>,
}

/// Reads one of the child's streams to the end, forwarding progress and
/// remembering the reported output path. Bytes that are not UTF-8 are
/// replaced, never an error.
async fn scan_lines<R: AsyncRead + Unpin>(
    reader: R,
    events: &UnboundedSender<DownloadEvent>,
) -> std::io::Result<Scanned> {
    let mut scanned = Scanned::default();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        if let Some(pct) = parse_progress_from_line(&line) {
            let _ = events.send(DownloadEvent::Progress(pct));
            continue;
        }
        debug!("yt-dlp> {line}");
        if let Some(path) = parse_saved_path(&line) {
            scanned.path = Some(path);
        } else if !line.trim().is_empty() {
            scanned.lines.push(line);
        }
    }
    Ok(scanned)
}

/// Picks the line worth showing from yt-dlp's stderr: the last `ERROR:` line,
/// else the last line printed.
fn summarize_stderr(scanned: &Scanned) -> String {
    scanned
        .lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| scanned.lines.last())
        .cloned()
        .unwrap_or_else(|| "no diagnostic output".to_string())
}

/// Fetches the release binary for this platform into `dir`.
async fn install(dir: &Path) -> Result<PathBuf, SourceError> {
    info!("fetching yt-dlp from {RELEASE_URL}");
    let data = reqwest::get(RELEASE_URL)
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let target = place_binary(dir, &data).await?;
    info!("installed yt-dlp at {}", target.display());
    Ok(target)
}

/// Writes `data` as an executable `dir/yt-dlp` via a `.part` file, which is
/// removed again if any step fails.
async fn place_binary(dir: &Path, data: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let target = dir.join(BIN);
    let partial = dir.join(format!("{BIN}.part"));

    let placed = async {
        tokio::fs::write(&partial, data).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&partial, std::fs::Permissions::from_mode(0o755)).await?;
        }
        tokio::fs::rename(&partial, &target).await
    }
    .await;

    if let Err(e) = placed {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
    }
    Ok(target)
}
