//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level
//! updates.

use std::path::PathBuf;

use directories::UserDirs;
use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// External encoder settings.
    #[serde(default)]
    pub encoder: EncoderSettings,

    /// Automatic audio-cleaning settings.
    #[serde(default)]
    pub cleaning: CleaningSettings,

    /// Desktop integration settings.
    #[serde(default)]
    pub desktop: DesktopSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Identifies one settings section for section-level updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Encoder,
    Cleaning,
    Desktop,
    Logging,
}

impl ConfigSection {
    /// TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Encoder => "encoder",
            ConfigSection::Cleaning => "cleaning",
            ConfigSection::Desktop => "desktop",
            ConfigSection::Logging => "logging",
        }
    }
}

/// Path configuration: where sources come from and artifacts go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder for project directories.
    #[serde(default = "default_evidence_root")]
    pub evidence_root: String,

    /// Folder the source recording is downloaded to.
    /// Empty means the user's Downloads directory.
    #[serde(default)]
    pub download_dir: String,

    /// Filename of the source recording inside the download folder.
    #[serde(default = "default_source_filename")]
    pub source_filename: String,

    /// Folder for per-project log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_evidence_root() -> String {
    "evidence".to_string()
}

fn default_source_filename() -> String {
    "video.webm".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            evidence_root: default_evidence_root(),
            download_dir: String::new(),
            source_filename: default_source_filename(),
            logs_folder: default_logs_folder(),
        }
    }
}

impl PathSettings {
    /// Resolve the download directory, falling back to the platform
    /// Downloads folder when unset.
    pub fn resolve_download_dir(&self) -> PathBuf {
        if !self.download_dir.is_empty() {
            return PathBuf::from(&self.download_dir);
        }

        match UserDirs::new() {
            Some(dirs) => dirs
                .download_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.home_dir().join("Downloads")),
            None => PathBuf::from("Downloads"),
        }
    }

    /// Full path of the expected source recording.
    pub fn source_path(&self) -> PathBuf {
        self.resolve_download_dir().join(&self.source_filename)
    }
}

/// External encoder (ffmpeg) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderSettings {
    /// Path or name of the ffmpeg executable.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Video codec for the conversion step.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Constant rate factor for the compression step.
    #[serde(default = "default_compress_crf")]
    pub compress_crf: u32,

    /// Pass `-y` so the encoder overwrites existing outputs.
    /// Re-running a project with this unset makes the encoder fail on the
    /// first existing output instead.
    #[serde(default = "default_true")]
    pub overwrite_outputs: bool,
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_compress_crf() -> u32 {
    23
}

fn default_true() -> bool {
    true
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            video_codec: default_video_codec(),
            compress_crf: default_compress_crf(),
            overwrite_outputs: true,
        }
    }
}

/// Automatic audio-cleaning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningSettings {
    /// Apply a high-pass pre-filter before spectral gating.
    #[serde(default = "default_true")]
    pub highpass_enabled: bool,

    /// High-pass cutoff frequency in Hz.
    #[serde(default = "default_highpass_hz")]
    pub highpass_hz: f64,

    /// Spectral noise reduction amount in dB.
    #[serde(default = "default_reduction_db")]
    pub reduction_db: f64,
}

fn default_highpass_hz() -> f64 {
    80.0
}

fn default_reduction_db() -> f64 {
    12.0
}

impl Default for CleaningSettings {
    fn default() -> Self {
        Self {
            highpass_enabled: true,
            highpass_hz: default_highpass_hz(),
            reduction_db: default_reduction_db(),
        }
    }
}

/// Desktop integration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesktopSettings {
    /// Command used to open a directory in the file browser.
    #[serde(default = "default_open_command")]
    pub open_command: String,

    /// Open the project root in the file browser after a successful run.
    #[serde(default = "default_true")]
    pub open_when_done: bool,
}

fn default_open_command() -> String {
    "xdg-open".to_string()
}

impl Default for DesktopSettings {
    fn default() -> Self {
        Self {
            open_command: default_open_command(),
            open_when_done: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format (filter per-line tool output, show tail on
    /// error).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of external-tool output lines to replay after a failure.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
        }
    }
}
