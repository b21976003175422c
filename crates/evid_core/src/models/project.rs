//! Project layout and run locking.
//!
//! A project is one invocation's unit of work. Every artifact path is
//! derived deterministically from the evidence root and the project name
//! with fixed suffixes, so all stages agree on locations without passing
//! paths around.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Filename the manually (or automatically) cleaned audio must use before
/// it is archived under its permanent name.
pub const CLEANED_AUDIO_FILENAME: &str = "cleaned_audio.wav";

/// How the cleaned audio track is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanMode {
    /// Human-in-the-loop: the pipeline suspends while the user cleans the
    /// extracted audio with an external tool.
    Manual,
    /// In-process noise reduction over the extracted audio.
    Automatic,
}

impl CleanMode {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            CleanMode::Manual => "manual",
            CleanMode::Automatic => "automatic",
        }
    }
}

/// All on-disk paths for one project.
///
/// Layout, relative to the evidence root:
///
/// ```text
/// <root>/<name>/
///     <name>_compressed.mp4        compressed final video
///     res/
///         <name>_input.webm        archived original download
///         <name>_input_converted.mp4   converted video (working name)
///         <name>_input.mp4         archived converted video (after finalize)
///         <name>_output.mp4        remuxed final video
///     audio/
///         <name>_input.wav         raw extracted audio
///         cleaned_audio.wav        cleaned audio (working name)
///         <name>_clean.wav         archived cleaned audio (after finalize)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    name: String,
    root: PathBuf,
    res_dir: PathBuf,
    audio_dir: PathBuf,
}

impl ProjectLayout {
    /// Derive the layout for `name` under `evidence_root`.
    pub fn new(evidence_root: impl AsRef<Path>, name: impl Into<String>) -> Self {
        let name = name.into();
        let root = evidence_root.as_ref().join(&name);
        let res_dir = root.join("res");
        let audio_dir = root.join("audio");
        Self {
            name,
            root,
            res_dir,
            audio_dir,
        }
    }

    /// Project name as supplied by the user.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resource directory (video artifacts).
    pub fn res_dir(&self) -> &Path {
        &self.res_dir
    }

    /// Audio directory (audio intermediates and archives).
    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// The three directories that make up the project tree, creation order.
    pub fn directories(&self) -> [&Path; 3] {
        [&self.root, &self.res_dir, &self.audio_dir]
    }

    /// Archived original download (`res/<name>_input.webm`).
    pub fn archived_source(&self) -> PathBuf {
        self.res_dir.join(format!("{}_input.webm", self.name))
    }

    /// Converted video under its working name
    /// (`res/<name>_input_converted.mp4`).
    pub fn converted_video(&self) -> PathBuf {
        self.res_dir
            .join(format!("{}_input_converted.mp4", self.name))
    }

    /// Archived converted video (`res/<name>_input.mp4`), produced by the
    /// finalize rename.
    pub fn archived_converted_video(&self) -> PathBuf {
        self.res_dir.join(format!("{}_input.mp4", self.name))
    }

    /// Raw extracted audio (`audio/<name>_input.wav`).
    pub fn raw_audio(&self) -> PathBuf {
        self.audio_dir.join(format!("{}_input.wav", self.name))
    }

    /// Cleaned audio under its fixed working name
    /// (`audio/cleaned_audio.wav`). Manual cleanup must save to exactly
    /// this path.
    pub fn cleaned_audio(&self) -> PathBuf {
        self.audio_dir.join(CLEANED_AUDIO_FILENAME)
    }

    /// Archived cleaned audio (`audio/<name>_clean.wav`), produced by the
    /// finalize rename.
    pub fn archived_clean_audio(&self) -> PathBuf {
        self.audio_dir.join(format!("{}_clean.wav", self.name))
    }

    /// Remuxed final video (`res/<name>_output.mp4`).
    pub fn final_video(&self) -> PathBuf {
        self.res_dir.join(format!("{}_output.mp4", self.name))
    }

    /// Compressed final video (`<root>/<name>_compressed.mp4`).
    pub fn compressed_video(&self) -> PathBuf {
        self.root.join(format!("{}_compressed.mp4", self.name))
    }

    /// Lock file guarding this project against concurrent runs.
    pub fn lock_file(&self) -> PathBuf {
        self.root.join(".evid.lock")
    }
}

/// Exclusive lock on a project directory.
///
/// Created with `O_CREAT | O_EXCL` semantics so a second run against the
/// same project name is rejected instead of silently corrupting the
/// other run's intermediates. The lock file is removed on drop.
#[derive(Debug)]
pub struct ProjectLock {
    path: PathBuf,
}

impl ProjectLock {
    /// Acquire the lock for `layout`, creating the project root if needed.
    ///
    /// Fails with `AlreadyExists` when another run holds the lock.
    pub fn acquire(layout: &ProjectLayout) -> io::Result<Self> {
        fs::create_dir_all(layout.root())?;
        let path = layout.lock_file();
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        Ok(Self { path })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
