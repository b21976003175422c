//! Core types for the pipeline orchestrator.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::logging::JobLogger;
use crate::models::{CleanMode, ProjectLayout};

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Details handed to the manual-clean confirmation callback.
///
/// The callback is the suspend-for-external-signal point of the run: it
/// returns once the user claims the cleaned file is in place. The step
/// verifies the claim afterwards.
#[derive(Debug, Clone)]
pub struct ManualCleanPrompt {
    /// Absolute (or run-relative) path of the raw extracted audio.
    pub raw_audio: PathBuf,
    /// Path the cleaned file must be saved to.
    pub expected_output: PathBuf,
}

/// Confirmation callback for manual audio cleaning.
pub type ConfirmCallback = Box<dyn Fn(&ManualCleanPrompt) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Contains the project layout and shared resources that steps can read
/// but not modify. Mutable state goes in `JobState`.
pub struct Context {
    /// Project layout (all derived artifact paths).
    pub layout: ProjectLayout,
    /// Application settings.
    pub settings: Settings,
    /// Project name/identifier.
    pub job_name: String,
    /// Resolved path of the source recording to archive.
    pub source_path: PathBuf,
    /// Per-project logger.
    pub logger: Arc<JobLogger>,
    /// Confirmation callback for manual cleaning.
    confirm_callback: Option<ConfirmCallback>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a run.
    pub fn new(
        layout: ProjectLayout,
        settings: Settings,
        source_path: PathBuf,
        logger: Arc<JobLogger>,
    ) -> Self {
        let job_name = layout.name().to_string();
        Self {
            layout,
            settings,
            job_name,
            source_path,
            logger,
            confirm_callback: None,
            progress_callback: None,
        }
    }

    /// Set the manual-clean confirmation callback.
    pub fn with_confirm_callback(mut self, callback: ConfirmCallback) -> Self {
        self.confirm_callback = Some(callback);
        self
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Invoke the confirmation callback (if set).
    ///
    /// Returns false when no callback is configured.
    pub fn confirm_manual_clean(&self, prompt: &ManualCleanPrompt) -> bool {
        match self.confirm_callback {
            Some(ref callback) => {
                callback(prompt);
                true
            }
            None => false,
        }
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }
}

/// Mutable run state that accumulates results from pipeline steps.
///
/// This is the "write-once manifest" - steps add new data but do not
/// overwrite existing values. Each step's output is stored in its own
/// section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobState {
    /// Project name.
    pub job_id: String,
    /// When the run started.
    pub started_at: Option<String>,
    /// Archive results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<ArchiveOutput>,
    /// Conversion results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert: Option<ConvertOutput>,
    /// Audio extraction results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractAudioOutput>,
    /// Audio cleaning results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<CleanOutput>,
    /// Remux results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remux: Option<RemuxOutput>,
    /// Compression results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compress: Option<CompressOutput>,
    /// Finalize results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalize: Option<FinalizeOutput>,
}

impl JobState {
    /// Create a new run state for the given project.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Check if the source was archived.
    pub fn has_archive(&self) -> bool {
        self.archive.is_some()
    }

    /// Check if the cleaned audio was produced.
    pub fn has_clean(&self) -> bool {
        self.clean.is_some()
    }

    /// Check if the remux completed.
    pub fn has_remux(&self) -> bool {
        self.remux.is_some()
    }
}

/// Output from the Archive step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveOutput {
    /// Where the original download now lives.
    pub archived_source: PathBuf,
}

/// Output from the Convert step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOutput {
    /// Converted video under its working name.
    pub converted_video: PathBuf,
    /// Encoder exit code.
    pub exit_code: i32,
}

/// Output from the ExtractAudio step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractAudioOutput {
    /// Raw extracted audio.
    pub raw_audio: PathBuf,
    /// Encoder exit code.
    pub exit_code: i32,
}

/// Output from the CleanAudio step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanOutput {
    /// Cleaned audio under its working name.
    pub cleaned_audio: PathBuf,
    /// How the audio was cleaned.
    pub mode: CleanMode,
}

/// Output from the Remux step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemuxOutput {
    /// Remuxed final video.
    pub final_video: PathBuf,
    /// Encoder exit code.
    pub exit_code: i32,
    /// Encoder command that was run.
    pub command: String,
}

/// Output from the Compress step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressOutput {
    /// Compressed final video.
    pub compressed_video: PathBuf,
    /// Encoder exit code.
    pub exit_code: i32,
}

/// Output from the Finalize step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeOutput {
    /// Archived cleaned audio.
    pub archived_clean_audio: PathBuf,
    /// Archived converted video.
    pub archived_converted_video: PathBuf,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (preconditions not met, but not an error).
    Skipped(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_state_tracks_completion() {
        let mut state = JobState::new("incident_42");
        assert!(!state.has_archive());
        assert!(!state.has_remux());

        state.archive = Some(ArchiveOutput {
            archived_source: PathBuf::from("evidence/incident_42/res/incident_42_input.webm"),
        });
        state.remux = Some(RemuxOutput {
            final_video: PathBuf::from("evidence/incident_42/res/incident_42_output.mp4"),
            exit_code: 0,
            command: "ffmpeg ...".to_string(),
        });

        assert!(state.has_archive());
        assert!(state.has_remux());
    }

    #[test]
    fn job_state_serializes() {
        let state = JobState::new("incident_42");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"job_id\":\"incident_42\""));
        // Unset sections are omitted entirely
        assert!(!json.contains("remux"));
    }

    #[test]
    fn confirm_without_callback_reports_false() {
        use crate::config::Settings;
        use crate::logging::{JobLogger, LogConfig};
        use crate::models::ProjectLayout;
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path(), "case");
        let logger = Arc::new(
            JobLogger::new("case", dir.path().join("logs"), LogConfig::default(), None).unwrap(),
        );
        let ctx = Context::new(
            layout,
            Settings::default(),
            dir.path().join("video.webm"),
            logger,
        );

        let prompt = ManualCleanPrompt {
            raw_audio: PathBuf::from("raw.wav"),
            expected_output: PathBuf::from("cleaned_audio.wav"),
        };
        assert!(!ctx.confirm_manual_clean(&prompt));
    }
}
