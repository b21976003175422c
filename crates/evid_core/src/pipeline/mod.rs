//! Pipeline orchestrator for the evidence run.
//!
//! This module provides the infrastructure for running the sequential
//! processing pipeline. Each run consists of a fixed sequence of steps
//! that validate, execute, and record their results.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Prepare       (create project tree)
//!     ├── Step: Archive       (move download into tree)
//!     ├── Step: Convert       (webm → mp4)
//!     ├── Step: ExtractAudio  (mp4 → wav)
//!     ├── Step: CleanAudio    (manual or automatic)
//!     ├── Step: Remux         (video + cleaned audio)
//!     ├── Step: Compress      (rate-factor recode)
//!     └── Step: Finalize      (archive renames)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use evid_core::models::CleanMode;
//! use evid_core::pipeline::{create_standard_pipeline, Context, JobState};
//!
//! let pipeline = create_standard_pipeline(CleanMode::Automatic);
//! let ctx = Context::new(layout, settings, source_path, logger);
//! let mut state = JobState::new("my_project");
//!
//! let result = pipeline.run(&ctx, &mut state)?;
//! println!("Completed: {:?}", result.steps_completed);
//! ```

mod errors;
mod runner;
mod step;
pub mod steps;
mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use runner::{Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{
    ArchiveStep, CleanAudioStep, CompressStep, ConvertStep, ExtractAudioStep, FinalizeStep,
    PrepareStep, RemuxStep,
};
pub use types::{
    ArchiveOutput, CleanOutput, CompressOutput, ConfirmCallback, Context, ConvertOutput,
    ExtractAudioOutput, FinalizeOutput, JobState, ManualCleanPrompt, ProgressCallback,
    RemuxOutput, StepOutcome,
};

use crate::models::CleanMode;

/// Create the standard pipeline with all steps in the correct order.
///
/// The standard pipeline executes these steps:
/// 1. Prepare - create the project directory tree
/// 2. Archive - move the source recording into the tree
/// 3. Convert - convert the archived container to mp4
/// 4. ExtractAudio - extract the audio stream to WAV
/// 5. CleanAudio - produce the cleaned audio (per `mode`)
/// 6. Remux - combine converted video with cleaned audio
/// 7. Compress - recode the final video at the configured rate factor
/// 8. Finalize - rename intermediates to their archive names
pub fn create_standard_pipeline(mode: CleanMode) -> Pipeline {
    Pipeline::new()
        .with_step(PrepareStep::new())
        .with_step(ArchiveStep::new())
        .with_step(ConvertStep::new())
        .with_step(ExtractAudioStep::new())
        .with_step(CleanAudioStep::new(mode))
        .with_step(RemuxStep::new())
        .with_step(CompressStep::new())
        .with_step(FinalizeStep::new())
}

#[cfg(all(test, unix))]
mod end_to_end_tests {
    use super::*;
    use crate::audio::{write_wav, WavBuffer};
    use crate::config::Settings;
    use crate::logging::{JobLogger, LogConfig};
    use crate::models::{CleanMode, ProjectLayout};
    use hound::{SampleFormat, WavSpec};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::{tempdir, TempDir};

    /// ffmpeg stand-in: copies the first `-i` input to the last argument.
    const STUB_OK: &str = r#"#!/bin/sh
in=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-i" ] && [ -z "$in" ]; then
    in="$a"
  fi
  prev="$a"
done
for a in "$@"; do
  out="$a"
done
cp "$in" "$out"
"#;

    /// Same stand-in, but the remux invocation (recognized by
    /// `-shortest`) fails with a diagnostic on stderr.
    const STUB_FAIL_REMUX: &str = r#"#!/bin/sh
for a in "$@"; do
  if [ "$a" = "-shortest" ]; then
    echo "Stream map '1:a:0' matched no streams." >&2
    exit 1
  fi
done
in=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-i" ] && [ -z "$in" ]; then
    in="$a"
  fi
  prev="$a"
done
for a in "$@"; do
  out="$a"
done
cp "$in" "$out"
"#;

    fn write_stub(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("ffmpeg-stub");
        fs::write(&path, script).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    /// The "download": a real WAV so the cleaning stage can decode the
    /// artifact after the stub copies it down the chain.
    fn write_source_recording(path: &Path) {
        let buffer = WavBuffer {
            samples: (0..44100).map(|i| (i as f32 * 0.05).sin() * 0.3).collect(),
            spec: WavSpec {
                channels: 1,
                sample_rate: 44100,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
        };
        write_wav(path, &buffer).unwrap();
    }

    fn test_context(dir: &TempDir, stub: &Path, source_present: bool) -> Context {
        let layout = ProjectLayout::new(dir.path().join("evidence"), "case");

        let source = dir.path().join("downloads").join("video.webm");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        if source_present {
            write_source_recording(&source);
        }

        let mut settings = Settings::default();
        settings.encoder.ffmpeg_path = stub.display().to_string();
        settings.desktop.open_command = "/nonexistent/opener".to_string();
        settings.desktop.open_when_done = false;

        let logger = Arc::new(
            JobLogger::new("case", dir.path().join("logs"), LogConfig::default(), None).unwrap(),
        );

        Context::new(layout, settings, source, logger)
    }

    #[test]
    fn automatic_run_produces_all_artifacts() {
        let dir = tempdir().unwrap();
        let stub = write_stub(dir.path(), STUB_OK);
        let ctx = test_context(&dir, &stub, true);
        let mut state = JobState::new("case");

        let pipeline = create_standard_pipeline(CleanMode::Automatic);
        let result = pipeline.run(&ctx, &mut state).unwrap();

        assert_eq!(result.steps_completed.len(), 8);
        assert!(result.all_completed());

        // The five archived artifacts
        assert!(ctx.layout.archived_source().exists());
        assert!(ctx.layout.archived_converted_video().exists());
        assert!(ctx.layout.archived_clean_audio().exists());
        assert!(ctx.layout.final_video().exists());
        assert!(ctx.layout.compressed_video().exists());
        // Plus the raw extracted audio
        assert!(ctx.layout.raw_audio().exists());

        // Working names were renamed away
        assert!(!ctx.layout.cleaned_audio().exists());
        assert!(!ctx.layout.converted_video().exists());

        // Full manifest recorded
        assert!(state.has_archive());
        assert!(state.has_clean());
        assert!(state.has_remux());
        assert!(state.compress.is_some());
        assert!(state.finalize.is_some());
    }

    #[test]
    fn missing_source_fails_before_any_encoder_call() {
        let dir = tempdir().unwrap();
        // A nonexistent encoder: any spawn attempt would fail loudly with
        // an I/O error instead of the expected FileNotFound.
        let ctx = test_context(&dir, Path::new("/nonexistent/ffmpeg"), false);
        let mut state = JobState::new("case");

        let pipeline = create_standard_pipeline(CleanMode::Automatic);
        let err = pipeline.run(&ctx, &mut state).unwrap_err();

        match err {
            PipelineError::StepFailed {
                step_name, source, ..
            } => {
                assert_eq!(step_name, "Archive");
                assert!(matches!(source, StepError::FileNotFound { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }

        // Directory tree was created before the source check
        assert!(ctx.layout.root().is_dir());
        assert!(ctx.layout.res_dir().is_dir());
        assert!(ctx.layout.audio_dir().is_dir());

        // ...but no artifacts exist
        assert!(!ctx.layout.archived_source().exists());
        assert!(!ctx.layout.converted_video().exists());
        assert!(state.convert.is_none());
        assert!(state.extract.is_none());
    }

    #[test]
    fn manual_confirmation_without_cleaned_file_skips_remux() {
        let dir = tempdir().unwrap();
        let stub = write_stub(dir.path(), STUB_OK);
        let ctx = test_context(&dir, &stub, true).with_confirm_callback(Box::new(|_prompt| {
            // Signal completion without creating cleaned_audio.wav
        }));
        let mut state = JobState::new("case");

        let pipeline = create_standard_pipeline(CleanMode::Manual);
        let err = pipeline.run(&ctx, &mut state).unwrap_err();

        match err {
            PipelineError::StepFailed {
                step_name, source, ..
            } => {
                assert_eq!(step_name, "CleanAudio");
                assert!(matches!(source, StepError::FileNotFound { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }

        assert!(state.remux.is_none());
        assert!(!ctx.layout.final_video().exists());
    }

    #[test]
    fn remux_failure_surfaces_diagnostics_and_aborts() {
        let dir = tempdir().unwrap();
        let stub = write_stub(dir.path(), STUB_FAIL_REMUX);
        let ctx = test_context(&dir, &stub, true);
        let mut state = JobState::new("case");

        let pipeline = create_standard_pipeline(CleanMode::Automatic);
        let err = pipeline.run(&ctx, &mut state).unwrap_err();

        match err {
            PipelineError::StepFailed {
                step_name, source, ..
            } => {
                assert_eq!(step_name, "Remux");
                match source {
                    StepError::CommandFailed {
                        exit_code, message, ..
                    } => {
                        assert_eq!(exit_code, 1);
                        assert!(message.contains("matched no streams"));
                    }
                    other => panic!("unexpected step error: {}", other),
                }
            }
            other => panic!("unexpected error: {}", other),
        }

        // The captured diagnostics reached the logger tail
        let tail = ctx.logger.get_tail();
        assert!(tail.iter().any(|line| line.contains("matched no streams")));

        // Nothing was finalized into the archive
        assert!(state.remux.is_none());
        assert!(state.finalize.is_none());
        assert!(!ctx.layout.final_video().exists());
        assert!(!ctx.layout.archived_clean_audio().exists());
        assert!(ctx.layout.cleaned_audio().exists());
    }

    #[test]
    fn rerun_overwrites_existing_artifacts() {
        // Documented behavior: with overwrite_outputs set the encoder is
        // passed -y, and archive renames silently replace existing files.
        // A re-run against a finished project therefore overwrites rather
        // than errors out.
        let dir = tempdir().unwrap();
        let stub = write_stub(dir.path(), STUB_OK);

        let first = test_context(&dir, &stub, true);
        let mut state = JobState::new("case");
        create_standard_pipeline(CleanMode::Automatic)
            .run(&first, &mut state)
            .unwrap();

        // Second run: fresh download appears, same project name
        let second = test_context(&dir, &stub, true);
        let mut state = JobState::new("case");
        create_standard_pipeline(CleanMode::Automatic)
            .run(&second, &mut state)
            .unwrap();

        assert!(second.layout.final_video().exists());
        assert!(second.layout.compressed_video().exists());
    }

    #[test]
    fn standard_pipeline_has_expected_order() {
        let pipeline = create_standard_pipeline(CleanMode::Automatic);
        assert_eq!(
            pipeline.step_names(),
            vec![
                "Prepare",
                "Archive",
                "Convert",
                "ExtractAudio",
                "CleanAudio",
                "Remux",
                "Compress",
                "Finalize"
            ]
        );
    }
}
