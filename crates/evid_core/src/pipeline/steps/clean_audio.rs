//! CleanAudio step - produces the cleaned audio track.
//!
//! Two terminal paths chosen once at startup:
//!
//! - Manual: the run suspends on the caller-supplied confirmation
//!   callback while a human cleans the raw audio with an external tool,
//!   then verifies the expected file exists.
//! - Automatic: the raw WAV is read fully into memory, the deterministic
//!   noise-reduction pass is applied, and the result written to the same
//!   expected filename.

use crate::audio::{read_wav, reduce_noise, write_wav, NoiseReduction};
use crate::desktop;
use crate::models::{CleanMode, CLEANED_AUDIO_FILENAME};
use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{CleanOutput, Context, JobState, ManualCleanPrompt, StepOutcome};

/// CleanAudio step, parameterized by the run's clean mode.
pub struct CleanAudioStep {
    mode: CleanMode,
}

impl CleanAudioStep {
    pub fn new(mode: CleanMode) -> Self {
        Self { mode }
    }

    /// The mode this step will clean with.
    pub fn mode(&self) -> CleanMode {
        self.mode
    }

    fn execute_manual(&self, ctx: &Context) -> StepResult<()> {
        let raw_audio = ctx.layout.raw_audio();
        let cleaned = ctx.layout.cleaned_audio();

        ctx.logger.section("Manual audio cleanup");
        ctx.logger.info("Upload the raw audio to your enhancement tool:");
        ctx.logger.info(&format!("  {}", absolute_display(&raw_audio)));
        ctx.logger.info(&format!(
            "Save the result as '{}' in the same folder.",
            CLEANED_AUDIO_FILENAME
        ));

        // Best effort: a headless session still works from the logged path.
        if let Err(e) = desktop::open_in_file_browser(
            &ctx.settings.desktop.open_command,
            ctx.layout.audio_dir(),
        ) {
            ctx.logger
                .warn(&format!("Could not open file browser: {}", e));
        }

        let prompt = ManualCleanPrompt {
            raw_audio,
            expected_output: cleaned.clone(),
        };
        if !ctx.confirm_manual_clean(&prompt) {
            return Err(StepError::precondition_failed(
                "manual cleaning requires a confirmation callback",
            ));
        }

        if !cleaned.exists() {
            return Err(StepError::file_not_found(format!(
                "{} (save the cleaned audio as '{}')",
                cleaned.display(),
                CLEANED_AUDIO_FILENAME
            )));
        }

        Ok(())
    }

    fn execute_automatic(&self, ctx: &Context) -> StepResult<()> {
        let raw_audio = ctx.layout.raw_audio();
        let cleaned = ctx.layout.cleaned_audio();

        ctx.logger.info("Reducing noise automatically...");

        let mut buffer = read_wav(&raw_audio)?;
        ctx.logger.debug(&format!(
            "Loaded {} frames, {} channel(s) at {} Hz",
            buffer.frames(),
            buffer.channels(),
            buffer.sample_rate()
        ));

        let options = NoiseReduction::from(&ctx.settings.cleaning);
        reduce_noise(&mut buffer, &options);

        write_wav(&cleaned, &buffer)?;
        ctx.logger
            .info(&format!("Cleaned audio written to {}", cleaned.display()));

        Ok(())
    }
}

impl PipelineStep for CleanAudioStep {
    fn name(&self) -> &str {
        "CleanAudio"
    }

    fn description(&self) -> &str {
        "Produce the cleaned audio track"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let raw_audio = ctx.layout.raw_audio();
        if !raw_audio.exists() {
            return Err(StepError::file_not_found(raw_audio.display().to_string()));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        match self.mode {
            CleanMode::Manual => self.execute_manual(ctx)?,
            CleanMode::Automatic => self.execute_automatic(ctx)?,
        }

        state.clean = Some(CleanOutput {
            cleaned_audio: ctx.layout.cleaned_audio(),
            mode: self.mode,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.clean.is_none() {
            return Err(StepError::invalid_output("CleanAudio results not recorded"));
        }

        let cleaned = ctx.layout.cleaned_audio();
        if !cleaned.exists() {
            return Err(StepError::invalid_output(format!(
                "Cleaned audio not created: {}",
                cleaned.display()
            )));
        }
        Ok(())
    }
}

/// Prefer the absolute path in user-facing instructions.
fn absolute_display(path: &std::path::Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
