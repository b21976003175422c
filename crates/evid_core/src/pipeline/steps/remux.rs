//! Remux step - combines the converted video with the cleaned audio.
//!
//! The remux is the invocation whose diagnostics matter most: a stream
//! mismatch here is the first place a silently bad earlier artifact
//! surfaces. Its output is fed through the logger tail and replayed on
//! failure.

use crate::encoder::Ffmpeg;
use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{Context, JobState, RemuxOutput, StepOutcome};

/// Remux step producing the final video (video copied, audio swapped,
/// duration limited to the shorter stream).
pub struct RemuxStep;

impl RemuxStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RemuxStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for RemuxStep {
    fn name(&self) -> &str {
        "Remux"
    }

    fn description(&self) -> &str {
        "Combine the converted video with the cleaned audio"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let video = ctx.layout.converted_video();
        if !video.exists() {
            return Err(StepError::file_not_found(video.display().to_string()));
        }

        let audio = ctx.layout.cleaned_audio();
        if !audio.exists() {
            return Err(StepError::file_not_found(audio.display().to_string()));
        }

        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let video = ctx.layout.converted_video();
        let audio = ctx.layout.cleaned_audio();
        let output_path = ctx.layout.final_video();

        let ffmpeg = Ffmpeg::new(&ctx.settings.encoder);
        let output = ffmpeg.remux(&video, &audio, &output_path)?;
        ctx.logger.command(&output.command);

        // Feed captured output through the tail buffer so a failure can
        // replay the diagnostics.
        for line in output.stdout.lines() {
            ctx.logger.output_line(line, false);
        }
        for line in output.stderr.lines() {
            ctx.logger.output_line(line, true);
        }

        if !output.success() {
            ctx.logger.error("Failed to combine video and audio:");
            ctx.logger.show_tail("ffmpeg output");
            return Err(StepError::command_failed(
                ffmpeg.program(),
                output.exit_code,
                output.stderr,
            ));
        }

        ctx.logger
            .info(&format!("Final video written to {}", output_path.display()));

        state.remux = Some(RemuxOutput {
            final_video: output_path,
            exit_code: output.exit_code,
            command: output.command,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.remux.is_none() {
            return Err(StepError::invalid_output("Remux results not recorded"));
        }

        let final_video = ctx.layout.final_video();
        if !final_video.exists() {
            return Err(StepError::invalid_output(format!(
                "Final video not created: {}",
                final_video.display()
            )));
        }
        Ok(())
    }
}
