//! Compress step - recodes the final video at the configured quality
//! factor for the archived compressed copy.

use crate::encoder::Ffmpeg;
use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{CompressOutput, Context, JobState, StepOutcome};

/// Compress step producing `<root>/<name>_compressed.mp4`.
pub struct CompressStep;

impl CompressStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CompressStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for CompressStep {
    fn name(&self) -> &str {
        "Compress"
    }

    fn description(&self) -> &str {
        "Recode the final video at the configured rate factor"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let final_video = ctx.layout.final_video();
        if !final_video.exists() {
            return Err(StepError::file_not_found(final_video.display().to_string()));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let input = ctx.layout.final_video();
        let output_path = ctx.layout.compressed_video();

        let ffmpeg = Ffmpeg::new(&ctx.settings.encoder);
        let output = ffmpeg.compress(&input, &output_path)?;
        ctx.logger.command(&output.command);

        if !output.success() {
            return Err(StepError::command_failed(
                ffmpeg.program(),
                output.exit_code,
                output.stderr,
            ));
        }

        ctx.logger.info(&format!(
            "Compressed video written to {}",
            output_path.display()
        ));

        state.compress = Some(CompressOutput {
            compressed_video: output_path,
            exit_code: output.exit_code,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.compress.is_none() {
            return Err(StepError::invalid_output("Compress results not recorded"));
        }

        let compressed = ctx.layout.compressed_video();
        if !compressed.exists() {
            return Err(StepError::invalid_output(format!(
                "Compressed video not created: {}",
                compressed.display()
            )));
        }
        Ok(())
    }
}
