//! Convert step - container/codec conversion of the archived source.

use crate::encoder::Ffmpeg;
use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{Context, ConvertOutput, JobState, StepOutcome};

/// Convert step producing the working mp4 from the archived webm.
pub struct ConvertStep;

impl ConvertStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConvertStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ConvertStep {
    fn name(&self) -> &str {
        "Convert"
    }

    fn description(&self) -> &str {
        "Convert the archived source to mp4"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let source = ctx.layout.archived_source();
        if !source.exists() {
            return Err(StepError::file_not_found(source.display().to_string()));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let input = ctx.layout.archived_source();
        let output_path = ctx.layout.converted_video();

        let ffmpeg = Ffmpeg::new(&ctx.settings.encoder);
        let output = ffmpeg.convert(&input, &output_path)?;
        ctx.logger.command(&output.command);

        if !output.success() {
            return Err(StepError::command_failed(
                ffmpeg.program(),
                output.exit_code,
                output.stderr,
            ));
        }

        ctx.logger
            .info(&format!("Converted to {}", output_path.display()));

        state.convert = Some(ConvertOutput {
            converted_video: output_path,
            exit_code: output.exit_code,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.convert.is_none() {
            return Err(StepError::invalid_output("Convert results not recorded"));
        }

        let converted = ctx.layout.converted_video();
        if !converted.exists() {
            return Err(StepError::invalid_output(format!(
                "Converted video not created: {}",
                converted.display()
            )));
        }
        Ok(())
    }
}
