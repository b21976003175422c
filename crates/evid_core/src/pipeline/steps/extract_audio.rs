//! ExtractAudio step - pulls the audio track out of the converted video.

use crate::encoder::Ffmpeg;
use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{Context, ExtractAudioOutput, JobState, StepOutcome};

/// ExtractAudio step producing the raw WAV from the converted mp4.
pub struct ExtractAudioStep;

impl ExtractAudioStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExtractAudioStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ExtractAudioStep {
    fn name(&self) -> &str {
        "ExtractAudio"
    }

    fn description(&self) -> &str {
        "Extract the highest-quality audio stream to WAV"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let converted = ctx.layout.converted_video();
        if !converted.exists() {
            return Err(StepError::file_not_found(converted.display().to_string()));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let input = ctx.layout.converted_video();
        let output_path = ctx.layout.raw_audio();

        let ffmpeg = Ffmpeg::new(&ctx.settings.encoder);
        let output = ffmpeg.extract_audio(&input, &output_path)?;
        ctx.logger.command(&output.command);

        if !output.success() {
            return Err(StepError::command_failed(
                ffmpeg.program(),
                output.exit_code,
                output.stderr,
            ));
        }

        ctx.logger
            .info(&format!("Audio extracted to {}", output_path.display()));

        state.extract = Some(ExtractAudioOutput {
            raw_audio: output_path,
            exit_code: output.exit_code,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.extract.is_none() {
            return Err(StepError::invalid_output(
                "ExtractAudio results not recorded",
            ));
        }

        let raw_audio = ctx.layout.raw_audio();
        if !raw_audio.exists() {
            return Err(StepError::invalid_output(format!(
                "Raw audio not created: {}",
                raw_audio.display()
            )));
        }
        Ok(())
    }
}
