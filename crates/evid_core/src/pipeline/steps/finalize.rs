//! Finalize step - moves intermediates to their permanent archive names
//! and shows the finished project to the user.

use std::fs;
use std::path::Path;

use crate::desktop;
use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{Context, FinalizeOutput, JobState, StepOutcome};

/// Finalize step renaming the cleaned audio and converted video to their
/// archive names, then opening the project root in the file browser.
pub struct FinalizeStep;

impl FinalizeStep {
    pub fn new() -> Self {
        Self
    }

    fn archive_rename(&self, from: &Path, to: &Path) -> StepResult<()> {
        fs::rename(from, to).map_err(|e| {
            StepError::io_error(
                format!("archiving {} as {}", from.display(), to.display()),
                e,
            )
        })
    }
}

impl Default for FinalizeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for FinalizeStep {
    fn name(&self) -> &str {
        "Finalize"
    }

    fn description(&self) -> &str {
        "Archive intermediates under their permanent names"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let cleaned = ctx.layout.cleaned_audio();
        if !cleaned.exists() {
            return Err(StepError::file_not_found(cleaned.display().to_string()));
        }

        let converted = ctx.layout.converted_video();
        if !converted.exists() {
            return Err(StepError::file_not_found(converted.display().to_string()));
        }

        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let archived_clean = ctx.layout.archived_clean_audio();
        let archived_converted = ctx.layout.archived_converted_video();

        self.archive_rename(&ctx.layout.cleaned_audio(), &archived_clean)?;
        ctx.logger.info(&format!(
            "Cleaned audio archived as {}",
            archived_clean.display()
        ));

        self.archive_rename(&ctx.layout.converted_video(), &archived_converted)?;
        ctx.logger.info(&format!(
            "Converted video archived as {}",
            archived_converted.display()
        ));

        if ctx.settings.desktop.open_when_done {
            if let Err(e) = desktop::open_in_file_browser(
                &ctx.settings.desktop.open_command,
                ctx.layout.root(),
            ) {
                ctx.logger
                    .warn(&format!("Could not open file browser: {}", e));
            }
        }

        state.finalize = Some(FinalizeOutput {
            archived_clean_audio: archived_clean,
            archived_converted_video: archived_converted,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.finalize.is_none() {
            return Err(StepError::invalid_output("Finalize results not recorded"));
        }

        for path in [
            ctx.layout.archived_clean_audio(),
            ctx.layout.archived_converted_video(),
        ] {
            if !path.exists() {
                return Err(StepError::invalid_output(format!(
                    "Archive missing: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}
