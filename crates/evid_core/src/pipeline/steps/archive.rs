//! Archive step - moves the source recording into the project tree.
//!
//! This is the single guarded entry condition of the run: a missing
//! source recording fails cleanly before any encoder process is spawned.
//! All later stages reference the archived copy, never the download
//! location.

use std::fs;
use std::io;
use std::path::Path;

use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{ArchiveOutput, Context, JobState, StepOutcome};

/// Archive step moving the download to `res/<name>_input.webm`.
pub struct ArchiveStep;

impl ArchiveStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ArchiveStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ArchiveStep {
    fn name(&self) -> &str {
        "Archive"
    }

    fn description(&self) -> &str {
        "Move the source recording into the project archive"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if !ctx.source_path.exists() {
            return Err(StepError::file_not_found(
                ctx.source_path.display().to_string(),
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let destination = ctx.layout.archived_source();

        move_file(&ctx.source_path, &destination)
            .map_err(|e| StepError::io_error("archiving source recording", e))?;

        ctx.logger.info(&format!(
            "Original moved to {}",
            destination.display()
        ));

        state.archive = Some(ArchiveOutput {
            archived_source: destination,
        });

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let archive = state
            .archive
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Archive results not recorded"))?;

        if !archive.archived_source.exists() {
            return Err(StepError::invalid_output(format!(
                "Archived source missing: {}",
                archive.archived_source.display()
            )));
        }
        Ok(())
    }
}

/// Move a file, falling back to copy+remove when rename crosses
/// filesystems (the download folder usually lives on another mount than
/// the evidence tree).
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
