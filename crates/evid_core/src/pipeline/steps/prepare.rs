//! Prepare step - creates the project directory tree.
//!
//! Runs first, before the source recording is checked, so a failed run
//! still leaves the empty project tree behind.

use std::fs;

use crate::pipeline::errors::{StepError, StepResult};
use crate::pipeline::step::PipelineStep;
use crate::pipeline::types::{Context, JobState, StepOutcome};

/// Prepare step creating root, `res/`, and `audio/` idempotently.
pub struct PrepareStep;

impl PrepareStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PrepareStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PrepareStep {
    fn name(&self) -> &str {
        "Prepare"
    }

    fn description(&self) -> &str {
        "Create the project directory tree"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, _state: &mut JobState) -> StepResult<StepOutcome> {
        for dir in ctx.layout.directories() {
            fs::create_dir_all(dir)
                .map_err(|e| StepError::io_error(format!("creating {}", dir.display()), e))?;
        }

        ctx.logger
            .info(&format!("Project tree ready at {}", ctx.layout.root().display()));

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, _state: &JobState) -> StepResult<()> {
        for dir in ctx.layout.directories() {
            if !dir.is_dir() {
                return Err(StepError::invalid_output(format!(
                    "Directory not created: {}",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::logging::{JobLogger, LogConfig};
    use crate::models::ProjectLayout;
    use crate::pipeline::types::JobState;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn creates_tree_idempotently() {
        let dir = tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path().join("evidence"), "case");
        let logger = Arc::new(
            JobLogger::new("case", dir.path().join("logs"), LogConfig::default(), None).unwrap(),
        );
        let ctx = Context::new(
            layout.clone(),
            Settings::default(),
            dir.path().join("video.webm"),
            logger,
        );
        let mut state = JobState::new("case");

        let step = PrepareStep::new();
        step.execute(&ctx, &mut state).unwrap();
        assert!(layout.res_dir().is_dir());
        assert!(layout.audio_dir().is_dir());

        // Running again must not fail
        step.execute(&ctx, &mut state).unwrap();
        step.validate_output(&ctx, &state).unwrap();
    }
}
