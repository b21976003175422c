//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use super::errors::StepResult;
use super::types::{Context, JobState, StepOutcome};

/// Trait for pipeline steps.
///
/// Each step in the pipeline implements this trait. The pipeline runner
/// calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work
/// 3. `validate_output` - Verify the step produced valid output
///
/// # Example
///
/// ```ignore
/// struct ArchiveStep;
///
/// impl PipelineStep for ArchiveStep {
///     fn name(&self) -> &str { "Archive" }
///
///     fn validate_input(&self, ctx: &Context) -> StepResult<()> {
///         if !ctx.source_path.exists() {
///             return Err(StepError::file_not_found(ctx.source_path.display().to_string()));
///         }
///         Ok(())
///     }
///
///     fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
///         // Move the source into the archive...
///         state.archive = Some(ArchiveOutput { ... });
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
///         if !state.has_archive() {
///             return Err(StepError::invalid_output("Archive not recorded"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Validate inputs before execution.
    ///
    /// Called before `execute`. Should check that all required
    /// preconditions are met (files exist, previous steps completed, etc.).
    fn validate_input(&self, ctx: &Context) -> StepResult<()>;

    /// Execute the step's main work.
    ///
    /// Should perform the step's processing and record results in `state`.
    /// Use `ctx.logger` for logging and `ctx.report_progress()` for progress.
    ///
    /// Returns `StepOutcome::Success` on completion, or `StepOutcome::Skipped`
    /// if the step determined it should be skipped (not an error).
    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome>;

    /// Validate outputs after execution.
    ///
    /// Called after `execute` returns `Success`. Should verify that
    /// the step produced valid output (files exist, state populated, etc.).
    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
