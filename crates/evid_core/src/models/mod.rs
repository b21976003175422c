//! Data models for the evidence pipeline.
//!
//! - Project layout (all artifact paths derived from the project name)
//! - Clean mode selection
//! - Project lock guarding against concurrent runs

mod project;

pub use project::{CleanMode, ProjectLayout, ProjectLock, CLEANED_AUDIO_FILENAME};
