//! Pipeline step implementations.
//!
//! Each step handles one phase of the evidence pipeline.

mod archive;
mod clean_audio;
mod compress;
mod convert;
mod extract_audio;
mod finalize;
mod prepare;
mod remux;

pub use archive::ArchiveStep;
pub use clean_audio::CleanAudioStep;
pub use compress::CompressStep;
pub use convert::ConvertStep;
pub use extract_audio::ExtractAudioStep;
pub use finalize::FinalizeStep;
pub use prepare::PrepareStep;
pub use remux::RemuxStep;
