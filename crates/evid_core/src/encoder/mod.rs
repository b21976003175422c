//! External encoder invocation.
//!
//! The media encoder is an opaque external collaborator: this module only
//! builds command lines, runs the tool synchronously, and captures its
//! output. Codec behavior is never inspected.

mod ffmpeg;

pub use ffmpeg::{EncoderError, EncoderResult, Ffmpeg, ToolOutput};
