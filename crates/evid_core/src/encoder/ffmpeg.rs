//! Low-level ffmpeg command wrapper.
//!
//! Provides a safe interface to the ffmpeg tool for the four pipeline
//! invocations: container conversion, audio extraction, remuxing, and
//! compression. Every invocation captures exit code, stdout, and stderr
//! into a [`ToolOutput`] so the calling step decides what is fatal.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::config::EncoderSettings;

/// Errors from launching the encoder process.
///
/// A non-zero exit is NOT an error at this layer - it is reported through
/// [`ToolOutput::exit_code`] and left to the caller.
#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for encoder operations.
pub type EncoderResult<T> = Result<T, EncoderError>;

/// Captured result of one external encoder invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// The full command line that was run.
    pub command: String,
    /// Process exit code (-1 when terminated by a signal).
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error (ffmpeg writes its diagnostics here).
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the process exited successfully.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// ffmpeg invocation wrapper configured from [`EncoderSettings`].
pub struct Ffmpeg {
    program: String,
    video_codec: String,
    compress_crf: u32,
    overwrite: bool,
}

impl Ffmpeg {
    /// Create a wrapper from the encoder settings.
    pub fn new(settings: &EncoderSettings) -> Self {
        Self {
            program: settings.ffmpeg_path.clone(),
            video_codec: settings.video_codec.clone(),
            compress_crf: settings.compress_crf,
            overwrite: settings.overwrite_outputs,
        }
    }

    /// The configured ffmpeg executable.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Convert the archived source container to mp4 with the configured
    /// video codec.
    pub fn convert(&self, input: &Path, output: &Path) -> EncoderResult<ToolOutput> {
        self.run(self.convert_args(input, output))
    }

    /// Extract the highest-quality audio stream to a WAV file.
    pub fn extract_audio(&self, input: &Path, output: &Path) -> EncoderResult<ToolOutput> {
        self.run(self.extract_audio_args(input, output))
    }

    /// Remux the converted video stream with the cleaned audio stream,
    /// stopping at the shorter of the two.
    pub fn remux(&self, video: &Path, audio: &Path, output: &Path) -> EncoderResult<ToolOutput> {
        self.run(self.remux_args(video, audio, output))
    }

    /// Recode the final video with the configured constant rate factor.
    pub fn compress(&self, input: &Path, output: &Path) -> EncoderResult<ToolOutput> {
        self.run(self.compress_args(input, output))
    }

    /// Human-readable command line for logging and state records.
    pub fn render_command(&self, args: &[OsString]) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    pub(crate) fn convert_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args = self.base_args();
        args.push("-i".into());
        args.push(input.into());
        args.push("-c:v".into());
        args.push(self.video_codec.clone().into());
        args.push(output.into());
        args
    }

    pub(crate) fn extract_audio_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args = self.base_args();
        args.push("-i".into());
        args.push(input.into());
        args.push("-q:a".into());
        args.push("0".into());
        args.push("-map".into());
        args.push("a".into());
        args.push(output.into());
        args
    }

    pub(crate) fn remux_args(&self, video: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
        let mut args = self.base_args();
        args.push("-i".into());
        args.push(video.into());
        args.push("-i".into());
        args.push(audio.into());
        args.push("-c:v".into());
        args.push("copy".into());
        args.push("-map".into());
        args.push("0:v:0".into());
        args.push("-map".into());
        args.push("1:a:0".into());
        args.push("-shortest".into());
        args.push(output.into());
        args
    }

    pub(crate) fn compress_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args = self.base_args();
        args.push("-i".into());
        args.push(input.into());
        args.push("-vcodec".into());
        args.push(self.video_codec.clone().into());
        args.push("-crf".into());
        args.push(self.compress_crf.to_string().into());
        args.push(output.into());
        args
    }

    fn base_args(&self) -> Vec<OsString> {
        if self.overwrite {
            vec!["-y".into()]
        } else {
            Vec::new()
        }
    }

    fn run(&self, args: Vec<OsString>) -> EncoderResult<ToolOutput> {
        let command = self.render_command(&args);
        tracing::debug!("Running: {}", command);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| EncoderError::Launch {
                tool: self.program.clone(),
                source: e,
            })?;

        Ok(ToolOutput {
            command,
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncoderSettings;

    fn ffmpeg() -> Ffmpeg {
        Ffmpeg::new(&EncoderSettings::default())
    }

    fn as_strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn convert_uses_configured_codec() {
        let args = as_strings(&ffmpeg().convert_args(
            Path::new("in.webm"),
            Path::new("out.mp4"),
        ));
        assert_eq!(
            args,
            vec!["-y", "-i", "in.webm", "-c:v", "libx264", "out.mp4"]
        );
    }

    #[test]
    fn extract_maps_highest_quality_audio() {
        let args = as_strings(&ffmpeg().extract_audio_args(
            Path::new("in.mp4"),
            Path::new("out.wav"),
        ));
        assert_eq!(
            args,
            vec!["-y", "-i", "in.mp4", "-q:a", "0", "-map", "a", "out.wav"]
        );
    }

    #[test]
    fn remux_copies_video_and_stops_at_shortest() {
        let args = as_strings(&ffmpeg().remux_args(
            Path::new("v.mp4"),
            Path::new("a.wav"),
            Path::new("out.mp4"),
        ));
        assert_eq!(
            args,
            vec![
                "-y", "-i", "v.mp4", "-i", "a.wav", "-c:v", "copy", "-map", "0:v:0", "-map",
                "1:a:0", "-shortest", "out.mp4"
            ]
        );
    }

    #[test]
    fn compress_uses_configured_crf() {
        let mut settings = EncoderSettings::default();
        settings.compress_crf = 28;
        let args = as_strings(&Ffmpeg::new(&settings).compress_args(
            Path::new("in.mp4"),
            Path::new("out.mp4"),
        ));
        assert_eq!(
            args,
            vec!["-y", "-i", "in.mp4", "-vcodec", "libx264", "-crf", "28", "out.mp4"]
        );
    }

    #[test]
    fn overwrite_disabled_drops_flag() {
        let mut settings = EncoderSettings::default();
        settings.overwrite_outputs = false;
        let args = as_strings(&Ffmpeg::new(&settings).convert_args(
            Path::new("in.webm"),
            Path::new("out.mp4"),
        ));
        assert!(!args.contains(&"-y".to_string()));
    }

    #[test]
    fn launch_failure_is_reported() {
        let mut settings = EncoderSettings::default();
        settings.ffmpeg_path = "/nonexistent/ffmpeg-binary".to_string();
        let result = Ffmpeg::new(&settings).convert(Path::new("a"), Path::new("b"));
        assert!(matches!(result, Err(EncoderError::Launch { .. })));
    }
}
