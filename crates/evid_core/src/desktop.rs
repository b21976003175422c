//! Desktop file-browser integration.
//!
//! Opening a directory for the user is always best effort: callers log a
//! warning on failure and continue, since a missing desktop environment
//! must never fail a pipeline run.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Open `path` in the desktop file browser using `open_command`
/// (typically `xdg-open`).
///
/// Blocks until the opener process exits, mirroring its exit status as an
/// `io::Error` on failure.
pub fn open_in_file_browser(open_command: &str, path: &Path) -> io::Result<()> {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    tracing::debug!("Opening file browser: {} {}", open_command, resolved.display());

    let status = Command::new(open_command)
        .arg(&resolved)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;

    if !status.success() {
        return Err(io::Error::other(format!(
            "{} exited with code {:?}",
            open_command,
            status.code()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_opener_is_an_error() {
        let result = open_in_file_browser("/nonexistent/opener", Path::new("."));
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn successful_opener_is_ok() {
        // `true` ignores its arguments and exits 0.
        let result = open_in_file_browser("true", Path::new("."));
        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn failing_opener_surfaces_exit_status() {
        let result = open_in_file_browser("false", Path::new("."));
        assert!(result.is_err());
    }
}
