//! evid - interactive evidence video pipeline.
//!
//! Prompts for a project name and clean mode, then runs the full
//! pipeline: archive the downloaded recording, convert it, extract and
//! clean its audio, remux, compress, and archive everything under
//! `evidence/<name>/`.
//!
//! Exit status is 0 on full success and 1 on any reported failure
//! (missing source recording, missing manually-cleaned file, encoder
//! errors, setup problems).

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;

use evid_core::config::ConfigManager;
use evid_core::logging::{init_tracing, JobLogger, LogConfig, LogLevel};
use evid_core::models::{CleanMode, ProjectLayout, ProjectLock};
use evid_core::pipeline::{create_standard_pipeline, Context, JobState, ManualCleanPrompt};

/// Default config file location, relative to the working directory.
const CONFIG_PATH: &str = ".config/evid.toml";

fn main() -> ExitCode {
    init_tracing(LogLevel::Warn);

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let mut config = ConfigManager::new(CONFIG_PATH);
    config.load_or_create().context("loading configuration")?;
    let settings = config.settings().clone();

    let name = prompt_line("What is the name of the final video? ")?;
    if name.is_empty() {
        anyhow::bail!("project name must not be empty");
    }

    let mode = if prompt_yes_no("Clean the audio manually? (y/n): ")? {
        CleanMode::Manual
    } else {
        CleanMode::Automatic
    };

    let layout = ProjectLayout::new(&settings.paths.evidence_root, name.as_str());
    let _lock = ProjectLock::acquire(&layout).with_context(|| {
        format!(
            "another run may be processing '{}' (lock file: {})",
            name,
            layout.lock_file().display()
        )
    })?;

    let logger = Arc::new(
        JobLogger::new(
            name.as_str(),
            &settings.paths.logs_folder,
            LogConfig::from_settings(&settings.logging),
            Some(Box::new(|line| println!("{}", line))),
        )
        .context("creating project logger")?,
    );

    let source_path = settings.paths.source_path();
    let ctx = Context::new(layout, settings, source_path, logger)
        .with_confirm_callback(Box::new(wait_for_manual_clean));

    let pipeline = create_standard_pipeline(mode);
    let mut state = JobState::new(name.as_str());
    pipeline.run(&ctx, &mut state)?;

    println!("Process completed successfully.");
    Ok(())
}

/// Blocking stdin implementation of the manual-clean confirmation.
fn wait_for_manual_clean(prompt: &ManualCleanPrompt) {
    println!("Upload the file to your audio enhancement tool:");
    println!("  {}", prompt.raw_audio.display());
    print!(
        "Press ENTER once the cleaned audio is saved as '{}'...",
        prompt.expected_output.display()
    );
    let _ = io::stdout().flush();

    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

/// Prompt for one trimmed line on stdin.
fn prompt_line(message: &str) -> anyhow::Result<String> {
    print!("{}", message);
    io::stdout().flush().context("flushing prompt")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading input")?;
    Ok(line.trim().to_string())
}

/// Prompt for a yes/no answer; anything but y/yes counts as no.
fn prompt_yes_no(message: &str) -> anyhow::Result<bool> {
    let answer = prompt_line(message)?.to_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes"))
}
