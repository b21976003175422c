//! Configuration management for the evidence pipeline.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use evid_core::config::{ConfigManager, ConfigSection};
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".config/evid.toml");
//! config.load_or_create().unwrap();
//!
//! // Read settings
//! println!("Evidence root: {}", config.settings().paths.evidence_root);
//!
//! // Modify a setting
//! config.settings_mut().encoder.compress_crf = 28;
//!
//! // Save just the encoder section atomically
//! config.update_section(ConfigSection::Encoder).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    CleaningSettings, ConfigSection, DesktopSettings, EncoderSettings, LoggingSettings,
    PathSettings, Settings,
};
