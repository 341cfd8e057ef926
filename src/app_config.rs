use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Card export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Media extraction settings
    #[serde(default)]
    pub media: MediaConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Card export configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportConfig {
    /// Character placed between output fields
    #[serde(default = "default_field_separator")]
    pub field_separator: String,

    /// Output file extension, derived from the separator when empty
    #[serde(default)]
    pub output_extension: String,

    /// Pre-roll before the cue start when cutting audio, in milliseconds
    #[serde(default = "default_audio_lead_ms")]
    pub audio_lead_ms: u64,
}

impl ExportConfig {
    /// Separator as a single character
    pub fn separator(&self) -> char {
        self.field_separator.chars().next().unwrap_or('\t')
    }

    /// Extension of the output file, without the leading dot
    ///
    /// Tab-separated output is written as `.tsv`, anything else as `.csv`.
    pub fn extension(&self) -> String {
        if !self.output_extension.is_empty() {
            return self.output_extension.trim_start_matches('.').to_string();
        }

        match self.separator() {
            '\t' => "tsv".to_string(),
            _ => "csv".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            field_separator: default_field_separator(),
            output_extension: String::new(),
            audio_lead_ms: default_audio_lead_ms(),
        }
    }
}

/// Media extraction configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaConfig {
    /// ffmpeg executable name or path
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Audio clip format and file extension
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Image file extension
    #[serde(default = "default_image_format")]
    pub image_format: String,

    /// Timeout for a single ffmpeg invocation in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            audio_format: default_audio_format(),
            image_format: default_image_format(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_field_separator() -> String {
    "\t".to_string()
}

fn default_audio_lead_ms() -> u64 {
    100 // catch the onset of speech
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

fn default_image_format() -> String {
    "jpg".to_string()
}

fn default_timeout_secs() -> u64 {
    120 // 2 minutes per clip
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let mut separator = self.export.field_separator.chars();
        match (separator.next(), separator.next()) {
            (Some(c), None) if !matches!(c, '"' | '\n' | '\r') => {}
            _ => {
                return Err(anyhow!(
                    "Field separator must be a single character other than a quote or line break, got {:?}",
                    self.export.field_separator
                ));
            }
        }

        if self.media.ffmpeg_path.trim().is_empty() {
            return Err(anyhow!("ffmpeg path must not be empty"));
        }

        if self.media.audio_format.trim().is_empty() || self.media.image_format.trim().is_empty() {
            return Err(anyhow!("Audio and image formats must not be empty"));
        }

        if self.media.timeout_secs == 0 {
            return Err(anyhow!("Media timeout must be at least one second"));
        }

        Ok(())
    }
}
