/*!
 * Error types for the bunkai application.
 *
 * This module contains custom error types for the different stages of a card
 * export, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a subtitle track
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The subtitle file could not be read at all
    #[error("Can't read subtitles: {path}: {source}")]
    Unreadable {
        /// Path of the subtitle file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The subtitle content is malformed
    #[error("Invalid subtitle content at line {line}: {message}")]
    Parse {
        /// 1-based line number in the input
        line: usize,
        /// What was wrong
        message: String,
    },
}

/// Errors that can occur when cutting media clips with the external extractor
#[derive(Error, Debug)]
pub enum MediaError {
    /// The extractor process could not be started
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        /// Program that was invoked
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The extractor ran but reported a failure
    #[error("{program} command {args:?} failed: {stderr}")]
    Failed {
        /// Program that was invoked
        program: String,
        /// Arguments passed to the program
        args: Vec<String>,
        /// Filtered error output
        stderr: String,
    },

    /// The extractor did not finish in time
    #[error("{program} command timed out after {secs} seconds")]
    Timeout {
        /// Program that was invoked
        program: String,
        /// Configured timeout
        secs: u64,
    },
}

/// Errors that can occur while exporting flash cards
#[derive(Error, Debug)]
pub enum ExportError {
    /// The output file could not be created
    #[error("Can't create output file: {path}: {source}")]
    OutputCreate {
        /// Path of the output file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Extracting media for a cue failed
    #[error("Can't export item #{index}: {text}: {source}")]
    Media {
        /// 1-based index of the cue in the foreign track
        index: usize,
        /// Flattened text of the cue
        text: String,
        /// Underlying extractor error
        #[source]
        source: MediaError,
    },

    /// Writing a record failed
    #[error("Failed to write record: {0}")]
    Write(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error reading subtitles
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from media extraction
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Error from the export
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
