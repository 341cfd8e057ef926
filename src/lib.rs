/*!
 * # bunkai - decompose media into flash cards
 *
 * A Rust library for turning subtitles, and optionally the media they belong
 * to, into flash cards for spaced-repetition software such as Anki.
 *
 * ## Features
 *
 * - Read SRT subtitle tracks
 * - Collapse progressively revealed, overlapping caption fragments
 * - Align a translation track to the foreign track by time overlap
 * - Cut an audio clip and a still frame per card with ffmpeg
 * - Write Anki-importable tab-separated (or other delimited) output
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `subtitle_processor`: Cues, tracks and SRT reading
 * - `normalizer`: Collapsing redundant cue fragments
 * - `aligner`: Cross-track alignment by time overlap
 * - `export`: Card records and delimited serialization
 * - `media`: Media clip extraction (ffmpeg)
 * - `app_controller`: Main application controller
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations and output layout
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod normalizer;
pub mod aligner;
pub mod export;
pub mod media;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use subtitle_processor::{Cue, Track};
pub use normalizer::{normalize, remove_overlap};
pub use aligner::align;
pub use export::{CardExporter, ExportRecord, RecordWriter};
pub use media::{FfmpegExtractor, MediaExtractor, MediaSource, TimeWindow};
pub use errors::{AppError, ExportError, MediaError, SubtitleError};
