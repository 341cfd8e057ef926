/*!
 * Media clip extraction.
 *
 * Cards can carry an audio clip and a still frame for each cue. Both are cut
 * from the source media by an external tool; `FfmpegExtractor` drives ffmpeg,
 * and the `MediaExtractor` trait lets callers substitute something else.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use tokio::process::Command;

use crate::app_config::MediaConfig;
use crate::errors::MediaError;

/// Time range of a clip in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl TimeWindow {
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self { start_ms, end_ms }
    }

    /// End is only meaningful when it lies after the start
    pub fn has_end(&self) -> bool {
        self.end_ms > self.start_ms
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.has_end().then(|| self.end_ms - self.start_ms)
    }

    /// Point to sample a still frame from
    pub fn frame_ms(&self) -> u64 {
        match self.duration_ms() {
            Some(duration) => self.start_ms + duration / 2,
            None => self.start_ms,
        }
    }

    /// The window starting `lead_ms` earlier, clamped at zero
    ///
    /// An undefined end stays undefined.
    pub fn with_lead(&self, lead_ms: u64) -> Self {
        let start_ms = self.start_ms.saturating_sub(lead_ms);
        let end_ms = if self.has_end() { self.end_ms } else { start_ms };
        Self { start_ms, end_ms }
    }

    /// File name fragment identifying this window
    pub fn path_fragment(&self) -> String {
        format!("{}-{}", path_position(self.start_ms), path_position(self.end_ms))
    }
}

/// Format a position as a time code safe for file names on all platforms
pub fn path_position(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}h{:02}m{:02}s{:03}ms", hours, minutes, seconds, millis)
}

/// Format a position in seconds as ffmpeg expects it
pub fn ffmpeg_position(ms: u64) -> String {
    format!("{}.{:03}", ms / 1_000, ms % 1_000)
}

/// Where clips are cut from and where they go
#[derive(Debug, Clone)]
pub struct MediaSource {
    /// Source media file
    pub media_path: PathBuf,
    /// Path prefix for produced files, e.g. `dir/name.media/name`
    pub output_prefix: PathBuf,
}

impl MediaSource {
    pub fn new(media_path: impl Into<PathBuf>, output_prefix: impl Into<PathBuf>) -> Self {
        Self {
            media_path: media_path.into(),
            output_prefix: output_prefix.into(),
        }
    }
}

/// Cuts audio clips and still frames for a time window
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Extract the audio of `window`; an undefined end means until the end of the media
    async fn extract_audio(&self, window: TimeWindow, source: &MediaSource) -> Result<PathBuf, MediaError>;

    /// Extract one frame from within `window`
    async fn extract_image(&self, window: TimeWindow, source: &MediaSource) -> Result<PathBuf, MediaError>;
}

/// Output path for a clip: `<prefix>_<start>-<end>.<ext>`
pub fn output_path(prefix: &Path, window: TimeWindow, extension: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(format!("_{}.{}", window.path_fragment(), extension));
    PathBuf::from(name)
}

/// ffmpeg-backed extractor
pub struct FfmpegExtractor {
    config: MediaConfig,
}

impl FfmpegExtractor {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    /// Arguments for cutting the audio of `window` into `out_file`
    pub fn audio_args(window: TimeWindow, in_file: &Path, out_file: &Path, format: &str) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            ffmpeg_position(window.start_ms),
            "-i".to_string(),
            in_file.to_string_lossy().to_string(),
        ];

        if let Some(duration) = window.duration_ms() {
            args.push("-t".to_string());
            args.push(ffmpeg_position(duration));
        }

        args.extend([
            "-f".to_string(),
            format.to_string(),
            "-vn".to_string(),
            out_file.to_string_lossy().to_string(),
        ]);
        args
    }

    /// Arguments for grabbing a single frame of `window` into `out_file`
    pub fn image_args(window: TimeWindow, in_file: &Path, out_file: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            ffmpeg_position(window.frame_ms()),
            "-i".to_string(),
            in_file.to_string_lossy().to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            out_file.to_string_lossy().to_string(),
        ]
    }

    async fn run(&self, args: Vec<String>) -> Result<(), MediaError> {
        let program = self.config.ffmpeg_path.clone();
        debug!("Running {} {}", program, args.join(" "));

        let mut command = Command::new(&program);
        command.args(&args).kill_on_drop(true);
        let ffmpeg_future = command.output();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|source| MediaError::Spawn { program: program.clone(), source })?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(MediaError::Timeout { program, secs: self.config.timeout_secs });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let filtered = filter_ffmpeg_stderr(&stderr);
            error!("Media extraction failed: {}", filtered);
            return Err(MediaError::Failed { program, args, stderr: filtered });
        }

        Ok(())
    }
}

#[async_trait]
impl MediaExtractor for FfmpegExtractor {
    async fn extract_audio(&self, window: TimeWindow, source: &MediaSource) -> Result<PathBuf, MediaError> {
        let out_file = output_path(&source.output_prefix, window, &self.config.audio_format);
        let args = Self::audio_args(window, &source.media_path, &out_file, &self.config.audio_format);
        self.run(args).await?;
        Ok(out_file)
    }

    async fn extract_image(&self, window: TimeWindow, source: &MediaSource) -> Result<PathBuf, MediaError> {
        let out_file = output_path(&source.output_prefix, window, &self.config.image_format);
        let args = Self::image_args(window, &source.media_path, &out_file);
        self.run(args).await?;
        Ok(out_file)
    }
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
