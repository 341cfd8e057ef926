use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::app_config::Config;
use crate::errors::ExportError;
use crate::export::{CardExporter, RecordWriter};
use crate::file_utils::{FileManager, FileType, OutputLayout};
use crate::media::{FfmpegExtractor, MediaExtractor, MediaSource};
use crate::subtitle_processor::Track;

// @module: Application controller for flash card export

/// Inputs of a single card export
#[derive(Debug, Clone)]
pub struct CardsJob {
    /// Subtitles in the language being studied; they drive the timing
    pub foreign_subtitles: PathBuf,
    /// Optional translation aligned by time
    pub native_subtitles: Option<PathBuf>,
    /// Optional media file to cut audio and images from
    pub media_file: Option<PathBuf>,
    /// Replace an existing output file
    pub force_overwrite: bool,
}

impl CardsJob {
    pub fn new(foreign_subtitles: impl Into<PathBuf>) -> Self {
        Self {
            foreign_subtitles: foreign_subtitles.into(),
            native_subtitles: None,
            media_file: None,
            force_overwrite: false,
        }
    }
}

/// Main application controller for card export
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Where the given job writes its output
    pub fn output_layout(&self, job: &CardsJob) -> OutputLayout {
        OutputLayout::for_subtitles(&job.foreign_subtitles, &self.config.export.extension())
    }

    /// Run a card export, cutting media with ffmpeg
    ///
    /// Returns the path of the written file, or `None` when the output
    /// already exists and overwriting was not requested.
    pub async fn run_cards(&self, job: &CardsJob) -> Result<Option<PathBuf>> {
        let extractor = FfmpegExtractor::new(self.config.media.clone());
        self.run_cards_with(job, &extractor).await
    }

    /// Run a card export with the given media extractor
    ///
    /// Any failure, including a single failed clip, aborts the whole export
    /// and leaves no output file behind.
    pub async fn run_cards_with(&self, job: &CardsJob, extractor: &dyn MediaExtractor) -> Result<Option<PathBuf>> {
        let start_time = std::time::Instant::now();
        let layout = self.output_layout(job);

        if FileManager::file_exists(&layout.output_file) && !job.force_overwrite {
            warn!("Skipping, output already exists: {:?} (use -f to force overwrite)", layout.output_file);
            return Ok(None);
        }

        let foreign = Self::load_track(&job.foreign_subtitles)
            .context("Can't read foreign subtitles")?;

        let native = match &job.native_subtitles {
            Some(path) => Some(Self::load_track(path).context("Can't read native subtitles")?),
            None => None,
        };

        let media_source = match &job.media_file {
            Some(media_file) => {
                if !FileManager::file_exists(media_file) {
                    return Err(anyhow!("Media file does not exist: {:?}", media_file));
                }
                if FileManager::detect_file_type(media_file) != FileType::Media {
                    warn!("{:?} does not look like a media file, trying anyway", media_file);
                }
                Some(MediaSource::new(media_file, layout.media_prefix()))
            }
            None => None,
        };

        // Staged next to the destination so nothing partial survives a failure
        let output_dir = match layout.output_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let staged = NamedTempFile::new_in(&output_dir).map_err(|source| ExportError::OutputCreate {
            path: layout.output_file.clone(),
            source,
        })?;

        if media_source.is_some() {
            FileManager::ensure_dir(&layout.media_dir)?;
        }

        let mut exporter = CardExporter::new().with_audio_lead(self.config.export.audio_lead_ms);
        if let Some(source) = &media_source {
            exporter = exporter.with_media(extractor, source);
        }

        info!("Exporting {} cards from {:?}", foreign.len(), job.foreign_subtitles);
        let progress_bar = Self::progress_bar(foreign.len() as u64);
        let mut writer = RecordWriter::with_separator(BufWriter::new(staged.as_file()), self.config.export.separator());

        let result = exporter
            .export(&foreign, native.as_ref(), |record| {
                writer.write_record(&record)?;
                progress_bar.inc(1);
                Ok(())
            })
            .await;

        let count = match result {
            Ok(count) => count,
            Err(e) => {
                progress_bar.abandon();
                return Err(e).context(format!("Export of {:?} failed", job.foreign_subtitles));
            }
        };

        writer.flush().context("Failed to write output")?;
        drop(writer);
        progress_bar.finish_and_clear();

        staged
            .persist(&layout.output_file)
            .map_err(|e| ExportError::OutputCreate {
                path: layout.output_file.clone(),
                source: e.error,
            })?;

        info!(
            "Exported {} cards to {:?} in {}",
            count,
            layout.output_file,
            Self::format_duration(start_time.elapsed())
        );

        Ok(Some(layout.output_file))
    }

    /// Read and normalize one subtitle track
    fn load_track(path: &Path) -> Result<Track> {
        if FileManager::detect_file_type(path) != FileType::Subtitle {
            debug!("{:?} has no .srt extension, parsing as SRT anyway", path);
        }

        let track = Track::from_srt_file(path)?;
        let raw_len = track.len();
        let track = track.normalize();
        debug!("Track '{}': {} cues, {} after normalization", track.name, raw_len, track.len());

        Ok(track)
    }

    fn progress_bar(len: u64) -> ProgressBar {
        let progress_bar = ProgressBar::new(len);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cards ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
