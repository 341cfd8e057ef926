use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !Self::dir_exists(path) {
            fs::create_dir_all(path)
                .with_context(|| format!("Can't create output directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Detect whether a file is a subtitle file by its extension
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> FileType {
        let ext = path
            .as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if ext == "srt" {
            return FileType::Subtitle;
        }

        // Common media extensions supported by ffmpeg
        let media_extensions = [
            "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v",
            "mpg", "mpeg", "ogv", "ts", "mts", "m2ts", "mp3", "m4a",
            "aac", "ogg", "opus", "flac", "wav",
        ];

        if media_extensions.contains(&ext.as_str()) {
            FileType::Media
        } else {
            FileType::Unknown
        }
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Subtitle file (SRT)
    Subtitle,
    /// Audio or video file supported by ffmpeg
    Media,
    /// Unknown file type
    Unknown,
}

/// Where a card export writes its files
///
/// Everything lives next to the foreign subtitles: `dir/name.srt` produces
/// `dir/name.<ext>` and clips under `dir/name.media/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// File stem of the foreign subtitles
    pub base: String,
    /// Delimited text output
    pub output_file: PathBuf,
    /// Directory for audio and image clips
    pub media_dir: PathBuf,
}

impl OutputLayout {
    pub fn for_subtitles<P: AsRef<Path>>(foreign_subtitles: P, extension: &str) -> Self {
        let foreign_subtitles = foreign_subtitles.as_ref();
        let dir = foreign_subtitles.parent().unwrap_or(Path::new(""));
        let base = foreign_subtitles
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = extension.trim_start_matches('.');

        Self {
            output_file: dir.join(format!("{}.{}", base, extension)),
            media_dir: dir.join(format!("{}.media", base)),
            base,
        }
    }

    /// Prefix for clip file names inside the media directory
    pub fn media_prefix(&self) -> PathBuf {
        self.media_dir.join(&self.base)
    }
}
