use std::fmt;
use std::fs;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use log::{warn, debug};
use crate::errors::SubtitleError;

// @module: Subtitle cues, tracks and SRT reading

// @const: SRT timestamp regex (comma or dot before the milliseconds)
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{1,2}:\d{2}:\d{2}[,.]\d{3})").unwrap()
});

// @struct: Single subtitle display unit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cue {
    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms, <= start_ms means the end is undefined
    pub end_ms: u64,

    // @field: Text lines in display order, may be empty
    pub lines: Vec<String>,
}

impl Cue {
    /// Creates a new cue from anything that yields lines
    pub fn new<I, S>(start_ms: u64, end_ms: u64, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Cue {
            start_ms,
            end_ms,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the cue has a meaningful end time
    pub fn has_end(&self) -> bool {
        self.end_ms > self.start_ms
    }

    /// Single-line rendering of the cue, safe for one output field
    pub fn flatten(&self) -> String {
        self.lines
            .join(" ")
            .replace(['\t', '\n'], " ")
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm or HH:MM:SS.mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Option<u64> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();
        if parts.len() != 4 {
            return None;
        }

        let hours: u64 = parts[0].parse().ok()?;
        let minutes: u64 = parts[1].parse().ok()?;
        let seconds: u64 = parts[2].parse().ok()?;
        let millis: u64 = parts[3].parse().ok()?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return None;
        }

        Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds as HH:MM:SS,mmm
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} --> {} {}",
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms),
            self.flatten()
        )
    }
}

/// One subtitle file worth of cues, sorted by start time
///
/// The sort order is established once here; the aligner's early exit
/// depends on it and does not check it again.
#[derive(Debug, Clone, Default)]
pub struct Track {
    /// Identifying label, usually the subtitle file stem
    pub name: String,

    cues: Vec<Cue>,
}

impl Track {
    /// Create a track, sorting the cues by start time if needed
    pub fn new(name: impl Into<String>, mut cues: Vec<Cue>) -> Self {
        let name = name.into();
        if !cues.is_sorted_by_key(|cue| cue.start_ms) {
            warn!("Cues in track '{}' are out of order, sorting by start time", name);
            cues.sort_by_key(|cue| cue.start_ms);
        }
        Track { name, cues }
    }

    /// Read an SRT file into a track named after the file stem
    pub fn from_srt_file<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SubtitleError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let cues = SubtitleProcessor::parse_srt_string(&content)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();

        debug!("Read {} cues from {:?}", cues.len(), path);
        Ok(Self::new(name, cues))
    }

    /// Cues in start-time order
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Collapse redundant cue fragments, keeping the track name
    pub fn normalize(self) -> Self {
        Track {
            name: self.name,
            cues: crate::normalizer::normalize(self.cues),
        }
    }

    /// Lines of this track that overlap the given cue
    pub fn align(&self, foreign: &Cue) -> Cue {
        crate::aligner::align(foreign, &self.cues)
    }
}

/// SRT reader
pub struct SubtitleProcessor;

impl SubtitleProcessor {
    /// Parse SRT content into cues in file order
    ///
    /// Cues without any text are kept: some sources emit them as timing
    /// placeholders and the normalizer merges them with what follows.
    pub fn parse_srt_string(content: &str) -> Result<Vec<Cue>, SubtitleError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut cues = Vec::new();
        let mut current: Option<Cue> = None;
        let mut expect_timing = false;

        let mut lines = content.lines().enumerate().peekable();

        while let Some((index, raw_line)) = lines.next() {
            let line_number = index + 1;
            let line = raw_line.trim_end();

            if line.trim().is_empty() {
                if let Some(cue) = current.take() {
                    cues.push(cue);
                }
                expect_timing = false;
                continue;
            }

            if let Some(cue) = current.as_mut() {
                // A sequence number or timing line here means the blank separator is missing
                let next_is_timing = lines
                    .peek()
                    .is_some_and(|(_, next)| TIMESTAMP_REGEX.is_match(next.trim()));
                let starts_cue = TIMESTAMP_REGEX.is_match(line.trim())
                    || (next_is_timing && line.trim().parse::<usize>().is_ok());

                if !starts_cue {
                    cue.lines.push(line.to_string());
                    continue;
                }

                warn!("Missing blank line before line {}, starting a new cue", line_number);
                if let Some(cue) = current.take() {
                    cues.push(cue);
                }
            }

            if let Some(caps) = TIMESTAMP_REGEX.captures(line.trim()) {
                let start_ms = Cue::parse_timestamp(&caps[1]);
                let end_ms = Cue::parse_timestamp(&caps[2]);
                match (start_ms, end_ms) {
                    (Some(start_ms), Some(end_ms)) => {
                        current = Some(Cue::new(start_ms, end_ms, Vec::<String>::new()));
                        expect_timing = false;
                        continue;
                    }
                    _ => {
                        return Err(SubtitleError::Parse {
                            line: line_number,
                            message: format!("invalid timestamp '{}'", line.trim()),
                        });
                    }
                }
            }

            if !expect_timing && line.trim().parse::<usize>().is_ok() {
                expect_timing = true;
                continue;
            }

            if expect_timing {
                return Err(SubtitleError::Parse {
                    line: line_number,
                    message: format!("expected a timing line, found '{}'", line.trim()),
                });
            }

            warn!("Unexpected text at line {} outside of a cue: {}", line_number, line.trim());
        }

        if let Some(cue) = current.take() {
            cues.push(cue);
        }

        Ok(cues)
    }
}
