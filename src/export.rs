/*!
 * Flash card export.
 *
 * One record is produced per foreign cue, carrying the cue text, its
 * neighbours, the time-aligned native text and optional media references.
 * `RecordWriter` serializes records as delimited text that Anki can import.
 */

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;

use log::debug;

use crate::errors::ExportError;
use crate::media::{MediaExtractor, MediaSource, TimeWindow};
use crate::subtitle_processor::{Cue, Track};

/// Default pre-roll before the cue start when cutting audio
pub const DEFAULT_AUDIO_LEAD_MS: u64 = 100;

/// One exported flash card
///
/// Text fields hold a single line each. The native neighbour fields are part
/// of the output layout but only the current cue is aligned, so they stay
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRecord {
    pub sound: String,
    pub time: String,
    pub source: String,
    pub image: String,
    pub foreign_curr: String,
    pub native_curr: String,
    pub foreign_prev: String,
    pub native_prev: String,
    pub foreign_next: String,
    pub native_next: String,
}

impl ExportRecord {
    /// Fields in output column order
    pub fn fields(&self) -> [&str; 10] {
        [
            self.sound.as_str(),
            self.time.as_str(),
            self.source.as_str(),
            self.image.as_str(),
            self.foreign_curr.as_str(),
            self.native_curr.as_str(),
            self.foreign_prev.as_str(),
            self.native_prev.as_str(),
            self.foreign_next.as_str(),
            self.native_next.as_str(),
        ]
    }
}

/// Anki markup for an audio file
pub fn sound_tag(path: &Path) -> String {
    format!("[sound:{}]", base_name(path))
}

/// Anki markup for an image file
pub fn image_tag(path: &Path) -> String {
    format!("<img src=\"{}\">", base_name(path))
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Builds flash card records from a foreign track
///
/// Both tracks are expected to be normalized already.
pub struct CardExporter<'a> {
    media: Option<(&'a dyn MediaExtractor, &'a MediaSource)>,
    audio_lead_ms: u64,
}

impl Default for CardExporter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CardExporter<'a> {
    pub fn new() -> Self {
        Self {
            media: None,
            audio_lead_ms: DEFAULT_AUDIO_LEAD_MS,
        }
    }

    /// Cut an audio clip and a still frame for every card
    pub fn with_media(mut self, extractor: &'a dyn MediaExtractor, source: &'a MediaSource) -> Self {
        self.media = Some((extractor, source));
        self
    }

    pub fn with_audio_lead(mut self, audio_lead_ms: u64) -> Self {
        self.audio_lead_ms = audio_lead_ms;
        self
    }

    /// Export every foreign cue in order, handing each record to `write`
    ///
    /// The first failure aborts the export; records already handed out are
    /// not retracted, so callers that need all-or-nothing output must stage
    /// what they write. Returns the number of records written.
    pub async fn export<F>(&self, foreign: &Track, native: Option<&Track>, mut write: F) -> Result<usize, ExportError>
    where
        F: FnMut(ExportRecord) -> io::Result<()>,
    {
        let cues = foreign.cues();

        for (i, cue) in cues.iter().enumerate() {
            let mut record = self.export_cue(i, cue, &foreign.name, native).await?;

            if i > 0 {
                record.foreign_prev = cues[i - 1].flatten();
            }

            if let Some(next) = cues.get(i + 1) {
                record.foreign_next = next.flatten();
            }

            write(record)?;
        }

        debug!("Exported {} cards from '{}'", cues.len(), foreign.name);
        Ok(cues.len())
    }

    /// Export every foreign cue and collect the records
    pub async fn export_records(&self, foreign: &Track, native: Option<&Track>) -> Result<Vec<ExportRecord>, ExportError> {
        let mut records = Vec::with_capacity(foreign.len());
        self.export(foreign, native, |record| {
            records.push(record);
            Ok(())
        })
        .await?;
        Ok(records)
    }

    async fn export_cue(&self, index: usize, cue: &Cue, source: &str, native: Option<&Track>) -> Result<ExportRecord, ExportError> {
        let mut record = ExportRecord {
            time: Cue::format_timestamp(cue.start_ms),
            source: source.to_string(),
            foreign_curr: cue.flatten(),
            ..Default::default()
        };

        if let Some(native) = native {
            record.native_curr = native.align(cue).flatten();
        }

        if let Some((extractor, media)) = self.media {
            let window = TimeWindow::new(cue.start_ms, cue.end_ms);
            let media_error = |source| ExportError::Media {
                index: index + 1,
                text: cue.to_string(),
                source,
            };

            let audio_file = extractor
                .extract_audio(window.with_lead(self.audio_lead_ms), media)
                .await
                .map_err(media_error)?;

            let image_file = extractor
                .extract_image(window, media)
                .await
                .map_err(media_error)?;

            record.sound = sound_tag(&audio_file);
            record.image = image_tag(&image_file);
        }

        Ok(record)
    }
}

/// Quote a field if it contains a quote, the separator or a line break
pub fn escape_field(field: &str, separator: char) -> Cow<'_, str> {
    let needs_quotes = field
        .chars()
        .any(|c| c == '"' || c == separator || c == '\t' || c == '\n' || c == '\r');

    if needs_quotes {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Writes records as delimited text, one per line
pub struct RecordWriter<W: Write> {
    inner: W,
    separator: char,
}

impl<W: Write> RecordWriter<W> {
    /// Tab-separated writer
    pub fn new(inner: W) -> Self {
        Self::with_separator(inner, '\t')
    }

    pub fn with_separator(inner: W, separator: char) -> Self {
        Self { inner, separator }
    }

    pub fn write_record(&mut self, record: &ExportRecord) -> io::Result<()> {
        let mut separator_buf = [0u8; 4];
        let separator = self.separator.encode_utf8(&mut separator_buf);

        for (i, field) in record.fields().iter().enumerate() {
            if i > 0 {
                self.inner.write_all(separator.as_bytes())?;
            }
            self.inner.write_all(escape_field(field, self.separator).as_bytes())?;
        }
        self.inner.write_all(b"\n")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
