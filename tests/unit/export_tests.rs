/*!
 * Tests for card record assembly and serialization
 */

use anyhow::Result;
use bunkai::errors::ExportError;
use bunkai::export::{escape_field, CardExporter, ExportRecord, RecordWriter};
use bunkai::media::{MediaSource, TimeWindow};
use bunkai::subtitle_processor::{Cue, Track};
use crate::common;
use crate::common::mock_extractor::{ClipKind, MockExtractor};

fn cue(start_ms: u64, end_ms: u64, lines: &[&str]) -> Cue {
    Cue::new(start_ms, end_ms, lines.iter().copied())
}

fn hello_world() -> Track {
    Track::new("greetings", vec![
        cue(0, 2000, &["Hello"]),
        cue(2000, 4000, &["World"]),
    ])
}

/// Test the two-cue scenario without native track or media
#[tokio::test]
async fn test_export_withoutNativeOrMedia_shouldFillNeighbours() -> Result<()> {
    let records = CardExporter::new().export_records(&hello_world(), None).await?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0], ExportRecord {
        time: "00:00:00,000".to_string(),
        source: "greetings".to_string(),
        foreign_curr: "Hello".to_string(),
        foreign_next: "World".to_string(),
        ..Default::default()
    });
    assert_eq!(records[1], ExportRecord {
        time: "00:00:02,000".to_string(),
        source: "greetings".to_string(),
        foreign_curr: "World".to_string(),
        foreign_prev: "Hello".to_string(),
        ..Default::default()
    });

    Ok(())
}

/// Test that an empty foreign track produces nothing
#[tokio::test]
async fn test_export_withEmptyTrack_shouldProduceNoRecords() -> Result<()> {
    let records = CardExporter::new().export_records(&Track::new("empty", Vec::new()), None).await?;

    assert!(records.is_empty());

    Ok(())
}

/// Test that native text is aligned per cue and neighbours stay empty
#[tokio::test]
async fn test_export_withNativeTrack_shouldAlignCurrentOnly() -> Result<()> {
    let foreign = Track::new("f", vec![
        cue(1000, 3000, &["Hola,", "amigo."]),
        cue(3000, 5000, &["Adiós."]),
    ]);
    let native = Track::new("n", vec![
        cue(900, 1500, &["Hello,"]),
        cue(1500, 2800, &["friend."]),
        cue(3000, 4000, &["Bye."]),
    ]);

    let records = CardExporter::new().export_records(&foreign, Some(&native)).await?;

    assert_eq!(records[0].foreign_curr, "Hola, amigo.");
    assert_eq!(records[0].native_curr, "Hello, friend.");
    assert_eq!(records[1].native_curr, "Bye.");
    assert!(records.iter().all(|r| r.native_prev.is_empty() && r.native_next.is_empty()));

    Ok(())
}

/// Test media references and the audio pre-roll
#[tokio::test]
async fn test_export_withMedia_shouldReferenceClipsByBaseName() -> Result<()> {
    let extractor = MockExtractor::new();
    let source = MediaSource::new("/videos/ep.mkv", "/out/ep.media/ep");
    let foreign = Track::new("ep", vec![cue(50, 2000, &["Hi"]), cue(2000, 4000, &["there"])]);

    let records = CardExporter::new()
        .with_media(&extractor, &source)
        .export_records(&foreign, None)
        .await?;

    assert_eq!(records[0].sound, "[sound:ep_00h00m00s000ms-00h00m02s000ms.mp3]");
    assert_eq!(records[0].image, "<img src=\"ep_00h00m00s050ms-00h00m02s000ms.jpg\">");
    assert_eq!(records[0].time, "00:00:00,050");
    assert_eq!(records[1].sound, "[sound:ep_00h00m01s900ms-00h00m04s000ms.mp3]");

    assert_eq!(extractor.calls(), vec![
        (ClipKind::Audio, TimeWindow::new(0, 2000)),
        (ClipKind::Image, TimeWindow::new(50, 2000)),
        (ClipKind::Audio, TimeWindow::new(1900, 4000)),
        (ClipKind::Image, TimeWindow::new(2000, 4000)),
    ]);

    Ok(())
}

/// Test that the audio lead can be configured
#[tokio::test]
async fn test_export_withCustomAudioLead_shouldShiftAudioOnly() -> Result<()> {
    let extractor = MockExtractor::new();
    let source = MediaSource::new("ep.mkv", "ep.media/ep");
    let foreign = Track::new("ep", vec![cue(1000, 2000, &["Hi"])]);

    CardExporter::new()
        .with_media(&extractor, &source)
        .with_audio_lead(250)
        .export_records(&foreign, None)
        .await?;

    assert_eq!(extractor.calls()[0], (ClipKind::Audio, TimeWindow::new(750, 2000)));
    assert_eq!(extractor.calls()[1], (ClipKind::Image, TimeWindow::new(1000, 2000)));

    Ok(())
}

/// Test that one failed clip aborts the whole export
#[tokio::test]
async fn test_export_withFailingExtractor_shouldAbortWithCueIndex() {
    let extractor = MockExtractor::failing_on(3);
    let source = MediaSource::new("ep.mkv", "ep.media/ep");
    let mut written = Vec::new();

    let result = CardExporter::new()
        .with_media(&extractor, &source)
        .export(&hello_world(), None, |record| {
            written.push(record);
            Ok(())
        })
        .await;

    match result {
        Err(ExportError::Media { index, text, .. }) => {
            assert_eq!(index, 2);
            assert!(text.contains("World"));
        }
        other => panic!("expected a media error, got {:?}", other),
    }
    assert_eq!(written.len(), 1);
    assert_eq!(extractor.calls().len(), 3);
}

/// Test that tabs and newlines inside cue lines are flattened
#[tokio::test]
async fn test_export_withTabsInText_shouldFlattenFields() -> Result<()> {
    let foreign = Track::new("f", vec![cue(0, 1000, &["a\tb", "c"])]);

    let records = CardExporter::new().export_records(&foreign, None).await?;

    assert_eq!(records[0].foreign_curr, "a b c");

    Ok(())
}

/// Test that an escaped field survives an RFC 4180 reader unchanged
#[test]
fn test_escape_field_withTabAndQuotes_shouldRoundTrip() {
    let original = "He said \"no\"\tand left";
    let record = ExportRecord {
        foreign_curr: original.to_string(),
        ..Default::default()
    };

    let mut writer = RecordWriter::new(Vec::new());
    writer.write_record(&record).unwrap();
    let output = String::from_utf8(writer.into_inner()).unwrap();

    assert!(output.contains("\"He said \"\"no\"\"\tand left\""));

    let fields = common::parse_delimited_line(output.trim_end_matches('\n'), '\t');
    assert_eq!(fields.len(), 10);
    assert_eq!(fields[4], original);
}

/// Test comma separated output quoting
#[test]
fn test_record_writer_withCommaSeparator_shouldQuoteCommas() {
    let record = ExportRecord {
        time: "00:00:01,000".to_string(),
        foreign_curr: "one, two".to_string(),
        ..Default::default()
    };

    let mut writer = RecordWriter::with_separator(Vec::new(), ',');
    writer.write_record(&record).unwrap();
    let output = String::from_utf8(writer.into_inner()).unwrap();

    let fields = common::parse_delimited_line(output.trim_end_matches('\n'), ',');
    assert_eq!(fields[1], "00:00:01,000");
    assert_eq!(fields[4], "one, two");
    assert_eq!(escape_field("plain", ','), "plain");
}
