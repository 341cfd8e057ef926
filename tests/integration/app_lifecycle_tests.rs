/*!
 * Tests for the controller lifecycle
 */

use anyhow::Result;
use bunkai::app_config::Config;
use bunkai::app_controller::{CardsJob, Controller};
use crate::common;
use crate::common::mock_extractor::MockExtractor;

/// Test controller initialization with the default configuration
#[test]
fn test_controller_initialization_withDefaults_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;

    assert_eq!(controller.config().export.extension(), "tsv");
    assert_eq!(controller.config().media.ffmpeg_path, "ffmpeg");

    Ok(())
}

/// Test that an invalid configuration is rejected up front
#[test]
fn test_controller_initialization_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.export.field_separator = "::".to_string();

    let result = Controller::with_config(config);

    assert!(result.is_err());
}

/// Test the output layout derived from a job
#[test]
fn test_output_layout_withCsvConfig_shouldUseCsvExtension() -> Result<()> {
    let mut config = Config::default();
    config.export.field_separator = ";".to_string();
    let controller = Controller::with_config(config)?;

    let layout = controller.output_layout(&CardsJob::new("subs/ep02.srt"));

    assert_eq!(layout.output_file, std::path::Path::new("subs/ep02.csv"));
    assert_eq!(layout.media_prefix(), std::path::Path::new("subs/ep02.media/ep02"));

    Ok(())
}

/// Test running the same job twice from a blocking context
#[test]
fn test_controller_rerun_withoutForce_shouldKeepFirstOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let foreign = common::create_foreign_subtitle(&dir, "foreign.srt")?;

    let controller = Controller::new_for_test()?;
    let job = CardsJob::new(&foreign);
    let extractor = MockExtractor::new();

    let first = tokio_test::block_on(controller.run_cards_with(&job, &extractor))?;
    let second = tokio_test::block_on(controller.run_cards_with(&job, &extractor))?;

    assert_eq!(first, Some(dir.join("foreign.tsv")));
    assert_eq!(second, None);

    Ok(())
}
