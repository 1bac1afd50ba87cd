use std::{fs, path::PathBuf};

use gesture_pipeline::{
    config::ConfigError, types::Channel, ManualClock, GesturePipeline, PipelineConfig, Pose,
};

fn shipped_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/pipeline.toml")
}

#[test]
fn shipped_config_matches_defaults() {
    let config = PipelineConfig::from_path(shipped_config()).expect("shipped config should load");
    assert_eq!(config, PipelineConfig::default());
}

#[test]
fn config_file_overrides_are_applied() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pipeline.toml");
    fs::write(
        &path,
        "[debounce]\ntimeout_ms = 25\ninstantaneous = \"fist\"\n\n[moving_average]\nwindow = 4\nchannels = [\"orientation\", \"gyroscope\"]\n",
    )
    .expect("write config");

    let config = PipelineConfig::from_path(&path).expect("config should load");
    assert_eq!(config.debounce.timeout_ms, 25);
    assert_eq!(config.debounce.instantaneous, Pose::Fist);
    assert_eq!(config.moving_average.window, 4);
    assert_eq!(
        config.moving_average.channels,
        vec![Channel::Orientation, Channel::Gyroscope]
    );
    assert_eq!(config.gestures, PipelineConfig::default().gestures);

    let clock = ManualClock::new();
    let pipeline = GesturePipeline::from_path(&path, clock.shared()).expect("pipeline");
    assert_eq!(pipeline.moving_average().stage().window(), 4);
    assert_eq!(pipeline.debounce().stage().timeout().as_millis(), 25);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = PipelineConfig::from_path(dir.path().join("absent.toml"))
        .expect_err("missing file should fail");
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn malformed_and_invalid_files_are_distinguished() {
    let dir = tempfile::tempdir().expect("tempdir");

    let malformed = dir.path().join("malformed.toml");
    fs::write(&malformed, "[gestures\nclick_max_hold_ms = 1").expect("write config");
    assert!(matches!(
        PipelineConfig::from_path(&malformed),
        Err(ConfigError::Parse(_))
    ));

    let invalid = dir.path().join("invalid.toml");
    fs::write(&invalid, "[exponential_average]\nalpha = -0.5\n").expect("write config");
    assert!(matches!(
        PipelineConfig::from_path(&invalid),
        Err(ConfigError::Invalid(_))
    ));
}
