//! Integration tests for environment configuration and overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hiresong_app::{AppConfig, OUTPUT_DIR_ENV, capture_device};
use hiresong_client::{API_URL_ENV, LEGACY_API_URL_ENV, TIMEOUT_ENV};

#[test]
fn config_tests_env_then_overrides() {
    // Safety:
    // - This is the only test in this binary that touches these variables.
    // - Variables are removed before returning.
    unsafe {
        std::env::remove_var(LEGACY_API_URL_ENV);
        std::env::set_var(API_URL_ENV, "https://api.example/");
        std::env::set_var(TIMEOUT_ENV, "30");
        std::env::set_var(OUTPUT_DIR_ENV, "/tmp/hiresong-out");
    }

    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.api_url, "https://api.example");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.output_dir, PathBuf::from("/tmp/hiresong-out"));

    let overridden = config
        .with_overrides(Some("http://127.0.0.1:9000"), Some(Path::new("videos")))
        .unwrap();
    assert_eq!(overridden.api_url, "http://127.0.0.1:9000");
    assert_eq!(overridden.output_dir, PathBuf::from("videos"));
    assert!(overridden.clone().with_overrides(Some("ftp://nope"), None).is_err());

    // Safety: see rationale above.
    unsafe { std::env::set_var(API_URL_ENV, "mailto:someone") };
    assert!(AppConfig::from_env().is_err());

    // Safety: see rationale above.
    unsafe {
        std::env::remove_var(API_URL_ENV);
        std::env::remove_var(TIMEOUT_ENV);
        std::env::remove_var(OUTPUT_DIR_ENV);
    }
}

#[test]
fn config_tests_synthetic_camera_is_always_available() {
    let mut device = capture_device(true).unwrap();
    device.open(hiresong_capture::TARGET_RESOLUTION).unwrap();
    assert_eq!(device.active_tracks(), 1);
    device.stop_all_tracks();
    assert_eq!(device.active_tracks(), 0);
}
