//! Integration tests for submission orchestration.

mod common;

use std::time::Duration;

use common::{CountingTransport, client_for, filled_shell};
use hiresong_app::{download_video, spawn_submission, submit_blocking};
use hiresong_ui::{ShellState, SubmitRejection};

#[test]
fn submission_flow_tests_missing_cv_never_reaches_network() {
    let transport = CountingTransport::new(200, "video/mp4", b"mp4");
    let client = client_for(transport.clone());
    let mut shell = filled_shell();
    shell.remove_cv();

    let outcome = submit_blocking(&mut shell, &client);

    assert!(matches!(outcome, Err(SubmitRejection::Invalid(_))));
    assert_eq!(shell.error(), Some("Please upload your CV (PDF)"));
    assert_eq!(transport.sends(), 0);
    assert!(!shell.is_pending());
}

#[test]
fn submission_flow_tests_video_response_becomes_local_reference() {
    let transport = CountingTransport::new(200, "video/mp4", b"\x00\x00\x00\x18ftyp");
    let client = client_for(transport.clone());
    let mut shell = filled_shell();

    assert_eq!(submit_blocking(&mut shell, &client), Ok(true));
    assert_eq!(transport.sends(), 1);
    assert!(!shell.is_pending());
    assert!(shell.video().unwrap().video().is_local());

    let dir = tempfile::tempdir().unwrap();
    let path = download_video(&shell, &client, dir.path()).unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"\x00\x00\x00\x18ftyp");
    assert_eq!(transport.fetches.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn submission_flow_tests_server_detail_is_shown() {
    let transport =
        CountingTransport::new(422, "application/json", br#"{"detail":"CV could not be parsed"}"#);
    let client = client_for(transport);
    let mut shell = filled_shell();

    assert_eq!(submit_blocking(&mut shell, &client), Ok(false));
    assert_eq!(shell.error(), Some("CV could not be parsed"));
}

#[test]
fn submission_flow_tests_worker_reports_remote_video() {
    let transport =
        CountingTransport::new(200, "application/json", br#"{"video_url":"/videos/42.mp4"}"#);
    let client = client_for(transport.clone());
    let mut shell = filled_shell();

    let ticket = shell.begin_submit().unwrap();
    let outcomes = spawn_submission(client.clone(), ticket).unwrap();
    let outcome = outcomes.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(shell.finish_submit(&outcome.ticket, outcome.result));

    let dir = tempfile::tempdir().unwrap();
    let path = download_video(&shell, &client, dir.path()).unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"remote-video");
    assert_eq!(transport.fetches.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn submission_flow_tests_download_without_video_fails() {
    let transport = CountingTransport::new(200, "video/mp4", b"");
    let client = client_for(transport);
    let shell = ShellState::new(0);
    let dir = tempfile::tempdir().unwrap();

    assert!(download_video(&shell, &client, dir.path()).is_err());
}
