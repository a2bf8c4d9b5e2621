//! Integration tests for the application shell submission flow.

use hiresong_core::{Genre, SelectedFile};
use hiresong_generation_contract::GeneratedVideo;
use hiresong_ui::{COMMENT_LIFETIME_MS, SUBMIT_LABEL, ShellState, SubmitRejection};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn selfie() -> SelectedFile {
    SelectedFile::new("me.png", "image/png", vec![7; 32]).unwrap()
}

fn cv() -> SelectedFile {
    SelectedFile::new("cv.pdf", "application/pdf", vec![9; 64]).unwrap()
}

fn complete_shell(rng: &mut StdRng) -> ShellState {
    let mut shell = ShellState::new(0);
    shell.choose_selfie(selfie(), 0, rng).unwrap();
    shell.choose_cv(cv(), 0, rng).unwrap();
    shell.set_company_url("https://acme.test");
    shell
}

#[test]
fn shell_flow_tests_missing_fields_report_in_order_and_issue_no_ticket() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut shell = ShellState::new(0);

    assert!(matches!(shell.begin_submit(), Err(SubmitRejection::Invalid(_))));
    assert_eq!(shell.error(), Some("Please upload or capture a selfie"));
    assert!(!shell.is_pending());

    shell.choose_selfie(selfie(), 0, &mut rng).unwrap();
    assert!(shell.begin_submit().is_err());
    assert_eq!(shell.error(), Some("Please upload your CV (PDF)"));

    shell.choose_cv(cv(), 0, &mut rng).unwrap();
    shell.set_company_url("   ");
    assert!(shell.begin_submit().is_err());
    assert_eq!(shell.error(), Some("Please enter the company website URL"));
    assert!(!shell.is_pending());
}

#[test]
fn shell_flow_tests_successful_finish_shows_video_and_returns_to_idle() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut shell = complete_shell(&mut rng);
    shell.set_genre(Genre::Jazz);

    let ticket = shell.begin_submit().unwrap();
    assert!(shell.is_pending());
    assert_eq!(ticket.submission().genre, Genre::Jazz);
    assert_eq!(ticket.submission().company_url, "https://acme.test");

    let applied = shell.finish_submit(
        &ticket,
        Ok(GeneratedVideo::Local {
            bytes: vec![0, 1, 2],
            content_type: "video/mp4".to_string(),
        }),
    );
    assert!(applied);
    assert!(!shell.is_pending());
    assert!(shell.error().is_none());
    assert!(shell.video().unwrap().video().is_local());
    assert_eq!(shell.submit_label(), SUBMIT_LABEL);
}

#[test]
fn shell_flow_tests_failed_finish_sets_banner_and_allows_retry() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut shell = complete_shell(&mut rng);

    let ticket = shell.begin_submit().unwrap();
    shell.finish_submit(&ticket, Err("Server error: 500".to_string()));
    assert_eq!(shell.error(), Some("Server error: 500"));
    assert!(!shell.is_pending());

    let retry = shell.begin_submit().unwrap();
    assert!(retry.id() > ticket.id());
    assert!(shell.error().is_none());
}

#[test]
fn shell_flow_tests_hover_counter_grows_only_when_eligible() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut shell = ShellState::new(0);
    assert!(!shell.hover_submit(&mut rng));
    assert_eq!(shell.evasive().hover_count(), 0);

    let mut shell = complete_shell(&mut rng);
    let mut previous = 0;
    for _ in 0..10 {
        assert!(shell.hover_submit(&mut rng));
        let count = shell.evasive().hover_count();
        assert!(count > previous);
        previous = count;
    }
    assert_eq!(
        shell.evasive().encouragement(),
        Some("Fine, you can click me now... 😌")
    );

    let ticket = shell.begin_submit().unwrap();
    assert_eq!(shell.evasive().offset(), (0.0, 0.0));
    assert!(!shell.hover_submit(&mut rng));
    shell.finish_submit(&ticket, Err("boom".to_string()));
}

#[test]
fn shell_flow_tests_reset_restores_initial_state() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut shell = complete_shell(&mut rng);
    shell.set_genre(Genre::Metal);
    shell.hover_submit(&mut rng);
    shell.toggle_webcam();
    let ticket = shell.begin_submit().unwrap();
    shell.finish_submit(
        &ticket,
        Ok(GeneratedVideo::Remote {
            url: "https://cdn.test/v.mp4".to_string(),
        }),
    );

    shell.reset();

    assert!(shell.form().selfie.is_none());
    assert!(shell.form().cv.is_none());
    assert!(shell.form().company_url.is_empty());
    assert_eq!(shell.form().genre, Genre::SurpriseMe);
    assert!(shell.video().is_none());
    assert!(shell.error().is_none());
    assert!(!shell.webcam_visible());
    assert_eq!(shell.evasive().hover_count(), 0);
    assert!(shell.selfie_picker().picker_is_reset());
    assert!(shell.cv_picker().picker_is_reset());
}

#[test]
fn shell_flow_tests_reset_keeps_outstanding_request_exclusive() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut shell = complete_shell(&mut rng);
    let first = shell.begin_submit().unwrap();

    shell.reset();
    assert!(!shell.is_pending());
    assert_eq!(shell.submit_label(), SUBMIT_LABEL);

    shell.choose_selfie(selfie(), 10, &mut rng).unwrap();
    shell.choose_cv(cv(), 10, &mut rng).unwrap();
    shell.set_company_url("https://other.test");
    assert_eq!(shell.begin_submit(), Err(SubmitRejection::AlreadyPending));
    assert!(!shell.hover_submit(&mut rng));

    let applied = shell.finish_submit(
        &first,
        Ok(GeneratedVideo::Remote {
            url: "https://cdn.test/old.mp4".to_string(),
        }),
    );
    assert!(!applied);
    assert!(shell.video().is_none());
    assert!(shell.error().is_none());

    let second = shell.begin_submit().unwrap();
    assert!(second.id() > first.id());
    assert_eq!(second.submission().company_url, "https://other.test");
}

#[test]
fn shell_flow_tests_tick_expires_picker_comments() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut shell = ShellState::new(0);
    shell.choose_cv(cv(), 0, &mut rng).unwrap();
    assert!(shell.cv_picker().comment(0).is_some());

    shell.tick(COMMENT_LIFETIME_MS - 1, &mut rng);
    assert!(shell.cv_picker().comment(0).is_some());

    shell.tick(COMMENT_LIFETIME_MS, &mut rng);
    assert!(shell.cv_picker().comment(0).is_none());
    assert!(shell.cv_picker().preview_caption().is_some());
}
