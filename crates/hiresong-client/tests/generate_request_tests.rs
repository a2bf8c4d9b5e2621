//! Integration tests for multipart request assembly.

mod common;

use std::sync::Arc;

use hiresong_client::GenerationClient;

#[test]
fn generate_request_tests_posts_all_four_fields_to_generate_endpoint() {
    let transport = Arc::new(common::ScriptedTransport::replying(
        200,
        Some("video/mp4"),
        b"mp4",
    ));
    let client = GenerationClient::new("http://localhost:8000/", transport.clone())
        .expect("client should build");

    let request = client.request_for(common::fixture_submission());
    client.generate(&request).expect("generation should succeed");

    let sent = transport.sent.lock().expect("sent lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].endpoint, "http://localhost:8000/api/generate");

    let files: Vec<&str> = sent[0].file_fields().iter().map(|(name, _)| *name).collect();
    assert_eq!(files, vec!["selfie", "cv"]);
    assert_eq!(
        sent[0].text_fields(),
        [
            ("company_url", "https://acme.example".to_string()),
            ("genre", "Metal".to_string()),
        ]
    );
}

#[test]
fn generate_request_tests_resolves_relative_video_urls() {
    let transport = Arc::new(common::ScriptedTransport::replying(
        200,
        Some("video/mp4"),
        b"remote-bytes",
    ));
    let client = GenerationClient::new("https://api.example.test", transport.clone())
        .expect("client should build");

    let video = hiresong_generation_contract::GeneratedVideo::Remote {
        url: "/videos/abc.mp4".to_string(),
    };
    let bytes = client.fetch_video(&video).expect("download should succeed");

    assert_eq!(bytes, b"remote-bytes".to_vec());
    assert_eq!(
        transport.fetched.lock().expect("fetch lock")[0],
        "https://api.example.test/videos/abc.mp4"
    );
}
