//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use hiresong_client::{ClientError, GenerateRequest, GenerationTransport};
use hiresong_core::{Genre, SelectedFile, SubmissionForm, ValidatedSubmission};
use hiresong_generation_contract::RawResponse;

/// Transport returning canned responses and recording what it was sent.
#[derive(Debug)]
pub struct ScriptedTransport {
    pub response: Result<RawResponse, String>,
    pub sent: Mutex<Vec<GenerateRequest>>,
    pub fetched: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn replying(status: u16, content_type: Option<&str>, body: &[u8]) -> Self {
        Self {
            response: Ok(RawResponse {
                status,
                content_type: content_type.map(str::to_string),
                body: body.to_vec(),
            }),
            sent: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            sent: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    fn reply(&self) -> Result<RawResponse, ClientError> {
        self.response.clone().map_err(ClientError::Transport)
    }
}

impl GenerationTransport for ScriptedTransport {
    fn send(&self, request: &GenerateRequest) -> Result<RawResponse, ClientError> {
        self.sent
            .lock()
            .expect("sent lock should work")
            .push(request.clone());
        self.reply()
    }

    fn fetch(&self, url: &str) -> Result<RawResponse, ClientError> {
        self.fetched
            .lock()
            .expect("fetch lock should work")
            .push(url.to_string());
        self.reply()
    }
}

pub fn fixture_submission() -> ValidatedSubmission {
    SubmissionForm {
        selfie: Some(SelectedFile::new("me.png", "image/png", vec![1, 2, 3]).expect("selfie")),
        cv: Some(
            SelectedFile::new("cv.pdf", "application/pdf", b"%PDF-1.4".to_vec()).expect("cv"),
        ),
        company_url: "https://acme.example".to_string(),
        genre: Genre::Metal,
    }
    .validate()
    .expect("fixture form should validate")
}
