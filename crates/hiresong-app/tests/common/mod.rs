//! Shared fixtures for app integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hiresong_client::{ClientError, GenerateRequest, GenerationClient, GenerationTransport};
use hiresong_core::SelectedFile;
use hiresong_generation_contract::RawResponse;
use hiresong_ui::ShellState;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Transport that counts calls and replies with one canned response.
#[derive(Debug)]
pub struct CountingTransport {
    pub response: RawResponse,
    pub sends: AtomicUsize,
    pub fetches: AtomicUsize,
}

impl CountingTransport {
    pub fn new(status: u16, content_type: &str, body: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            response: RawResponse {
                status,
                content_type: Some(content_type.to_string()),
                body: body.to_vec(),
            },
            sends: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

impl GenerationTransport for CountingTransport {
    fn send(&self, _request: &GenerateRequest) -> Result<RawResponse, ClientError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    fn fetch(&self, _url: &str) -> Result<RawResponse, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(RawResponse {
            status: 200,
            content_type: Some("video/mp4".to_string()),
            body: b"remote-video".to_vec(),
        })
    }
}

pub fn client_for(transport: Arc<CountingTransport>) -> GenerationClient {
    GenerationClient::new("http://localhost:8000", transport).expect("client should build")
}

pub fn filled_shell() -> ShellState {
    let mut rng = StdRng::seed_from_u64(99);
    let mut shell = ShellState::new(0);
    shell
        .choose_selfie(
            SelectedFile::new("me.jpg", "image/jpeg", vec![1; 16]).expect("selfie"),
            0,
            &mut rng,
        )
        .expect("selfie accepted");
    shell
        .choose_cv(
            SelectedFile::new("cv.pdf", "application/pdf", b"%PDF-1.5".to_vec()).expect("cv"),
            0,
            &mut rng,
        )
        .expect("cv accepted");
    shell.set_company_url("https://acme.example");
    shell
}
