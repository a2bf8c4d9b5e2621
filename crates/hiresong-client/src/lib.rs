#![warn(missing_docs)]
//! # hiresong-client
//!
//! ## Purpose
//! Implements the Generation API client used by the application shell.
//!
//! ## Responsibilities
//! - Validate and normalize the configurable API base URL.
//! - Assemble the multipart generation request from a validated submission.
//! - Execute requests through an injectable [`GenerationTransport`].
//! - Provide the `reqwest` HTTP transport used in production.
//!
//! ## Data flow
//! Shell validates the form -> [`GenerationClient::request_for`] builds a
//! [`GenerateRequest`] -> [`GenerationClient::generate`] sends it through the
//! transport -> the response contract yields a [`GeneratedVideo`].
//!
//! ## Ownership and lifetimes
//! Requests own their file payloads so they can move to a worker thread while
//! the UI thread keeps running.
//!
//! ## Error model
//! Endpoint policy violations, transport failures, and contract violations
//! are surfaced as [`ClientError`]. [`ClientError::user_message`] gives the
//! text shown to the user.
//!
//! ## Security and privacy notes
//! File bytes are never logged; only names and sizes.

use std::sync::Arc;
use std::time::Duration;

use hiresong_core::{Genre, SelectedFile, ValidatedSubmission};
use hiresong_generation_contract::{
    FIELD_COMPANY_URL, FIELD_CV, FIELD_GENRE, FIELD_SELFIE, GENERATE_PATH, GeneratedVideo,
    GenerationContractError, RawResponse, interpret_response,
};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Base URL used when no override is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "HIRESONG_API_URL";

/// Fallback environment variable kept for deployments of the web front-end.
pub const LEGACY_API_URL_ENV: &str = "VITE_API_URL";

/// Environment variable overriding the HTTP timeout in seconds.
pub const TIMEOUT_ENV: &str = "HIRESONG_HTTP_TIMEOUT_SECS";

/// Generation can take minutes; the default timeout is generous.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Message shown when a failure carries no usable text.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate video. Please try again.";

/// One multipart generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Absolute endpoint URL.
    pub endpoint: String,
    /// `selfie` file part.
    pub selfie: SelectedFile,
    /// `cv` file part.
    pub cv: SelectedFile,
    /// `company_url` text part.
    pub company_url: String,
    /// `genre` text part.
    pub genre: Genre,
}

impl GenerateRequest {
    /// Text fields in submission order.
    pub fn text_fields(&self) -> [(&'static str, String); 2] {
        [
            (FIELD_COMPANY_URL, self.company_url.clone()),
            (FIELD_GENRE, self.genre.wire_value().to_string()),
        ]
    }

    /// File fields in submission order.
    pub fn file_fields(&self) -> [(&'static str, &SelectedFile); 2] {
        [(FIELD_SELFIE, &self.selfie), (FIELD_CV, &self.cv)]
    }
}

/// Abstract transport used by the generation client.
pub trait GenerationTransport: Send + Sync {
    /// Posts the multipart generation request.
    fn send(&self, request: &GenerateRequest) -> Result<RawResponse, ClientError>;

    /// Downloads a hosted resource (remote video).
    fn fetch(&self, url: &str) -> Result<RawResponse, ClientError>;
}

/// Blocking `reqwest` transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Builds a transport with the given request timeout.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] when the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ClientError::Transport(format!("failed to create HTTP client: {error}")))?;
        Ok(Self { client })
    }
}

impl GenerationTransport for HttpTransport {
    fn send(&self, request: &GenerateRequest) -> Result<RawResponse, ClientError> {
        let mut form = Form::new();
        for (field, file) in request.file_fields() {
            let part = Part::bytes(file.bytes().to_vec())
                .file_name(file.name().to_string())
                .mime_str(file.mime_type())
                .map_err(|error| ClientError::Transport(format!("invalid {field} part: {error}")))?;
            form = form.part(field, part);
        }
        for (field, value) in request.text_fields() {
            form = form.text(field, value);
        }

        let response = self
            .client
            .post(&request.endpoint)
            .multipart(form)
            .send()
            .map_err(|error| ClientError::Transport(error.to_string()))?;
        into_raw_response(response)
    }

    fn fetch(&self, url: &str) -> Result<RawResponse, ClientError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|error| ClientError::Transport(error.to_string()))?;
        into_raw_response(response)
    }
}

fn into_raw_response(response: reqwest::blocking::Response) -> Result<RawResponse, ClientError> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response
        .bytes()
        .map_err(|error| ClientError::Transport(format!("failed to read response body: {error}")))?
        .to_vec();

    Ok(RawResponse {
        status,
        content_type,
        body,
    })
}

/// Generation API client bound to one base URL.
#[derive(Clone)]
pub struct GenerationClient {
    base_url: String,
    transport: Arc<dyn GenerationTransport>,
}

impl GenerationClient {
    /// Creates a client with a validated base URL.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidEndpoint`] when the URL is not http(s).
    pub fn new(
        base_url: impl AsRef<str>,
        transport: Arc<dyn GenerationTransport>,
    ) -> Result<Self, ClientError> {
        let base_url = validate_base_url(base_url.as_ref())?;
        Ok(Self {
            base_url,
            transport,
        })
    }

    /// Normalized base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute generation endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{GENERATE_PATH}", self.base_url)
    }

    /// Builds the multipart request for a validated submission.
    pub fn request_for(&self, submission: ValidatedSubmission) -> GenerateRequest {
        GenerateRequest {
            endpoint: self.endpoint(),
            selfie: submission.selfie,
            cv: submission.cv,
            company_url: submission.company_url,
            genre: submission.genre,
        }
    }

    /// Sends one generation request and interprets the response.
    ///
    /// # Errors
    /// Propagates transport failures and contract violations.
    pub fn generate(&self, request: &GenerateRequest) -> Result<GeneratedVideo, ClientError> {
        info!(
            endpoint = %request.endpoint,
            selfie_bytes = request.selfie.size_bytes(),
            cv_bytes = request.cv.size_bytes(),
            genre = %request.genre,
            "submitting generation request"
        );

        let raw = self.transport.send(request)?;
        debug!(
            status = raw.status,
            content_type = raw.content_type.as_deref().unwrap_or("-"),
            bytes = raw.body.len(),
            "generation response received"
        );

        interpret_response(raw).map_err(|error| {
            warn!(%error, "generation failed");
            ClientError::Contract(error)
        })
    }

    /// Returns the bytes of a generated video, downloading remote media.
    ///
    /// # Errors
    /// Returns [`ClientError::Download`] for non-success download statuses.
    pub fn fetch_video(&self, video: &GeneratedVideo) -> Result<Vec<u8>, ClientError> {
        match video {
            GeneratedVideo::Local { bytes, .. } => Ok(bytes.clone()),
            GeneratedVideo::Remote { url } => {
                let absolute = self.resolve_url(url)?;
                let raw = self.transport.fetch(&absolute)?;
                if !raw.is_success() {
                    return Err(ClientError::Download(raw.status));
                }
                Ok(raw.body)
            }
        }
    }

    /// Resolves a possibly server-relative URL against the base URL.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidEndpoint`] when the URL cannot be joined.
    pub fn resolve_url(&self, url: &str) -> Result<String, ClientError> {
        let base = Url::parse(&format!("{}/", self.base_url))
            .map_err(|error| ClientError::InvalidEndpoint(format!("invalid base url: {error}")))?;
        base.join(url)
            .map(String::from)
            .map_err(|error| ClientError::InvalidEndpoint(format!("invalid video url: {error}")))
    }
}

/// Validates and normalizes an API base URL.
///
/// # Errors
/// Returns [`ClientError::InvalidEndpoint`] for unparsable or non-http(s) URLs.
pub fn validate_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed)
        .map_err(|error| ClientError::InvalidEndpoint(format!("invalid api url: {error}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::InvalidEndpoint(
            "api url must use http or https".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

/// Reads the base URL from the environment.
///
/// `HIRESONG_API_URL` wins over `VITE_API_URL`; blank values are ignored.
pub fn base_url_from_env() -> String {
    [API_URL_ENV, LEGACY_API_URL_ENV]
        .into_iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Reads the request timeout from the environment.
///
/// Unset or invalid values fall back to [`DEFAULT_TIMEOUT_SECS`].
pub fn timeout_from_env() -> Duration {
    let seconds = std::env::var(TIMEOUT_ENV)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|seconds| *seconds > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(seconds)
}

/// Errors produced by the generation client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL violates endpoint policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Network or HTTP client failure.
    #[error("{0}")]
    Transport(String),
    /// Response violated the generation contract.
    #[error(transparent)]
    Contract(#[from] GenerationContractError),
    /// Remote video download returned a failure status.
    #[error("video download failed with status {0}")]
    Download(u16),
}

impl ClientError {
    /// Text shown in the shell's error banner.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}
