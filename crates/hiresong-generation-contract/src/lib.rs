#![warn(missing_docs)]
//! # hiresong-generation-contract
//!
//! ## Purpose
//! Defines the Generation API response contract and its client-side
//! interpretation.
//!
//! ## Responsibilities
//! - Classify responses by HTTP status and content type.
//! - Turn binary `video/*` bodies into a local playable reference.
//! - Require `video_url` in JSON success bodies.
//! - Extract `detail` from JSON error bodies, with a status fallback.
//!
//! ## Data flow
//! Transport returns [`RawResponse`] -> [`interpret_response`] ->
//! [`GeneratedVideo`] for the playback panel, or
//! [`GenerationContractError`] whose `Display` is the user-facing message.
//!
//! ## Ownership and lifetimes
//! Parsed values own their buffers so nothing borrows from transient network
//! responses.
//!
//! ## Error model
//! Non-success statuses, malformed JSON, and missing `video_url` all return
//! [`GenerationContractError`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Path of the generation endpoint relative to the API base URL.
pub const GENERATE_PATH: &str = "/api/generate";

/// Multipart field carrying the selfie image.
pub const FIELD_SELFIE: &str = "selfie";
/// Multipart field carrying the CV PDF.
pub const FIELD_CV: &str = "cv";
/// Multipart field carrying the company URL.
pub const FIELD_COMPANY_URL: &str = "company_url";
/// Multipart field carrying the genre wire value.
pub const FIELD_GENRE: &str = "genre";

/// Undecoded HTTP response as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if present.
    pub content_type: Option<String>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns `true` when the content type names a video payload.
    pub fn is_video(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|value| value.to_ascii_lowercase().contains("video"))
            .unwrap_or(false)
    }
}

/// JSON success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoUrlResponse {
    /// Location of the generated video.
    #[serde(default)]
    pub video_url: Option<String>,
}

/// JSON failure body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable failure detail. Usually a string; structured details are
    /// rendered as compact JSON.
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorResponse {
    fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(text) if text.trim().is_empty() => None,
            Value::String(text) => Some(text.clone()),
            Value::Bool(false) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Reference to playable media returned by a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedVideo {
    /// Binary video held in memory, playable without another request.
    Local {
        /// Video bytes.
        bytes: Vec<u8>,
        /// Content type reported by the server.
        content_type: String,
    },
    /// Video hosted by the server.
    Remote {
        /// Absolute or server-relative URL.
        url: String,
    },
}

impl GeneratedVideo {
    /// Returns `true` for in-memory media.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }

    /// Content type, when known.
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::Local { content_type, .. } => Some(content_type),
            Self::Remote { .. } => None,
        }
    }

    /// Display label for the media.
    ///
    /// Remote media yields its URL, which a player can open. In-memory media
    /// yields a `blob:hiresong/<content type>;<length>` tag that only names
    /// the bytes and resolves nowhere; write the bytes to a file to play them.
    pub fn reference(&self) -> String {
        match self {
            Self::Local {
                bytes,
                content_type,
            } => format!("blob:hiresong/{content_type};{}", bytes.len()),
            Self::Remote { url } => url.clone(),
        }
    }
}

/// Interprets one generation response.
///
/// # Errors
/// - [`GenerationContractError::Server`] for non-2xx statuses.
/// - [`GenerationContractError::Decode`] for non-video success bodies that are
///   not JSON.
/// - [`GenerationContractError::MissingVideoUrl`] when the JSON body lacks a
///   usable `video_url`.
pub fn interpret_response(raw: RawResponse) -> Result<GeneratedVideo, GenerationContractError> {
    if !raw.is_success() {
        let detail = serde_json::from_slice::<ErrorResponse>(&raw.body)
            .ok()
            .and_then(|body| body.detail_text());
        return Err(GenerationContractError::Server {
            status: raw.status,
            detail,
        });
    }

    if raw.is_video() {
        let content_type = raw.content_type.unwrap_or_default();
        return Ok(GeneratedVideo::Local {
            bytes: raw.body,
            content_type,
        });
    }

    let parsed: VideoUrlResponse =
        serde_json::from_slice(&raw.body).map_err(GenerationContractError::Decode)?;
    match parsed.video_url {
        Some(url) if !url.trim().is_empty() => Ok(GeneratedVideo::Remote { url }),
        _ => Err(GenerationContractError::MissingVideoUrl),
    }
}

/// Generation contract errors. `Display` is the user-facing message.
#[derive(Debug, Error)]
pub enum GenerationContractError {
    /// Non-success HTTP status.
    #[error("{}", server_message(*status, detail.as_deref()))]
    Server {
        /// HTTP status code.
        status: u16,
        /// `detail` from the JSON error body.
        detail: Option<String>,
    },
    /// Success body carried no video reference.
    #[error("No video URL in response")]
    MissingVideoUrl,
    /// Success body was neither video nor JSON.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

fn server_message(status: u16, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => detail.to_string(),
        None => format!("Server error: {status}"),
    }
}
