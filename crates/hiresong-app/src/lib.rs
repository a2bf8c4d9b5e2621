#![warn(missing_docs)]
//! # hiresong-app
//!
//! ## Purpose
//! Orchestrates the shell, the generation client, and the webcam capture
//! session for the `hiresong` binary.
//!
//! ## Responsibilities
//! - Load runtime configuration from the environment.
//! - Initialise structured logging.
//! - Run one submission at a time on a worker thread and feed the outcome
//!   back into the shell.
//! - Translate terminal key presses into capture session input.
//!
//! ## Data flow
//! CLI arguments -> [`ShellState`] -> [`SubmissionTicket`] ->
//! [`spawn_submission`] worker -> [`SubmissionOutcome`] ->
//! [`ShellState::finish_submit`] -> download.
//!
//! ## Ownership and lifetimes
//! Tickets and the client move into the worker; the shell never leaves the
//! calling thread.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Network and validation
//! failures end up as banner text on the shell, never as panics.

mod capture_control;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use hiresong_capture::{CaptureDevice, CaptureError, SyntheticCaptureDevice, TARGET_RESOLUTION};
use hiresong_client::{
    ClientError, GenerationClient, HttpTransport, base_url_from_env, timeout_from_env,
    validate_base_url,
};
use hiresong_core::{CoreError, SelectedFile};
use hiresong_generation_contract::GeneratedVideo;
use hiresong_ui::{ShellState, SubmissionTicket, SubmitRejection, UiError};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub use capture_control::{CaptureCommand, CaptureController, SLIDER_STEP};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("HIRESONG_VERSION");

/// Environment variable selecting the download directory.
pub const OUTPUT_DIR_ENV: &str = "HIRESONG_OUTPUT_DIR";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Installs the `fmt` subscriber. `RUST_LOG` overrides the `info` default.
///
/// Calling it twice is harmless; the second call leaves the first subscriber
/// in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Generation API base URL, normalized.
    pub api_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Directory receiving downloads and snapshots.
    pub output_dir: PathBuf,
}

impl AppConfig {
    /// Reads `HIRESONG_API_URL` / `VITE_API_URL`, `HIRESONG_HTTP_TIMEOUT_SECS`
    /// and `HIRESONG_OUTPUT_DIR`.
    ///
    /// # Errors
    /// Returns [`AppError::Client`] when the configured API URL is invalid.
    pub fn from_env() -> Result<Self, AppError> {
        let output_dir = std::env::var(OUTPUT_DIR_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            api_url: validate_base_url(&base_url_from_env())?,
            timeout: timeout_from_env(),
            output_dir,
        })
    }

    /// Applies command-line overrides on top of the environment.
    ///
    /// # Errors
    /// Returns [`AppError::Client`] when the overriding API URL is invalid.
    pub fn with_overrides(
        mut self,
        api_url: Option<&str>,
        output_dir: Option<&Path>,
    ) -> Result<Self, AppError> {
        if let Some(api_url) = api_url {
            self.api_url = validate_base_url(api_url)?;
        }
        if let Some(output_dir) = output_dir {
            self.output_dir = output_dir.to_path_buf();
        }
        Ok(self)
    }

    /// Builds a client backed by the `reqwest` transport.
    ///
    /// # Errors
    /// Returns [`AppError::Client`] when the HTTP client cannot be created.
    pub fn http_client(&self) -> Result<GenerationClient, AppError> {
        let transport = HttpTransport::new(self.timeout)?;
        Ok(GenerationClient::new(&self.api_url, Arc::new(transport))?)
    }
}

/// Milliseconds since the clock was created; feeds every `now_ms` argument.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    started: Instant,
}

impl MonotonicClock {
    /// Starts the clock at zero.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Elapsed milliseconds.
    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one generation request, tagged with its ticket.
#[derive(Debug)]
pub struct SubmissionOutcome {
    /// Ticket the request was issued for.
    pub ticket: SubmissionTicket,
    /// Video or the user-facing failure message.
    pub result: Result<GeneratedVideo, String>,
}

/// Runs a ticket's request against the client.
pub fn execute_ticket(
    client: &GenerationClient,
    ticket: &SubmissionTicket,
) -> Result<GeneratedVideo, String> {
    let request = client.request_for(ticket.submission().clone());
    client
        .generate(&request)
        .map_err(|error| error.user_message())
}

/// Runs the request on a worker thread and reports through a channel.
///
/// # Errors
/// Returns [`AppError::Worker`] when the thread cannot be spawned.
pub fn spawn_submission(
    client: GenerationClient,
    ticket: SubmissionTicket,
) -> Result<Receiver<SubmissionOutcome>, AppError> {
    let (outcome_tx, outcome_rx) = mpsc::channel();
    thread::Builder::new()
        .name("hiresong-submit".to_string())
        .spawn(move || {
            let result = execute_ticket(&client, &ticket);
            if outcome_tx.send(SubmissionOutcome { ticket, result }).is_err() {
                warn!("submission outcome dropped: receiver closed");
            }
        })
        .map_err(|error| AppError::Worker(error.to_string()))?;
    Ok(outcome_rx)
}

/// Validates, submits, and applies the outcome on the calling thread.
///
/// Returns `true` when the shell now shows a video.
///
/// # Errors
/// Returns [`SubmitRejection`] when validation fails or a request is already
/// in flight; nothing is sent in that case.
pub fn submit_blocking(
    shell: &mut ShellState,
    client: &GenerationClient,
) -> Result<bool, SubmitRejection> {
    let ticket = shell.begin_submit()?;
    let result = execute_ticket(client, &ticket);
    shell.finish_submit(&ticket, result);
    Ok(shell.video().is_some())
}

/// Saves the shell's video under `dir`, fetching remote media through the
/// client.
///
/// # Errors
/// Returns [`UiError::NoVideo`] (wrapped) when nothing has been generated.
pub fn download_video(
    shell: &ShellState,
    client: &GenerationClient,
    dir: &Path,
) -> Result<PathBuf, AppError> {
    let panel = shell.video().ok_or(UiError::NoVideo)?;
    let path = panel.download(dir, |url| {
        client
            .fetch_video(&GeneratedVideo::Remote {
                url: url.to_string(),
            })
            .map_err(|error| error.user_message())
    })?;
    Ok(path)
}

/// Reads a file from disk for one of the pickers.
///
/// # Errors
/// Returns [`AppError::Core`] for unreadable or unsupported files.
pub fn load_file(path: &Path) -> Result<SelectedFile, AppError> {
    Ok(SelectedFile::from_path(path)?)
}

/// Opens the capture backend.
///
/// `synthetic` selects a generated test pattern at the target resolution.
///
/// # Errors
/// Returns [`AppError::Capture`] when no real camera backend was compiled in.
pub fn capture_device(synthetic: bool) -> Result<Box<dyn CaptureDevice>, AppError> {
    if synthetic {
        info!("using synthetic camera");
        return Ok(Box::new(SyntheticCaptureDevice::with_native_size(
            TARGET_RESOLUTION.width,
            TARGET_RESOLUTION.height,
        )));
    }

    #[cfg(all(target_os = "linux", feature = "webcam"))]
    {
        Ok(Box::new(hiresong_capture::V4lCaptureDevice::new(0)))
    }

    #[cfg(not(all(target_os = "linux", feature = "webcam")))]
    {
        Err(AppError::Capture(CaptureError::Device(
            "no camera backend built in; rebuild with --features webcam or pass --synthetic-camera"
                .to_string(),
        )))
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// File loading or model error.
    #[error(transparent)]
    Core(#[from] CoreError),
    /// Client configuration or transport error.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// UI state error.
    #[error(transparent)]
    Ui(#[from] UiError),
    /// Camera error.
    #[error("camera error: {0}")]
    Capture(#[from] CaptureError),
    /// Worker thread could not be started.
    #[error("cannot start worker: {0}")]
    Worker(String),
}
