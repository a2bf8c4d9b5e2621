#![warn(missing_docs)]
//! # hiresong-ui
//!
//! ## Purpose
//! Defines the UI-facing state of the HireSong client, independent of any
//! rendering toolkit.
//!
//! ## Responsibilities
//! - Own the submission form and drive validation and submission tickets.
//! - Model file pickers with accept filters and judgment comments.
//! - Model the evasive submit button and the rotating header badge.
//! - Hold the generated video and write downloads.
//!
//! ## Data flow
//! Front-end events (picks, hovers, key presses) mutate [`ShellState`] with
//! explicit `now_ms` timestamps. [`ShellState::begin_submit`] hands a
//! [`SubmissionTicket`] to the caller, which performs the network request and
//! reports back through [`ShellState::finish_submit`].
//!
//! ## Ownership and lifetimes
//! The shell owns every file and the generated video. Tickets own a copy of
//! the validated submission so the request can move to a worker thread.
//!
//! ## Error model
//! User mistakes become banner text on the shell. Picker rejections, thumbnail
//! decoding and downloads return [`UiError`].
//!
//! ## Security and privacy notes
//! File contents are never logged.

use std::path::PathBuf;

use thiserror::Error;

mod evasive;
mod file_selector;
mod header;
mod shell;
mod video_panel;

pub use evasive::{
    EvasiveButton, LARGE_ENVELOPE, LARGE_ENVELOPE_HOVERS, MIN_SCALE, SMALL_ENVELOPE,
};
pub use file_selector::{
    AcceptFilter, COMMENT_LIFETIME_MS, FileSelector, JudgeComment, LARGE_CV_MB, SelectionChange,
    THUMBNAIL_EDGE, Thumbnail, comment_pool, judge_file,
};
pub use header::{HEADER_EMOJIS, HeaderBadge, ROTATION_INTERVAL_MS};
pub use shell::{
    CANCEL_CAMERA_LABEL, GENERATING_LABEL, SUBMIT_LABEL, ShellState, SubmissionTicket,
    SubmitRejection, TAKE_SELFIE_LABEL,
};
pub use video_panel::{
    CREATE_ANOTHER_LABEL, DOWNLOAD_FILE_NAME, DOWNLOAD_LABEL, SUCCESS_SUBTITLE, SUCCESS_TITLE,
    VideoPanel,
};

/// Errors raised by UI state operations.
#[derive(Debug, Error)]
pub enum UiError {
    /// File does not match the picker's accept filter.
    #[error("{name} is not accepted here (expected {accept})")]
    RejectedFile {
        /// Rejected file name.
        name: String,
        /// Accept string of the picker.
        accept: String,
    },
    /// Image preview could not be decoded.
    #[error("cannot preview image: {0}")]
    Thumbnail(String),
    /// No video is available.
    #[error("no video has been generated yet")]
    NoVideo,
    /// Remote video could not be retrieved.
    #[error("cannot fetch video: {0}")]
    Fetch(String),
    /// Filesystem failure while saving.
    #[error("cannot write {}: {source}", path.display())]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
