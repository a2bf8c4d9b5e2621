#![warn(missing_docs)]
//! # hiresong-core
//!
//! ## Purpose
//! Defines the pure data model used across the `hiresong` workspace.
//!
//! ## Responsibilities
//! - Represent user-selected files (selfie image, CV PDF) with MIME category.
//! - Model the closed music [`Genre`] set including the "Surprise Me" sentinel.
//! - Validate the [`SubmissionForm`] before anything reaches the network.
//!
//! ## Data flow
//! File picker or webcam capture produces a [`SelectedFile`] -> the shell
//! stores it in [`SubmissionForm`] -> [`SubmissionForm::validate`] yields a
//! [`ValidatedSubmission`] consumed by the generation client.
//!
//! ## Ownership and lifetimes
//! Files own their byte buffers (`Vec<u8>`). A selection is replaced or
//! cleared as a whole and never mutated in place.
//!
//! ## Error model
//! Construction failures return [`CoreError`]. Missing form input returns
//! [`ValidationError`], whose `Display` text is the user-facing message.
//!
//! ## Security and privacy notes
//! This crate never logs file bytes. Fingerprints are one-way SHA-256 digests.
//!
//! ## Example
//! ```rust
//! use hiresong_core::{Genre, SelectedFile, SubmissionForm, ValidationError};
//!
//! let mut form = SubmissionForm::default();
//! assert_eq!(form.validate().unwrap_err(), ValidationError::MissingSelfie);
//!
//! form.selfie = Some(SelectedFile::new("me.png", "image/png", vec![1, 2, 3]).unwrap());
//! form.cv = Some(SelectedFile::new("cv.pdf", "application/pdf", vec![4, 5]).unwrap());
//! form.company_url = "https://example.com".to_string();
//! let submission = form.validate().expect("form is complete");
//! assert_eq!(submission.genre, Genre::SurpriseMe);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Bytes per megabyte used for size labels and size-aware comments.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Broad MIME category of a selected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// Any `image/*` payload (selfie).
    Image,
    /// `application/pdf` payload (CV).
    Pdf,
}

impl FileCategory {
    /// Maps a MIME type to its category.
    ///
    /// Returns `None` for MIME types the product does not accept.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let normalized = mime_type.trim().to_ascii_lowercase();
        if normalized.starts_with("image/") {
            Some(Self::Image)
        } else if normalized == "application/pdf" {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    /// Lowercase category tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
        }
    }
}

/// One file chosen by the user or produced by the webcam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    mime_type: String,
    category: FileCategory,
    bytes: Vec<u8>,
}

impl SelectedFile {
    /// Creates a validated file selection.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidFileName`] for a blank name and
    /// [`CoreError::UnsupportedMimeType`] when the MIME type is neither an
    /// image nor a PDF.
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidFileName);
        }

        let mime_type = mime_type.into().trim().to_ascii_lowercase();
        let category = FileCategory::from_mime(&mime_type)
            .ok_or_else(|| CoreError::UnsupportedMimeType(mime_type.clone()))?;

        Ok(Self {
            name,
            mime_type,
            category,
            bytes,
        })
    }

    /// Reads a file from disk, inferring the MIME type from its extension.
    ///
    /// # Errors
    /// Returns [`CoreError::Io`] when the file cannot be read and
    /// [`CoreError::UnsupportedMimeType`] for unknown extensions.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let mime_type = mime_from_extension(path).ok_or_else(|| {
            CoreError::UnsupportedMimeType(format!("unknown extension: {}", path.display()))
        })?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(CoreError::InvalidFileName)?
            .to_string();
        let bytes = std::fs::read(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::new(name, mime_type, bytes)
    }

    /// File name shown in previews and sent as the multipart file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// MIME category.
    pub fn category(&self) -> FileCategory {
        self.category
    }

    /// Raw payload bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the selection and returns the payload bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Payload size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Payload size in megabytes.
    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / BYTES_PER_MB
    }

    /// Size rendered with two decimals, e.g. `"0.12 MB"`.
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size_mb())
    }

    /// Stable hex SHA-256 over name and content.
    ///
    /// Two selections of the same file on disk produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update([0_u8]);
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }
}

/// Infers a MIME type from a path extension.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Music style for the generated pitch song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Genre {
    /// Let the generator pick a style.
    #[default]
    #[serde(rename = "Surprise Me")]
    SurpriseMe,
    /// Pop.
    Pop,
    /// Rock.
    Rock,
    /// Rap / Hip-Hop.
    Rap,
    /// Electronic / Dance.
    Electronic,
    /// Country.
    Country,
    /// Jazz.
    Jazz,
    /// R&B.
    #[serde(rename = "R&B")]
    RnB,
    /// Metal.
    Metal,
    /// Indie.
    Indie,
    /// Ballad.
    Ballad,
}

impl Genre {
    /// Every genre in display order, sentinel first.
    pub const ALL: [Genre; 11] = [
        Genre::SurpriseMe,
        Genre::Pop,
        Genre::Rock,
        Genre::Rap,
        Genre::Electronic,
        Genre::Country,
        Genre::Jazz,
        Genre::RnB,
        Genre::Metal,
        Genre::Indie,
        Genre::Ballad,
    ];

    /// Value sent in the `genre` multipart field.
    pub fn wire_value(&self) -> &'static str {
        match self {
            Genre::SurpriseMe => "Surprise Me",
            Genre::Pop => "Pop",
            Genre::Rock => "Rock",
            Genre::Rap => "Rap",
            Genre::Electronic => "Electronic",
            Genre::Country => "Country",
            Genre::Jazz => "Jazz",
            Genre::RnB => "R&B",
            Genre::Metal => "Metal",
            Genre::Indie => "Indie",
            Genre::Ballad => "Ballad",
        }
    }

    /// Label shown in the genre picker.
    pub fn label(&self) -> &'static str {
        match self {
            Genre::SurpriseMe => "🎲 Surprise Me",
            Genre::Pop => "🎤 Pop",
            Genre::Rock => "🎸 Rock",
            Genre::Rap => "🎤 Rap / Hip-Hop",
            Genre::Electronic => "🎧 Electronic / Dance",
            Genre::Country => "🤠 Country",
            Genre::Jazz => "🎷 Jazz",
            Genre::RnB => "💿 R&B",
            Genre::Metal => "🤘 Metal",
            Genre::Indie => "🎹 Indie",
            Genre::Ballad => "🎻 Ballad",
        }
    }

    /// Returns `true` for the non-deterministic sentinel.
    pub fn is_surprise(&self) -> bool {
        matches!(self, Genre::SurpriseMe)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_value())
    }
}

impl FromStr for Genre {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Genre::ALL
            .into_iter()
            .find(|genre| genre.wire_value().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownGenre(wanted.to_string()))
    }
}

/// Top-level form state owned by the application shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionForm {
    /// Selfie image, uploaded or captured.
    pub selfie: Option<SelectedFile>,
    /// CV document.
    pub cv: Option<SelectedFile>,
    /// Company website URL as typed by the user.
    pub company_url: String,
    /// Selected music genre.
    pub genre: Genre,
}

impl SubmissionForm {
    /// Returns `true` when every required field is filled.
    pub fn is_complete(&self) -> bool {
        self.selfie.is_some() && self.cv.is_some() && !self.company_url.trim().is_empty()
    }

    /// Validates required fields in fixed order: selfie, CV, company URL.
    ///
    /// # Errors
    /// Returns the first failing [`ValidationError`].
    pub fn validate(&self) -> Result<ValidatedSubmission, ValidationError> {
        let selfie = self.selfie.as_ref().ok_or(ValidationError::MissingSelfie)?;
        let cv = self.cv.as_ref().ok_or(ValidationError::MissingCv)?;
        if self.company_url.trim().is_empty() {
            return Err(ValidationError::MissingCompanyUrl);
        }

        Ok(ValidatedSubmission {
            selfie: selfie.clone(),
            cv: cv.clone(),
            company_url: self.company_url.clone(),
            genre: self.genre,
        })
    }
}

/// Form snapshot that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    /// Selfie image.
    pub selfie: SelectedFile,
    /// CV document.
    pub cv: SelectedFile,
    /// Company URL, sent exactly as entered.
    pub company_url: String,
    /// Selected genre.
    pub genre: Genre,
}

/// Missing-input validation failures. `Display` is the user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No selfie selected or captured.
    #[error("Please upload or capture a selfie")]
    MissingSelfie,
    /// No CV selected.
    #[error("Please upload your CV (PDF)")]
    MissingCv,
    /// Company URL is empty or whitespace.
    #[error("Please enter the company website URL")]
    MissingCompanyUrl,
}

/// Error type for core model construction.
#[derive(Debug, Error)]
pub enum CoreError {
    /// File name is blank or not valid UTF-8.
    #[error("file name is empty or invalid")]
    InvalidFileName,
    /// MIME type is outside the accepted image/PDF set.
    #[error("unsupported mime type: {0}")]
    UnsupportedMimeType(String),
    /// Genre string does not name a known genre.
    #[error("unknown genre: {0}")]
    UnknownGenre(String),
    /// File could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
