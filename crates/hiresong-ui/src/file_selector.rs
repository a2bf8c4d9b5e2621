//! File picker state with accept filtering and judgment comments.

use hiresong_core::{FileCategory, SelectedFile};
use image::GenericImageView;
use rand::Rng;
use tracing::debug;

use crate::UiError;

/// How long a judgment comment stays visible.
pub const COMMENT_LIFETIME_MS: u64 = 4_000;

/// PDFs above this size get the "thick CV" comment.
pub const LARGE_CV_MB: f64 = 5.0;

/// Longest thumbnail edge in pixels.
pub const THUMBNAIL_EDGE: u32 = 96;

const IMAGE_COMMENTS: [&str; 5] = [
    "You look... unique! 📸",
    "Is that really your best angle? 🤨",
    "Professional! (kind of) 👔",
    "I've seen worse selfies! 😅",
    "Camera loves you! (or does it?) 📷",
];

const LARGE_CV_COMMENT: &str = "Wow, that's a THICC CV! 📚";
const COMPACT_CV_COMMENT: &str = "Nice and compact CV! 📄";

const PDF_COMMENTS: [&str; 4] = [
    "I bet this CV is full of lies... 😏",
    "Hope there are no typos in there! 🤞",
    "Did you really graduate from there? 🤔",
    "Your CV looks... interesting... 👀",
];

/// Browser-style accept filter (`"image/*"`, `".pdf,application/pdf"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptFilter {
    raw: String,
    rules: Vec<AcceptRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AcceptRule {
    Extension(String),
    MimePrefix(String),
    Mime(String),
}

impl AcceptFilter {
    /// Parses a comma-separated accept string. Blank entries are skipped.
    pub fn parse(raw: &str) -> Self {
        let rules = raw
            .split(',')
            .map(|entry| entry.trim().to_ascii_lowercase())
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                if let Some(extension) = entry.strip_prefix('.') {
                    AcceptRule::Extension(extension.to_string())
                } else if let Some(prefix) = entry.strip_suffix("/*") {
                    AcceptRule::MimePrefix(format!("{prefix}/"))
                } else {
                    AcceptRule::Mime(entry)
                }
            })
            .collect();

        Self {
            raw: raw.to_string(),
            rules,
        }
    }

    /// Original accept string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` when any rule matches the file. An empty filter accepts all.
    pub fn accepts(&self, file: &SelectedFile) -> bool {
        if self.rules.is_empty() {
            return true;
        }

        let name = file.name().to_ascii_lowercase();
        let mime = file.mime_type();
        self.rules.iter().any(|rule| match rule {
            AcceptRule::Extension(extension) => name.ends_with(&format!(".{extension}")),
            AcceptRule::MimePrefix(prefix) => mime.starts_with(prefix.as_str()),
            AcceptRule::Mime(exact) => mime == exact.as_str(),
        })
    }
}

/// Outcome of choosing a file in the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// A new file was selected and reported upward.
    Selected(SelectedFile),
    /// The picker already held this exact file; no change event fired.
    Unchanged,
}

/// Judgment comment with its expiry time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeComment {
    /// Comment text.
    pub text: &'static str,
    /// Time at which the comment disappears.
    pub expires_at_ms: u64,
}

/// Small RGBA preview of an image selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA bytes.
    pub rgba: Vec<u8>,
}

/// State of one file picker (selfie or CV).
#[derive(Debug, Clone)]
pub struct FileSelector {
    label: String,
    category: FileCategory,
    filter: AcceptFilter,
    file: Option<SelectedFile>,
    picker_value: Option<String>,
    comment: Option<JudgeComment>,
}

impl FileSelector {
    /// Creates an empty selector.
    pub fn new(label: impl Into<String>, accept: &str, category: FileCategory) -> Self {
        Self {
            label: label.into(),
            category,
            filter: AcceptFilter::parse(accept),
            file: None,
            picker_value: None,
            comment: None,
        }
    }

    /// Selfie picker: `"Upload Photo"`, `image/*`.
    pub fn selfie() -> Self {
        Self::new("Upload Photo", "image/*", FileCategory::Image)
    }

    /// CV picker: `"Upload CV (PDF)"`, `.pdf,application/pdf`.
    pub fn cv() -> Self {
        Self::new("Upload CV (PDF)", ".pdf,application/pdf", FileCategory::Pdf)
    }

    /// Picker button label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Accept filter.
    pub fn filter(&self) -> &AcceptFilter {
        &self.filter
    }

    /// Currently selected file.
    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// Returns `true` when the underlying picker holds no value.
    pub fn picker_is_reset(&self) -> bool {
        self.picker_value.is_none()
    }

    /// Handles a file chosen in the picker.
    ///
    /// # Errors
    /// Returns [`UiError::RejectedFile`] when the accept filter does not match.
    pub fn choose<R: Rng + ?Sized>(
        &mut self,
        file: SelectedFile,
        now_ms: u64,
        rng: &mut R,
    ) -> Result<SelectionChange, UiError> {
        if !self.filter.accepts(&file) {
            return Err(UiError::RejectedFile {
                name: file.name().to_string(),
                accept: self.filter.as_str().to_string(),
            });
        }

        let fingerprint = file.fingerprint();
        if self.picker_value.as_deref() == Some(fingerprint.as_str()) {
            debug!(name = file.name(), "picker value unchanged");
            return Ok(SelectionChange::Unchanged);
        }

        self.picker_value = Some(fingerprint);
        self.comment = Some(JudgeComment {
            text: judge_file(self.category, &file, rng),
            expires_at_ms: now_ms.saturating_add(COMMENT_LIFETIME_MS),
        });
        self.file = Some(file.clone());
        debug!(name = file.name(), size = file.size_bytes(), "file selected");
        Ok(SelectionChange::Selected(file))
    }

    /// Shows a file that did not come from the picker (webcam capture).
    pub fn adopt(&mut self, file: SelectedFile) {
        self.file = Some(file);
        self.picker_value = None;
        self.comment = None;
    }

    /// Clears the file and resets the picker so the same file can be chosen again.
    pub fn remove(&mut self) {
        self.file = None;
        self.picker_value = None;
        self.comment = None;
    }

    /// Visible judgment comment at `now_ms`.
    pub fn comment(&self, now_ms: u64) -> Option<&'static str> {
        self.comment
            .as_ref()
            .filter(|comment| now_ms < comment.expires_at_ms)
            .map(|comment| comment.text)
    }

    /// Drops the comment once expired.
    pub fn expire_comment(&mut self, now_ms: u64) {
        if self
            .comment
            .as_ref()
            .is_some_and(|comment| now_ms >= comment.expires_at_ms)
        {
            self.comment = None;
        }
    }

    /// Name and size line shown in the preview.
    pub fn preview_caption(&self) -> Option<String> {
        self.file
            .as_ref()
            .map(|file| format!("{} ({})", file.name(), file.size_label()))
    }

    /// Decodes a thumbnail for image selections.
    ///
    /// Returns `Ok(None)` for PDFs and empty selectors.
    ///
    /// # Errors
    /// Returns [`UiError::Thumbnail`] when the image cannot be decoded.
    pub fn thumbnail(&self) -> Result<Option<Thumbnail>, UiError> {
        let Some(file) = self.file.as_ref() else {
            return Ok(None);
        };
        if file.category() != FileCategory::Image {
            return Ok(None);
        }

        let decoded = image::load_from_memory(file.bytes())
            .map_err(|error| UiError::Thumbnail(error.to_string()))?;
        let preview = decoded.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE);
        let (width, height) = preview.dimensions();
        Ok(Some(Thumbnail {
            width,
            height,
            rgba: preview.to_rgba8().into_raw(),
        }))
    }
}

/// Picks a judgment comment for a freshly selected file.
pub fn judge_file<R: Rng + ?Sized>(
    category: FileCategory,
    file: &SelectedFile,
    rng: &mut R,
) -> &'static str {
    match category {
        FileCategory::Image => IMAGE_COMMENTS[rng.random_range(0..IMAGE_COMMENTS.len())],
        FileCategory::Pdf => {
            let index = rng.random_range(0..=PDF_COMMENTS.len());
            if index == 0 {
                if file.size_mb() > LARGE_CV_MB {
                    LARGE_CV_COMMENT
                } else {
                    COMPACT_CV_COMMENT
                }
            } else {
                PDF_COMMENTS[index - 1]
            }
        }
    }
}

/// Every comment `judge_file` may produce for a category.
pub fn comment_pool(category: FileCategory) -> Vec<&'static str> {
    match category {
        FileCategory::Image => IMAGE_COMMENTS.to_vec(),
        FileCategory::Pdf => {
            let mut pool = vec![LARGE_CV_COMMENT, COMPACT_CV_COMMENT];
            pool.extend_from_slice(&PDF_COMMENTS);
            pool
        }
    }
}
