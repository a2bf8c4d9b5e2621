//! Playback panel for a generated video.

use std::fs;
use std::path::{Path, PathBuf};

use hiresong_generation_contract::GeneratedVideo;
use tracing::info;

use crate::UiError;

/// File name used for downloads.
pub const DOWNLOAD_FILE_NAME: &str = "hiresong-pitch.mp4";

/// Headline shown above the player.
pub const SUCCESS_TITLE: &str = "🎉 Your Video Pitch is Ready!";

/// Line under the headline.
pub const SUCCESS_SUBTITLE: &str = "Watch your personalized 30-second pitch below";

/// Download button caption.
pub const DOWNLOAD_LABEL: &str = "⬇️ Download Video";

/// Reset button caption.
pub const CREATE_ANOTHER_LABEL: &str = "Create Another Video";

/// Holds the video returned by the last successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPanel {
    video: GeneratedVideo,
}

impl VideoPanel {
    /// Wraps a generated video.
    pub fn new(video: GeneratedVideo) -> Self {
        Self { video }
    }

    /// The video shown by the panel.
    pub fn video(&self) -> &GeneratedVideo {
        &self.video
    }

    /// Display label for the video; see [`GeneratedVideo::reference`].
    ///
    /// Only remote URLs are playable. Use [`VideoPanel::download`] for local media.
    pub fn source(&self) -> String {
        self.video.reference()
    }

    /// Writes the video to `dir/hiresong-pitch.mp4`.
    ///
    /// Local media is written directly; remote media is retrieved through
    /// `fetch` first.
    ///
    /// # Errors
    /// Returns [`UiError::Fetch`] when `fetch` fails and [`UiError::Io`] when
    /// the file cannot be written.
    pub fn download<F>(&self, dir: impl AsRef<Path>, fetch: F) -> Result<PathBuf, UiError>
    where
        F: FnOnce(&str) -> Result<Vec<u8>, String>,
    {
        let target = dir.as_ref().join(DOWNLOAD_FILE_NAME);
        let remote;
        let bytes: &[u8] = match &self.video {
            GeneratedVideo::Local { bytes, .. } => bytes.as_slice(),
            GeneratedVideo::Remote { url } => {
                remote = fetch(url).map_err(UiError::Fetch)?;
                remote.as_slice()
            }
        };

        fs::write(&target, bytes).map_err(|source| UiError::Io {
            path: target.clone(),
            source,
        })?;
        info!(path = %target.display(), bytes = bytes.len(), "video downloaded");
        Ok(target)
    }
}
