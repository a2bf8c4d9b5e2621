#![warn(missing_docs)]
//! # hiresong-capture
//!
//! ## Purpose
//! Provides the webcam abstraction and the selfie capture state machine.
//!
//! ## Responsibilities
//! - Define a backend-agnostic [`CaptureDevice`] trait.
//! - Expose a real Video4Linux device behind the `webcam` feature.
//! - Expose a deterministic synthetic device for CI and unit tests.
//! - Drive the drag-to-flash gesture and shutter interactions in
//!   [`CaptureSession`].
//! - Encode the captured frame as a JPEG [`SelectedFile`].
//!
//! ## Data flow
//! Shell opens a [`CaptureSession`] -> device delivers [`VideoFrame`]s -> the
//! gesture (or shutter) reaches `Flashing` -> after the flash delay the frame is
//! JPEG-encoded into `selfie.jpg` and handed back to the shell.
//!
//! ## Ownership and lifetimes
//! The session owns its device exclusively. The device is released on every
//! exit path: capture, failure, explicit release, and drop.
//!
//! ## Error model
//! Device acquisition and frame failures are reported as [`CaptureError`]
//! values; the session turns them into a persistent user-facing message.
//!
//! ## Timing
//! Every time-dependent operation takes an explicit `now_ms` so callers (and
//! tests) supply the clock.

mod session;
#[cfg(all(target_os = "linux", feature = "webcam"))]
mod v4l_device;

use std::sync::{Arc, Mutex};

use hiresong_core::SelectedFile;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;
use tracing::debug;

pub use session::{
    CAMERA_DENIED_MESSAGE, CaptureEvent, CaptureMode, CaptureSession, CaptureState, DECAY_INTERVAL_MS,
    DECAY_STEP, DRAG_UPDATE_INTERVAL_MS, DragOutcome, GESTURE_FLASH_MS, GESTURE_THRESHOLD,
    GESTURE_WINDOW_MS, SHUTTER_FLASH_MS,
};
#[cfg(all(target_os = "linux", feature = "webcam"))]
pub use v4l_device::V4lCaptureDevice;

/// Resolution requested when the camera is acquired.
pub const TARGET_RESOLUTION: Resolution = Resolution {
    width: 1280,
    height: 720,
};

/// JPEG quality used for captured selfies (0.95 on a unit scale).
pub const JPEG_QUALITY: u8 = 95;

/// File name given to captured selfies.
pub const CAPTURED_FILE_NAME: &str = "selfie.jpg";

/// MIME type given to captured selfies.
pub const CAPTURED_MIME_TYPE: &str = "image/jpeg";

/// Requested or native frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// One decoded video frame in RGB8 row-major layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// Native frame width.
    pub width: u32,
    /// Native frame height.
    pub height: u32,
    /// RGB bytes (`width * height * 3`).
    pub rgb: Vec<u8>,
}

impl VideoFrame {
    /// Constructs a validated frame.
    ///
    /// # Errors
    /// Returns [`CaptureError::InvalidFrame`] when the buffer does not match
    /// the declared geometry.
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self, CaptureError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or_else(|| CaptureError::InvalidFrame("frame dimensions overflow".to_string()))?;
        if width == 0 || height == 0 || rgb.len() != expected {
            return Err(CaptureError::InvalidFrame(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                rgb.len()
            )));
        }

        Ok(Self { width, height, rgb })
    }
}

/// Trait implemented by concrete camera providers.
pub trait CaptureDevice: Send {
    /// Acquires exclusive access to the camera at (or near) `resolution`.
    ///
    /// # Errors
    /// Returns [`CaptureError::PermissionDenied`] or [`CaptureError::Device`]
    /// when the camera cannot be acquired.
    fn open(&mut self, resolution: Resolution) -> Result<(), CaptureError>;

    /// Grabs the current frame at the device's native size.
    ///
    /// # Errors
    /// Returns [`CaptureError::NotOpen`] before a successful `open`.
    fn grab_frame(&mut self) -> Result<VideoFrame, CaptureError>;

    /// Stops every active media track and releases the hardware.
    fn stop_all_tracks(&mut self);

    /// Number of tracks currently running.
    fn active_tracks(&self) -> usize;
}

/// Encodes a frame as JPEG at the given quality.
///
/// # Errors
/// Returns [`CaptureError::Encode`] when the encoder rejects the frame.
pub fn encode_jpeg(frame: &VideoFrame, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, quality);
    encoder
        .encode(&frame.rgb, frame.width, frame.height, ExtendedColorType::Rgb8)
        .map_err(|error| CaptureError::Encode(error.to_string()))?;

    debug!(
        width = frame.width,
        height = frame.height,
        bytes = jpeg.len(),
        "encoded captured frame"
    );
    Ok(jpeg)
}

/// Encodes a frame into the selfie file handed back to the shell.
///
/// # Errors
/// Propagates encoding failures.
pub fn frame_to_selfie(frame: &VideoFrame) -> Result<SelectedFile, CaptureError> {
    let jpeg = encode_jpeg(frame, JPEG_QUALITY)?;
    SelectedFile::new(CAPTURED_FILE_NAME, CAPTURED_MIME_TYPE, jpeg)
        .map_err(|error| CaptureError::Encode(error.to_string()))
}

/// Shared observation point for a [`SyntheticCaptureDevice`].
///
/// Lets tests inspect track state after the device has moved into a session.
#[derive(Debug, Clone, Default)]
pub struct SyntheticTracks {
    inner: Arc<Mutex<SyntheticTrackState>>,
}

#[derive(Debug, Default)]
struct SyntheticTrackState {
    active: usize,
    opened: usize,
    stopped: usize,
    frames: u64,
}

impl SyntheticTracks {
    /// Tracks currently running.
    pub fn active(&self) -> usize {
        self.with_state(|state| state.active)
    }

    /// Successful `open` calls so far.
    pub fn opened(&self) -> usize {
        self.with_state(|state| state.opened)
    }

    /// Tracks stopped so far.
    pub fn stopped(&self) -> usize {
        self.with_state(|state| state.stopped)
    }

    /// Frames delivered so far.
    pub fn frames(&self) -> u64 {
        self.with_state(|state| state.frames)
    }

    fn with_state<T>(&self, read: impl FnOnce(&SyntheticTrackState) -> T) -> T {
        match self.inner.lock() {
            Ok(state) => read(&state),
            Err(poisoned) => read(&poisoned.into_inner()),
        }
    }
}

/// Deterministic synthetic camera for tests, CI, and headless runs.
#[derive(Debug)]
pub struct SyntheticCaptureDevice {
    native: Resolution,
    deny_access: bool,
    fail_grab: bool,
    tracks: SyntheticTracks,
}

impl SyntheticCaptureDevice {
    /// Creates a device with a small native frame size.
    pub fn new() -> Self {
        Self::with_native_size(16, 9)
    }

    /// Creates a device reporting the given native frame size.
    pub fn with_native_size(width: u32, height: u32) -> Self {
        Self {
            native: Resolution { width, height },
            deny_access: false,
            fail_grab: false,
            tracks: SyntheticTracks::default(),
        }
    }

    /// Creates a device that refuses access, as a denied permission prompt would.
    pub fn denied() -> Self {
        Self {
            deny_access: true,
            ..Self::new()
        }
    }

    /// Creates a device that opens normally but cannot deliver a frame.
    pub fn failing_grab() -> Self {
        Self {
            fail_grab: true,
            ..Self::new()
        }
    }

    /// Returns a handle that observes this device's tracks.
    pub fn tracks(&self) -> SyntheticTracks {
        self.tracks.clone()
    }
}

impl Default for SyntheticCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureDevice for SyntheticCaptureDevice {
    fn open(&mut self, resolution: Resolution) -> Result<(), CaptureError> {
        if self.deny_access {
            return Err(CaptureError::PermissionDenied);
        }

        let mut state = self
            .tracks
            .inner
            .lock()
            .map_err(|_| CaptureError::Device("synthetic track lock poisoned".to_string()))?;
        state.active = 1;
        state.opened += 1;
        debug!(
            requested_width = resolution.width,
            requested_height = resolution.height,
            native_width = self.native.width,
            native_height = self.native.height,
            "synthetic camera opened"
        );
        Ok(())
    }

    fn grab_frame(&mut self) -> Result<VideoFrame, CaptureError> {
        let mut state = self
            .tracks
            .inner
            .lock()
            .map_err(|_| CaptureError::Device("synthetic track lock poisoned".to_string()))?;
        if state.active == 0 {
            return Err(CaptureError::NotOpen);
        }
        if self.fail_grab {
            return Err(CaptureError::Device("synthetic frame unavailable".to_string()));
        }
        state.frames += 1;

        let shade = (state.frames % 255) as u8;
        let pixels = (self.native.width as usize) * (self.native.height as usize);
        let mut rgb = Vec::with_capacity(pixels * 3);
        for index in 0..pixels {
            let column = (index % self.native.width as usize) as u8;
            rgb.extend_from_slice(&[shade, column.wrapping_mul(16), 128]);
        }

        VideoFrame::new(self.native.width, self.native.height, rgb)
    }

    fn stop_all_tracks(&mut self) {
        if let Ok(mut state) = self.tracks.inner.lock() {
            state.stopped += state.active;
            state.active = 0;
        }
    }

    fn active_tracks(&self) -> usize {
        self.tracks.active()
    }
}

/// Capture layer error type.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The user or the OS denied camera access.
    #[error("camera access denied")]
    PermissionDenied,
    /// The camera was used before being opened.
    #[error("camera is not open")]
    NotOpen,
    /// Frame buffer does not match its geometry.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    /// JPEG encoding failed.
    #[error("photo encoding failed: {0}")]
    Encode(String),
    /// Backend runtime failure.
    #[error("camera backend failure: {0}")]
    Device(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for synthetic capture and encoding.

    use super::*;

    #[test]
    fn synthetic_device_generates_native_frames() {
        let mut device = SyntheticCaptureDevice::with_native_size(4, 2);
        device.open(TARGET_RESOLUTION).expect("open should work");
        let frame = device.grab_frame().expect("capture should work");
        assert_eq!(frame.width, 4);
        assert_eq!(frame.height, 2);
        assert_eq!(frame.rgb.len(), 4 * 2 * 3);
    }

    #[test]
    fn synthetic_device_requires_open() {
        let mut device = SyntheticCaptureDevice::new();
        assert!(matches!(device.grab_frame(), Err(CaptureError::NotOpen)));
    }

    #[test]
    fn encodes_selfie_as_jpeg() {
        let frame = VideoFrame::new(2, 2, vec![200; 12]).expect("frame");
        let selfie = frame_to_selfie(&frame).expect("encode should work");
        assert_eq!(selfie.name(), "selfie.jpg");
        assert_eq!(selfie.mime_type(), "image/jpeg");
        assert_eq!(&selfie.bytes()[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn rejects_mismatched_frame_buffers() {
        assert!(VideoFrame::new(2, 2, vec![0; 11]).is_err());
        assert!(VideoFrame::new(0, 2, vec![]).is_err());
    }
}
