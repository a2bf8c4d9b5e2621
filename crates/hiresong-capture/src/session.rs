//! Selfie capture state machine.
//!
//! States run `Initializing -> Ready -> Dragging -> Flashing -> Captured`,
//! with `CameraError` reachable when the camera cannot be acquired or the
//! final frame cannot be captured.

use hiresong_core::SelectedFile;
use tracing::{debug, info, warn};

use crate::{CaptureDevice, TARGET_RESOLUTION, frame_to_selfie};

/// Message shown for any camera acquisition failure.
pub const CAMERA_DENIED_MESSAGE: &str = "Unable to access camera. Please check permissions.";

/// Minimum spacing between accepted intensity updates while dragging.
pub const DRAG_UPDATE_INTERVAL_MS: u64 = 100;

/// Intensity at which a drag counts as reaching the maximum.
pub const GESTURE_THRESHOLD: u8 = 95;

/// The maximum must be reached strictly within this window after drag start.
pub const GESTURE_WINDOW_MS: u64 = 1_000;

/// Flash overlay duration before a gesture capture.
pub const GESTURE_FLASH_MS: u64 = 300;

/// Flash overlay duration before a shutter-button capture.
pub const SHUTTER_FLASH_MS: u64 = 200;

/// Idle decay step applied per [`DECAY_INTERVAL_MS`].
pub const DECAY_STEP: u8 = 5;

/// Idle decay period.
pub const DECAY_INTERVAL_MS: u64 = 50;

const MAX_INTENSITY: u8 = 100;

/// Interaction offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// Drag the brightness control to the maximum quickly.
    #[default]
    Gesture,
    /// Press an explicit "Take Photo" button.
    Shutter,
}

/// Capture session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Camera has been requested but not acquired yet.
    Initializing,
    /// Live preview running, waiting for input.
    Ready,
    /// Brightness control is held.
    Dragging,
    /// Flash overlay is showing; capture pending.
    Flashing,
    /// Photo produced and camera released.
    Captured,
    /// Camera could not be used.
    CameraError,
}

/// Result of one drag update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// The session was not dragging.
    Ignored,
    /// Dropped by the update rate limit.
    Throttled,
    /// Intensity updated.
    Accepted,
    /// Intensity updated and the flash started.
    Flash,
}

/// Event emitted by [`CaptureSession::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Photo captured after the flash.
    Captured(SelectedFile),
    /// Capture failed after the flash; the message is user-facing.
    Failed(String),
}

/// One webcam activation and its transient interaction state.
pub struct CaptureSession {
    device: Option<Box<dyn CaptureDevice>>,
    mode: CaptureMode,
    state: CaptureState,
    intensity: u8,
    drag_started_at_ms: Option<u64>,
    last_accepted_update_ms: Option<u64>,
    flash_deadline_ms: Option<u64>,
    decay_anchor_ms: u64,
    error: Option<String>,
}

impl CaptureSession {
    /// Creates a session in `Initializing` that owns `device`.
    pub fn new(device: Box<dyn CaptureDevice>, mode: CaptureMode) -> Self {
        Self {
            device: Some(device),
            mode,
            state: CaptureState::Initializing,
            intensity: 0,
            drag_started_at_ms: None,
            last_accepted_update_ms: None,
            flash_deadline_ms: None,
            decay_anchor_ms: 0,
            error: None,
        }
    }

    /// Creates a session and immediately requests the camera.
    pub fn start(device: Box<dyn CaptureDevice>, mode: CaptureMode, now_ms: u64) -> Self {
        let mut session = Self::new(device, mode);
        session.activate(now_ms);
        session
    }

    /// Requests the camera at the target resolution.
    ///
    /// On failure the session moves to `CameraError` with
    /// [`CAMERA_DENIED_MESSAGE`]. No retry is attempted.
    pub fn activate(&mut self, now_ms: u64) -> CaptureState {
        if self.state != CaptureState::Initializing {
            return self.state;
        }

        let Some(device) = self.device.as_mut() else {
            self.fail(CAMERA_DENIED_MESSAGE.to_string());
            return self.state;
        };

        match device.open(TARGET_RESOLUTION) {
            Ok(()) => {
                self.state = CaptureState::Ready;
                self.decay_anchor_ms = now_ms;
                info!(mode = ?self.mode, "camera ready");
            }
            Err(error) => {
                warn!(%error, "camera acquisition failed");
                self.fail(CAMERA_DENIED_MESSAGE.to_string());
            }
        }

        self.state
    }

    /// Presses the brightness control. `Ready -> Dragging`.
    pub fn press(&mut self, now_ms: u64) -> bool {
        if self.state != CaptureState::Ready || self.mode != CaptureMode::Gesture {
            return false;
        }

        self.state = CaptureState::Dragging;
        self.drag_started_at_ms = Some(now_ms);
        debug!(now_ms, "drag started");
        true
    }

    /// Moves the brightness control to `value` (clamped to 0-100).
    ///
    /// Updates closer than [`DRAG_UPDATE_INTERVAL_MS`] to the last accepted
    /// update are dropped. Reaching [`GESTURE_THRESHOLD`] in less than
    /// [`GESTURE_WINDOW_MS`] after the press starts the flash.
    pub fn drag_to(&mut self, value: u8, now_ms: u64) -> DragOutcome {
        if self.state != CaptureState::Dragging {
            return DragOutcome::Ignored;
        }

        if let Some(last) = self.last_accepted_update_ms
            && now_ms.saturating_sub(last) < DRAG_UPDATE_INTERVAL_MS
        {
            return DragOutcome::Throttled;
        }

        self.last_accepted_update_ms = Some(now_ms);
        self.intensity = value.min(MAX_INTENSITY);

        let started = self.drag_started_at_ms.unwrap_or(now_ms);
        let elapsed = now_ms.saturating_sub(started);
        if self.intensity >= GESTURE_THRESHOLD && elapsed < GESTURE_WINDOW_MS {
            info!(elapsed_ms = elapsed, "gesture completed");
            self.enter_flash(now_ms, GESTURE_FLASH_MS);
            return DragOutcome::Flash;
        }

        DragOutcome::Accepted
    }

    /// Releases the brightness control. `Dragging -> Ready`.
    pub fn release(&mut self, now_ms: u64) -> bool {
        if self.state != CaptureState::Dragging {
            return false;
        }

        self.state = CaptureState::Ready;
        self.drag_started_at_ms = None;
        self.decay_anchor_ms = now_ms;
        debug!(intensity = self.intensity, "drag released");
        true
    }

    /// Presses the explicit "Take Photo" button. `Ready -> Flashing`.
    pub fn take_photo(&mut self, now_ms: u64) -> bool {
        if self.state != CaptureState::Ready {
            return false;
        }

        self.enter_flash(now_ms, SHUTTER_FLASH_MS);
        true
    }

    /// Advances timers: idle decay while `Ready`, capture once the flash ends.
    pub fn tick(&mut self, now_ms: u64) -> Option<CaptureEvent> {
        match self.state {
            CaptureState::Ready => {
                self.apply_decay(now_ms);
                None
            }
            CaptureState::Flashing => match self.flash_deadline_ms {
                Some(deadline) if now_ms >= deadline => Some(self.capture()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Stops every camera track. Safe to call repeatedly.
    pub fn release_camera(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.stop_all_tracks();
            info!("camera released");
        }
    }

    /// Current state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Interaction mode.
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Current brightness intensity (0-100).
    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    /// `true` while the live preview is available.
    pub fn is_camera_ready(&self) -> bool {
        matches!(
            self.state,
            CaptureState::Ready | CaptureState::Dragging | CaptureState::Flashing
        )
    }

    /// `true` while the brightness control is held.
    pub fn is_dragging(&self) -> bool {
        self.state == CaptureState::Dragging
    }

    /// `true` while the flash overlay is visible.
    pub fn flash_active(&self) -> bool {
        self.state == CaptureState::Flashing
    }

    /// Milliseconds until the pending capture, if flashing.
    pub fn flash_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.flash_deadline_ms
            .filter(|_| self.flash_active())
            .map(|deadline| deadline.saturating_sub(now_ms))
    }

    /// Persistent user-facing error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Tracks still held by the session's device.
    pub fn active_tracks(&self) -> usize {
        self.device
            .as_ref()
            .map(|device| device.active_tracks())
            .unwrap_or(0)
    }

    /// Preview brightness multiplier (`1.0` means unfiltered).
    pub fn brightness_filter(&self) -> f32 {
        1.0 + f32::from(self.intensity) / 100.0
    }

    /// Caption shown next to the brightness control.
    pub fn hint(&self) -> String {
        match self.state {
            CaptureState::Initializing => "Starting camera...".to_string(),
            CaptureState::CameraError => {
                format!("⚠️ {}", self.error.as_deref().unwrap_or(CAMERA_DENIED_MESSAGE))
            }
            CaptureState::Ready => match self.mode {
                CaptureMode::Gesture => "💡 Drag the brightness slider quickly! →".to_string(),
                CaptureMode::Shutter => "📸 Press Take Photo when ready".to_string(),
            },
            CaptureState::Dragging if self.intensity >= GESTURE_THRESHOLD => {
                "📸 Perfect! Taking photo...".to_string()
            }
            CaptureState::Dragging if self.intensity > 0 => {
                format!("Keep going! {}%", self.intensity)
            }
            CaptureState::Dragging => "⚡ Drag fast to the right to take photo!".to_string(),
            CaptureState::Flashing => "📸 Perfect! Taking photo...".to_string(),
            CaptureState::Captured => "Photo captured".to_string(),
        }
    }

    fn enter_flash(&mut self, now_ms: u64, flash_ms: u64) {
        self.state = CaptureState::Flashing;
        self.intensity = MAX_INTENSITY;
        self.drag_started_at_ms = None;
        self.flash_deadline_ms = Some(now_ms.saturating_add(flash_ms));
        debug!(now_ms, flash_ms, "flash started");
    }

    fn apply_decay(&mut self, now_ms: u64) {
        if self.intensity == 0 {
            self.decay_anchor_ms = now_ms;
            return;
        }

        let steps = now_ms.saturating_sub(self.decay_anchor_ms) / DECAY_INTERVAL_MS;
        if steps == 0 {
            return;
        }

        let decrement = steps.saturating_mul(u64::from(DECAY_STEP));
        self.intensity = u64::from(self.intensity).saturating_sub(decrement) as u8;
        self.decay_anchor_ms = self
            .decay_anchor_ms
            .saturating_add(steps.saturating_mul(DECAY_INTERVAL_MS));
    }

    fn capture(&mut self) -> CaptureEvent {
        self.flash_deadline_ms = None;

        let result = match self.device.as_mut() {
            Some(device) => device.grab_frame().and_then(|frame| frame_to_selfie(&frame)),
            None => Err(crate::CaptureError::NotOpen),
        };
        self.release_camera();

        match result {
            Ok(selfie) => {
                self.state = CaptureState::Captured;
                self.intensity = 0;
                info!(bytes = selfie.size_bytes(), "selfie captured");
                CaptureEvent::Captured(selfie)
            }
            Err(error) => {
                warn!(%error, "selfie capture failed");
                let message = format!("Unable to capture photo: {error}");
                self.fail(message.clone());
                CaptureEvent::Failed(message)
            }
        }
    }

    fn fail(&mut self, message: String) {
        self.release_camera();
        self.state = CaptureState::CameraError;
        self.flash_deadline_ms = None;
        self.drag_started_at_ms = None;
        self.error = Some(message);
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release_camera();
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("intensity", &self.intensity)
            .field("camera_held", &self.device.is_some())
            .finish()
    }
}
