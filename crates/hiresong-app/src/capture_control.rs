//! Keyboard-driven control of a capture session.

use hiresong_capture::{CaptureDevice, CaptureEvent, CaptureMode, CaptureSession, CaptureState};
use tracing::info;

/// Slider movement per arrow key press.
pub const SLIDER_STEP: u8 = 25;

/// Input understood by [`CaptureController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCommand {
    /// Grab the brightness slider.
    Press,
    /// Move the slider right.
    DragRight,
    /// Move the slider left.
    DragLeft,
    /// Let go of the slider.
    Release,
    /// Shutter button.
    TakePhoto,
    /// Close the camera without a photo.
    Cancel,
    /// Reopen the camera after an error. The caller supplies the device
    /// through [`CaptureController::retry_with`].
    Retry,
}

/// Slider position plus the session it drives.
///
/// The slider moves on every key press; the session decides which positions
/// it accepts.
pub struct CaptureController {
    session: CaptureSession,
    slider: u8,
}

impl CaptureController {
    /// Wraps an activated session.
    pub fn new(session: CaptureSession) -> Self {
        Self { session, slider: 0 }
    }

    /// Applies one command. Returns `false` once the user cancelled.
    pub fn handle(&mut self, command: CaptureCommand, now_ms: u64) -> bool {
        match command {
            CaptureCommand::Press => {
                self.session.press(now_ms);
            }
            CaptureCommand::DragRight => {
                self.slider = self.slider.saturating_add(SLIDER_STEP).min(100);
                self.session.drag_to(self.slider, now_ms);
            }
            CaptureCommand::DragLeft => {
                self.slider = self.slider.saturating_sub(SLIDER_STEP);
                self.session.drag_to(self.slider, now_ms);
            }
            CaptureCommand::Release => {
                self.session.release(now_ms);
            }
            CaptureCommand::TakePhoto => {
                self.session.take_photo(now_ms);
            }
            CaptureCommand::Cancel => {
                self.session.release_camera();
                return false;
            }
            CaptureCommand::Retry => {}
        }
        true
    }

    /// Advances session timers. While not dragging the slider follows the
    /// decaying intensity.
    pub fn tick(&mut self, now_ms: u64) -> Option<CaptureEvent> {
        let event = self.session.tick(now_ms);
        if !self.session.is_dragging() {
            self.slider = self.session.intensity();
        }
        event
    }

    /// Replaces a failed session with one started on `device`.
    ///
    /// Does nothing unless the current session is in
    /// [`CaptureState::CameraError`]. Returns whether the new session is ready.
    pub fn retry_with(&mut self, device: Box<dyn CaptureDevice>, now_ms: u64) -> bool {
        if self.session.state() != CaptureState::CameraError {
            return false;
        }
        info!("reopening camera");
        self.session = CaptureSession::start(device, self.session.mode(), now_ms);
        self.slider = 0;
        self.session.is_camera_ready()
    }

    /// Underlying session.
    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Current slider position.
    pub fn slider(&self) -> u8 {
        self.slider
    }

    /// One-line status for the terminal.
    pub fn status_line(&self) -> String {
        let filled = usize::from(self.slider / 5);
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled));
        let keys = match (self.session.state(), self.session.mode()) {
            (CaptureState::Flashing, _) => "",
            (CaptureState::CameraError, _) => "r: retry  esc: cancel",
            (_, CaptureMode::Gesture) => "space: grab  ←/→: drag  enter: release  esc: cancel",
            (_, CaptureMode::Shutter) => "t: take photo  esc: cancel",
        };
        format!(
            "{} [{bar}] {:>3}%  {keys}",
            self.session.hint(),
            self.session.intensity()
        )
    }
}
