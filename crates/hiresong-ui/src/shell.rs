//! Application shell: form, submission lifecycle, and child state.

use hiresong_core::{Genre, SelectedFile, SubmissionForm, ValidatedSubmission, ValidationError};
use hiresong_generation_contract::GeneratedVideo;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{EvasiveButton, FileSelector, HeaderBadge, SelectionChange, UiError, VideoPanel};

/// Submit button caption while idle.
pub const SUBMIT_LABEL: &str = "Generate Video Pitch 🎬";

/// Submit button caption while a request is in flight.
pub const GENERATING_LABEL: &str = "Generating your video pitch...";

/// Webcam toggle caption while the camera panel is hidden.
pub const TAKE_SELFIE_LABEL: &str = "Take Selfie";

/// Webcam toggle caption while the camera panel is shown.
pub const CANCEL_CAMERA_LABEL: &str = "Cancel Camera";

/// Permission to run one generation request.
///
/// Issued by [`ShellState::begin_submit`] and handed back to
/// [`ShellState::finish_submit`] with the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    id: u64,
    epoch: u64,
    submission: ValidatedSubmission,
}

impl SubmissionTicket {
    /// Monotonic ticket number.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Validated form snapshot to send.
    pub fn submission(&self) -> &ValidatedSubmission {
        &self.submission
    }
}

/// Reasons a submission did not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    /// A required field is missing; the message is on the error banner.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// Another submission is still in flight.
    #[error("a submission is already in progress")]
    AlreadyPending,
}

/// Request that has been handed out and not yet reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    ticket: u64,
    epoch: u64,
}

/// Top-level UI state.
#[derive(Debug, Clone)]
pub struct ShellState {
    form: SubmissionForm,
    selfie_picker: FileSelector,
    cv_picker: FileSelector,
    error: Option<String>,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    epoch: u64,
    video: Option<VideoPanel>,
    evasive: EvasiveButton,
    show_webcam: bool,
    header: HeaderBadge,
}

impl ShellState {
    /// Creates an empty shell.
    pub fn new(now_ms: u64) -> Self {
        Self {
            form: SubmissionForm::default(),
            selfie_picker: FileSelector::selfie(),
            cv_picker: FileSelector::cv(),
            error: None,
            in_flight: None,
            next_ticket: 0,
            epoch: 0,
            video: None,
            evasive: EvasiveButton::new(),
            show_webcam: false,
            header: HeaderBadge::new(now_ms),
        }
    }

    /// Handles a file picked as selfie.
    ///
    /// # Errors
    /// Returns [`UiError::RejectedFile`] for non-image files.
    pub fn choose_selfie<R: Rng + ?Sized>(
        &mut self,
        file: SelectedFile,
        now_ms: u64,
        rng: &mut R,
    ) -> Result<SelectionChange, UiError> {
        let change = self.selfie_picker.choose(file, now_ms, rng)?;
        if let SelectionChange::Selected(file) = &change {
            self.form.selfie = Some(file.clone());
        }
        Ok(change)
    }

    /// Handles a file picked as CV.
    ///
    /// # Errors
    /// Returns [`UiError::RejectedFile`] for non-PDF files.
    pub fn choose_cv<R: Rng + ?Sized>(
        &mut self,
        file: SelectedFile,
        now_ms: u64,
        rng: &mut R,
    ) -> Result<SelectionChange, UiError> {
        let change = self.cv_picker.choose(file, now_ms, rng)?;
        if let SelectionChange::Selected(file) = &change {
            self.form.cv = Some(file.clone());
        }
        Ok(change)
    }

    /// Clears the selfie.
    pub fn remove_selfie(&mut self) {
        self.selfie_picker.remove();
        self.form.selfie = None;
    }

    /// Clears the CV.
    pub fn remove_cv(&mut self) {
        self.cv_picker.remove();
        self.form.cv = None;
    }

    /// Stores a webcam capture as selfie and closes the camera panel.
    pub fn accept_captured_selfie(&mut self, file: SelectedFile) {
        debug!(bytes = file.size_bytes(), "captured selfie accepted");
        self.selfie_picker.adopt(file.clone());
        self.form.selfie = Some(file);
        self.show_webcam = false;
    }

    /// Updates the company URL as typed.
    pub fn set_company_url(&mut self, url: impl Into<String>) {
        self.form.company_url = url.into();
    }

    /// Updates the genre.
    pub fn set_genre(&mut self, genre: Genre) {
        self.form.genre = genre;
    }

    /// Shows or hides the camera panel; returns the new visibility.
    pub fn toggle_webcam(&mut self) -> bool {
        self.show_webcam = !self.show_webcam;
        self.show_webcam
    }

    /// Whether the camera panel is shown.
    pub fn webcam_visible(&self) -> bool {
        self.show_webcam
    }

    /// Caption of the webcam toggle.
    pub fn webcam_label(&self) -> &'static str {
        if self.show_webcam {
            CANCEL_CAMERA_LABEL
        } else {
            TAKE_SELFIE_LABEL
        }
    }

    /// Pointer entered the submit button.
    ///
    /// The button only dodges when the form is complete and idle.
    pub fn hover_submit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let eligible = self.form.is_complete() && self.in_flight.is_none();
        self.evasive.on_hover(eligible, rng)
    }

    /// Validates the form and starts a submission.
    ///
    /// # Errors
    /// - [`SubmitRejection::Invalid`] after setting the banner to the first
    ///   missing field's message.
    /// - [`SubmitRejection::AlreadyPending`] while a request is in flight,
    ///   including one issued before the last reset.
    pub fn begin_submit(&mut self) -> Result<SubmissionTicket, SubmitRejection> {
        if self.in_flight.is_some() {
            return Err(SubmitRejection::AlreadyPending);
        }

        let submission = match self.form.validate() {
            Ok(submission) => submission,
            Err(error) => {
                debug!(%error, "submission rejected");
                self.error = Some(error.to_string());
                return Err(error.into());
            }
        };

        self.error = None;
        self.video = None;
        self.evasive.reset();
        self.next_ticket += 1;
        self.in_flight = Some(InFlight {
            ticket: self.next_ticket,
            epoch: self.epoch,
        });
        info!(
            ticket = self.next_ticket,
            genre = %submission.genre,
            "submission started"
        );

        Ok(SubmissionTicket {
            id: self.next_ticket,
            epoch: self.epoch,
            submission,
        })
    }

    /// Applies the outcome of a submission.
    ///
    /// Returns `false` when the result is not shown: the ticket is not the
    /// one in flight, or it was issued before a reset. A stale in-flight
    /// ticket still frees the slot for the next submission.
    pub fn finish_submit(
        &mut self,
        ticket: &SubmissionTicket,
        result: Result<GeneratedVideo, String>,
    ) -> bool {
        if self.in_flight.map(|in_flight| in_flight.ticket) != Some(ticket.id) {
            debug!(ticket = ticket.id, "unknown submission result dropped");
            return false;
        }

        self.in_flight = None;
        if ticket.epoch != self.epoch {
            debug!(ticket = ticket.id, "stale submission result dropped");
            return false;
        }

        match result {
            Ok(video) => {
                info!(ticket = ticket.id, local = video.is_local(), "video ready");
                self.video = Some(VideoPanel::new(video));
            }
            Err(message) => {
                warn!(ticket = ticket.id, %message, "submission failed");
                self.error = Some(message);
            }
        }
        true
    }

    /// "Create Another": restores every field and child to its initial value.
    ///
    /// A request still running keeps its slot until its result comes back.
    pub fn reset(&mut self) {
        self.form = SubmissionForm::default();
        self.selfie_picker.remove();
        self.cv_picker.remove();
        self.error = None;
        self.epoch += 1;
        self.video = None;
        self.evasive.reset();
        self.show_webcam = false;
        info!("shell reset");
    }

    /// Advances timers: comment expiry and header rotation.
    pub fn tick<R: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut R) {
        self.selfie_picker.expire_comment(now_ms);
        self.cv_picker.expire_comment(now_ms);
        self.header.tick(now_ms, rng);
    }

    /// Current form contents.
    pub fn form(&self) -> &SubmissionForm {
        &self.form
    }

    /// Selfie picker.
    pub fn selfie_picker(&self) -> &FileSelector {
        &self.selfie_picker
    }

    /// CV picker.
    pub fn cv_picker(&self) -> &FileSelector {
        &self.cv_picker
    }

    /// Error banner text.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a submission started since the last reset is in flight.
    pub fn is_pending(&self) -> bool {
        self.in_flight
            .is_some_and(|in_flight| in_flight.epoch == self.epoch)
    }

    /// Whether any request, current or from before a reset, is still out.
    pub fn has_outstanding_request(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Result panel, once a video is available.
    pub fn video(&self) -> Option<&VideoPanel> {
        self.video.as_ref()
    }

    /// Submit button state.
    pub fn evasive(&self) -> &EvasiveButton {
        &self.evasive
    }

    /// Header badge.
    pub fn header(&self) -> &HeaderBadge {
        &self.header
    }

    /// Submit button caption.
    pub fn submit_label(&self) -> &'static str {
        if self.is_pending() {
            GENERATING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for ticket bookkeeping.

    use super::*;

    fn jpeg() -> SelectedFile {
        SelectedFile::new("me.jpg", "image/jpeg", vec![1, 2, 3]).unwrap()
    }

    fn pdf() -> SelectedFile {
        SelectedFile::new("cv.pdf", "application/pdf", vec![4, 5]).unwrap()
    }

    fn filled_shell() -> ShellState {
        let mut shell = ShellState::new(0);
        shell.accept_captured_selfie(jpeg());
        shell.form.cv = Some(pdf());
        shell.set_company_url("https://acme.test");
        shell
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let mut shell = filled_shell();
        let _ticket = shell.begin_submit().unwrap();
        assert_eq!(shell.begin_submit(), Err(SubmitRejection::AlreadyPending));
        assert_eq!(shell.submit_label(), GENERATING_LABEL);
    }

    #[test]
    fn result_after_reset_is_ignored() {
        let mut shell = filled_shell();
        let ticket = shell.begin_submit().unwrap();
        shell.reset();

        let applied = shell.finish_submit(
            &ticket,
            Ok(GeneratedVideo::Remote {
                url: "/videos/1.mp4".to_string(),
            }),
        );
        assert!(!applied);
        assert!(shell.video().is_none());
        assert!(!shell.is_pending());
        assert!(!shell.has_outstanding_request());
    }

    #[test]
    fn reset_keeps_old_request_outstanding() {
        let mut shell = filled_shell();
        let ticket = shell.begin_submit().unwrap();
        shell.reset();

        assert!(!shell.is_pending());
        assert!(shell.has_outstanding_request());
        assert_eq!(shell.submit_label(), SUBMIT_LABEL);

        let mut refilled = filled_shell();
        std::mem::swap(&mut shell.form, &mut refilled.form);
        assert_eq!(shell.begin_submit(), Err(SubmitRejection::AlreadyPending));

        assert!(!shell.finish_submit(&ticket, Err("late".to_string())));
        assert!(shell.error().is_none());
        assert!(shell.begin_submit().is_ok());
    }

    #[test]
    fn capture_closes_webcam_panel() {
        let mut shell = ShellState::new(0);
        assert!(shell.toggle_webcam());
        assert_eq!(shell.webcam_label(), CANCEL_CAMERA_LABEL);
        shell.accept_captured_selfie(jpeg());
        assert!(!shell.webcam_visible());
        assert_eq!(shell.webcam_label(), TAKE_SELFIE_LABEL);
        assert!(shell.form().selfie.is_some());
    }
}
