//! Submit button that dodges the pointer.

use rand::Rng;

/// Movement envelope (width, height in px) for the first hovers.
pub const LARGE_ENVELOPE: (f32, f32) = (200.0, 150.0);

/// Movement envelope once the button gets tired.
pub const SMALL_ENVELOPE: (f32, f32) = (30.0, 20.0);

/// Hovers that use the large envelope; later hovers use the small one.
pub const LARGE_ENVELOPE_HOVERS: u32 = 6;

/// Lower bound of the shrinking scale.
pub const MIN_SCALE: f32 = 0.7;

const SCALE_STEP: f32 = 0.05;
const SLOW_TRANSITION_FROM: u32 = 7;
const FAST_TRANSITION_MS: u32 = 300;
const SLOW_TRANSITION_MS: u32 = 800;

const ENCOURAGEMENTS: [&str; 8] = [
    "Come on, you can do it! 🏃",
    "Almost there! Keep trying! 💪",
    "The button believes in you! ✨",
    "Third time's the charm! 🍀",
    "You're getting warmer! 🔥",
    "Don't give up now! 🎯",
    "Catch me if you can! 😄",
    "Fine, you can click me now... 😌",
];

/// Position offset and hover counter of the submit button.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvasiveButton {
    hover_count: u32,
    offset: (f32, f32),
}

impl EvasiveButton {
    /// Creates a button at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles the pointer entering the button.
    ///
    /// Only qualifying hovers (`eligible`) move the button and count.
    pub fn on_hover<R: Rng + ?Sized>(&mut self, eligible: bool, rng: &mut R) -> bool {
        if !eligible {
            return false;
        }

        let (width, height) = if self.hover_count >= LARGE_ENVELOPE_HOVERS {
            SMALL_ENVELOPE
        } else {
            LARGE_ENVELOPE
        };
        self.offset = (
            (rng.random::<f32>() - 0.5) * width,
            (rng.random::<f32>() - 0.5) * height,
        );
        self.hover_count = self.hover_count.saturating_add(1);
        true
    }

    /// Qualifying hovers so far.
    pub fn hover_count(&self) -> u32 {
        self.hover_count
    }

    /// Current translation in pixels.
    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    /// Caption shown under the button, if any.
    pub fn encouragement(&self) -> Option<&'static str> {
        if self.hover_count == 0 {
            return None;
        }
        let index = (self.hover_count as usize - 1).min(ENCOURAGEMENTS.len() - 1);
        Some(ENCOURAGEMENTS[index])
    }

    /// Render scale; shrinks with each hover while idle.
    pub fn scale(&self, pending: bool) -> f32 {
        if self.hover_count == 0 || pending {
            return 1.0;
        }
        (1.0 - self.hover_count as f32 * SCALE_STEP).max(MIN_SCALE)
    }

    /// Movement animation duration.
    pub fn transition_ms(&self) -> u32 {
        if self.hover_count >= SLOW_TRANSITION_FROM {
            SLOW_TRANSITION_MS
        } else {
            FAST_TRANSITION_MS
        }
    }

    /// Returns the button to the origin with a fresh counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
