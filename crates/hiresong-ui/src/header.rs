//! Rotating header emoji.

use rand::Rng;

/// Interval between emoji changes.
pub const ROTATION_INTERVAL_MS: u64 = 2_000;

/// Emojis the header cycles through.
pub const HEADER_EMOJIS: [&str; 12] = [
    "🎵", "🎶", "🎤", "🎸", "🎹", "🎺", "🎻", "🥁", "🎧", "💼", "🎬", "✨",
];

/// Header badge state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderBadge {
    index: usize,
    last_rotation_ms: u64,
}

impl HeaderBadge {
    /// Starts on the first emoji.
    pub fn new(now_ms: u64) -> Self {
        Self {
            index: 0,
            last_rotation_ms: now_ms,
        }
    }

    /// Picks a new random emoji once per [`ROTATION_INTERVAL_MS`].
    pub fn tick<R: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut R) -> bool {
        if now_ms.saturating_sub(self.last_rotation_ms) < ROTATION_INTERVAL_MS {
            return false;
        }
        self.index = rng.random_range(0..HEADER_EMOJIS.len());
        self.last_rotation_ms = now_ms;
        true
    }

    /// Current emoji.
    pub fn emoji(&self) -> &'static str {
        HEADER_EMOJIS[self.index]
    }

    /// Title line, e.g. `"🎵 HireSong"`.
    pub fn title(&self) -> String {
        format!("{} HireSong", self.emoji())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for header rotation timing.

    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rotates_only_after_full_interval() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut badge = HeaderBadge::new(0);
        assert_eq!(badge.emoji(), HEADER_EMOJIS[0]);

        assert!(!badge.tick(ROTATION_INTERVAL_MS - 1, &mut rng));
        assert_eq!(badge.emoji(), HEADER_EMOJIS[0]);
        assert!(badge.tick(ROTATION_INTERVAL_MS, &mut rng));

        assert!(!badge.tick(2 * ROTATION_INTERVAL_MS - 1, &mut rng));
        assert!(badge.tick(2 * ROTATION_INTERVAL_MS, &mut rng));
    }

    #[test]
    fn emoji_always_comes_from_table() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut badge = HeaderBadge::new(0);
        let mut seen = Vec::new();
        for step in 1..=200 {
            assert!(badge.tick(step * ROTATION_INTERVAL_MS, &mut rng));
            assert!(HEADER_EMOJIS.contains(&badge.emoji()));
            assert!(badge.title().ends_with(" HireSong"));
            if !seen.contains(&badge.emoji()) {
                seen.push(badge.emoji());
            }
        }
        assert!(seen.len() > 1);
    }
}
