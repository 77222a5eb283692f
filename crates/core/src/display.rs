//! Display ratchet for remaining-time countdowns.
//!
//! The estimator runs once per second and its output wobbles as the two
//! progress signals drift. Rendering the raw value re-jitters the countdown
//! on every recomputation, so the displayed figure decrements by exactly one
//! per tick while the underlying estimate stays close, and only snaps when
//! the estimate genuinely moves (an upward ETA revision after a slow start,
//! or a fresh card).

/// Maximum discrepancy, in seconds, absorbed by the smooth countdown before
/// the display snaps to the newly computed value.
pub const JITTER_THRESHOLD_SECS: u64 = 1;

/// Per-card countdown state. Core-owned, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Currently rendered remaining seconds.
    pub displayed_remaining: Option<u64>,
    /// Last raw estimator output fed to the ratchet.
    pub last_computed: Option<u64>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one freshly computed remaining-time value and return the next
    /// value to render.
    ///
    /// Snap rules: no previous display, no computed value, or a discrepancy
    /// above [`JITTER_THRESHOLD_SECS`] adopts `computed` directly. Otherwise
    /// the display decrements by exactly one per tick until it reaches zero.
    pub fn observe(&mut self, computed: Option<u64>) -> Option<u64> {
        self.last_computed = computed;

        let next = match (self.displayed_remaining, computed) {
            (Some(prev), Some(new)) if prev.abs_diff(new) <= JITTER_THRESHOLD_SECS => {
                Some(prev.saturating_sub(1))
            }
            (_, new) => new,
        };

        self.displayed_remaining = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Smooth countdown
    // -----------------------------------------------------------------------

    #[test]
    fn stable_estimate_decrements_by_one_per_tick() {
        let mut state = DisplayState::new();
        assert_eq!(state.observe(Some(50)), Some(50));
        assert_eq!(state.observe(Some(50)), Some(49));
        assert_eq!(state.observe(Some(49)), Some(48));
        assert_eq!(state.observe(Some(48)), Some(47));
    }

    #[test]
    fn countdown_holds_at_zero() {
        let mut state = DisplayState::new();
        state.observe(Some(1));
        assert_eq!(state.observe(Some(1)), Some(0));
        assert_eq!(state.observe(Some(0)), Some(0));
        assert_eq!(state.observe(Some(1)), Some(0));
    }

    // -----------------------------------------------------------------------
    // Snap behavior
    // -----------------------------------------------------------------------

    #[test]
    fn first_observation_snaps() {
        let mut state = DisplayState::new();
        assert_eq!(state.observe(Some(90)), Some(90));
    }

    #[test]
    fn upward_revision_snaps_immediately() {
        let mut state = DisplayState::new();
        state.observe(Some(50));
        assert_eq!(state.observe(Some(80)), Some(80));
    }

    #[test]
    fn large_downward_revision_snaps_immediately() {
        let mut state = DisplayState::new();
        state.observe(Some(50));
        assert_eq!(state.observe(Some(20)), Some(20));
    }

    #[test]
    fn losing_the_signal_clears_the_display() {
        let mut state = DisplayState::new();
        state.observe(Some(50));
        assert_eq!(state.observe(None), None);
        // and a reappearing signal snaps again
        assert_eq!(state.observe(Some(30)), Some(30));
    }

    #[test]
    fn last_computed_tracks_raw_input() {
        let mut state = DisplayState::new();
        state.observe(Some(50));
        state.observe(Some(50));
        assert_eq!(state.last_computed, Some(50));
        assert_eq!(state.displayed_remaining, Some(49));
    }
}
