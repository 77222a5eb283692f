//! Remaining-time estimation for a running job.
//!
//! Two progress signals exist and neither is good alone: the backend's
//! reported fraction updates infrequently and in coarse steps, while a pure
//! `elapsed / eta` projection is smooth but wrong whenever the a-priori ETA
//! is off. The estimator blends both, shifting weight toward the
//! throughput-derived figure once enough reported progress has accumulated
//! to trust it.

// ---------------------------------------------------------------------------
// Tunables
// ---------------------------------------------------------------------------

/// Display progress at which the blend reaches full weight on the
/// throughput-derived estimate. Below this the ramp is linear.
pub const BLEND_RAMP_THRESHOLD: f64 = 0.25;

/// Minimum display progress before a throughput extrapolation is used at
/// all; under this the fraction is too small to divide by meaningfully.
pub const MIN_TRUSTED_PROGRESS: f64 = 0.01;

/// Cap on the elapsed-time projection so a job that has not reported
/// completion never visually reaches 100%.
pub const TIME_PROGRESS_CAP: f64 = 0.99;

// ---------------------------------------------------------------------------
// Estimate
// ---------------------------------------------------------------------------

/// Output of one estimator pass.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RemainingEstimate {
    /// Whole seconds remaining, or `None` when there is no time signal
    /// (job not started, or no ETA prediction).
    pub remaining_seconds: Option<u64>,

    /// Fraction to render on the progress bar. Never less than the reported
    /// progress, so the bar cannot visually regress.
    pub display_progress: f64,
}

/// Estimate the remaining time for a running job.
///
/// * `progress`: backend-reported fraction, clamped to `0.0..=1.0`.
/// * `started_at` / `now`: fractional epoch seconds.
/// * `eta_seconds`: a-priori total-duration guess; `<= 0` counts as absent.
pub fn estimate_remaining(
    progress: f64,
    started_at: Option<f64>,
    eta_seconds: Option<f64>,
    now: f64,
) -> RemainingEstimate {
    let progress = progress.clamp(0.0, 1.0);

    let (started_at, eta) = match (started_at, eta_seconds) {
        (Some(s), Some(e)) if e > 0.0 => (s, e),
        _ => {
            // No time-based signal at all; pass the reported fraction through.
            return RemainingEstimate {
                remaining_seconds: None,
                display_progress: progress,
            };
        }
    };

    let elapsed = (now - started_at).max(0.0);
    let time_progress = (elapsed / eta).min(TIME_PROGRESS_CAP);
    let display_progress = progress.max(time_progress);

    // Ramp from pure time-projection to pure throughput-extrapolation over
    // the first quarter of visible progress.
    let blend = (display_progress / BLEND_RAMP_THRESHOLD).min(1.0);

    let estimated_remaining = (eta - elapsed).max(0.0);
    let actual_remaining = if display_progress > MIN_TRUSTED_PROGRESS {
        elapsed / display_progress - elapsed
    } else {
        estimated_remaining
    };

    let refined = estimated_remaining * (1.0 - blend) + actual_remaining * blend;

    RemainingEstimate {
        remaining_seconds: Some(refined.max(0.0).floor() as u64),
        display_progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // No-signal cases
    // -----------------------------------------------------------------------

    #[test]
    fn missing_start_time_yields_no_remaining() {
        let est = estimate_remaining(0.3, None, Some(100.0), 1000.0);
        assert_eq!(est.remaining_seconds, None);
        assert_eq!(est.display_progress, 0.3);
    }

    #[test]
    fn missing_eta_yields_no_remaining() {
        let est = estimate_remaining(0.3, Some(990.0), None, 1000.0);
        assert_eq!(est.remaining_seconds, None);
    }

    #[test]
    fn zero_eta_does_not_divide_by_zero() {
        let est = estimate_remaining(0.3, Some(990.0), Some(0.0), 1000.0);
        assert_eq!(est.remaining_seconds, None);
        assert_eq!(est.display_progress, 0.3);
    }

    // -----------------------------------------------------------------------
    // Worked example: 10s elapsed of a 100s prediction at 10% reported
    // -----------------------------------------------------------------------

    #[test]
    fn agreeing_signals_give_ninety_seconds() {
        let est = estimate_remaining(0.10, Some(990.0), Some(100.0), 1000.0);
        assert_eq!(est.remaining_seconds, Some(90));
        assert!((est.display_progress - 0.10).abs() < 1e-9);
    }

    #[test]
    fn fast_job_shortens_the_estimate() {
        // 10s elapsed, 100s predicted, but already 50% reported: the
        // throughput view says ~10s remain and carries full blend weight.
        let est = estimate_remaining(0.50, Some(990.0), Some(100.0), 1000.0);
        assert_eq!(est.remaining_seconds, Some(10));
        assert!((est.display_progress - 0.50).abs() < 1e-9);
    }

    #[test]
    fn overrun_job_keeps_a_small_positive_remainder() {
        // 120s elapsed of a 100s prediction: the time estimate is exhausted
        // but the capped projection still leaves a nonzero tail.
        let est = estimate_remaining(0.90, Some(880.0), Some(100.0), 1000.0);
        assert!((est.display_progress - TIME_PROGRESS_CAP).abs() < 1e-9);
        assert!(est.remaining_seconds.unwrap() >= 1);
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    #[test]
    fn remaining_is_always_present_with_a_time_signal() {
        for elapsed in [0.0, 10.0, 100.0, 1000.0] {
            for progress in [0.0, 0.01, 0.2, 0.5, 0.99, 1.0] {
                let est =
                    estimate_remaining(progress, Some(1000.0 - elapsed), Some(60.0), 1000.0);
                assert!(est.remaining_seconds.is_some());
                assert!(est.display_progress >= progress.min(1.0));
            }
        }
    }

    #[test]
    fn display_progress_never_below_reported() {
        for progress in [0.0, 0.1, 0.5, 0.9, 1.0] {
            let est = estimate_remaining(progress, Some(999.0), Some(1000.0), 1000.0);
            assert!(est.display_progress >= progress);
        }
    }

    #[test]
    fn display_progress_capped_below_one_on_overrun() {
        // 10x over the predicted duration with no reported completion.
        let est = estimate_remaining(0.5, Some(0.0), Some(100.0), 1000.0);
        assert!(est.display_progress <= TIME_PROGRESS_CAP);
        // 1000/0.99 - 1000, floored
        assert_eq!(est.remaining_seconds, Some(10));
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        let high = estimate_remaining(1.7, Some(990.0), Some(100.0), 1000.0);
        assert!(high.display_progress <= 1.0);

        let low = estimate_remaining(-0.5, Some(990.0), Some(100.0), 1000.0);
        assert!(low.display_progress >= 0.0);
    }

    #[test]
    fn clock_skew_before_start_counts_as_zero_elapsed() {
        let est = estimate_remaining(0.0, Some(2000.0), Some(100.0), 1000.0);
        assert_eq!(est.remaining_seconds, Some(100));
    }
}
