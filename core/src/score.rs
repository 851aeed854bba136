//! Shared risk scoring — one scale for every analysis.
//!
//! All findings score on [0, 1] through the same piecewise-linear
//! curve so they can be ranked against each other:
//!   - a metric of 0 scores 0.0
//!   - the flagging threshold scores 0.5 (a "just flagged" finding
//!     never lands at the extreme)
//!   - the saturation point and anything above it scores 1.0
//!
//! Pure and deterministic; monotonic non-decreasing in the metric.

/// Default saturation point when an analysis has no better calibration.
pub fn saturation_for(threshold: f64) -> f64 {
    threshold * 3.0
}

/// Scale a raw severity metric onto [0, 1].
pub fn scaled(metric: f64, threshold: f64, saturation: f64) -> f64 {
    if metric <= 0.0 || threshold <= 0.0 {
        return 0.0;
    }
    if metric >= saturation {
        return 1.0;
    }
    if metric < threshold {
        0.5 * metric / threshold
    } else if saturation > threshold {
        0.5 + 0.5 * (metric - threshold) / (saturation - threshold)
    } else {
        1.0
    }
}

/// Attenuate a base score by a [0, 1] modifier without leaving [0, 1].
/// A modifier of 1 keeps the base; a modifier of 0 halves it. Monotonic
/// in both arguments.
pub fn blend(base: f64, modifier: f64) -> f64 {
    let modifier = modifier.clamp(0.0, 1.0);
    (base * (0.5 + 0.5 * modifier)).clamp(0.0, 1.0)
}
