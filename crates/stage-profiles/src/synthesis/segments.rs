//! Random segments scaled to a fixed total.

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use stages::PowerError;

use crate::config::DrawRange;

/// How the boundary segments are pinned after scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMode {
    /// First segment is 0 so the curve starts at the origin; the last absorbs the remainder.
    Distance,
    /// Climb segments. A flat finish ends on a 0 segment, otherwise on a short
    /// descent; the second-to-last segment absorbs the remainder.
    Elevation { flat_finish: bool },
}

impl SegmentMode {
    pub fn default_range(self) -> DrawRange {
        match self {
            SegmentMode::Distance => DrawRange::DISTANCE,
            SegmentMode::Elevation { .. } => DrawRange::DEFAULT,
        }
    }
}

/// Draws `segment_count` random segments that sum to `goal`, using the
/// default draw range for `mode` and a final dip of 5 draw units.
pub fn scaled_random_segments(
    goal: f64,
    segment_count: usize,
    mode: SegmentMode,
    rng: &mut impl Rng,
) -> Result<Vec<f64>, PowerError> {
    scaled_random_segments_with(goal, segment_count, mode, mode.default_range(), 5.0, rng)
}

/// Draws `segment_count` integers in `range`, scales them so they sum to
/// `goal` and pins the boundary segments according to `mode`.
///
/// The returned segments always sum to `goal` up to floating-point rounding.
pub fn scaled_random_segments_with(
    goal: f64,
    segment_count: usize,
    mode: SegmentMode,
    range: DrawRange,
    final_dip_units: f64,
    rng: &mut impl Rng,
) -> Result<Vec<f64>, PowerError> {
    if segment_count < 2 {
        return Err(PowerError::InvalidInput(format!(
            "need at least 2 segments, got {segment_count}"
        )));
    }
    if !goal.is_finite() || goal < 0.0 {
        return Err(PowerError::InvalidInput(format!(
            "segment goal must be a non-negative number, got {goal}"
        )));
    }
    range.validate()?;

    let draws = Uniform::new(range.min, range.max);
    let numbers: Vec<u32> = (0..segment_count).map(|_| draws.sample(rng)).collect();
    let total: f64 = numbers.iter().map(|&n| n as f64).sum();

    let scale = goal / total;
    let mut segments: Vec<f64> = numbers.iter().map(|&n| n as f64 * scale).collect();

    let last = segment_count - 1;
    match mode {
        SegmentMode::Distance => {
            segments[0] = 0.0;
            segments[last] = goal - segments[..last].iter().sum::<f64>();
        }
        SegmentMode::Elevation { flat_finish } => {
            segments[last] = if flat_finish {
                0.0
            } else {
                -final_dip_units * scale
            };
            let others: f64 = segments[..last - 1].iter().sum::<f64>() + segments[last];
            segments[last - 1] = goal - others;
        }
    }

    Ok(segments)
}
