//! Display decimation. Analytics never see the decimated series.

use serde::Serialize;

/// Keep index 0, every `step`-th index and the last index, in order.
///
/// Never interpolates. `step <= 1` returns the input unchanged.
pub fn downsample<T: Clone>(points: &[T], step: usize) -> Vec<T> {
    if step <= 1 || points.len() <= 2 {
        return points.to_vec();
    }
    let last = points.len() - 1;
    let mut out: Vec<T> = points.iter().step_by(step).cloned().collect();
    if last % step != 0 {
        out.push(points[last].clone());
    }
    out
}

/// Smallest step that keeps at most about `max_points` samples.
pub fn step_for_max_points(len: usize, max_points: usize) -> usize {
    if max_points == 0 {
        return 1;
    }
    len.div_ceil(max_points).max(1)
}

/// One chart sample: raw channels and their smoothed rate of rise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayPoint {
    pub time: f64,
    pub et: Option<f64>,
    pub bt: Option<f64>,
    pub ror_et: Option<f64>,
    pub ror_bt: Option<f64>,
}
