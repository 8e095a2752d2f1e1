//! Rate-of-rise over a trailing time window.
//!
//! Sampling is irregular, so the window is located by time, never by index
//! count. The result is aligned 1:1 with the input and expressed in °/min.

use crate::error::AnalysisError;

/// Compute the rate of rise of `values` over a trailing `period_s` window.
///
/// For sample `i`, the reference sample `j` is the latest earlier sample with
/// `t_i - t_j >= period_s`, or the first sample when none is that old.
/// Output is `(v_i - v_j) / (t_i - t_j) * 60`; `None` when either value is
/// missing or `t_i == t_j`. Fewer than two samples gives all `None`.
pub fn calculate_ror(
    values: &[Option<f64>],
    times: &[f64],
    period_s: u32,
) -> Result<Vec<Option<f64>>, AnalysisError> {
    if values.len() != times.len() {
        return Err(AnalysisError::LengthMismatch {
            what: "values",
            expected: times.len(),
            actual: values.len(),
        });
    }
    let n = times.len();
    if n < 2 {
        return Ok(vec![None; n]);
    }
    let period = f64::from(period_s);

    let out = (0..n)
        .map(|i| {
            let t_i = times[i];
            // times[..i] is non-decreasing, so `t_i - t_j >= period` holds for a prefix.
            let aged = times[..i].partition_point(|&t_j| t_i - t_j >= period);
            let j = aged.saturating_sub(1);
            rate_between(values, times, j, i)
        })
        .collect();
    Ok(out)
}

/// °/min between samples `j` and `i`, `None` if undefined.
#[inline]
pub(crate) fn rate_between(values: &[Option<f64>], times: &[f64], j: usize, i: usize) -> Option<f64> {
    let (v_i, v_j) = (values.get(i).copied()??, values.get(j).copied()??);
    let dt = times.get(i)? - times.get(j)?;
    if dt == 0.0 || !dt.is_finite() {
        return None;
    }
    let rate = (v_i - v_j) / dt * 60.0;
    rate.is_finite().then_some(rate)
}

/// RoR value at an event index, if the index and value exist.
#[inline]
pub fn ror_at(ror: &[Option<f64>], idx: Option<usize>) -> Option<f64> {
    ror.get(idx?).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_sample_curve_with_thirty_second_window() {
        let t = [0.0, 30.0, 60.0, 90.0, 120.0];
        let v = [Some(96.0), Some(94.0), Some(93.0), Some(95.0), Some(110.0)];
        let r = calculate_ror(&v, &t, 30).unwrap();
        assert_eq!(r[0], None);
        assert!((r[1].unwrap() + 4.0).abs() < 1e-9);
        assert!((r[3].unwrap() - 4.0).abs() < 1e-9);
        assert!((r[4].unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn falls_back_to_first_sample_inside_window() {
        // 60 s window, only 20 s of data: every sample measures against index 0.
        let t = [0.0, 10.0, 20.0];
        let v = [Some(100.0), Some(101.0), Some(104.0)];
        let r = calculate_ror(&v, &t, 60).unwrap();
        assert_eq!(r[0], None);
        assert!((r[1].unwrap() - 6.0).abs() < 1e-9);
        assert!((r[2].unwrap() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn gaps_propagate_as_none() {
        let t = [0.0, 30.0, 60.0];
        let v = [Some(100.0), None, Some(110.0)];
        let r = calculate_ror(&v, &t, 30).unwrap();
        assert_eq!(r[1], None);
        // j for i=2 is index 1, which is a gap
        assert_eq!(r[2], None);
    }

    #[test]
    fn length_mismatch_is_structural() {
        let err = calculate_ror(&[Some(1.0)], &[0.0, 1.0], 30).unwrap_err();
        assert!(matches!(err, AnalysisError::LengthMismatch { .. }));
    }

    #[test]
    fn short_inputs_are_all_none() {
        assert!(calculate_ror(&[], &[], 30).unwrap().is_empty());
        assert_eq!(calculate_ror(&[Some(1.0)], &[0.0], 30).unwrap(), vec![None]);
    }

    #[test]
    fn ror_at_handles_missing() {
        let r = [None, Some(2.0)];
        assert_eq!(ror_at(&r, Some(1)), Some(2.0));
        assert_eq!(ror_at(&r, Some(0)), None);
        assert_eq!(ror_at(&r, Some(7)), None);
        assert_eq!(ror_at(&r, None), None);
    }
}
