//! Area under the bean-temperature curve above a base temperature.

/// Trapezoidal area of `max(bt - base, 0)` between samples `start..=end`,
/// in degree-minutes.
///
/// Segments touching a gap contribute nothing. Returns `None` when the range
/// is empty or no segment could be integrated.
pub fn area_under_curve(
    times: &[f64],
    bt: &[Option<f64>],
    start: usize,
    end: usize,
    base: f64,
) -> Option<f64> {
    if !base.is_finite() || start >= end || end >= times.len() || end >= bt.len() {
        return None;
    }
    let mut area = 0.0;
    let mut segments = 0usize;
    for i in start..end {
        let (Some(a), Some(b)) = (bt[i], bt[i + 1]) else {
            continue;
        };
        let dt = times[i + 1] - times[i];
        if !(dt > 0.0) {
            continue;
        }
        let (ha, hb) = ((a - base).max(0.0), (b - base).max(0.0));
        area += (ha + hb) / 2.0 * dt;
        segments += 1;
    }
    (segments > 0).then_some(area / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_curve_above_base() {
        let t = [0.0, 60.0, 120.0];
        let bt = [Some(110.0); 3];
        let a = area_under_curve(&t, &bt, 0, 2, 100.0).unwrap();
        assert!((a - 20.0).abs() < 1e-9);
    }

    #[test]
    fn below_base_clamps_to_zero() {
        let t = [0.0, 60.0];
        let bt = [Some(90.0), Some(80.0)];
        assert_eq!(area_under_curve(&t, &bt, 0, 1, 100.0), Some(0.0));
    }

    #[test]
    fn gaps_and_empty_ranges() {
        let t = [0.0, 60.0, 120.0];
        let bt = [Some(110.0), None, Some(110.0)];
        assert_eq!(area_under_curve(&t, &bt, 0, 2, 100.0), None);
        assert_eq!(area_under_curve(&t, &bt, 2, 2, 100.0), None);
        assert_eq!(area_under_curve(&t, &bt, 0, 9, 100.0), None);
    }
}
