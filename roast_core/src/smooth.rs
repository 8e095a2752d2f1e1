//! Centered smoothing filters for derived series.
//!
//! Both filters are centered so they add no time lag, keep the series length,
//! and ignore gaps inside the span. A span holding only gaps yields a gap.

/// Span `[lo, hi]` of a centered window around `i`, truncated at the edges.
#[inline]
fn span(i: usize, window: usize, len: usize) -> (usize, usize) {
    let back = window / 2;
    let ahead = window - 1 - back;
    (i.saturating_sub(back), (i + ahead).min(len - 1))
}

/// Centered moving average over `window` points. `window <= 1` is identity.
pub fn smooth(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window <= 1 || series.is_empty() {
        return series.to_vec();
    }
    (0..series.len())
        .map(|i| {
            let (lo, hi) = span(i, window, series.len());
            let (sum, count) = series[lo..=hi]
                .iter()
                .flatten()
                .fold((0.0f64, 0usize), |(s, c), v| (s + v, c + 1));
            (count > 0).then(|| sum / count as f64)
        })
        .collect()
}

/// Centered median over `window` points for spike rejection. `window <= 1`
/// is identity. Even counts average the two middle values.
pub fn median(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window <= 1 || series.is_empty() {
        return series.to_vec();
    }
    // Preallocated scratch buffer reused across positions
    let mut buf: Vec<f64> = Vec::with_capacity(window);
    (0..series.len())
        .map(|i| {
            let (lo, hi) = span(i, window, series.len());
            buf.clear();
            buf.extend(series[lo..=hi].iter().flatten());
            if buf.is_empty() {
                return None;
            }
            buf.sort_unstable_by(f64::total_cmp);
            let mid = buf.len() / 2;
            Some(if buf.len() % 2 == 0 {
                (buf[mid - 1] + buf[mid]) / 2.0
            } else {
                buf[mid]
            })
        })
        .collect()
}
