//! Ordered fallback resolution for values with several possible sources.

use crate::metrics::Source;
use crate::units::{in_weight_loss_band, normalize_weight_loss_fraction};

/// First candidate that is present and satisfies `accept`.
pub fn first_passing<T, I, F>(candidates: I, mut accept: F) -> Option<T>
where
    I: IntoIterator<Item = Option<T>>,
    F: FnMut(&T) -> bool,
{
    candidates.into_iter().flatten().find(|c| accept(c))
}

/// Weight loss in percent from `(green - roasted) / green`, when it is sane.
pub fn weight_loss_from_weights(green: Option<f64>, roasted: Option<f64>) -> Option<f64> {
    let (g, r) = (green?, roasted?);
    if !(g > 0.0 && r > 0.0 && r < g) {
        return None;
    }
    Some((g - r) / g * 100.0)
}

/// Resolve the weight-loss percentage.
///
/// Measured weights win, then the declared value, then the stored one. Each
/// candidate must land in `(0, 50]` percent; nothing is clamped.
pub fn resolve_weight_loss(
    green: Option<f64>,
    roasted: Option<f64>,
    declared: Option<f64>,
    stored: Option<f64>,
) -> Option<f64> {
    resolve_weight_loss_with_source(green, roasted, Source::Stored, declared, stored).map(|(pct, _)| pct)
}

/// Same chain as [`resolve_weight_loss`], tagged with the winning source.
///
/// `weights_source` is where the green/roasted pair came from; declared
/// values are tagged `Profile` and stored ones `Stored`.
pub fn resolve_weight_loss_with_source(
    green: Option<f64>,
    roasted: Option<f64>,
    weights_source: Source,
    declared: Option<f64>,
    stored: Option<f64>,
) -> Option<(f64, Source)> {
    let resolved = first_passing(
        [
            weight_loss_from_weights(green, roasted).map(|pct| (pct, weights_source)),
            normalize_weight_loss_fraction(declared).map(|pct| (pct, Source::Profile)),
            normalize_weight_loss_fraction(stored).map(|pct| (pct, Source::Stored)),
        ],
        |(pct, _)| in_weight_loss_band(*pct),
    );
    if resolved.is_none() && (green.is_some() || declared.is_some() || stored.is_some()) {
        tracing::debug!(?green, ?roasted, ?declared, ?stored, "no weight-loss candidate in band");
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_passing_skips_absent_and_rejected() {
        let got = first_passing([None, Some(-1.0), Some(3.0), Some(4.0)], |v| *v > 0.0);
        assert_eq!(got, Some(3.0));
        assert_eq!(first_passing::<f64, _, _>([None, None], |_| true), None);
    }

    #[test]
    fn weights_win_over_declared() {
        let got = resolve_weight_loss(Some(10.0), Some(8.5), Some(0.2), None).unwrap();
        assert!((got - 15.0).abs() < 1e-9);
    }

    #[test]
    fn declared_fraction_is_scaled() {
        let got = resolve_weight_loss(None, None, Some(0.15), None).unwrap();
        assert!((got - 15.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_band_falls_through() {
        assert_eq!(resolve_weight_loss(None, None, Some(72.0), None), None);
        assert_eq!(resolve_weight_loss(None, None, Some(72.0), Some(14.0)), Some(14.0));
        // roasted heavier than green is never a loss
        assert_eq!(resolve_weight_loss(Some(1.0), Some(2.0), None, None), None);
    }

    #[test]
    fn winning_source_is_reported() {
        let weights = resolve_weight_loss_with_source(Some(10.0), Some(8.5), Source::Profile, Some(0.2), Some(14.0));
        assert_eq!(weights.map(|(_, s)| s), Some(Source::Profile));
        let declared = resolve_weight_loss_with_source(None, None, Source::Stored, Some(0.15), Some(14.0));
        assert_eq!(declared.map(|(_, s)| s), Some(Source::Profile));
        let stored = resolve_weight_loss_with_source(Some(1.0), Some(2.0), Source::Stored, Some(72.0), Some(14.0));
        assert_eq!(stored, Some((14.0, Source::Stored)));
    }
}
