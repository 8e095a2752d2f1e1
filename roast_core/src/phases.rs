//! Turning-point search and phase boundary detection.
//!
//! Two modes, tried in order:
//! - **Indexed**: the curve carries an event index computed against it; events
//!   map straight to samples. The turning point is still searched.
//! - **Curve only**: charge is the first sample and drop the last. Dry-end and
//!   first crack stay unknown; they are never guessed from the curve shape.
//!
//! Times in `ComputedMetrics` are relative to charge; `PhaseBoundaries` are
//! absolute on the series' own time axis.

use serde::Serialize;

use crate::error::AnalysisError;
use crate::metrics::{ComputedMetrics, MetricId, Source};
use crate::series::{RoastCurve, RoastEvent, TimeSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DetectionMode {
    Indexed,
    CurveOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TurningPoint {
    pub index: usize,
    pub time: f64,
    pub bt: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Marker {
    Event(RoastEvent),
    TurningPoint,
}

/// Chart marker for a detected event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventMarker {
    pub marker: Marker,
    pub index: usize,
    pub time: f64,
    pub bt: Option<f64>,
}

/// Absolute boundaries in seconds. Known values are non-decreasing in field order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseBoundaries {
    pub charge: f64,
    pub dry: Option<f64>,
    pub first_crack_start: Option<f64>,
    pub drop: Option<f64>,
}

impl PhaseBoundaries {
    /// Build boundaries, discarding any that would run backwards in time.
    pub fn ordered(charge: f64, dry: Option<f64>, fcs: Option<f64>, drop: Option<f64>) -> Self {
        let mut last = charge;
        let mut keep = |v: Option<f64>, what: &'static str| {
            let v = v?;
            if v >= last {
                last = v;
                Some(v)
            } else {
                tracing::debug!(what, at = v, after = last, "boundary out of order; discarded");
                None
            }
        };
        let dry = keep(dry, "dry");
        let first_crack_start = keep(fcs, "first_crack_start");
        let drop = keep(drop, "drop");
        Self {
            charge,
            dry,
            first_crack_start,
            drop,
        }
    }

    /// Boundaries from charge-relative metrics, anchored at absolute `charge`.
    pub fn from_metrics(charge: f64, m: &ComputedMetrics) -> Self {
        let drop = m
            .value(MetricId::DropTime)
            .or_else(|| m.value(MetricId::TotalTime));
        Self::ordered(
            charge,
            m.value(MetricId::DryTime).map(|t| charge + t),
            m.value(MetricId::FcsTime).map(|t| charge + t),
            drop.map(|t| charge + t),
        )
    }

    pub fn durations(&self) -> PhaseDurations {
        let span = |a: Option<f64>, b: Option<f64>| Some(b? - a?);
        PhaseDurations {
            dry: span(Some(self.charge), self.dry),
            mid: span(self.dry, self.first_crack_start),
            finish: span(self.first_crack_start, self.drop),
        }
    }

    /// `drop - charge` when drop is known.
    pub fn total(&self) -> Option<f64> {
        self.drop.map(|d| d - self.charge)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PhaseDurations {
    pub dry: Option<f64>,
    pub mid: Option<f64>,
    pub finish: Option<f64>,
}

/// Phase durations with their share of the total roast time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PhaseSummary {
    pub durations: PhaseDurations,
    pub total: Option<f64>,
    pub dry_pct: Option<f64>,
    pub mid_pct: Option<f64>,
    pub finish_pct: Option<f64>,
}

impl PhaseSummary {
    /// Percentages use `total` only when it is positive.
    pub fn new(durations: PhaseDurations, total: Option<f64>) -> Self {
        let total = total.filter(|t| *t > 0.0);
        let pct = |d: Option<f64>| Some(d? / total? * 100.0);
        Self {
            durations,
            total,
            dry_pct: pct(durations.dry),
            mid_pct: pct(durations.mid),
            finish_pct: pct(durations.finish),
        }
    }

    /// Read a summary back out of a (possibly declared) metrics bundle.
    pub fn from_metrics(m: &ComputedMetrics) -> Self {
        let durations = PhaseDurations {
            dry: m.value(MetricId::DryPhaseTime),
            mid: m.value(MetricId::MidPhaseTime),
            finish: m.value(MetricId::FinishPhaseTime),
        };
        let total = m
            .value(MetricId::DropTime)
            .or_else(|| m.value(MetricId::TotalTime));
        let mut s = Self::new(durations, total);
        // Declared percentages win over recomputed ones
        s.dry_pct = m.value(MetricId::DryPhasePct).or(s.dry_pct);
        s.mid_pct = m.value(MetricId::MidPhasePct).or(s.mid_pct);
        s.finish_pct = m.value(MetricId::FinishPhasePct).or(s.finish_pct);
        s
    }

    pub fn to_metrics(&self, source: Source) -> ComputedMetrics {
        ComputedMetrics::new()
            .with(MetricId::DryPhaseTime, self.durations.dry, source)
            .with(MetricId::MidPhaseTime, self.durations.mid, source)
            .with(MetricId::FinishPhaseTime, self.durations.finish, source)
            .with(MetricId::DryPhasePct, self.dry_pct, source)
            .with(MetricId::MidPhasePct, self.mid_pct, source)
            .with(MetricId::FinishPhasePct, self.finish_pct, source)
    }
}

/// Index of the minimum non-null value in `values[lo..=hi]`; earliest wins ties.
pub fn find_turning_point(values: &[Option<f64>], lo: usize, hi: usize) -> Option<usize> {
    if values.is_empty() || lo > hi {
        return None;
    }
    let hi = hi.min(values.len() - 1);
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.iter().enumerate().take(hi + 1).skip(lo) {
        if let Some(v) = *v
            && best.is_none_or(|(_, b)| v < b)
        {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Closed search range for the turning point.
///
/// `[charge, dry]` when dry-end is known, else `[charge, fcs]`, else the
/// first `cap` samples after charge.
pub fn tp_search_range(
    charge: usize,
    dry: Option<usize>,
    fcs: Option<usize>,
    len: usize,
    cap: usize,
) -> Option<(usize, usize)> {
    if len == 0 || charge >= len {
        return None;
    }
    let hi = match (dry, fcs) {
        (Some(d), _) => d,
        (None, Some(f)) => f,
        (None, None) => charge.saturating_add(cap).min(len - 1),
    };
    (hi >= charge).then_some((charge, hi))
}

/// Sample indices of resolved events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventSamples {
    pub charge: usize,
    pub dry: Option<usize>,
    pub fcs: Option<usize>,
    pub fce: Option<usize>,
    pub scs: Option<usize>,
    pub sce: Option<usize>,
    pub drop: Option<usize>,
}

/// What the detector could support from the curve and its index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub mode: DetectionMode,
    pub samples: EventSamples,
    pub boundaries: PhaseBoundaries,
    pub turning_point: Option<TurningPoint>,
}

impl Detection {
    /// Charge-relative event metrics sourced from the curve.
    pub fn to_metrics(&self, series: &TimeSeries) -> ComputedMetrics {
        let src = Source::Telemetry;
        let t = series.time();
        let charge_t = t[self.samples.charge];
        let rel = |i: Option<usize>| i.map(|i| t[i] - charge_t);
        let bt = |i: Option<usize>| series.bt()[i?];
        let et = |i: Option<usize>| series.et()[i?];
        let tp = self.turning_point.map(|tp| tp.index);
        let s = &self.samples;
        let charge = Some(s.charge);

        let mut m = ComputedMetrics::new()
            .with(MetricId::ChargeBt, bt(charge), src)
            .with(MetricId::ChargeEt, et(charge), src)
            .with(MetricId::TpTime, rel(tp), src)
            .with(MetricId::TpBt, bt(tp), src)
            .with(MetricId::TpEt, et(tp), src)
            .with(MetricId::DryTime, rel(s.dry), src)
            .with(MetricId::DryBt, bt(s.dry), src)
            .with(MetricId::DryEt, et(s.dry), src)
            .with(MetricId::FcsTime, rel(s.fcs), src)
            .with(MetricId::FcsBt, bt(s.fcs), src)
            .with(MetricId::FcsEt, et(s.fcs), src)
            .with(MetricId::FceTime, rel(s.fce), src)
            .with(MetricId::FceBt, bt(s.fce), src)
            .with(MetricId::FceEt, et(s.fce), src)
            .with(MetricId::ScsTime, rel(s.scs), src)
            .with(MetricId::ScsBt, bt(s.scs), src)
            .with(MetricId::SceTime, rel(s.sce), src)
            .with(MetricId::SceBt, bt(s.sce), src)
            .with(MetricId::DropTime, rel(s.drop), src)
            .with(MetricId::DropBt, bt(s.drop), src)
            .with(MetricId::DropEt, et(s.drop), src);
        m.insert(MetricId::TotalTime, rel(s.drop), src);
        m
    }

    /// Markers for every resolved event plus the turning point, in time order.
    pub fn markers(&self, series: &TimeSeries) -> Vec<EventMarker> {
        let s = &self.samples;
        let mut out: Vec<EventMarker> = [
            (Marker::Event(RoastEvent::Charge), Some(s.charge)),
            (Marker::TurningPoint, self.turning_point.map(|tp| tp.index)),
            (Marker::Event(RoastEvent::DryEnd), s.dry),
            (Marker::Event(RoastEvent::FirstCrackStart), s.fcs),
            (Marker::Event(RoastEvent::FirstCrackEnd), s.fce),
            (Marker::Event(RoastEvent::SecondCrackStart), s.scs),
            (Marker::Event(RoastEvent::SecondCrackEnd), s.sce),
            (Marker::Event(RoastEvent::Drop), s.drop),
        ]
        .into_iter()
        .filter_map(|(marker, idx)| {
            let index = idx?;
            Some(EventMarker {
                marker,
                index,
                time: series.time()[index],
                bt: series.bt()[index],
            })
        })
        .collect();
        out.sort_by_key(|m| m.index);
        out
    }
}

/// Run the detector over `curve`.
///
/// Returns `Ok(None)` for an empty series. An index bound to another series
/// is a structural error.
pub fn detect(curve: &RoastCurve, tp_search_samples: usize) -> Result<Option<Detection>, AnalysisError> {
    let series = curve.series();
    if series.is_empty() {
        return Ok(None);
    }
    let len = series.len();
    let t = series.time();

    let (mode, samples) = match curve.events() {
        Some(idx) => {
            if idx.series_id() != series.id() {
                return Err(AnalysisError::ForeignEventIndex {
                    bound: idx.series_id().get(),
                    series: series.id().get(),
                });
            }
            let charge = idx.get(RoastEvent::Charge).unwrap_or(0);
            // Events after charge must not run backwards in time
            let mut last = charge;
            let mut keep = |ev: RoastEvent| {
                let i = idx.get(ev)?;
                if t[i] >= t[last] {
                    last = i;
                    Some(i)
                } else {
                    tracing::debug!(event = ?ev, index = i, "event precedes an earlier event; ignored");
                    None
                }
            };
            let samples = EventSamples {
                charge,
                dry: keep(RoastEvent::DryEnd),
                fcs: keep(RoastEvent::FirstCrackStart),
                fce: keep(RoastEvent::FirstCrackEnd),
                scs: keep(RoastEvent::SecondCrackStart),
                sce: keep(RoastEvent::SecondCrackEnd),
                drop: keep(RoastEvent::Drop),
            };
            (DetectionMode::Indexed, samples)
        }
        None => (
            DetectionMode::CurveOnly,
            EventSamples {
                charge: 0,
                dry: None,
                fcs: None,
                fce: None,
                scs: None,
                sce: None,
                drop: Some(len - 1),
            },
        ),
    };

    let turning_point = tp_search_range(samples.charge, samples.dry, samples.fcs, len, tp_search_samples)
        .and_then(|(lo, hi)| find_turning_point(series.bt(), lo, hi))
        .and_then(|i| {
            Some(TurningPoint {
                index: i,
                time: t[i],
                bt: series.bt()[i]?,
            })
        });

    let at = |i: Option<usize>| i.map(|i| t[i]);
    let boundaries = PhaseBoundaries::ordered(
        t[samples.charge],
        at(samples.dry),
        at(samples.fcs),
        at(samples.drop),
    );

    tracing::trace!(?mode, tp = ?turning_point.map(|tp| tp.index), "phase detection");
    Ok(Some(Detection {
        mode,
        samples,
        boundaries,
        turning_point,
    }))
}

/// Phase and total rate of rise (°/min) from charge-relative event metrics.
///
/// Dry and total phases start at the turning point when it is known, else at
/// charge.
pub fn phase_ror_metrics(m: &ComputedMetrics, source: Source) -> ComputedMetrics {
    let point = |t: MetricId, bt: MetricId| Some((m.value(t)?, m.value(bt)?));
    let slope = |a: Option<(f64, f64)>, b: Option<(f64, f64)>| {
        let ((ta, va), (tb, vb)) = (a?, b?);
        let dt = tb - ta;
        (dt > 0.0).then(|| (vb - va) / dt * 60.0)
    };

    let start = point(MetricId::TpTime, MetricId::TpBt)
        .or_else(|| m.value(MetricId::ChargeBt).map(|bt| (0.0, bt)));
    let dry = point(MetricId::DryTime, MetricId::DryBt);
    let fcs = point(MetricId::FcsTime, MetricId::FcsBt);
    let drop_t = m
        .value(MetricId::DropTime)
        .or_else(|| m.value(MetricId::TotalTime));
    let drop = drop_t.zip(m.value(MetricId::DropBt));

    ComputedMetrics::new()
        .with(MetricId::DryPhaseRor, slope(start, dry), source)
        .with(MetricId::MidPhaseRor, slope(dry, fcs), source)
        .with(MetricId::FinishPhaseRor, slope(fcs, drop), source)
        .with(MetricId::TotalRor, slope(start, drop), source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turning_point_prefers_earliest_tie() {
        let v = [Some(100.0), Some(90.0), Some(95.0), Some(90.0), Some(120.0)];
        assert_eq!(find_turning_point(&v, 0, 4), Some(1));
        assert_eq!(find_turning_point(&v, 2, 4), Some(3));
    }

    #[test]
    fn turning_point_skips_gaps_and_clamps_range() {
        let v = [None, Some(5.0), None];
        assert_eq!(find_turning_point(&v, 0, 99), Some(1));
        assert_eq!(find_turning_point(&[None, None], 0, 1), None);
        assert_eq!(find_turning_point(&v, 2, 1), None);
    }

    #[test]
    fn search_range_precedence() {
        assert_eq!(tp_search_range(2, Some(40), Some(80), 500, 200), Some((2, 40)));
        assert_eq!(tp_search_range(2, None, Some(80), 500, 200), Some((2, 80)));
        assert_eq!(tp_search_range(2, None, None, 500, 200), Some((2, 202)));
        assert_eq!(tp_search_range(2, None, None, 50, 200), Some((2, 49)));
        assert_eq!(tp_search_range(5, None, None, 5, 200), None);
    }

    #[test]
    fn ordered_discards_backwards_boundaries() {
        let b = PhaseBoundaries::ordered(0.0, Some(300.0), Some(250.0), Some(600.0));
        assert_eq!(b.dry, Some(300.0));
        assert_eq!(b.first_crack_start, None);
        assert_eq!(b.drop, Some(600.0));
    }

    #[test]
    fn durations_need_both_ends() {
        let b = PhaseBoundaries::ordered(10.0, Some(250.0), None, Some(610.0));
        let d = b.durations();
        assert_eq!(d.dry, Some(240.0));
        assert_eq!(d.mid, None);
        assert_eq!(d.finish, None);
        assert_eq!(b.total(), Some(600.0));
    }

    #[test]
    fn summary_percentages() {
        let b = PhaseBoundaries::ordered(0.0, Some(240.0), Some(480.0), Some(600.0));
        let s = PhaseSummary::new(b.durations(), b.total());
        assert_eq!(s.dry_pct, Some(40.0));
        assert_eq!(s.mid_pct, Some(40.0));
        assert_eq!(s.finish_pct, Some(20.0));
        let none = PhaseSummary::new(b.durations(), Some(0.0));
        assert_eq!(none.dry_pct, None);
    }

    #[test]
    fn phase_ror_from_tp_or_charge() {
        let m = ComputedMetrics::new()
            .with(MetricId::ChargeBt, Some(200.0), Source::Profile)
            .with(MetricId::TpTime, Some(60.0), Source::Profile)
            .with(MetricId::TpBt, Some(90.0), Source::Profile)
            .with(MetricId::DryTime, Some(240.0), Source::Profile)
            .with(MetricId::DryBt, Some(150.0), Source::Profile)
            .with(MetricId::DropTime, Some(600.0), Source::Profile)
            .with(MetricId::DropBt, Some(210.0), Source::Profile);
        let r = phase_ror_metrics(&m, Source::Telemetry);
        assert_eq!(r.value(MetricId::DryPhaseRor), Some(20.0));
        assert_eq!(r.value(MetricId::MidPhaseRor), None);
        assert_eq!(r.value(MetricId::TotalRor), Some(120.0 / 540.0 * 60.0));
    }
}
