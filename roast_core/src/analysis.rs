//! The analysis pipeline: one snapshot in, one report out.
//!
//! Order per roast: RoR → smoothing → detection → merge with declared and
//! stored values → phases, phase RoR, AUC, weight loss → display decimation.
//! Each call builds a fresh metrics bundle; inputs are never mutated.

use serde::Serialize;

use crate::auc::area_under_curve;
use crate::config::AnalysisCfg;
use crate::downsample::{DisplayPoint, downsample};
use crate::error::{BuildError, Result};
use crate::metrics::{ComputedMetrics, MetricGroup, MetricId, Source};
use crate::phases::{
    Detection, DetectionMode, EventMarker, PhaseBoundaries, PhaseSummary, TurningPoint, detect,
    phase_ror_metrics,
};
use crate::resolve::{first_passing, resolve_weight_loss_with_source};
use crate::ror::{calculate_ror, ror_at};
use crate::series::TimeSeries;
use crate::smooth::{median, smooth};
use crate::snapshot::{RoastSnapshot, Weights};

/// Result of analyzing one roast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoastReport {
    pub label: Option<String>,
    /// `None` when there was no usable curve.
    pub mode: Option<DetectionMode>,
    pub metrics: ComputedMetrics,
    pub phases: PhaseSummary,
    pub boundaries: PhaseBoundaries,
    pub turning_point: Option<TurningPoint>,
    pub markers: Vec<EventMarker>,
    pub weight_loss: Option<f64>,
    pub display: Vec<DisplayPoint>,
}

/// Curve-derived intermediate results.
struct CurveAnalysis {
    detection: Detection,
    metrics: ComputedMetrics,
    markers: Vec<EventMarker>,
    display: Vec<DisplayPoint>,
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    cfg: AnalysisCfg,
}

impl Analyzer {
    pub fn new(cfg: AnalysisCfg) -> std::result::Result<Self, BuildError> {
        if cfg.ror.period_s == 0 {
            return Err(BuildError::InvalidConfig("ror.period_s must be >= 1"));
        }
        if cfg.smoothing.window == 0 {
            return Err(BuildError::InvalidConfig("smoothing.window must be >= 1"));
        }
        if cfg.smoothing.median_window == 0 {
            return Err(BuildError::InvalidConfig("smoothing.median_window must be >= 1"));
        }
        if cfg.phases.tp_search_samples == 0 {
            return Err(BuildError::InvalidConfig("phases.tp_search_samples must be >= 1"));
        }
        if cfg.auc.base_c.is_some_and(|b| !b.is_finite()) {
            return Err(BuildError::InvalidConfig("auc.base_c must be finite"));
        }
        if cfg.display.step == Some(0) {
            return Err(BuildError::InvalidConfig("display.step must be >= 1"));
        }
        if cfg.display.max_points.is_some_and(|m| m < 2) {
            return Err(BuildError::InvalidConfig("display.max_points must be >= 2"));
        }
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &AnalysisCfg {
        &self.cfg
    }

    /// Analyze one roast.
    ///
    /// Structural problems in the curve (misaligned arrays, foreign event
    /// index) are errors. Missing or implausible data only leaves metrics
    /// absent.
    pub fn analyze(&self, snap: &RoastSnapshot) -> Result<RoastReport> {
        let curve = match &snap.curve {
            Some(c) => self.analyze_curve(c, snap.declared.value(MetricId::AucBase))?,
            None => None,
        };
        let empty = ComputedMetrics::new();
        let telemetry = curve.as_ref().map_or(&empty, |c| &c.metrics);
        let declared = &snap.declared;
        let stored = &snap.stored;

        // Event timings: declared > telemetry > stored
        let mut merged = ComputedMetrics::merge_groups(&[declared, telemetry, stored], &MetricGroup::TIMING);

        // Phases come from the merged boundaries unless supplied as a group
        let charge_abs = curve
            .as_ref()
            .map_or(0.0, |c| c.detection.boundaries.charge);
        let boundaries = PhaseBoundaries::from_metrics(charge_abs, &merged);
        let derived = PhaseSummary::new(boundaries.durations(), boundaries.total()).to_metrics(Source::Telemetry);
        merged.fill_missing_groups(&ComputedMetrics::merge_groups(
            &[declared, &derived, stored],
            &[MetricGroup::Phases],
        ));

        // Phase RoR: derived from merged events, fcs_ror from the smoothed curve
        let mut ror = phase_ror_metrics(&merged, Source::Telemetry);
        if let Some(fcs) = telemetry.get(MetricId::FcsRor) {
            ror.insert(MetricId::FcsRor, Some(fcs.value), fcs.source);
        }
        merged.fill_missing_groups(&ComputedMetrics::merge_groups(
            &[declared, &ror, stored],
            &[MetricGroup::PhaseRor],
        ));

        // Summary values: declared > stored > telemetry. A declared base
        // without an area only steers the computed area.
        let declared_auc = if declared.contains(MetricId::Auc) { declared } else { &empty };
        merged.fill_missing_groups(&ComputedMetrics::merge_groups(
            &[declared_auc, stored, telemetry],
            &[MetricGroup::Auc],
        ));
        merged.fill_missing_groups(&ComputedMetrics::merge_groups(
            &[declared, stored, telemetry],
            &[MetricGroup::Color],
        ));

        // Weights: stored record first, then the profile's own weights
        let profile_weights = weights_metrics(snap.weights, Source::Profile);
        merged.fill_missing_groups(&ComputedMetrics::merge_groups(
            &[stored, &profile_weights, declared],
            &[MetricGroup::Weights],
        ));

        let weight_loss = weight_loss_for(snap, &merged);
        if let Some((pct, source)) = weight_loss {
            merged.insert(MetricId::WeightLoss, Some(pct), source);
        }

        let phases = PhaseSummary::from_metrics(&merged);
        let report_boundaries = PhaseBoundaries::from_metrics(charge_abs, &merged);

        let (mode, turning_point, markers, display) = match curve {
            Some(c) => (
                Some(c.detection.mode),
                c.detection.turning_point,
                c.markers,
                c.display,
            ),
            None => (None, None, Vec::new(), Vec::new()),
        };

        tracing::debug!(
            label = snap.label.as_deref().unwrap_or(""),
            ?mode,
            metrics = merged.len(),
            weight_loss = ?weight_loss.map(|w| w.0),
            "roast analyzed"
        );

        Ok(RoastReport {
            label: snap.label.clone(),
            mode,
            metrics: merged,
            phases,
            boundaries: report_boundaries,
            turning_point,
            markers,
            weight_loss: weight_loss.map(|w| w.0),
            display,
        })
    }

    /// Smoothed BT and ET RoR for `series`.
    pub fn smoothed_ror(&self, series: &TimeSeries) -> Result<(Vec<Option<f64>>, Vec<Option<f64>>)> {
        let filter = |values: &[Option<f64>]| -> Result<Vec<Option<f64>>> {
            let raw = calculate_ror(values, series.time(), self.cfg.ror.period_s)?;
            let pre = median(&raw, self.cfg.smoothing.median_window);
            Ok(smooth(&pre, self.cfg.smoothing.window))
        };
        Ok((filter(series.bt())?, filter(series.et())?))
    }

    fn analyze_curve(
        &self,
        curve: &crate::series::RoastCurve,
        declared_base: Option<f64>,
    ) -> Result<Option<CurveAnalysis>> {
        if let Some(at) = curve.series().first_time_regression() {
            tracing::warn!(index = at, "time axis goes backwards; ignoring curve");
            return Ok(None);
        }
        let Some(detection) = detect(curve, self.cfg.phases.tp_search_samples)? else {
            tracing::debug!("empty curve; nothing to detect");
            return Ok(None);
        };
        let series = curve.series();
        let (ror_bt, ror_et) = self.smoothed_ror(series)?;

        let mut metrics = detection.to_metrics(series);
        metrics.insert(
            MetricId::FcsRor,
            ror_at(&ror_bt, detection.samples.fcs),
            Source::Telemetry,
        );
        if let Some((base, auc)) = self.curve_auc(&detection, series, declared_base) {
            metrics.insert(MetricId::AucBase, Some(base), Source::Telemetry);
            metrics.insert(MetricId::Auc, Some(auc), Source::Telemetry);
        }

        let points: Vec<DisplayPoint> = (0..series.len())
            .map(|i| DisplayPoint {
                time: series.time()[i],
                et: series.et()[i],
                bt: series.bt()[i],
                ror_et: ror_et[i],
                ror_bt: ror_bt[i],
            })
            .collect();
        let display = downsample(&points, self.cfg.display.step_for(points.len()));

        Ok(Some(CurveAnalysis {
            markers: detection.markers(series),
            detection,
            metrics,
            display,
        }))
    }

    /// AUC from the turning point (or charge) to drop. Base: declared, then
    /// configured, then the turning-point BT.
    fn curve_auc(
        &self,
        detection: &Detection,
        series: &TimeSeries,
        declared_base: Option<f64>,
    ) -> Option<(f64, f64)> {
        let end = detection.samples.drop?;
        let tp = detection.turning_point;
        let start = tp.map_or(detection.samples.charge, |tp| tp.index);
        let base = first_passing(
            [declared_base, self.cfg.auc.base_c, tp.map(|tp| tp.bt)],
            |b| b.is_finite(),
        )?;
        let area = area_under_curve(series.time(), series.bt(), start, end, base)?;
        Some((base, area))
    }
}

fn weights_metrics(w: Weights, source: Source) -> ComputedMetrics {
    ComputedMetrics::new()
        .with(MetricId::GreenWeight, w.green_kg, source)
        .with(MetricId::RoastedWeight, w.roasted_kg, source)
}

/// Weight loss with the source it was taken from.
fn weight_loss_for(snap: &RoastSnapshot, merged: &ComputedMetrics) -> Option<(f64, Source)> {
    let weights_source = merged
        .get(MetricId::GreenWeight)
        .map_or(Source::Stored, |m| m.source);
    resolve_weight_loss_with_source(
        merged.value(MetricId::GreenWeight),
        merged.value(MetricId::RoastedWeight),
        weights_source,
        snap.declared.value(MetricId::WeightLoss),
        snap.stored.value(MetricId::WeightLoss),
    )
}

/// Analyze independent roasts on a scoped worker pool.
///
/// Results come back in input order.
pub fn analyze_batch(analyzer: &Analyzer, snapshots: &[RoastSnapshot]) -> Vec<Result<RoastReport>> {
    if snapshots.is_empty() {
        return Vec::new();
    }
    let workers = std::thread::available_parallelism()
        .map_or(1, std::num::NonZeroUsize::get)
        .min(snapshots.len());

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &RoastSnapshot)>();
    let (out_tx, out_rx) = crossbeam_channel::unbounded::<(usize, Result<RoastReport>)>();
    for job in snapshots.iter().enumerate() {
        // Receiver is alive for the whole function
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    std::thread::scope(|s| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let out_tx = out_tx.clone();
            s.spawn(move || {
                for (idx, snap) in job_rx.iter() {
                    if out_tx.send((idx, analyzer.analyze(snap))).is_err() {
                        tracing::debug!("batch consumer gone; worker exiting");
                        break;
                    }
                }
            });
        }
    });
    drop(out_tx);

    let mut slots: Vec<Option<Result<RoastReport>>> = (0..snapshots.len()).map(|_| None).collect();
    for (idx, res) in out_rx.iter() {
        slots[idx] = Some(res);
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(idx, r)| r.unwrap_or_else(|| Err(eyre::eyre!("roast #{idx} produced no result"))))
        .collect()
}
