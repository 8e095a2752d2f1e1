//! Conversions from `roast_config` documents and schema into core types.
//!
//! Unit normalization happens here and nowhere else: everything that leaves
//! this module is in °C, seconds and kilograms.

use std::str::FromStr;

use crate::config::{AnalysisCfg, AucCfg, DisplayCfg, PhaseCfg, RorCfg, SmoothingCfg};
use crate::error::AnalysisError;
use crate::goals::{GoalDefinition, OnFailure, OnMissing, ParameterGoal};
use crate::metrics::{ComputedMetrics, MetricId, MetricKind, Source};
use crate::series::{RoastCurve, TimeSeries};
use crate::snapshot::{RoastSnapshot, Weights};
use crate::units::{MassUnit, TempUnit};

// ── AnalysisCfg ──────────────────────────────────────────────────────────────

impl From<&roast_config::RorCfg> for RorCfg {
    fn from(c: &roast_config::RorCfg) -> Self {
        Self {
            period_s: c.period_s,
        }
    }
}

impl From<&roast_config::SmoothingCfg> for SmoothingCfg {
    fn from(c: &roast_config::SmoothingCfg) -> Self {
        Self {
            window: c.window,
            median_window: c.median_window,
        }
    }
}

impl From<&roast_config::PhaseCfg> for PhaseCfg {
    fn from(c: &roast_config::PhaseCfg) -> Self {
        Self {
            tp_search_samples: c.tp_search_samples,
        }
    }
}

impl From<&roast_config::AucCfg> for AucCfg {
    fn from(c: &roast_config::AucCfg) -> Self {
        Self { base_c: c.base_c }
    }
}

impl From<&roast_config::DisplayCfg> for DisplayCfg {
    fn from(c: &roast_config::DisplayCfg) -> Self {
        Self {
            step: c.step,
            max_points: c.max_points,
        }
    }
}

impl From<&roast_config::Config> for AnalysisCfg {
    fn from(c: &roast_config::Config) -> Self {
        Self {
            ror: (&c.ror).into(),
            smoothing: (&c.smoothing).into(),
            phases: (&c.phases).into(),
            auc: (&c.auc).into(),
            display: (&c.display).into(),
        }
    }
}

// ── Goals ────────────────────────────────────────────────────────────────────

impl From<roast_config::FailedStatus> for OnFailure {
    fn from(s: roast_config::FailedStatus) -> Self {
        match s {
            roast_config::FailedStatus::Failed => OnFailure::Red,
            roast_config::FailedStatus::Warning => OnFailure::Yellow,
        }
    }
}

impl From<roast_config::MissingValueStatus> for OnMissing {
    fn from(s: roast_config::MissingValueStatus) -> Self {
        match s {
            roast_config::MissingValueStatus::Skip => OnMissing::Skip,
            roast_config::MissingValueStatus::Warning => OnMissing::Yellow,
            roast_config::MissingValueStatus::Failed => OnMissing::Red,
        }
    }
}

impl TryFrom<&roast_config::GoalCfg> for GoalDefinition {
    type Error = AnalysisError;

    fn try_from(c: &roast_config::GoalCfg) -> Result<Self, Self::Error> {
        let parameters = c
            .parameters
            .iter()
            .map(|(key, p)| {
                Ok(ParameterGoal {
                    metric: MetricId::from_str(key)?,
                    enabled: p.enabled,
                    tolerance: p.tolerance,
                    warning: p.warning,
                    target: p.target,
                })
            })
            .collect::<Result<Vec<_>, AnalysisError>>()?;
        Ok(Self {
            name: c.name.clone(),
            active: c.is_active,
            on_failure: c.failed_status.into(),
            on_missing: c.missing_value_status.into(),
            parameters,
        })
    }
}

// ── Documents ────────────────────────────────────────────────────────────────

fn temp_unit(mode: Option<&str>) -> TempUnit {
    match mode {
        None => TempUnit::Celsius,
        Some(m) => TempUnit::parse(m).unwrap_or_else(|| {
            tracing::warn!(mode = m, "unknown temperature mode; assuming Celsius");
            TempUnit::Celsius
        }),
    }
}

/// Convert a metric value to Celsius according to its kind.
fn normalize_metric(unit: TempUnit, id: MetricId, v: f64) -> f64 {
    match id.kind() {
        MetricKind::Temperature => unit.to_celsius(v),
        MetricKind::TemperatureRate => unit.rate_to_celsius(v),
        _ => v,
    }
}

/// Build a curve, or `None` when the time axis is empty or runs backwards.
fn curve_from_parts(
    time: Vec<f64>,
    et: Vec<Option<f64>>,
    bt: Vec<Option<f64>>,
    events: Option<&[i64]>,
) -> Result<Option<RoastCurve>, AnalysisError> {
    if time.is_empty() {
        return Ok(None);
    }
    let series = TimeSeries::new(time, et, bt)?;
    if let Some(at) = series.first_time_regression() {
        tracing::warn!(index = at, len = series.len(), "time axis is not monotonic; curve dropped");
        return Ok(None);
    }
    let curve = match events {
        Some(raw) => RoastCurve::with_raw_events(series, raw)?,
        None => RoastCurve::new(series),
    };
    Ok(Some(curve))
}

fn profile_weights(weight: Option<&(f64, f64, String)>) -> Weights {
    let Some((green, roasted, unit)) = weight else {
        return Weights::default();
    };
    let Some(unit) = MassUnit::parse(unit) else {
        tracing::warn!(unit = %unit, "unknown weight unit; profile weights ignored");
        return Weights::default();
    };
    let kg = |v: f64| (v > 0.0 && v.is_finite()).then(|| unit.to_kg(v));
    Weights::new(kg(*green), kg(*roasted))
}

impl TryFrom<&roast_config::ProfileDoc> for RoastSnapshot {
    type Error = AnalysisError;

    fn try_from(doc: &roast_config::ProfileDoc) -> Result<Self, Self::Error> {
        let unit = temp_unit(doc.mode.as_deref());
        let convert = |ch: &[Option<f64>]| -> Vec<Option<f64>> {
            ch.iter().map(|v| v.map(|x| unit.to_celsius(x))).collect()
        };
        let curve = curve_from_parts(
            doc.timex.clone(),
            convert(&doc.temp1),
            convert(&doc.temp2),
            doc.timeindex.as_deref(),
        )?;

        let mut declared = ComputedMetrics::new();
        for (key, v) in doc.computed_numbers() {
            match MetricId::from_key(key) {
                Some(id) => declared.insert(id, Some(normalize_metric(unit, id, v)), Source::Profile),
                None => tracing::trace!(key, "ignoring unknown computed key"),
            }
        }

        Ok(Self {
            curve,
            declared,
            stored: ComputedMetrics::new(),
            weights: profile_weights(doc.weight.as_ref()),
            label: doc.title.clone(),
        })
    }
}

impl TryFrom<&[roast_config::TelemetryRow]> for RoastSnapshot {
    type Error = AnalysisError;

    /// Rows are taken as Celsius.
    fn try_from(rows: &[roast_config::TelemetryRow]) -> Result<Self, Self::Error> {
        let time = rows.iter().map(|r| r.time).collect();
        let et = rows.iter().map(|r| r.et).collect();
        let bt = rows.iter().map(|r| r.bt).collect();
        Ok(Self {
            curve: curve_from_parts(time, et, bt, None)?,
            ..Self::default()
        })
    }
}

impl From<&roast_config::RecordDoc> for ComputedMetrics {
    fn from(r: &roast_config::RecordDoc) -> Self {
        let unit = temp_unit(r.temp_unit.as_deref());
        let src = Source::Stored;
        let temp = |v: Option<f64>| v.map(|x| unit.to_celsius(x));
        let positive = |v: Option<f64>| v.filter(|x| *x > 0.0);

        ComputedMetrics::new()
            .with(MetricId::GreenWeight, positive(r.green_weight_kg), src)
            .with(MetricId::RoastedWeight, positive(r.roasted_weight_kg), src)
            .with(MetricId::WeightLoss, r.weight_loss, src)
            .with(MetricId::ChargeBt, temp(r.charge_temp), src)
            .with(MetricId::TpTime, r.tp_time, src)
            .with(MetricId::TpBt, temp(r.tp_temp), src)
            .with(MetricId::DryTime, r.dry_time, src)
            .with(MetricId::DryBt, temp(r.dry_temp), src)
            .with(MetricId::FcsTime, r.fcs_time, src)
            .with(MetricId::FcsBt, temp(r.fcs_temp), src)
            .with(MetricId::DropTime, r.drop_time, src)
            .with(MetricId::TotalTime, r.drop_time, src)
            .with(MetricId::DropBt, temp(r.drop_temp), src)
            .with(MetricId::FinishPhaseTime, r.dev_time, src)
            .with(MetricId::WholeColor, positive(r.whole_color), src)
            .with(MetricId::GroundColor, positive(r.ground_color), src)
    }
}
