#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Roast-curve telemetry analysis (I/O free).
//!
//! Takes a roaster's sampled ET/BT curve plus whatever the profile and a
//! stored record already declare, and resolves one consistent set of roast
//! metrics.
//!
//! ## Architecture
//!
//! - **Series**: time axis with aligned channels and bound event indices (`series`)
//! - **Units**: Fahrenheit/mass normalization and weight-loss scale (`units`)
//! - **Rate of rise**: time-windowed RoR (`ror`) and centered filters (`smooth`)
//! - **Detection**: turning point, phase boundaries, phase RoR (`phases`, `auc`)
//! - **Merging**: source-tagged metrics merged per group (`metrics`, `resolve`)
//! - **QC**: goal bands and statuses (`goals`)
//! - **Pipeline**: `Analyzer` and the batch runner (`analysis`)
//!
//! Missing data is `None`, never zero. Only structural mistakes by the caller
//! surface as `AnalysisError`.

pub mod analysis;
pub mod auc;
pub mod config;
pub mod conversions;
pub mod downsample;
pub mod error;
pub mod goals;
pub mod metrics;
pub mod phases;
pub mod resolve;
pub mod ror;
pub mod series;
pub mod smooth;
pub mod snapshot;
pub mod source;
pub mod units;

pub use analysis::{Analyzer, RoastReport, analyze_batch};
pub use config::AnalysisCfg;
pub use error::{AnalysisError, BuildError, Report, Result};
pub use goals::{GoalDefinition, GoalReport, ParameterGoal, Status, check_goals, compare_to_reference};
pub use metrics::{ComputedMetrics, Metric, MetricGroup, MetricId, Source};
pub use phases::{DetectionMode, PhaseBoundaries, PhaseSummary, TurningPoint};
pub use series::{EventIndex, RoastCurve, RoastEvent, SeriesId, TimeSeries};
pub use snapshot::{RoastSnapshot, Weights};
pub use source::{GoalSource, ProfileSource};
