//! Sparse named metrics with provenance.
//!
//! `ComputedMetrics` maps a `MetricId` to a value and the source it came
//! from. Metrics are grouped by the event or derivation that produces them;
//! merging copies whole groups so one group never mixes sources.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AnalysisError;

/// Where a metric value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Declared by the upstream profile computation
    Profile,
    /// Derived by this engine from the raw curve
    Telemetry,
    /// Stored roast record summary
    Stored,
}

/// Physical kind of a metric, used for unit conversion at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Absolute temperature
    Temperature,
    /// Temperature per minute, or temperature times minutes
    TemperatureRate,
    /// Seconds
    Duration,
    Percent,
    /// Kilograms
    Mass,
    Dimensionless,
}

/// Logical group; merges take or leave a group as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricGroup {
    Charge,
    TurningPoint,
    DryEnd,
    FirstCrackStart,
    FirstCrackEnd,
    SecondCrackStart,
    SecondCrackEnd,
    Drop,
    Phases,
    PhaseRor,
    Auc,
    WeightLoss,
    Weights,
    Color,
}

impl MetricGroup {
    /// Groups whose values are points on the curve.
    pub const TIMING: [MetricGroup; 8] = [
        MetricGroup::Charge,
        MetricGroup::TurningPoint,
        MetricGroup::DryEnd,
        MetricGroup::FirstCrackStart,
        MetricGroup::FirstCrackEnd,
        MetricGroup::SecondCrackStart,
        MetricGroup::SecondCrackEnd,
        MetricGroup::Drop,
    ];

    /// Summary scalars where a stored record outranks curve synthesis.
    pub const SUMMARY: [MetricGroup; 3] =
        [MetricGroup::Auc, MetricGroup::Weights, MetricGroup::Color];
}

macro_rules! metric_ids {
    ($( $id:ident => $key:literal, $group:ident, $kind:ident $(, [$($alias:literal),*])? ; )*) => {
        /// Known metric identifiers. `as_str` is the canonical profile key.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum MetricId {
            $( $id, )*
        }

        impl MetricId {
            pub const ALL: &'static [MetricId] = &[ $( MetricId::$id, )* ];

            pub fn as_str(self) -> &'static str {
                match self {
                    $( MetricId::$id => $key, )*
                }
            }

            pub fn group(self) -> MetricGroup {
                match self {
                    $( MetricId::$id => MetricGroup::$group, )*
                }
            }

            pub fn kind(self) -> MetricKind {
                match self {
                    $( MetricId::$id => MetricKind::$kind, )*
                }
            }

            /// Look up a canonical key or one of the goal-vocabulary aliases.
            pub fn from_key(key: &str) -> Option<MetricId> {
                match key {
                    $( $key $($(| $alias)*)? => Some(MetricId::$id), )*
                    _ => None,
                }
            }
        }
    };
}

metric_ids! {
    ChargeBt => "CHARGE_BT", Charge, Temperature, ["charge_temp"];
    ChargeEt => "CHARGE_ET", Charge, Temperature;
    TpTime => "TP_time", TurningPoint, Duration;
    TpBt => "TP_BT", TurningPoint, Temperature, ["TP_temp"];
    TpEt => "TP_ET", TurningPoint, Temperature;
    DryTime => "DRY_time", DryEnd, Duration;
    DryBt => "DRY_BT", DryEnd, Temperature, ["DRY_temp"];
    DryEt => "DRY_ET", DryEnd, Temperature;
    FcsTime => "FCs_time", FirstCrackStart, Duration;
    FcsBt => "FCs_BT", FirstCrackStart, Temperature, ["FCs_temp"];
    FcsEt => "FCs_ET", FirstCrackStart, Temperature;
    FceTime => "FCe_time", FirstCrackEnd, Duration;
    FceBt => "FCe_BT", FirstCrackEnd, Temperature, ["FCe_temp"];
    FceEt => "FCe_ET", FirstCrackEnd, Temperature;
    ScsTime => "SCs_time", SecondCrackStart, Duration;
    ScsBt => "SCs_BT", SecondCrackStart, Temperature;
    SceTime => "SCe_time", SecondCrackEnd, Duration;
    SceBt => "SCe_BT", SecondCrackEnd, Temperature;
    DropTime => "DROP_time", Drop, Duration;
    DropBt => "DROP_BT", Drop, Temperature, ["drop_temp"];
    DropEt => "DROP_ET", Drop, Temperature;
    TotalTime => "totaltime", Drop, Duration, ["total_time", "drop_time"];
    DryPhaseTime => "dryphasetime", Phases, Duration;
    MidPhaseTime => "midphasetime", Phases, Duration;
    FinishPhaseTime => "finishphasetime", Phases, Duration, ["DEV_time"];
    DryPhasePct => "dry_phase_pct", Phases, Percent;
    MidPhasePct => "mid_phase_pct", Phases, Percent;
    FinishPhasePct => "finish_phase_pct", Phases, Percent, ["DEV_ratio"];
    DryPhaseRor => "dry_phase_ror", PhaseRor, TemperatureRate;
    MidPhaseRor => "mid_phase_ror", PhaseRor, TemperatureRate;
    FinishPhaseRor => "finish_phase_ror", PhaseRor, TemperatureRate;
    TotalRor => "total_ror", PhaseRor, TemperatureRate;
    FcsRor => "fcs_ror", PhaseRor, TemperatureRate;
    Auc => "AUC", Auc, TemperatureRate;
    AucBase => "AUCbase", Auc, Temperature;
    WeightLoss => "weight_loss", WeightLoss, Percent;
    GreenWeight => "green_weight_kg", Weights, Mass;
    RoastedWeight => "roasted_weight_kg", Weights, Mass;
    WholeColor => "whole_color", Color, Dimensionless;
    GroundColor => "ground_color", Color, Dimensionless;
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricId {
    type Err = AnalysisError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricId::from_key(s).ok_or_else(|| AnalysisError::UnknownMetric(s.to_string()))
    }
}

impl Serialize for MetricId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metric {
    pub value: f64,
    pub source: Source,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ComputedMetrics {
    entries: BTreeMap<MetricId, Metric>,
}

impl ComputedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a finite value; `None` and non-finite values are ignored.
    pub fn insert(&mut self, id: MetricId, value: Option<f64>, source: Source) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.entries.insert(id, Metric { value: v, source });
        }
    }

    /// Builder-style `insert`.
    pub fn with(mut self, id: MetricId, value: Option<f64>, source: Source) -> Self {
        self.insert(id, value, source);
        self
    }

    pub fn value(&self, id: MetricId) -> Option<f64> {
        self.entries.get(&id).map(|m| m.value)
    }

    pub fn get(&self, id: MetricId) -> Option<&Metric> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: MetricId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricId, &Metric)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn has_group(&self, group: MetricGroup) -> bool {
        self.entries.keys().any(|id| id.group() == group)
    }

    /// Copy of the members of `group`.
    pub fn group(&self, group: MetricGroup) -> ComputedMetrics {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(id, _)| id.group() == group)
                .map(|(id, m)| (*id, *m))
                .collect(),
        }
    }

    fn absorb(&mut self, other: ComputedMetrics) {
        self.entries.extend(other.entries);
    }

    /// Build a fresh bundle taking each of `groups` wholesale from the first
    /// layer (in precedence order) that has any member of it.
    pub fn merge_groups(layers: &[&ComputedMetrics], groups: &[MetricGroup]) -> ComputedMetrics {
        let mut out = ComputedMetrics::new();
        for &g in groups {
            if let Some(layer) = layers.iter().find(|l| l.has_group(g)) {
                out.absorb(layer.group(g));
            }
        }
        out
    }

    /// Add every group of `other` that `self` lacks entirely.
    pub fn fill_missing_groups(&mut self, other: &ComputedMetrics) {
        let groups: Vec<MetricGroup> = other.entries.keys().map(|id| id.group()).collect();
        for g in groups {
            if !self.has_group(g) {
                self.absorb(other.group(g));
            }
        }
    }

    /// Parse `(key, value)` pairs, skipping unknown keys.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, f64)>,
        source: Source,
    ) -> ComputedMetrics {
        let mut out = ComputedMetrics::new();
        for (key, value) in pairs {
            match MetricId::from_key(key) {
                Some(id) => out.insert(id, Some(value), source),
                None => tracing::trace!(key, "ignoring unknown metric key"),
            }
        }
        out
    }
}
