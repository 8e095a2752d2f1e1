//! Goal compliance: compare resolved metrics against a reference roast or
//! explicit targets.

use serde::Serialize;

use crate::metrics::{ComputedMetrics, MetricId};

/// Half-width used when a parameter has zero tolerance.
pub const MIN_HALF_BAND: f64 = 1e-6;

/// Per-parameter outcome. Ordered so that `max` yields the worst status and
/// `Unknown` only wins when nothing else was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unknown,
    Green,
    Yellow,
    Red,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unknown => "unknown",
            Status::Green => "green",
            Status::Yellow => "yellow",
            Status::Red => "red",
        }
    }

    /// Worst of `statuses`, `Unknown` when empty.
    pub fn worst(statuses: impl IntoIterator<Item = Status>) -> Status {
        statuses.into_iter().max().unwrap_or(Status::Unknown)
    }
}

/// What a failed comparison reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    #[default]
    Red,
    Yellow,
}

/// What a comparison with a missing actual or target reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OnMissing {
    #[default]
    Skip,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGoal {
    pub metric: MetricId,
    pub enabled: bool,
    /// Full band width; the accepted range is `target ± tolerance / 2`.
    pub tolerance: f64,
    /// Full width of the wider warning band, if any.
    pub warning: Option<f64>,
    /// Fixed target; when absent the reference metric is the target.
    pub target: Option<f64>,
}

impl ParameterGoal {
    pub fn new(metric: MetricId, tolerance: f64) -> Self {
        Self {
            metric,
            enabled: true,
            tolerance,
            warning: None,
            target: None,
        }
    }

    pub fn with_warning(mut self, warning: f64) -> Self {
        self.warning = Some(warning);
        self
    }

    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    fn half_band(&self) -> f64 {
        (self.tolerance / 2.0).max(MIN_HALF_BAND)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalDefinition {
    pub name: String,
    pub active: bool,
    pub on_failure: OnFailure,
    pub on_missing: OnMissing,
    pub parameters: Vec<ParameterGoal>,
}

impl GoalDefinition {
    pub fn new(name: impl Into<String>, parameters: Vec<ParameterGoal>) -> Self {
        Self {
            name: name.into(),
            active: true,
            on_failure: OnFailure::default(),
            on_missing: OnMissing::default(),
            parameters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamResult {
    pub metric: MetricId,
    pub actual: Option<f64>,
    pub reference: Option<f64>,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalCheckResult {
    pub goal: String,
    pub parameters: Vec<ParamResult>,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalReport {
    pub goals: Vec<GoalCheckResult>,
    pub status: Status,
}

fn classify(param: &ParameterGoal, actual: Option<f64>, target: Option<f64>, goal: &GoalDefinition) -> Status {
    let (Some(a), Some(t)) = (actual, target) else {
        return match goal.on_missing {
            OnMissing::Skip => Status::Unknown,
            OnMissing::Yellow => Status::Yellow,
            OnMissing::Red => Status::Red,
        };
    };
    let diff = (a - t).abs();
    if diff <= param.half_band() {
        return Status::Green;
    }
    if let Some(w) = param.warning
        && diff <= (w / 2.0).max(MIN_HALF_BAND)
    {
        return Status::Yellow;
    }
    match goal.on_failure {
        OnFailure::Red => Status::Red,
        OnFailure::Yellow => Status::Yellow,
    }
}

/// Check every enabled parameter of `goal` against `reference`.
pub fn compare_to_reference(
    actual: &ComputedMetrics,
    reference: &ComputedMetrics,
    goal: &GoalDefinition,
) -> GoalCheckResult {
    let parameters: Vec<ParamResult> = goal
        .parameters
        .iter()
        .filter(|p| p.enabled)
        .map(|p| {
            let a = actual.value(p.metric);
            let target = p.target.or_else(|| reference.value(p.metric));
            let status = classify(p, a, target, goal);
            tracing::trace!(goal = %goal.name, metric = %p.metric, ?a, ?target, ?status, "parameter checked");
            ParamResult {
                metric: p.metric,
                actual: a,
                reference: target,
                status,
            }
        })
        .collect();
    let status = Status::worst(parameters.iter().map(|p| p.status));
    GoalCheckResult {
        goal: goal.name.clone(),
        parameters,
        status,
    }
}

/// Evaluate all active goals and aggregate to the worst status.
pub fn check_goals(actual: &ComputedMetrics, reference: &ComputedMetrics, goals: &[GoalDefinition]) -> GoalReport {
    let goals: Vec<GoalCheckResult> = goals
        .iter()
        .filter(|g| g.active)
        .map(|g| compare_to_reference(actual, reference, g))
        .collect();
    let status = Status::worst(goals.iter().map(|g| g.status));
    GoalReport { goals, status }
}
