#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and input documents for the roast-curve analysis engine.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - `ProfileDoc` / `RecordDoc` are the JSON documents handed over by the
//!   surrounding application (uploaded profile, stored roast record).
//! - The telemetry CSV loader enforces headers and keeps empty cells as gaps
//!   so channels stay aligned with the time axis.
use serde::Deserialize;
use std::collections::BTreeMap;

/// Telemetry CSV schema.
///
/// Expected headers:
/// time,et,bt
///
/// Example:
/// time,et,bt
/// 0,210.5,96.0
/// 2,,94.1
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TelemetryRow {
    pub time: f64,
    pub et: Option<f64>,
    pub bt: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RorCfg {
    /// Trailing window in seconds for the rate-of-rise lookup (30 or 60 typical)
    pub period_s: u32,
}

impl Default for RorCfg {
    fn default() -> Self {
        Self { period_s: 30 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SmoothingCfg {
    /// Centered moving-average window applied to RoR (1 = disabled)
    pub window: usize,
    /// Centered median prefilter window for spike rejection (1 = disabled)
    pub median_window: usize,
}

impl Default for SmoothingCfg {
    fn default() -> Self {
        Self {
            window: 3,
            median_window: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PhaseCfg {
    /// Samples scanned after charge for the turning point when neither
    /// dry-end nor first crack is known
    pub tp_search_samples: usize,
}

impl Default for PhaseCfg {
    fn default() -> Self {
        Self {
            tp_search_samples: 200,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AucCfg {
    /// Base temperature (Celsius). When absent the turning-point BT is used.
    pub base_c: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayCfg {
    /// Fixed downsampling step; takes precedence over `max_points`
    pub step: Option<usize>,
    /// Upper bound on points handed to the chart consumer
    pub max_points: Option<usize>,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            step: None,
            max_points: Some(600),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Status reported for a parameter that fell outside its bands.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailedStatus {
    #[default]
    Failed,
    Warning,
}

/// Status reported for a parameter whose actual or reference value is missing.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingValueStatus {
    #[default]
    Skip,
    Warning,
    Failed,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ParameterCfg {
    /// Parameters are only checked when switched on explicitly
    #[serde(default)]
    pub enabled: bool,
    /// Full width of the green band (split evenly around the target)
    pub tolerance: f64,
    /// Full width of the wider yellow band; absent means no warning band
    #[serde(default)]
    pub warning: Option<f64>,
    /// Explicit target; overrides the reference profile's value
    #[serde(default)]
    pub target: Option<f64>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct GoalCfg {
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub failed_status: FailedStatus,
    #[serde(default)]
    pub missing_value_status: MissingValueStatus,
    /// Keyed by metric name (`total_time`, `DEV_ratio`, `FCs_BT`, ...)
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterCfg>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub ror: RorCfg,
    pub smoothing: SmoothingCfg,
    pub phases: PhaseCfg,
    pub auc: AucCfg,
    pub display: DisplayCfg,
    pub logging: Logging,
    pub goals: Vec<GoalCfg>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // RoR
        if self.ror.period_s == 0 {
            eyre::bail!("ror.period_s must be >= 1");
        }
        if self.ror.period_s > 600 {
            eyre::bail!("ror.period_s is unreasonably large (>10min)");
        }

        // Smoothing
        if self.smoothing.window == 0 {
            eyre::bail!("smoothing.window must be >= 1");
        }
        if self.smoothing.window > 61 {
            eyre::bail!("smoothing.window must be <= 61 (larger windows shift event timing)");
        }
        if self.smoothing.median_window == 0 {
            eyre::bail!("smoothing.median_window must be >= 1");
        }

        // Phases
        if self.phases.tp_search_samples == 0 {
            eyre::bail!("phases.tp_search_samples must be >= 1");
        }

        // AUC
        if let Some(base) = self.auc.base_c
            && !base.is_finite()
        {
            eyre::bail!("auc.base_c must be finite");
        }

        // Display
        if self.display.step == Some(0) {
            eyre::bail!("display.step must be >= 1");
        }
        if let Some(n) = self.display.max_points
            && n < 2
        {
            eyre::bail!("display.max_points must be >= 2");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot}");
        }

        // Goals
        for goal in &self.goals {
            if goal.name.trim().is_empty() {
                eyre::bail!("goals.name must not be empty");
            }
            for (key, p) in &goal.parameters {
                if !(p.tolerance.is_finite() && p.tolerance >= 0.0) {
                    eyre::bail!("goal '{}': {key}.tolerance must be >= 0", goal.name);
                }
                if let Some(w) = p.warning
                    && !(w.is_finite() && w >= p.tolerance)
                {
                    eyre::bail!(
                        "goal '{}': {key}.warning must be >= tolerance ({})",
                        goal.name,
                        p.tolerance
                    );
                }
                if let Some(t) = p.target
                    && !t.is_finite()
                {
                    eyre::bail!("goal '{}': {key}.target must be finite", goal.name);
                }
            }
        }

        Ok(())
    }
}

/// Roast profile document as produced by the roaster logging software.
///
/// `temp1` is ET, `temp2` is BT. `timeindex` holds event indices into `timex`
/// (`-1` = unknown). `computed` carries values the logging software already
/// derived; they arrive as numbers or numeric strings.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ProfileDoc {
    pub title: Option<String>,
    pub timex: Vec<f64>,
    pub temp1: Vec<Option<f64>>,
    pub temp2: Vec<Option<f64>>,
    pub timeindex: Option<Vec<i64>>,
    pub computed: BTreeMap<String, serde_json::Value>,
    /// Temperature mode: "C" or "F"
    pub mode: Option<String>,
    /// [green, roasted, unit]
    pub weight: Option<(f64, f64, String)>,
}

impl ProfileDoc {
    /// Numeric entries of `computed`; non-numeric values are skipped.
    pub fn computed_numbers(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.computed.iter().filter_map(|(k, v)| {
            let n = match v {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            n.is_finite().then_some((k.as_str(), n))
        })
    }
}

/// Stored roast record summary (values typed in by the operator or saved
/// from an earlier analysis).
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RecordDoc {
    pub green_weight_kg: Option<f64>,
    pub roasted_weight_kg: Option<f64>,
    /// Either a fraction (0..1) or a percentage
    pub weight_loss: Option<f64>,
    pub charge_temp: Option<f64>,
    pub drop_temp: Option<f64>,
    #[serde(rename = "TP_time")]
    pub tp_time: Option<f64>,
    #[serde(rename = "TP_temp")]
    pub tp_temp: Option<f64>,
    #[serde(rename = "DRY_time")]
    pub dry_time: Option<f64>,
    #[serde(rename = "DRY_temp")]
    pub dry_temp: Option<f64>,
    #[serde(rename = "FCs_time")]
    pub fcs_time: Option<f64>,
    #[serde(rename = "FCs_temp")]
    pub fcs_temp: Option<f64>,
    pub drop_time: Option<f64>,
    #[serde(rename = "DEV_time")]
    pub dev_time: Option<f64>,
    pub whole_color: Option<f64>,
    pub ground_color: Option<f64>,
    /// "C" or "F"
    pub temp_unit: Option<String>,
}

pub fn load_profile_json(s: &str) -> eyre::Result<ProfileDoc> {
    serde_json::from_str::<ProfileDoc>(s).map_err(|e| eyre::eyre!("parse profile JSON: {e}"))
}

pub fn load_record_json(s: &str) -> eyre::Result<RecordDoc> {
    serde_json::from_str::<RecordDoc>(s).map_err(|e| eyre::eyre!("parse record JSON: {e}"))
}

pub fn load_telemetry_csv(path: &std::path::Path) -> eyre::Result<Vec<TelemetryRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open telemetry CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["time", "et", "bt"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "telemetry CSV must have headers 'time,et,bt', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TelemetryRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if rows.is_empty() {
        eyre::bail!("telemetry CSV {:?} has no samples", path);
    }
    Ok(rows)
}
