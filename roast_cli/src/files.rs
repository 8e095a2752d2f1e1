//! File-backed loaders: config, profiles, records and telemetry CSV.

use eyre::{Result, WrapErr};
use roast_core::metrics::ComputedMetrics;
use roast_core::snapshot::RoastSnapshot;
use roast_core::{GoalDefinition, GoalSource, ProfileSource};
use std::fs;
use std::path::{Path, PathBuf};

/// Load and validate the config, or fall back to defaults.
pub fn read_config(path: Option<&Path>) -> Result<roast_config::Config> {
    let Some(path) = path else {
        tracing::debug!("no --config given; using defaults");
        return Ok(roast_config::Config::default());
    };
    let text = fs::read_to_string(path).wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = roast_config::load_toml(&text).wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn read_record(path: &Path) -> Result<ComputedMetrics> {
    let text = fs::read_to_string(path).wrap_err_with(|| format!("read record {}", path.display()))?;
    let doc = roast_config::load_record_json(&text)?;
    Ok(ComputedMetrics::from(&doc))
}

/// Profiles keyed by file path, each optionally paired with one stored record.
#[derive(Debug, Default)]
pub struct FileSource {
    record: Option<PathBuf>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: Option<PathBuf>) -> Self {
        Self { record }
    }

    fn attach_record(&self, snap: RoastSnapshot) -> Result<RoastSnapshot> {
        match &self.record {
            Some(path) => Ok(snap.with_stored(read_record(path)?)),
            None => Ok(snap),
        }
    }

    /// Raw telemetry CSV as a snapshot without declared values.
    pub fn fetch_csv(&self, path: &Path) -> Result<RoastSnapshot> {
        let rows = roast_config::load_telemetry_csv(path)?;
        let snap = RoastSnapshot::try_from(rows.as_slice())?;
        let label = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        let snap = match label {
            Some(l) => snap.with_label(l),
            None => snap,
        };
        self.attach_record(snap)
    }
}

impl ProfileSource for FileSource {
    fn fetch(&self, key: &str) -> Result<RoastSnapshot> {
        let path = Path::new(key);
        let text = fs::read_to_string(path).wrap_err_with(|| format!("read profile {key}"))?;
        let doc = roast_config::load_profile_json(&text)?;
        let mut snap = RoastSnapshot::try_from(&doc)?;
        if snap.label.is_none() {
            snap.label = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        }
        self.attach_record(snap)
    }
}

/// Goals declared in the `[[goals]]` tables of the config.
pub struct ConfigGoals(Vec<GoalDefinition>);

impl ConfigGoals {
    pub fn from_config(cfg: &roast_config::Config) -> Result<Self> {
        let goals = cfg
            .goals
            .iter()
            .map(|g| GoalDefinition::try_from(g).wrap_err_with(|| format!("goal '{}'", g.name)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(goals))
    }
}

impl GoalSource for ConfigGoals {
    fn goals(&self) -> Vec<GoalDefinition> {
        self.0.clone()
    }
}
