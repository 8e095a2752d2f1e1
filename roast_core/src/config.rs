//! Runtime configuration for the analyzer.
//!
//! Separate from the TOML schema in `roast_config`; see `conversions` for the
//! mapping.

/// Rate-of-rise window.
#[derive(Debug, Clone, Copy)]
pub struct RorCfg {
    /// Trailing window in seconds.
    pub period_s: u32,
}

impl Default for RorCfg {
    fn default() -> Self {
        Self { period_s: 30 }
    }
}

/// Smoothing of the derived RoR series.
#[derive(Debug, Clone, Copy)]
pub struct SmoothingCfg {
    /// Centered moving average window (1 = disabled).
    pub window: usize,
    /// Median prefilter window (1 = disabled).
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

#[derive(Debug, Clone, Copy)]
pub struct PhaseCfg {
    /// Samples after charge searched for the turning point when neither
    /// dry-end nor first crack is known.
    pub tp_search_samples: usize,
}

impl Default for PhaseCfg {
    fn default() -> Self {
        Self {
            tp_search_samples: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AucCfg {
    /// Fixed AUC base (°C) used when the profile declares none.
    pub base_c: Option<f64>,
}

/// Display decimation. `step` wins over `max_points`.
#[derive(Debug, Clone, Copy)]
pub struct DisplayCfg {
    pub step: Option<usize>,
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

impl DisplayCfg {
    pub fn step_for(&self, len: usize) -> usize {
        match (self.step, self.max_points) {
            (Some(s), _) => s.max(1),
            (None, Some(m)) => crate::downsample::step_for_max_points(len, m),
            (None, None) => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisCfg {
    pub ror: RorCfg,
    pub smoothing: SmoothingCfg,
    pub phases: PhaseCfg,
    pub auc: AucCfg,
    pub display: DisplayCfg,
}
