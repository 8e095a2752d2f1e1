//! Everything known about one roast before analysis.

use serde::Serialize;

use crate::metrics::ComputedMetrics;
use crate::series::RoastCurve;

/// Batch weights in kilograms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Weights {
    pub green_kg: Option<f64>,
    pub roasted_kg: Option<f64>,
}

impl Weights {
    pub fn new(green_kg: Option<f64>, roasted_kg: Option<f64>) -> Self {
        Self { green_kg, roasted_kg }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoastSnapshot {
    /// Raw curve; absent when only summary data exists.
    pub curve: Option<RoastCurve>,
    /// Values declared by the profile's own computation.
    pub declared: ComputedMetrics,
    /// Values from a stored roast record.
    pub stored: ComputedMetrics,
    /// Weights carried by the profile document.
    pub weights: Weights,
    pub label: Option<String>,
}

impl RoastSnapshot {
    pub fn from_curve(curve: RoastCurve) -> Self {
        Self {
            curve: Some(curve),
            ..Self::default()
        }
    }

    pub fn with_declared(mut self, declared: ComputedMetrics) -> Self {
        self.declared = declared;
        self
    }

    pub fn with_stored(mut self, stored: ComputedMetrics) -> Self {
        self.stored = stored;
        self
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
