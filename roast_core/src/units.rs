//! Unit and scale normalization at the system boundary.
//!
//! Everything past this module is canonical: temperatures in Celsius, rates in
//! °C/min, masses in kilograms, weight loss in percent.

use serde::Serialize;

/// Upper bound of a physically plausible roast weight loss, in percent.
pub const WEIGHT_LOSS_MAX_PCT: f64 = 50.0;

/// Resolve a weight-loss value that may be a fraction (0..1) or a percentage.
///
/// - `(0, 1]` is a fraction and is scaled to percent.
/// - `(1, 100]` is already a percentage.
/// - Anything else (zero, negative, >100, NaN) is rejected rather than clamped.
pub fn normalize_weight_loss_fraction(raw: Option<f64>) -> Option<f64> {
    let v = raw?;
    if v > 0.0 && v <= 1.0 {
        Some(v * 100.0)
    } else if v > 1.0 && v <= 100.0 {
        Some(v)
    } else {
        None
    }
}

/// True iff `pct` lies in the sanity band `(0, 50]`.
#[inline]
pub fn in_weight_loss_band(pct: f64) -> bool {
    pct > 0.0 && pct <= WEIGHT_LOSS_MAX_PCT
}

/// Temperature scale of an incoming document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    /// Parse a mode flag ("C", "F", "celsius", ...). Unknown flags yield `None`
    /// so the caller can decide on the default.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "celsius" => Some(Self::Celsius),
            "f" | "fahrenheit" => Some(Self::Fahrenheit),
            _ => None,
        }
    }

    /// Absolute temperature to Celsius.
    #[inline]
    pub fn to_celsius(self, v: f64) -> f64 {
        match self {
            Self::Celsius => v,
            Self::Fahrenheit => (v - 32.0) * 5.0 / 9.0,
        }
    }

    /// Temperature difference, rate or area to Celsius (scale only, no offset).
    #[inline]
    pub fn rate_to_celsius(self, v: f64) -> f64 {
        match self {
            Self::Celsius => v,
            Self::Fahrenheit => v * 5.0 / 9.0,
        }
    }
}

/// Mass unit of the profile's weight triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassUnit {
    Grams,
    Kilograms,
    Pounds,
}

impl MassUnit {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "g" | "gram" | "grams" => Some(Self::Grams),
            "kg" | "kilogram" | "kilograms" => Some(Self::Kilograms),
            "lb" | "lbs" | "pound" | "pounds" => Some(Self::Pounds),
            _ => None,
        }
    }

    #[inline]
    pub fn to_kg(self, v: f64) -> f64 {
        match self {
            Self::Grams => v / 1000.0,
            Self::Kilograms => v,
            Self::Pounds => v * 0.453_592_37,
        }
    }
}
