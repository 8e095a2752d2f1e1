//! Human-readable report text.

use roast_core::goals::GoalReport;
use roast_core::metrics::MetricKind;
use roast_core::{DetectionMode, RoastReport, Source};
use std::fmt::Write;

/// `m:ss` for seconds; negative values keep their sign.
pub fn clock(seconds: f64) -> String {
    let sign = if seconds < 0.0 { "-" } else { "" };
    let total = seconds.abs().round() as u64;
    format!("{sign}{}:{:02}", total / 60, total % 60)
}

fn opt_clock(v: Option<f64>) -> String {
    v.map_or_else(|| "--".to_string(), clock)
}

fn opt_pct(v: Option<f64>) -> String {
    v.map_or_else(|| "--".to_string(), |p| format!("{p:.1}%"))
}

fn source_name(s: Source) -> &'static str {
    match s {
        Source::Profile => "profile",
        Source::Telemetry => "telemetry",
        Source::Stored => "stored",
    }
}

fn value_with_unit(kind: MetricKind, v: f64) -> String {
    match kind {
        MetricKind::Temperature => format!("{v:.1} °C"),
        MetricKind::TemperatureRate => format!("{v:.2}"),
        MetricKind::Duration => clock(v),
        MetricKind::Percent => format!("{v:.1}%"),
        MetricKind::Mass => format!("{v:.3} kg"),
        MetricKind::Dimensionless => format!("{v:.1}"),
    }
}

pub fn report_text(r: &RoastReport) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "Roast: {}", r.label.as_deref().unwrap_or("(unnamed)"));
    let mode = match r.mode {
        Some(DetectionMode::Indexed) => "event index",
        Some(DetectionMode::CurveOnly) => "curve only",
        None => "no curve",
    };
    let _ = writeln!(out, "Detection: {mode}");
    if let Some(tp) = r.turning_point {
        let _ = writeln!(
            out,
            "Turning point: {} at {:.1} °C",
            clock(tp.time - r.boundaries.charge),
            tp.bt
        );
    }
    let b = &r.boundaries;
    let rel = |v: Option<f64>| opt_clock(v.map(|t| t - b.charge));
    let _ = writeln!(
        out,
        "Events: dry end {}, first crack {}, drop {}",
        rel(b.dry),
        rel(b.first_crack_start),
        rel(b.drop)
    );
    let p = &r.phases;
    let _ = writeln!(
        out,
        "Phases: drying {} ({}), maillard {} ({}), development {} ({})",
        opt_clock(p.durations.dry),
        opt_pct(p.dry_pct),
        opt_clock(p.durations.mid),
        opt_pct(p.mid_pct),
        opt_clock(p.durations.finish),
        opt_pct(p.finish_pct)
    );
    let _ = writeln!(out, "Weight loss: {}", opt_pct(r.weight_loss));
    let _ = writeln!(out, "Metrics:");
    for (id, m) in r.metrics.iter() {
        let _ = writeln!(
            out,
            "  {:<18} {:>12}  ({})",
            id.as_str(),
            value_with_unit(id.kind(), m.value),
            source_name(m.source)
        );
    }
    out
}

pub fn goals_text(report: &GoalReport) -> String {
    let mut out = String::new();
    for g in &report.goals {
        let _ = writeln!(out, "Goal '{}': {}", g.goal, g.status.as_str().to_uppercase());
        for p in &g.parameters {
            let fmt = |v: Option<f64>| v.map_or_else(|| "--".to_string(), |x| value_with_unit(p.metric.kind(), x));
            let _ = writeln!(
                out,
                "  {:<18} actual {:>12}  target {:>12}  {}",
                p.metric.as_str(),
                fmt(p.actual),
                fmt(p.reference),
                p.status.as_str()
            );
        }
    }
    let _ = writeln!(out, "Overall: {}", report.status.as_str().to_uppercase());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formats_minutes() {
        assert_eq!(clock(0.0), "0:00");
        assert_eq!(clock(61.4), "1:01");
        assert_eq!(clock(600.0), "10:00");
        assert_eq!(clock(-30.0), "-0:30");
    }
}
