//! Human-readable error descriptions and structured JSON error formatting.

use roast_core::error::{AnalysisError, BuildError};

fn find<E: std::error::Error + Send + Sync + 'static>(err: &eyre::Report) -> Option<&E> {
    err.chain().find_map(|e| e.downcast_ref::<E>())
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(BuildError::InvalidConfig(msg)) = find::<BuildError>(err) {
        return format!(
            "What happened: Invalid analysis settings ({msg}).\nLikely causes: Out-of-range values in the TOML config.\nHow to fix: Edit the config file, then rerun."
        );
    }

    if let Some(ae) = find::<AnalysisError>(err) {
        return match ae {
            AnalysisError::LengthMismatch { what, expected, actual } => format!(
                "What happened: The {what} has {actual} samples but the time axis has {expected}.\nLikely causes: A truncated or hand-edited profile.\nHow to fix: Re-export the profile from the roasting software."
            ),
            AnalysisError::EventIndexShape(n) => format!(
                "What happened: The event index has {n} slots; 7 or 8 are expected.\nLikely causes: The 'timeindex' array was edited or comes from an unsupported logger.\nHow to fix: Remove 'timeindex' to analyze the raw curve, or re-export the profile."
            ),
            AnalysisError::ForeignEventIndex { .. } => {
                "What happened: Event indices were applied to a different curve than the one they were computed on.\nLikely causes: Profile data from two files was combined.\nHow to fix: Load the curve and its event index from the same profile.".to_string()
            }
            AnalysisError::UnknownMetric(key) => format!(
                "What happened: Unknown metric '{key}'.\nLikely causes: A typo in a [[goals]] parameter name.\nHow to fix: Use a metric key such as CHARGE_BT, FCs_time, totaltime, DEV_ratio or weight_loss."
            ),
        };
    }

    // String-based heuristics for errors coming from loaders and config
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("telemetry csv must have headers") {
        return "Invalid headers in telemetry CSV. Expected 'time,et,bt'.".to_string();
    }

    if lower.contains("invalid configuration") {
        return format!(
            "What happened: Configuration is invalid.\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config and try again. Details: {msg}"
        );
    }

    if lower.contains("parse profile json") || lower.contains("parse record json") {
        return format!(
            "What happened: A roast file is not valid JSON for this tool.\nLikely causes: Wrong file, or a Python-literal .alog that was not converted to JSON.\nHow to fix: Export the profile as JSON. Details: {msg}"
        );
    }

    if lower.contains("no goals configured") {
        return "What happened: No goals to check against.\nHow to fix: Add at least one [[goals]] table to the config.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 for bad settings, 3 for malformed roast data, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if find::<BuildError>(err).is_some() {
        return 2;
    }
    if find::<AnalysisError>(err).is_some() {
        return 3;
    }
    if format!("{err:#}").to_ascii_lowercase().contains("invalid configuration") {
        return 2;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if find::<BuildError>(err).is_some() {
        return "InvalidConfig";
    }
    match find::<AnalysisError>(err) {
        Some(AnalysisError::LengthMismatch { .. }) => "LengthMismatch",
        Some(AnalysisError::EventIndexShape(_)) => "EventIndexShape",
        Some(AnalysisError::ForeignEventIndex { .. }) => "ForeignEventIndex",
        Some(AnalysisError::UnknownMetric(_)) => "UnknownMetric",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = reason_name(err);
    let msg = humanize(err);
    match find::<AnalysisError>(err) {
        Some(AnalysisError::LengthMismatch { what, expected, actual }) => json!({
            "reason": reason,
            "details": { "channel": what, "expected": expected, "actual": actual },
            "message": msg,
        })
        .to_string(),
        _ => json!({ "reason": reason, "message": msg }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn wrapped_analysis_errors_are_found() {
        let res: eyre::Result<()> = Err(AnalysisError::EventIndexShape(3)).wrap_err("read profile x.json");
        let err = res.unwrap_err();
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("3 slots"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "EventIndexShape");
    }

    #[test]
    fn csv_header_hint() {
        let err = eyre::eyre!("telemetry CSV must have headers 'time,et,bt', got: t,a,b");
        assert!(humanize(&err).starts_with("Invalid headers in telemetry CSV"));
        assert_eq!(exit_code_for_error(&err), 1);
    }
}
