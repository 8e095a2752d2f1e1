//! Subcommand implementations.

use crate::files::{ConfigGoals, FileSource};
use crate::render;
use eyre::{Result, WrapErr};
use roast_core::goals::Status;
use roast_core::metrics::MetricId;
use roast_core::{
    AnalysisCfg, Analyzer, GoalSource, ProfileSource, RoastReport, RoastSnapshot, analyze_batch,
    check_goals,
};
use std::path::{Path, PathBuf};

/// Exit code when a goal check ends red.
pub const EXIT_GOAL_FAILED: i32 = 4;

fn build_analyzer(cfg: &roast_config::Config, step: Option<u64>) -> Result<Analyzer> {
    let mut acfg: AnalysisCfg = cfg.into();
    if let Some(s) = step {
        acfg.display.step = Some(usize::try_from(s).unwrap_or(usize::MAX));
    }
    Ok(Analyzer::new(acfg)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).wrap_err("serialize JSON output")?;
    println!("{s}");
    Ok(())
}

pub fn run_analyze(
    cfg: &roast_config::Config,
    profile: Option<&Path>,
    csv: Option<&Path>,
    record: Option<PathBuf>,
    step: Option<u64>,
    json: bool,
) -> Result<i32> {
    let analyzer = build_analyzer(cfg, step)?;
    let source = FileSource::with_record(record);
    let snap = match (profile, csv) {
        (Some(p), _) => source.fetch(&p.to_string_lossy())?,
        (None, Some(c)) => source.fetch_csv(c)?,
        (None, None) => eyre::bail!("one of --profile or --csv is required"),
    };
    let report = analyzer.analyze(&snap)?;
    if json {
        print_json(&report)?;
    } else {
        print!("{}", render::report_text(&report));
    }
    Ok(0)
}

pub fn run_check(
    cfg: &roast_config::Config,
    profile: &Path,
    record: Option<PathBuf>,
    reference: &Path,
    json: bool,
) -> Result<i32> {
    let goals = ConfigGoals::from_config(cfg)?.goals();
    if goals.is_empty() {
        eyre::bail!("no goals configured; add [[goals]] tables to the config");
    }
    let analyzer = build_analyzer(cfg, None)?;
    let actual = analyzer.analyze(&FileSource::with_record(record).fetch(&profile.to_string_lossy())?)?;
    let reference = analyzer
        .analyze(&FileSource::new().fetch(&reference.to_string_lossy())?)
        .wrap_err("analyze reference roast")?;

    let report = check_goals(&actual.metrics, &reference.metrics, &goals);
    tracing::info!(status = report.status.as_str(), goals = report.goals.len(), "goal check finished");
    if json {
        print_json(&report)?;
    } else {
        print!("{}", render::goals_text(&report));
    }
    Ok(if report.status == Status::Red { EXIT_GOAL_FAILED } else { 0 })
}

fn csv_cell(v: Option<f64>) -> String {
    v.map(|x| format!("{x}")).unwrap_or_default()
}

fn export_row(path: &Path, r: &RoastReport) -> Vec<String> {
    let mut row = vec![
        path.display().to_string(),
        r.label.clone().unwrap_or_default(),
        r.mode.map(|m| format!("{m:?}")).unwrap_or_default(),
    ];
    row.extend(MetricId::ALL.iter().map(|id| csv_cell(r.metrics.value(*id))));
    row
}

pub fn run_export(cfg: &roast_config::Config, out: &Path, profiles: &[PathBuf]) -> Result<i32> {
    let analyzer = build_analyzer(cfg, None)?;
    let source = FileSource::new();
    let mut failed = 0usize;
    let snaps: Vec<(usize, RoastSnapshot)> = profiles
        .iter()
        .enumerate()
        .filter_map(|(i, p)| match source.fetch(&p.to_string_lossy()) {
            Ok(s) => Some((i, s)),
            Err(e) => {
                tracing::warn!(profile = %p.display(), error = %e, "skipping unreadable profile");
                eprintln!("skipped {}: {e:#}", p.display());
                failed += 1;
                None
            }
        })
        .collect();
    let (idx, snaps): (Vec<usize>, Vec<RoastSnapshot>) = snaps.into_iter().unzip();
    let reports = analyze_batch(&analyzer, &snaps);

    let mut w = csv::Writer::from_path(out).wrap_err_with(|| format!("create {}", out.display()))?;
    let mut header = vec!["profile".to_string(), "label".to_string(), "mode".to_string()];
    header.extend(MetricId::ALL.iter().map(|id| id.as_str().to_string()));
    w.write_record(&header)?;
    let mut written = 0usize;
    for (i, res) in idx.into_iter().zip(reports) {
        match res {
            Ok(r) => {
                w.write_record(export_row(&profiles[i], &r))?;
                written += 1;
            }
            Err(e) => {
                tracing::warn!(profile = %profiles[i].display(), error = %e, "analysis failed");
                eprintln!("skipped {}: {e:#}", profiles[i].display());
                failed += 1;
            }
        }
    }
    w.flush()?;
    tracing::info!(written, failed, out = %out.display(), "export finished");
    if failed > 0 {
        eyre::bail!("{failed} of {} profiles could not be exported", profiles.len());
    }
    println!("exported {written} roasts to {}", out.display());
    Ok(0)
}

/// Validate the config and run a synthetic roast through the pipeline.
pub fn run_self_check(cfg: &roast_config::Config) -> Result<i32> {
    let analyzer = build_analyzer(cfg, None)?;
    ConfigGoals::from_config(cfg)?;

    let time: Vec<f64> = (0..=120).map(|i| f64::from(i) * 5.0).collect();
    let bt: Vec<Option<f64>> = time
        .iter()
        .map(|t| Some(if *t < 90.0 { 200.0 - t } else { 110.0 + (t - 90.0) * 0.2 }))
        .collect();
    let series = roast_core::TimeSeries::from_bt(time, bt)?;
    let snap = RoastSnapshot::from_curve(roast_core::RoastCurve::new(series));
    let report = analyzer.analyze(&snap)?;
    match report.turning_point {
        Some(tp) if (tp.time - 90.0).abs() < f64::EPSILON => {}
        other => eyre::bail!("self-check: unexpected turning point {other:?}"),
    }
    println!("OK");
    Ok(0)
}
