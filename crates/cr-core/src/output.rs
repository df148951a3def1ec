//! Rendering of command payloads.
//!
//! Renderers return strings so the binary decides where they go: payloads
//! to stdout, errors to stderr.

use std::fmt::Write as _;

use cr_common::{OutputFormat, SCHEMA_VERSION};
use serde::Serialize;

use crate::analysis::{AnalysisReport, StageReport};
use crate::inference::Interval;

fn fmt_interval(interval: Option<&Interval>) -> String {
    match interval {
        Some(i) => format!("[{}, {}]", i.lower, i.upper),
        None => "unattainable".to_string(),
    }
}

fn percent(coverage: f64) -> String {
    format!("{}%", (coverage * 1000.0).round() / 10.0)
}

/// Render an analysis report.
pub fn render_report(
    report: &AnalysisReport,
    format: OutputFormat,
    run_id: &str,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(report)?;
            if let Some(obj) = value.as_object_mut() {
                obj.insert("run_id".to_string(), serde_json::json!(run_id));
            }
            serde_json::to_string_pretty(&value)
        }
        OutputFormat::Summary => Ok(render_summary(report, run_id)),
        OutputFormat::Md => Ok(render_markdown(report, run_id)),
    }
}

fn render_summary(report: &AnalysisReport, run_id: &str) -> String {
    let p = &report.posterior;
    format!(
        "[{}] {}: MAP {} mean {:.2} {} HPDI {}",
        run_id,
        report.model,
        p.map,
        p.mean,
        percent(report.coverage),
        fmt_interval(Some(&p.interval)),
    )
}

fn stage_row(out: &mut String, stage: &StageReport) {
    let lp = stage
        .estimates
        .lincoln_petersen
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(
        out,
        "| {} | {} | {:.2} | {:.2} | {} | {:.2} | {} |",
        stage.index,
        stage.map,
        stage.mean,
        stage.sd,
        lp,
        stage.estimates.chapman,
        fmt_interval(stage.interval.as_ref()),
    );
}

fn render_markdown(report: &AnalysisReport, run_id: &str) -> String {
    let mut out = String::new();
    let p = &report.posterior;
    let _ = writeln!(out, "# cr-core run");
    let _ = writeln!(out);
    if let Some(description) = &report.description {
        let _ = writeln!(out, "{description}");
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "Model: {}", report.model);
    let _ = writeln!(
        out,
        "Grid: {} points over [{}, {}]",
        report.grid.points, report.grid.min, report.grid.max
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Posterior");
    let _ = writeln!(out);
    let _ = writeln!(out, "| MAP | mean | median | sd | {} HPDI | attained |", percent(report.coverage));
    let _ = writeln!(out, "|---|---|---|---|---|---|");
    let _ = writeln!(
        out,
        "| {} | {:.2} | {} | {:.2} | {} | {:.4} |",
        p.map,
        p.mean,
        p.median,
        p.sd,
        fmt_interval(Some(&p.interval)),
        p.interval.coverage,
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Stages");
    let _ = writeln!(out);
    let _ = writeln!(out, "| stage | MAP | mean | sd | Lincoln–Petersen | Chapman | HPDI |");
    let _ = writeln!(out, "|---|---|---|---|---|---|---|");
    for stage in &report.stages {
        stage_row(&mut out, stage);
    }
    if let Some(two_test) = &report.two_test {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Detection probabilities");
        let _ = writeln!(out);
        let _ = writeln!(out, "| test | MAP | mean | sd | HPDI |");
        let _ = writeln!(out, "|---|---|---|---|---|");
        for (name, s) in [("p1", &two_test.p1), ("p2", &two_test.p2)] {
            let _ = writeln!(
                out,
                "| {} | {} | {:.3} | {:.3} | {} |",
                name,
                s.map,
                s.mean,
                s.sd,
                fmt_interval(s.interval.as_ref()),
            );
        }
        let (n, p1, p2) = two_test.joint_map;
        let _ = writeln!(out);
        let _ = writeln!(out, "Joint MAP: N={n} p1={p1} p2={p2}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Run: {run_id}");
    out
}

/// Render any serializable payload; Markdown falls back to a JSON block.
pub fn render_value<T: Serialize>(
    value: &T,
    format: OutputFormat,
    title: &str,
    run_id: &str,
) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(match format {
        OutputFormat::Json => json,
        OutputFormat::Summary => format!("[{run_id}] {title}: {}", serde_json::to_string(value)?),
        OutputFormat::Md => format!("# cr-core {title}\n\n```json\n{json}\n```\n"),
    })
}

/// Render an error for stderr.
pub fn render_error(error: &cr_common::Error, format: OutputFormat, run_id: &str) -> String {
    match format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": "error",
                "error": error.to_json(),
            });
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| error.to_string())
        }
        OutputFormat::Summary => format!("[{run_id}] error {}: {}", error.code(), error),
        OutputFormat::Md => format!(
            "# Error\n\nError {}: {}\n\nHint: {}\n",
            error.code(),
            error,
            error.remediation()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::run_analysis;
    use cr_config::{get_preset, PresetName};

    fn report() -> AnalysisReport {
        run_analysis(&get_preset(PresetName::LincolnPetersen)).unwrap()
    }

    #[test]
    fn json_carries_run_id_and_interval() {
        let out = render_report(&report(), OutputFormat::Json, "run-test").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["run_id"], "run-test");
        assert_eq!(value["posterior"]["interval"]["lower"], 47.0);
        assert_eq!(value["posterior"]["interval"]["upper"], 196.0);
        assert_eq!(value["stages"][0]["observation"]["kind"], "capture");
    }

    #[test]
    fn summary_is_one_line() {
        let out = render_report(&report(), OutputFormat::Summary, "run-test").unwrap();
        assert!(!out.contains('\n'));
        assert!(out.starts_with("[run-test] hypergeometric"));
        assert!(out.contains("95% HPDI [47, 196]"));
    }

    #[test]
    fn markdown_has_tables() {
        let out = render_report(&report(), OutputFormat::Md, "run-test").unwrap();
        assert!(out.contains("## Posterior"));
        assert!(out.contains("| 0 |"));
        assert!(out.contains("84.00"));
        assert!(!out.contains("Detection probabilities"));
    }

    #[test]
    fn two_test_markdown_lists_detection_marginals() {
        let report = run_analysis(&get_preset(PresetName::TwoTest)).unwrap();
        let out = render_report(&report, OutputFormat::Md, "run-test").unwrap();
        assert!(out.contains("## Detection probabilities"));
        assert!(out.contains("Joint MAP"));
    }

    #[test]
    fn errors_render_with_code() {
        let err = cr_common::Error::CoverageUnattainable {
            target: 0.95,
            best: 0.9,
        };
        let json = render_error(&err, OutputFormat::Json, "run-x");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"]["code"], 32);
        assert_eq!(value["status"], "error");
        assert!(render_error(&err, OutputFormat::Summary, "run-x").contains("error 32"));
        assert!(render_error(&err, OutputFormat::Md, "run-x").contains("Hint:"));
    }
}
