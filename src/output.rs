//! Output rendering for validation, Lighthouse and asset commands.
//!
//! Supports `human` (default) and `json` outputs. Human text for findings is
//! the FIX INSTRUCTIONS layout: errors first, numbered, then a warnings
//! block in the same shape. The JSON forms are built by pure `compose_*`
//! functions so they can be tested without capturing stdout.

use crate::error::SeoError;
use crate::models::assets::AssetManifest;
use crate::models::lighthouse::LighthouseReport;
use crate::models::{Finding, Summary, ValidationReport};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::fmt::Write as _;
use std::path::Path;

const RULE: usize = 60;

pub fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn paint_bad(s: &str, color: bool) -> String {
    if color {
        s.red().bold().to_string()
    } else {
        s.to_string()
    }
}

fn paint_warn(s: &str, color: bool) -> String {
    if color {
        s.yellow().bold().to_string()
    } else {
        s.to_string()
    }
}

fn paint_ok(s: &str, color: bool) -> String {
    if color {
        s.green().bold().to_string()
    } else {
        s.to_string()
    }
}

fn pretty(v: &JsonVal) -> String {
    serde_json::to_string_pretty(v).unwrap_or_default()
}

/// One numbered entry of the fix list (without the number).
pub fn instruction(f: &Finding) -> String {
    let mut out = format!("[{}] {}", f.code, f.element);
    if let Some(line) = f.location.line {
        let _ = write!(out, " at line {line}");
    }
    let _ = write!(out, " in {}", f.location.file);
    let _ = write!(out, "\n  Rule: {}", f.message);
    if let Some(current) = &f.current {
        let _ = write!(out, "\n  Current: {current}");
    }
    if let Some(expected) = &f.expected {
        let _ = write!(out, "\n  Expected: {expected}");
    }
    let _ = write!(out, "\n  Fix: {}", f.fix);
    out
}

/// Human text for one report. A report without findings is one line.
pub fn compose_report_text(report: &ValidationReport, color: bool) -> String {
    let label = report.validator.to_uppercase();
    if report.findings.is_empty() {
        return paint_ok(
            &format!("✓ {label} validation passed for {}", report.file),
            color,
        );
    }
    let errors: Vec<&Finding> = report.errors().collect();
    let warnings: Vec<&Finding> = report.warnings().collect();
    let heavy = "=".repeat(RULE);
    let light = "-".repeat(RULE);

    let mut lines = Vec::new();
    if report.passed {
        lines.push(paint_warn(&format!("▲ {label} VALIDATION PASSED WITH WARNINGS"), color));
    } else {
        lines.push(paint_bad(&format!("✗ {label} VALIDATION FAILED"), color));
    }
    lines.push(format!("File: {}", report.file));
    lines.push(format!("Errors: {} | Warnings: {}", errors.len(), warnings.len()));
    if !errors.is_empty() {
        lines.push(String::new());
        lines.push(heavy.clone());
        lines.push("FIX INSTRUCTIONS (execute in order):".to_string());
        lines.push(heavy.clone());
        for (i, f) in errors.iter().enumerate() {
            lines.push(format!("\n{}. {}", i + 1, instruction(f)));
        }
    }
    if !warnings.is_empty() {
        lines.push(format!("\n{light}"));
        lines.push(paint_warn("WARNINGS (recommended fixes):", color));
        lines.push(light);
        for (i, f) in warnings.iter().enumerate() {
            lines.push(format!("\n{}. {}", i + 1, instruction(f)));
        }
    }
    lines.push(format!("\n{heavy}"));
    lines.push("After fixing, save the file and run the check again.".to_string());
    lines.join("\n")
}

/// Compose the JSON object for a batch of reports (pure).
pub fn compose_reports_json(reports: &[ValidationReport]) -> JsonVal {
    json!({
        "reports": reports,
        "summary": Summary::of(reports),
    })
}

/// Print validation reports in the requested format.
pub fn print_reports(reports: &[ValidationReport], output: &str) {
    match output {
        "json" => println!("{}", pretty(&compose_reports_json(reports))),
        _ => {
            let color = use_colors(output);
            for (i, r) in reports.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("{}", compose_report_text(r, color));
            }
            if reports.len() > 1 {
                let s = Summary::of(reports);
                let line = format!(
                    "— Summary — errors={} warnings={} files={}",
                    s.errors, s.warnings, s.files
                );
                println!();
                if color {
                    println!("{}", line.bold());
                } else {
                    println!("{line}");
                }
            }
        }
    }
}

fn vital(v: Option<f64>, unit: &str) -> String {
    match v {
        Some(x) if unit == "ms" => format!("{x:.0} ms"),
        Some(x) => format!("{x:.3}"),
        None => "n/a".to_string(),
    }
}

/// Human text for a Lighthouse run.
pub fn compose_lighthouse_text(r: &LighthouseReport, saved: Option<&Path>, color: bool) -> String {
    let mut lines = Vec::new();
    if r.passed {
        lines.push(paint_ok("✓ PASSED - Lighthouse Audit", color));
    } else {
        lines.push(paint_bad("✗ FAILED - Lighthouse Audit", color));
    }
    lines.push(format!("URL: {}", r.url));
    lines.push(format!("Target: {}", r.target));
    lines.push(String::new());
    lines.push("SCORES:".to_string());
    for (category, score) in r.scores.entries() {
        let mark = if score >= r.target {
            paint_ok("✓", color)
        } else {
            paint_bad("✗", color)
        };
        lines.push(format!("  {mark} {category}: {score}/100"));
    }
    lines.push(String::new());
    let v = &r.core_web_vitals;
    lines.push("CORE WEB VITALS:".to_string());
    lines.push(format!("  LCP: {}", vital(v.lcp_ms, "ms")));
    lines.push(format!("  CLS: {}", vital(v.cls, "")));
    lines.push(format!("  INP: {}", vital(v.inp_ms, "ms")));
    lines.push(format!("  FID: {}", vital(v.fid_ms, "ms")));

    let audits: Vec<&Finding> = r.issues.iter().filter(|f| f.code == "LH_AUDIT").collect();
    if !audits.is_empty() {
        lines.push(String::new());
        lines.push(format!("TOP ISSUES ({} total):", r.issue_count));
        for f in audits {
            lines.push(format!(
                "  - {} {}",
                f.current.as_deref().unwrap_or(""),
                f.message
            ));
        }
    }

    let failing: Vec<&Finding> = r
        .issues
        .iter()
        .filter(|f| f.severity == crate::models::Severity::Error)
        .collect();
    if !failing.is_empty() {
        let heavy = "=".repeat(RULE);
        lines.push(String::new());
        lines.push(heavy.clone());
        lines.push("FIX INSTRUCTIONS (execute in order):".to_string());
        lines.push(heavy);
        for (i, f) in failing.iter().enumerate() {
            lines.push(format!("\n{}. {}", i + 1, instruction(f)));
        }
    }
    if let Some(p) = saved {
        lines.push(String::new());
        lines.push(format!("Report saved: {}", p.display()));
    }
    lines.join("\n")
}

/// Compose the Lighthouse JSON (pure); `savedTo` is present when persisted.
pub fn compose_lighthouse_json(r: &LighthouseReport, saved: Option<&Path>) -> JsonVal {
    let mut v = serde_json::to_value(r).unwrap_or(JsonVal::Null);
    if let (Some(p), Some(obj)) = (saved, v.as_object_mut()) {
        obj.insert("savedTo".into(), json!(p.to_string_lossy()));
    }
    v
}

pub fn print_lighthouse(r: &LighthouseReport, saved: Option<&Path>, output: &str) {
    match output {
        "json" => println!("{}", pretty(&compose_lighthouse_json(r, saved))),
        _ => println!("{}", compose_lighthouse_text(r, saved, use_colors(output))),
    }
}

/// Print what the generator wrote.
pub fn print_assets(m: &AssetManifest, output_dir: &Path, output: &str) {
    match output {
        "json" => println!(
            "{}",
            pretty(&serde_json::to_value(m).unwrap_or(JsonVal::Null))
        ),
        _ => {
            let color = use_colors(output);
            println!(
                "{}",
                paint_ok(
                    &format!("✓ Generated {} assets from {}", m.outputs.len(), m.source_logo),
                    color
                )
            );
            println!("  Output: {}", output_dir.display());
            for (name, o) in &m.outputs {
                match (o.width, o.height) {
                    (Some(w), Some(h)) => println!("    - {name} ({w}x{h})"),
                    _ => println!("    - {name}"),
                }
            }
        }
    }
}

/// Compose the JSON error object (pure).
pub fn compose_error_json(e: &SeoError) -> JsonVal {
    json!({
        "error": {
            "code": e.code(),
            "message": e.to_string(),
            "fix": e.fix(),
        }
    })
}

/// Report an environment error: JSON on stdout, or text on stderr.
pub fn print_error(e: &SeoError, output: &str) {
    match output {
        "json" => println!("{}", pretty(&compose_error_json(e))),
        _ => {
            let color = use_colors(output);
            eprintln!(
                "{} [{}] {}",
                paint_bad("✗ ERROR", color),
                e.code(),
                e
            );
            eprintln!("  Fix: {}", e.fix());
        }
    }
}

/// Editor-hook response for a validated file, or a skip when `None`.
pub fn compose_hook_response(report: Option<&ValidationReport>) -> JsonVal {
    match report {
        None => json!({"decision": "continue"}),
        Some(r) if r.findings.is_empty() => json!({
            "decision": "continue",
            "hookSpecificOutput": {
                "feedback": format!("✓ {} validation passed for {}", r.validator.to_uppercase(), r.file)
            }
        }),
        Some(r) => json!({
            "hookSpecificOutput": {
                "feedback": compose_report_text(r, false)
            }
        }),
    }
}
