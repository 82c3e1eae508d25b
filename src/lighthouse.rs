//! Lighthouse runner: localhost guard, reachability check, one headless audit,
//! score extraction and a timestamped report on disk.
//!
//! The browser session sits behind [`AuditDriver`] so everything around it
//! (guard, reachability check, extraction, persistence) runs without Chrome.

use crate::error::{Result, SeoError};
use crate::models::lighthouse::{CoreWebVitals, LighthouseReport, Scores};
use crate::models::Severity::{Error, Warning};
use crate::rules::{clip, evaluate, fires, Occurrence, RuleSpec};
use chrono::{DateTime, Utc};
use serde_json::Value as Json;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::{Host, Url};

pub const DEFAULT_TARGET: u8 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_REPORTS_DIR: &str = ".seolint/reports";

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(200);
const MAX_ISSUES: usize = 15;
const CATEGORIES: &str = "performance,accessibility,best-practices,seo";
const CHROME_FLAGS: &str = "--headless --no-sandbox --disable-gpu --disable-dev-shm-usage";

/// Reject anything but an http(s) URL on a loopback host. Pure string
/// inspection; nothing is resolved or contacted.
pub fn check_local_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|_| SeoError::InvalidUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SeoError::InvalidUrl(raw.to_string()));
    }
    let local = match url.host() {
        Some(Host::Domain(d)) => d.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip == std::net::Ipv4Addr::LOCALHOST,
        Some(Host::Ipv6(ip)) => ip == std::net::Ipv6Addr::LOCALHOST,
        None => false,
    };
    if local {
        Ok(url)
    } else {
        Err(SeoError::RemoteUrl(raw.to_string()))
    }
}

/// One plain GET; only a 200 counts as a running server.
pub fn check_reachable(url: &Url) -> Result<()> {
    let agent = ureq::AgentBuilder::new()
        .timeout(PROBE_TIMEOUT)
        .redirects(0)
        .build();
    let unreachable = |reason: String| SeoError::ServerUnreachable {
        url: url.to_string(),
        reason,
    };
    match agent.get(url.as_str()).call() {
        Ok(resp) if resp.status() == 200 => {
            debug!(url = %url, "server reachable");
            Ok(())
        }
        Ok(resp) => Err(unreachable(format!("HTTP {}", resp.status()))),
        Err(ureq::Error::Status(code, _)) => Err(unreachable(format!("HTTP {code}"))),
        Err(ureq::Error::Transport(t)) => Err(unreachable(t.to_string())),
    }
}

/// Produces a raw Lighthouse JSON result for `url`.
pub trait AuditDriver {
    fn audit(&self, url: &Url, timeout: Duration) -> Result<Json>;
}

/// Drives the `lighthouse` CLI (or `npx --yes lighthouse`) in a scratch
/// directory that is removed on every exit path.
#[derive(Debug, Clone, Default)]
pub struct LighthouseCli {
    /// Explicit `lighthouse` executable; PATH is searched otherwise.
    pub binary: Option<PathBuf>,
    pub chrome_path: Option<PathBuf>,
}

impl LighthouseCli {
    fn command(&self) -> Result<Command> {
        if let Some(bin) = &self.binary {
            return Ok(Command::new(bin));
        }
        if let Ok(bin) = which::which("lighthouse") {
            return Ok(Command::new(bin));
        }
        let npx = which::which("npx").map_err(|_| SeoError::AuditToolMissing)?;
        let mut cmd = Command::new(npx);
        cmd.args(["--yes", "lighthouse"]);
        Ok(cmd)
    }
}

impl AuditDriver for LighthouseCli {
    fn audit(&self, url: &Url, timeout: Duration) -> Result<Json> {
        let scratch = tempfile::TempDir::new()?;
        let report = scratch.path().join("report.json");
        let stderr_log = scratch.path().join("stderr.log");
        let profile = scratch.path().join("profile");

        let mut cmd = self.command()?;
        cmd.arg(url.as_str())
            .arg("--output=json")
            .arg(format!("--output-path={}", report.display()))
            .arg(format!("--only-categories={CATEGORIES}"))
            .arg("--quiet")
            .arg(format!(
                "--chrome-flags={CHROME_FLAGS} --user-data-dir={}",
                profile.display()
            ))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(fs::File::create(&stderr_log)?));
        if let Some(chrome) = &self.chrome_path {
            cmd.env("CHROME_PATH", chrome);
        }
        // Own process group, so Chrome can be killed along with lighthouse.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        debug!(url = %url, scratch = %scratch.path().display(), "launching lighthouse");
        let mut child = cmd.spawn()?;
        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                kill_tree(&mut child);
                return Err(SeoError::Timeout {
                    secs: timeout.as_secs(),
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        if !report.is_file() {
            let stderr = fs::read_to_string(&stderr_log).unwrap_or_default();
            let detail = match stderr.trim() {
                "" => format!("exited with {status}"),
                s => clip(s, 200),
            };
            return Err(SeoError::AuditFailed(detail));
        }
        let text = fs::read_to_string(&report)?;
        serde_json::from_str(&text)
            .map_err(|e| SeoError::AuditFailed(format!("invalid Lighthouse JSON output: {e}")))
    }
}

/// SIGKILL the child's process group, then reap the child. Runs before the
/// scratch directory is dropped.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        let status = Command::new("kill").args(["-KILL", "--", &group]).status();
        debug!(?status, group = %group, "killed lighthouse process group");
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Scores and failing audits pulled out of a raw result.
#[derive(Debug, Clone, Default)]
pub struct AuditResult {
    pub scores: Scores,
    pub target: u8,
    /// `(id, title, score 0-100, description)`, worst first.
    pub failing: Vec<(String, String, u8, String)>,
}

fn unit_to_percent(v: f64) -> u8 {
    (v * 100.0).round().clamp(0.0, 100.0) as u8
}

fn category_score(raw: &Json, id: &str) -> u8 {
    raw.pointer(&format!("/categories/{id}/score"))
        .and_then(Json::as_f64)
        .map(unit_to_percent)
        .unwrap_or(0)
}

fn numeric(raw: &Json, audit: &str) -> Option<f64> {
    raw.pointer(&format!("/audits/{audit}/numericValue"))
        .and_then(Json::as_f64)
}

pub fn extract_scores(raw: &Json) -> Scores {
    Scores {
        performance: category_score(raw, "performance"),
        accessibility: category_score(raw, "accessibility"),
        best_practices: category_score(raw, "best-practices"),
        seo: category_score(raw, "seo"),
    }
}

pub fn extract_vitals(raw: &Json) -> CoreWebVitals {
    CoreWebVitals {
        lcp_ms: numeric(raw, "largest-contentful-paint"),
        cls: numeric(raw, "cumulative-layout-shift"),
        inp_ms: numeric(raw, "interaction-to-next-paint"),
        fid_ms: numeric(raw, "max-potential-fid"),
        tbt_ms: numeric(raw, "total-blocking-time"),
        fcp_ms: numeric(raw, "first-contentful-paint"),
    }
}

/// Audits scoring below 1, worst first; ties keep report order.
pub fn failing_audits(raw: &Json) -> Vec<(String, String, u8, String)> {
    let Some(audits) = raw.get("audits").and_then(Json::as_object) else {
        return Vec::new();
    };
    let mut out: Vec<_> = audits
        .iter()
        .filter_map(|(id, a)| {
            let score = a.get("score").and_then(Json::as_f64)?;
            (score < 1.0).then(|| {
                let title = a.get("title").and_then(Json::as_str).unwrap_or(id.as_str());
                let desc = a.get("description").and_then(Json::as_str).unwrap_or("");
                (id.clone(), title.to_string(), unit_to_percent(score), clip(desc, 100))
            })
        })
        .collect();
    out.sort_by_key(|(_, _, score, _)| *score);
    out
}

fn below(name: &'static str, score: u8, target: u8) -> Vec<Occurrence> {
    fires(score < target, None)
        .into_iter()
        .map(|o| {
            o.with("category", name)
                .with("score", score)
                .with("target", target)
        })
        .collect()
}

fn perf_below(r: &AuditResult) -> Vec<Occurrence> {
    below("performance", r.scores.performance, r.target)
}

fn a11y_below(r: &AuditResult) -> Vec<Occurrence> {
    below("accessibility", r.scores.accessibility, r.target)
}

fn best_below(r: &AuditResult) -> Vec<Occurrence> {
    below("best-practices", r.scores.best_practices, r.target)
}

fn seo_below(r: &AuditResult) -> Vec<Occurrence> {
    below("seo", r.scores.seo, r.target)
}

fn top_audits(r: &AuditResult) -> Vec<Occurrence> {
    r.failing
        .iter()
        .take(MAX_ISSUES)
        .map(|(id, title, score, desc)| {
            Occurrence::at(None)
                .with("id", id)
                .with("title", title)
                .with("score", score)
                .with("description", desc)
        })
        .collect()
}

const CATEGORY_FIX: &str = "Fix the failing {category} audits listed below and re-run until the score reaches {target}.";

pub static RULES: &[RuleSpec<AuditResult>] = &[
    RuleSpec {
        code: "LH_PERF",
        severity: Error,
        element: "performance",
        message: "Performance score below target",
        current: Some("{score}/100"),
        expected: Some("{target}/100"),
        fix: CATEGORY_FIX,
        check: perf_below,
    },
    RuleSpec {
        code: "LH_ACCE",
        severity: Error,
        element: "accessibility",
        message: "Accessibility score below target",
        current: Some("{score}/100"),
        expected: Some("{target}/100"),
        fix: CATEGORY_FIX,
        check: a11y_below,
    },
    RuleSpec {
        code: "LH_BEST",
        severity: Error,
        element: "best-practices",
        message: "Best practices score below target",
        current: Some("{score}/100"),
        expected: Some("{target}/100"),
        fix: CATEGORY_FIX,
        check: best_below,
    },
    RuleSpec {
        code: "LH_SEO",
        severity: Error,
        element: "seo",
        message: "SEO score below target",
        current: Some("{score}/100"),
        expected: Some("{target}/100"),
        fix: CATEGORY_FIX,
        check: seo_below,
    },
    RuleSpec {
        code: "LH_AUDIT",
        severity: Warning,
        element: "{id}",
        message: "{title}",
        current: Some("[{score}]"),
        expected: Some("[100]"),
        fix: "{description}",
        check: top_audits,
    },
];

/// Turn a raw result into a report; `passed` iff every category meets
/// `target`.
pub fn build_report(url: &Url, raw: &Json, target: u8, timestamp: DateTime<Utc>) -> LighthouseReport {
    let failing = failing_audits(raw);
    let result = AuditResult {
        scores: extract_scores(raw),
        target,
        failing,
    };
    LighthouseReport {
        url: url.to_string(),
        timestamp,
        target,
        scores: result.scores,
        core_web_vitals: extract_vitals(raw),
        issues: evaluate(&result, url.as_str(), RULES),
        issue_count: result.failing.len(),
        passed: result.scores.all_at_least(target),
    }
}

/// File name unique per process and millisecond.
pub fn report_file_name(timestamp: &DateTime<Utc>) -> String {
    format!(
        "lighthouse-{}-{}.json",
        timestamp.format("%Y%m%dT%H%M%S%.3fZ"),
        std::process::id()
    )
}

/// Write `report` under `dir`; never overwrites an existing file.
pub fn persist(report: &LighthouseReport, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(&report.timestamp));
    let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
    file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;
    file.write_all(b"\n")?;
    info!(path = %path.display(), passed = report.passed, "lighthouse report saved");
    Ok(path)
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub target: u8,
    pub timeout: Duration,
    /// `None` skips persistence.
    pub reports_dir: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            target: DEFAULT_TARGET,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            reports_dir: Some(PathBuf::from(DEFAULT_REPORTS_DIR)),
        }
    }
}

/// Guard, check reachability, audit once, then persist (on pass and on fail).
pub fn run(
    raw_url: &str,
    opts: &RunOptions,
    driver: &dyn AuditDriver,
) -> Result<(LighthouseReport, Option<PathBuf>)> {
    let url = check_local_url(raw_url)?;
    check_reachable(&url)?;
    let raw = driver.audit(&url, opts.timeout)?;
    let report = build_report(&url, &raw, opts.target, Utc::now());
    debug!(passed = report.passed, issues = report.issue_count, "audit extracted");
    let saved = match &opts.reports_dir {
        Some(dir) => Some(persist(&report, dir)?),
        None => None,
    };
    Ok((report, saved))
}
