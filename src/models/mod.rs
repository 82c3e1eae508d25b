//! Shared data models for findings, reports, Lighthouse results and assets.

pub mod assets;
pub mod lighthouse;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Finding severity. Only `Error` blocks a report.
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Sort rank: errors before warnings.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Error => 0,
            Severity::Warning => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Where a finding points: a file (or URL) and an optional 1-based line.
pub struct Location {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A single rule violation with complete fix guidance.
pub struct Finding {
    pub code: String,
    pub severity: Severity,
    pub location: Location,
    /// What failed, e.g. `<title>` or `robots.txt`.
    pub element: String,
    /// Human description of the violated rule.
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    pub fix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Findings for one validated file, errors first.
pub struct ValidationReport {
    pub file: String,
    /// Validator label, e.g. `META` or `AI-SEO`.
    pub validator: String,
    pub findings: Vec<Finding>,
    pub passed: bool,
}

impl ValidationReport {
    /// Build a report; findings are stably partitioned so errors precede
    /// warnings while rule-table and occurrence order are preserved.
    pub fn new(file: impl Into<String>, validator: impl Into<String>, mut findings: Vec<Finding>) -> Self {
        findings.sort_by_key(|f| f.severity.rank());
        let passed = !findings.iter().any(|f| f.severity == Severity::Error);
        ValidationReport {
            file: file.into(),
            validator: validator.into(),
            findings,
            passed,
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }

    pub fn codes(&self) -> Vec<&str> {
        self.findings.iter().map(|f| f.code.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Aggregated counts across the reports of one invocation.
pub struct Summary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
    pub passed: bool,
}

impl Summary {
    pub fn of(reports: &[ValidationReport]) -> Self {
        Summary {
            files: reports.len(),
            errors: reports.iter().map(|r| r.errors().count()).sum(),
            warnings: reports.iter().map(|r| r.warnings().count()).sum(),
            passed: reports.iter().all(|r| r.passed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(code: &str, severity: Severity) -> Finding {
        Finding {
            code: code.into(),
            severity,
            location: Location {
                file: "index.html".into(),
                line: Some(3),
            },
            element: "<title>".into(),
            message: "m".into(),
            current: None,
            expected: Some("e".into()),
            fix: "f".into(),
        }
    }

    #[test]
    fn errors_sorted_before_warnings_keeping_table_order() {
        let r = ValidationReport::new(
            "index.html",
            "META",
            vec![
                finding("META003", Severity::Warning),
                finding("META004", Severity::Error),
                finding("META015", Severity::Warning),
                finding("META007", Severity::Error),
            ],
        );
        assert_eq!(r.codes(), vec!["META004", "META007", "META003", "META015"]);
        assert!(!r.passed);
    }

    #[test]
    fn warnings_never_block() {
        let r = ValidationReport::new("a", "META", vec![finding("META015", Severity::Warning)]);
        assert!(r.passed);
    }

    #[test]
    fn json_round_trip_keeps_passed_and_codes() {
        let r = ValidationReport::new(
            "index.html",
            "META",
            vec![
                finding("META004", Severity::Error),
                finding("META015", Severity::Warning),
            ],
        );
        let s = serde_json::to_string(&r).unwrap();
        let back: ValidationReport = serde_json::from_str(&s).unwrap();
        assert_eq!(back.passed, r.passed);
        let mut a = back.codes();
        let mut b = r.codes();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn summary_counts() {
        let reports = vec![
            ValidationReport::new("a", "META", vec![finding("META004", Severity::Error)]),
            ValidationReport::new("b", "META", vec![finding("META015", Severity::Warning)]),
        ];
        let s = Summary::of(&reports);
        assert_eq!((s.files, s.errors, s.warnings, s.passed), (2, 1, 1, false));
    }
}
