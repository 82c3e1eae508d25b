//! Declarative rule tables and the generic evaluator.
//!
//! A rule is data: a code, a severity, text templates and a pure `check`
//! function over one parsed artifact. `check` returns one `Occurrence` per
//! violation (in document order) and each occurrence becomes a `Finding`.
//! Templates reference occurrence variables as `{name}`; unknown
//! placeholders are left untouched so literal braces survive.

use crate::models::{Finding, Location, Severity};
use tracing::debug;

/// One violation site produced by a rule check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occurrence {
    pub line: Option<usize>,
    vars: Vec<(&'static str, String)>,
}

impl Occurrence {
    pub fn at(line: Option<usize>) -> Self {
        Occurrence {
            line,
            vars: Vec::new(),
        }
    }

    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.vars.push((key, value.to_string()));
        self
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Zero or one occurrence.
pub fn fires(cond: bool, line: Option<usize>) -> Vec<Occurrence> {
    if cond {
        vec![Occurrence::at(line)]
    } else {
        Vec::new()
    }
}

/// A statically-defined rule over artifact type `A`.
pub struct RuleSpec<A: ?Sized> {
    pub code: &'static str,
    pub severity: Severity,
    pub element: &'static str,
    pub message: &'static str,
    pub current: Option<&'static str>,
    pub expected: Option<&'static str>,
    pub fix: &'static str,
    pub check: fn(&A) -> Vec<Occurrence>,
}

impl<A: ?Sized> RuleSpec<A> {
    fn finding(&self, file: &str, occ: &Occurrence) -> Finding {
        Finding {
            code: self.code.to_string(),
            severity: self.severity,
            location: Location {
                file: file.to_string(),
                line: occ.line,
            },
            element: render(self.element, occ),
            message: render(self.message, occ),
            current: self.current.map(|t| render(t, occ)),
            expected: self.expected.map(|t| render(t, occ)),
            fix: render(self.fix, occ),
        }
    }
}

/// Evaluate every rule of `table` against `artifact`, in table order.
///
/// Rules never short-circuit each other; a rule that fires several times
/// yields one finding per occurrence.
pub fn evaluate<A: ?Sized>(artifact: &A, file: &str, table: &[RuleSpec<A>]) -> Vec<Finding> {
    let mut out = Vec::new();
    for rule in table {
        let hits = (rule.check)(artifact);
        if !hits.is_empty() {
            debug!(code = rule.code, count = hits.len(), file, "rule fired");
        }
        out.extend(hits.iter().map(|o| rule.finding(file, o)));
    }
    out
}

/// Codes of a table, in order.
pub fn codes<A: ?Sized>(table: &[RuleSpec<A>]) -> Vec<&'static str> {
    table.iter().map(|r| r.code).collect()
}

fn render(template: &str, occ: &Occurrence) -> String {
    let mut s = template.to_string();
    for (k, v) in &occ.vars {
        s = s.replace(&format!("{{{k}}}"), v);
    }
    s
}

/// Truncate to `max` chars, appending `...` when cut.
pub fn clip(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doc {
        words: Vec<&'static str>,
    }

    fn long_words(d: &Doc) -> Vec<Occurrence> {
        d.words
            .iter()
            .enumerate()
            .filter(|(_, w)| w.len() > 3)
            .map(|(i, w)| Occurrence::at(Some(i + 1)).with("word", w))
            .collect()
    }

    fn empty(d: &Doc) -> Vec<Occurrence> {
        fires(d.words.is_empty(), None)
    }

    static TABLE: &[RuleSpec<Doc>] = &[
        RuleSpec {
            code: "T001",
            severity: Severity::Error,
            element: "doc",
            message: "Document must not be empty",
            current: None,
            expected: Some("{...}"),
            fix: "Add words.",
            check: empty,
        },
        RuleSpec {
            code: "T002",
            severity: Severity::Warning,
            element: "'{word}'",
            message: "Words should be short",
            current: Some("{word} ({missing} unknown)"),
            expected: None,
            fix: "Shorten '{word}'.",
            check: long_words,
        },
    ];

    #[test]
    fn one_finding_per_occurrence_in_document_order() {
        let d = Doc {
            words: vec!["a", "house", "of", "cards"],
        };
        let f = evaluate(&d, "doc.txt", TABLE);
        assert_eq!(f.len(), 2);
        assert_eq!(f[0].element, "'house'");
        assert_eq!(f[0].location.line, Some(2));
        assert_eq!(f[1].fix, "Shorten 'cards'.");
        assert_eq!(f[1].current.as_deref(), Some("cards ({missing} unknown)"));
    }

    #[test]
    fn silent_rules_emit_nothing() {
        let d = Doc { words: vec![] };
        let f = evaluate(&d, "doc.txt", TABLE);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].code, "T001");
        assert_eq!(f[0].expected.as_deref(), Some("{...}"));
    }

    #[test]
    fn clip_marks_truncation() {
        assert_eq!(clip("abcdef", 3), "abc...");
        assert_eq!(clip("abc", 3), "abc");
    }
}
