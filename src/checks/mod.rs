//! Rule tables per artifact kind and the file-level validation driver.
//!
//! Every kind maps raw bytes to one `ValidationReport`: decode, parse,
//! evaluate the kind's table. Undecodable input yields the kind's single
//! `…000` finding instead.

pub mod ai;
pub mod assets;
pub mod meta;
pub mod perf;
pub mod schema;
pub mod sitemap;

use crate::error::Result;
use crate::models::ValidationReport;
use crate::parse::{self, decode_text, html, jsonld, ParseError};
use crate::rules::{evaluate, Occurrence, RuleSpec};
use crate::utils::display_path;
use clap::ValueEnum;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
/// File-based validator families.
pub enum ArtifactKind {
    Meta,
    Schema,
    Ai,
    Perf,
    Sitemap,
}

const SCHEMA_INDICATORS: &[&str] = &["schema", "jsonld", "json-ld", "structured", "ld+json"];
const AI_INDICATORS: &[&str] = &["llms", "robots"];
const PERF_INDICATORS: &[&str] = &[
    "layout", "page", "component", "template", "view", "head", "base", "app", "root", "index",
];
const TEMPLATE_EXTENSIONS: &[&str] = &[".html", ".astro", ".tsx", ".jsx", ".vue", ".svelte", ".css"];

impl ArtifactKind {
    /// Validator name shown in reports.
    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Meta => "META",
            ArtifactKind::Schema => "SCHEMA",
            ArtifactKind::Ai => "AI-SEO",
            ArtifactKind::Perf => "PERF",
            ArtifactKind::Sitemap => "SITEMAP",
        }
    }

    /// Code prefix of every finding of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            ArtifactKind::Ai => "AI",
            other => other.label(),
        }
    }

    /// Whether an edited path is worth validating as this kind.
    pub fn wants(self, path: &str) -> bool {
        let lower = path.to_lowercase();
        let any = |list: &[&str]| list.iter().any(|i| lower.contains(i));
        match self {
            ArtifactKind::Meta => any(html::HEAD_FILE_INDICATORS),
            ArtifactKind::Schema => {
                any(SCHEMA_INDICATORS) || lower.ends_with(".json") || any(html::HEAD_FILE_INDICATORS)
            }
            ArtifactKind::Ai => any(AI_INDICATORS),
            ArtifactKind::Perf => {
                any(PERF_INDICATORS) || TEMPLATE_EXTENSIONS.iter().any(|e| lower.ends_with(e))
            }
            ArtifactKind::Sitemap => lower.contains("sitemap"),
        }
    }

    fn unreadable(self) -> &'static RuleSpec<ParseError> {
        match self {
            ArtifactKind::Meta => &meta::UNREADABLE,
            ArtifactKind::Schema => &schema::UNREADABLE,
            ArtifactKind::Ai => &ai::UNREADABLE,
            ArtifactKind::Perf => &perf::UNREADABLE,
            ArtifactKind::Sitemap => &sitemap::UNREADABLE,
        }
    }
}

/// Check function shared by every `…000` rule.
fn unreadable(e: &ParseError) -> Vec<Occurrence> {
    vec![Occurrence::at(e.line).with("detail", &e.detail)]
}

/// Validate in-memory content; `file` is used for locations and framework
/// detection.
pub fn validate_source(kind: ArtifactKind, file: &str, bytes: &[u8]) -> ValidationReport {
    let findings = match decode_text(bytes) {
        Err(e) => evaluate(&e, file, std::slice::from_ref(kind.unreadable())),
        Ok(text) => match kind {
            ArtifactKind::Meta => evaluate(&html::parse(file, &text), file, meta::RULES),
            ArtifactKind::Perf => evaluate(&html::parse(file, &text), file, perf::RULES),
            ArtifactKind::Schema => evaluate(&jsonld::parse(&text), file, schema::RULES),
            ArtifactKind::Sitemap => evaluate(&parse::sitemap::parse(&text), file, sitemap::RULES),
            ArtifactKind::Ai => ai::evaluate_text(file, &text),
        },
    };
    debug!(file, kind = kind.label(), findings = findings.len(), "validated");
    ValidationReport::new(file, kind.label(), findings)
}

/// Validate one path. AI accepts a directory holding llms.txt/robots.txt.
pub fn validate_path(kind: ArtifactKind, path: &Path, shown: &str) -> Result<ValidationReport> {
    if kind == ArtifactKind::Ai && path.is_dir() {
        let findings = ai::evaluate_dir(path, shown)?;
        return Ok(ValidationReport::new(shown, kind.label(), findings));
    }
    let bytes = fs::read(path)?;
    Ok(validate_source(kind, shown, &bytes))
}

/// Validate many paths in parallel; reports keep input order.
pub fn validate_paths(kind: ArtifactKind, root: &Path, paths: &[PathBuf]) -> Result<Vec<ValidationReport>> {
    paths
        .par_iter()
        .map(|p| validate_path(kind, p, &display_path(root, p)))
        .collect()
}

/// Run the ASSET table over `dir`, or over the first public directory
/// under `root` when `dir` is `None`.
pub fn check_assets(root: &Path, dir: Option<&Path>) -> ValidationReport {
    let found = match dir {
        Some(d) => Some(d.to_path_buf()).filter(|d| d.is_dir()),
        None => assets::find_public_dir(root),
    };
    let shown = match (dir, found.as_deref()) {
        (Some(d), _) | (None, Some(d)) => display_path(root, d),
        (None, None) => "public".to_string(),
    };
    let scanned = assets::scan(found.as_deref());
    ValidationReport::new(&shown, "ASSETS", evaluate(&scanned, &shown, assets::RULES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::codes;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn assert_table(prefix: &str, table: Vec<&'static str>) {
        let unique: HashSet<_> = table.iter().collect();
        assert_eq!(unique.len(), table.len(), "duplicate code in {prefix} table");
        for c in &table {
            assert!(c.starts_with(prefix), "{c} outside {prefix}");
        }
    }

    #[test]
    fn codes_are_unique_and_namespaced() {
        let mut meta = codes(meta::RULES);
        meta.push(meta::UNREADABLE.code);
        assert_table("META", meta);
        let mut schema = codes(schema::RULES);
        schema.push(schema::UNREADABLE.code);
        assert_table("SCHEMA", schema);
        let mut perf = codes(perf::RULES);
        perf.push(perf::UNREADABLE.code);
        assert_table("PERF", perf);
        let mut sm = codes(sitemap::RULES);
        sm.push(sitemap::UNREADABLE.code);
        assert_table("SITEMAP", sm);
        let mut ai = codes(ai::LLMS_RULES);
        ai.extend(codes(ai::ROBOTS_RULES));
        ai.extend(codes(ai::DIR_RULES));
        ai.push(ai::UNREADABLE.code);
        assert_table("AI", ai);
        assert_table("ASSET", codes(assets::RULES));
    }

    #[test]
    fn undecodable_input_is_one_terminal_finding() {
        for kind in [
            ArtifactKind::Meta,
            ArtifactKind::Schema,
            ArtifactKind::Ai,
            ArtifactKind::Perf,
            ArtifactKind::Sitemap,
        ] {
            let r = validate_source(kind, "x", b"ok\n\xc3\x28");
            assert_eq!(r.findings.len(), 1);
            assert_eq!(r.findings[0].code, format!("{}000", kind.prefix()));
            assert_eq!(r.findings[0].location.line, Some(2));
            assert!(!r.passed);
        }
    }

    #[test]
    fn hook_path_filters() {
        assert!(ArtifactKind::Meta.wants("src/layouts/BaseLayout.astro"));
        assert!(!ArtifactKind::Meta.wants("src/components/Card.tsx"));
        assert!(ArtifactKind::Schema.wants("data/org.json"));
        assert!(ArtifactKind::Ai.wants("public/llms.txt"));
        assert!(!ArtifactKind::Ai.wants("public/sitemap.xml"));
        assert!(ArtifactKind::Sitemap.wants("public/sitemap.xml"));
        assert!(ArtifactKind::Perf.wants("src/styles/global.css"));
    }

    #[test]
    fn paths_keep_input_order() {
        let td = tempdir().unwrap();
        let a = td.path().join("a.html");
        let b = td.path().join("b.html");
        std::fs::write(&a, "<title>Short</title>").unwrap();
        std::fs::write(&b, "<title>A perfectly reasonable page title</title>").unwrap();
        let reports = validate_paths(ArtifactKind::Meta, td.path(), &[b.clone(), a.clone()]).unwrap();
        assert_eq!(reports[0].file, "b.html");
        assert_eq!(reports[1].file, "a.html");
        assert!(reports[1].codes().contains(&"META003"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let td = tempdir().unwrap();
        let err = validate_paths(ArtifactKind::Meta, td.path(), &[td.path().join("nope.html")]).unwrap_err();
        assert_eq!(err.code(), "IO");
    }

    #[test]
    fn assets_without_public_dir() {
        let td = tempdir().unwrap();
        let r = check_assets(td.path(), None);
        assert_eq!(r.codes(), vec!["ASSET001"]);
        assert_eq!(r.validator, "ASSETS");
    }
}
