//! SITEMAP rules.

use super::unreadable;
use crate::models::Severity::{Error, Warning};
use crate::parse::sitemap::Sitemap;
use crate::parse::ParseError;
use crate::rules::{clip, fires, Occurrence, RuleSpec};

fn no_declaration(s: &Sitemap) -> Vec<Occurrence> {
    fires(!s.has_declaration, Some(1))
}

fn no_namespace(s: &Sitemap) -> Vec<Occurrence> {
    fires(!s.has_namespace, None)
}

fn no_urls(s: &Sitemap) -> Vec<Occurrence> {
    fires(s.locs.is_empty(), None)
}

fn no_lastmod(s: &Sitemap) -> Vec<Occurrence> {
    fires(!s.has_lastmod, None)
}

fn relative_locs(s: &Sitemap) -> Vec<Occurrence> {
    s.locs
        .iter()
        .filter(|(url, _)| !url.starts_with("http"))
        .map(|(url, line)| {
            Occurrence::at(Some(*line))
                .with("url", url)
                .with("short", clip(url, 50))
        })
        .collect()
}

pub static UNREADABLE: RuleSpec<ParseError> = RuleSpec {
    code: "SITEMAP000",
    severity: Error,
    element: "sitemap.xml",
    message: "Sitemap must be UTF-8 encoded",
    current: Some("{detail}"),
    expected: Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"),
    fix: "Re-save sitemap.xml as UTF-8.",
    check: unreadable,
};

pub static RULES: &[RuleSpec<Sitemap>] = &[
    RuleSpec {
        code: "SITEMAP001",
        severity: Error,
        element: "sitemap.xml",
        message: "Sitemap must be valid XML",
        current: Some("Missing XML declaration"),
        expected: Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"),
        fix: "Add XML declaration at the start of the file.",
        check: no_declaration,
    },
    RuleSpec {
        code: "SITEMAP002",
        severity: Error,
        element: "<urlset>",
        message: "Sitemap must have proper namespace",
        current: Some("Missing or invalid namespace"),
        expected: Some("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"),
        fix: "Add xmlns attribute to urlset element.",
        check: no_namespace,
    },
    RuleSpec {
        code: "SITEMAP003",
        severity: Error,
        element: "<url>",
        message: "Sitemap must contain at least one URL",
        current: Some("No URLs found"),
        expected: Some("<url><loc>https://...</loc></url>"),
        fix: "Add at least one URL entry.",
        check: no_urls,
    },
    RuleSpec {
        code: "SITEMAP004",
        severity: Warning,
        element: "<lastmod>",
        message: "Sitemap should include lastmod dates",
        current: Some("No lastmod elements found"),
        expected: Some("<lastmod>2026-01-22</lastmod>"),
        fix: "Add lastmod element to each URL for better crawling.",
        check: no_lastmod,
    },
    RuleSpec {
        code: "SITEMAP005",
        severity: Error,
        element: "<loc>{short}</loc>",
        message: "Sitemap URLs must be absolute",
        current: Some("{url}"),
        expected: Some("https://yourdomain.com/..."),
        fix: "Use absolute URLs starting with https://.",
        check: relative_locs,
    },
];
