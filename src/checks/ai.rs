//! AI-SEO rules: `llms.txt`, `robots.txt` and the public directory that
//! should contain them.
//!
//! A path is routed by file name: anything containing `robots` is read as
//! robots.txt, everything else as llms.txt. A directory gets the presence
//! rules plus the file rules of whatever it holds.

use super::unreadable;
use crate::error::Result;
use crate::models::Finding;
use crate::models::Severity::{Error, Warning};
use crate::parse::llms::{self, LlmsTxt};
use crate::parse::robots::{self, RobotsTxt};
use crate::parse::{decode_text, ParseError};
use crate::rules::{evaluate, fires, Occurrence, RuleSpec};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Crawlers of AI assistants and model trainers.
pub const AI_BOTS: &[&str] = &[
    "GPTBot",
    "ClaudeBot",
    "PerplexityBot",
    "Google-Extended",
    "Amazonbot",
    "anthropic-ai",
    "Bytespider",
    "CCBot",
    "ChatGPT-User",
    "cohere-ai",
];

pub const REQUIRED_SECTIONS: &[&str] = &["About"];
pub const RECOMMENDED_SECTIONS: &[&str] = &["Key Pages", "Contact"];
pub const MIN_LENGTH: usize = 100;

/// Which companion files a public directory holds.
#[derive(Debug, Clone, Copy)]
pub struct DirListing {
    pub has_llms: bool,
    pub has_robots: bool,
}

fn no_llms(d: &DirListing) -> Vec<Occurrence> {
    fires(!d.has_llms, None)
}

fn no_robots(d: &DirListing) -> Vec<Occurrence> {
    fires(!d.has_robots, None)
}

fn missing_title(l: &LlmsTxt) -> Vec<Occurrence> {
    fires(l.title.is_none(), Some(1))
}

fn missing_description(l: &LlmsTxt) -> Vec<Occurrence> {
    fires(l.description.is_none(), Some(2))
}

fn sections_missing(l: &LlmsTxt, names: &[&'static str]) -> Vec<Occurrence> {
    names
        .iter()
        .filter(|s| !l.has_section(s))
        .map(|s| Occurrence::at(None).with("section", s))
        .collect()
}

fn missing_required_section(l: &LlmsTxt) -> Vec<Occurrence> {
    sections_missing(l, REQUIRED_SECTIONS)
}

fn missing_recommended_section(l: &LlmsTxt) -> Vec<Occurrence> {
    sections_missing(l, RECOMMENDED_SECTIONS)
}

fn too_short(l: &LlmsTxt) -> Vec<Occurrence> {
    if l.length < MIN_LENGTH {
        vec![Occurrence::at(None).with("len", l.length)]
    } else {
        Vec::new()
    }
}

fn bot_blocked(r: &RobotsTxt) -> Vec<Occurrence> {
    AI_BOTS
        .iter()
        .filter_map(|bot| {
            let g = r.group_for(bot).filter(|g| g.blocks_root())?;
            Some(Occurrence::at(Some(g.line)).with("bot", bot))
        })
        .collect()
}

fn wildcard_blocks(r: &RobotsTxt) -> Vec<Occurrence> {
    let Some(w) = r.wildcard().filter(|g| g.blocks_root()) else {
        return Vec::new();
    };
    AI_BOTS
        .iter()
        .filter(|bot| r.group_for(bot).is_none())
        .map(|bot| Occurrence::at(Some(w.line)).with("bot", bot))
        .collect()
}

fn no_sitemap(r: &RobotsTxt) -> Vec<Occurrence> {
    fires(r.sitemaps.is_empty(), None)
}

pub static UNREADABLE: RuleSpec<ParseError> = RuleSpec {
    code: "AI000",
    severity: Error,
    element: "file",
    message: "AI crawler files must be UTF-8 text",
    current: Some("{detail}"),
    expected: Some("UTF-8 encoded text"),
    fix: "Re-save the file as UTF-8 and run the check again.",
    check: unreadable,
};

pub static DIR_RULES: &[RuleSpec<DirListing>] = &[
    RuleSpec {
        code: "AI001",
        severity: Error,
        element: "llms.txt",
        message: "Site should have /llms.txt for AI crawlers",
        current: Some("File not found"),
        expected: Some("public/llms.txt or static/llms.txt"),
        fix: "Create llms.txt in public/static directory. Include site name, description, and key pages.",
        check: no_llms,
    },
    RuleSpec {
        code: "AI006",
        severity: Warning,
        element: "robots.txt",
        message: "Site should have robots.txt",
        current: Some("File not found"),
        expected: Some("public/robots.txt"),
        fix: "Create robots.txt in public directory with User-agent and Allow/Disallow rules.",
        check: no_robots,
    },
];

pub static LLMS_RULES: &[RuleSpec<LlmsTxt>] = &[
    RuleSpec {
        code: "AI003",
        severity: Error,
        element: "llms.txt",
        message: "llms.txt must have site title on first line",
        current: None,
        expected: Some("# Site Name"),
        fix: "Add '# Site Name' as first line of llms.txt.",
        check: missing_title,
    },
    RuleSpec {
        code: "AI004",
        severity: Error,
        element: "llms.txt",
        message: "llms.txt must have site description",
        current: None,
        expected: Some("> One-line description of your site"),
        fix: "Add '> Brief description' after the title in llms.txt.",
        check: missing_description,
    },
    RuleSpec {
        code: "AI002",
        severity: Error,
        element: "llms.txt",
        message: "llms.txt must have '{section}' section",
        current: Some("Missing: {section}"),
        expected: Some("## {section}"),
        fix: "Add '## {section}' section to llms.txt with relevant content.",
        check: missing_required_section,
    },
    RuleSpec {
        code: "AI007",
        severity: Warning,
        element: "llms.txt",
        message: "llms.txt should have substantive content (≥100 chars)",
        current: Some("{len} characters"),
        expected: Some("≥100 characters"),
        fix: "Add more descriptive content about your site, key pages, and what AI assistants should know.",
        check: too_short,
    },
    RuleSpec {
        code: "AI010",
        severity: Warning,
        element: "llms.txt",
        message: "llms.txt should have '{section}' section",
        current: Some("Missing: {section}"),
        expected: Some("## {section}"),
        fix: "Add '## {section}' section to llms.txt with relevant content.",
        check: missing_recommended_section,
    },
];

pub static ROBOTS_RULES: &[RuleSpec<RobotsTxt>] = &[
    RuleSpec {
        code: "AI005",
        severity: Warning,
        element: "robots.txt",
        message: "robots.txt blocks {bot}",
        current: Some("User-agent: {bot} / Disallow: /"),
        expected: Some("User-agent: {bot} / Allow: /"),
        fix: "Change 'Disallow: /' to 'Allow: /' for {bot}, or remove the block entirely.",
        check: bot_blocked,
    },
    RuleSpec {
        code: "AI008",
        severity: Warning,
        element: "robots.txt",
        message: "Wildcard User-agent blocks {bot}",
        current: Some("User-agent: * / Disallow: /"),
        expected: Some("Add explicit allow for {bot}"),
        fix: "Add 'User-agent: {bot}' with 'Allow: /' before the wildcard block to allow AI crawlers.",
        check: wildcard_blocks,
    },
    RuleSpec {
        code: "AI009",
        severity: Warning,
        element: "robots.txt",
        message: "robots.txt should reference sitemap",
        current: None,
        expected: Some("Sitemap: https://yourdomain.com/sitemap.xml"),
        fix: "Add 'Sitemap: https://yourdomain.com/sitemap.xml' at the end of robots.txt.",
        check: no_sitemap,
    },
];

fn is_robots(file: &str) -> bool {
    let lower = file.to_lowercase();
    let name = lower.rsplit(['/', '\\']).next().unwrap_or(&lower);
    name.contains("robots")
}

/// Evaluate decoded text as llms.txt or robots.txt, by file name.
pub fn evaluate_text(file: &str, text: &str) -> Vec<Finding> {
    if is_robots(file) {
        evaluate(&robots::parse(text), file, ROBOTS_RULES)
    } else {
        evaluate(&llms::parse(text), file, LLMS_RULES)
    }
}

/// Evaluate raw bytes, turning undecodable input into AI000.
pub fn evaluate_bytes(file: &str, bytes: &[u8]) -> Vec<Finding> {
    match decode_text(bytes) {
        Ok(text) => evaluate_text(file, &text),
        Err(e) => evaluate(&e, file, std::slice::from_ref(&UNREADABLE)),
    }
}

/// Presence rules for `dir`, then the file rules for each file present.
pub fn evaluate_dir(dir: &Path, shown: &str) -> Result<Vec<Finding>> {
    let llms_path = dir.join("llms.txt");
    let robots_path = dir.join("robots.txt");
    let listing = DirListing {
        has_llms: llms_path.is_file(),
        has_robots: robots_path.is_file(),
    };
    debug!(dir = %dir.display(), ?listing, "scanned ai directory");
    let mut findings = evaluate(&listing, shown, DIR_RULES);
    for (present, path, name) in [
        (listing.has_llms, &llms_path, "llms.txt"),
        (listing.has_robots, &robots_path, "robots.txt"),
    ] {
        if present {
            let bytes = fs::read(path)?;
            let file = format!("{}/{}", shown.trim_end_matches('/'), name);
            findings.extend(evaluate_bytes(&file, &bytes));
        }
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Severity, ValidationReport};
    use tempfile::tempdir;

    const GOOD_LLMS: &str = "# Acme\n> Widgets for everyone, shipped worldwide.\n\n## About\nAcme builds widgets.\n\n## Key Pages\n- /docs\n\n## Contact\nhello@acme.test\n";

    #[test]
    fn plain_text_llms() {
        let f = evaluate_text("public/llms.txt", "Just some text");
        let r = ValidationReport::new("public/llms.txt", "AI-SEO", f);
        let errors: Vec<_> = r.errors().map(|f| f.code.as_str()).collect();
        assert!(errors.contains(&"AI003") && errors.contains(&"AI004"));
        let warnings: Vec<_> = r.warnings().map(|f| f.code.as_str()).collect();
        assert!(warnings.contains(&"AI007"));
        assert_eq!(r.findings[0].severity, Severity::Error);
        assert!(!r.passed);
    }

    #[test]
    fn complete_llms_is_clean() {
        assert!(evaluate_text("llms.txt", GOOD_LLMS).is_empty());
    }

    #[test]
    fn robots_bot_and_wildcard_blocks() {
        let robots = "User-agent: GPTBot\nDisallow: /\n\nUser-agent: ClaudeBot\nAllow: /\n\nUser-agent: *\nDisallow: /\n";
        let f = evaluate_text("public/robots.txt", robots);
        let blocked: Vec<_> = f.iter().filter(|f| f.code == "AI005").collect();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].message, "robots.txt blocks GPTBot");
        assert_eq!(blocked[0].location.line, Some(1));
        // every bot without its own group is caught by the wildcard
        let wildcard = f.iter().filter(|f| f.code == "AI008").count();
        assert_eq!(wildcard, AI_BOTS.len() - 2);
        assert!(f.iter().any(|f| f.code == "AI009"));
    }

    #[test]
    fn empty_disallow_is_not_a_block() {
        let robots = "User-agent: *\nDisallow:\n\nSitemap: https://acme.test/sitemap.xml\n";
        assert!(evaluate_text("robots.txt", robots).is_empty());
    }

    #[test]
    fn invalid_utf8_is_terminal() {
        let f = evaluate_bytes("llms.txt", b"# Acme\n\xff\xfe");
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].code, "AI000");
        assert_eq!(f[0].location.line, Some(2));
    }

    #[test]
    fn directory_mode() {
        let td = tempdir().unwrap();
        let f = evaluate_dir(td.path(), "public").unwrap();
        let codes: Vec<_> = f.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["AI001", "AI006"]);

        std::fs::write(td.path().join("llms.txt"), GOOD_LLMS).unwrap();
        std::fs::write(td.path().join("robots.txt"), "User-agent: *\nAllow: /\n").unwrap();
        let f = evaluate_dir(td.path(), "public").unwrap();
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].code, "AI009");
        assert_eq!(f[0].location.file, "public/robots.txt");
    }
}
