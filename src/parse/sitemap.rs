//! Minimal sitemap.xml reader: declaration, namespace, `<loc>` and
//! `<lastmod>` presence. Well-formedness beyond that is not checked.

use super::LineIndex;
use regex::Regex;
use std::sync::LazyLock;

static NS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<(?:urlset|sitemapindex)\b[^>]*\bxmlns\s*=\s*["'][^"']*sitemaps\.org[^"']*["']"#)
        .expect("static regex")
});

static LOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<loc>\s*(.*?)\s*</loc>").expect("static regex"));

static LASTMOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<lastmod>").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sitemap {
    pub has_declaration: bool,
    pub has_namespace: bool,
    pub locs: Vec<(String, usize)>,
    pub has_lastmod: bool,
}

pub fn parse(source: &str) -> Sitemap {
    let lines = LineIndex::new(source);
    Sitemap {
        has_declaration: source.trim_start().starts_with("<?xml"),
        has_namespace: NS_RE.is_match(source),
        locs: LOC_RE
            .captures_iter(source)
            .filter_map(|c| {
                let whole = c.get(0)?;
                Some((c.get(1)?.as_str().to_string(), lines.line(whole.start())))
            })
            .collect(),
        has_lastmod: LASTMOD_RE.is_match(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_urlset() {
        let src = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://acme.test/</loc><lastmod>2024-01-01</lastmod></url>
  <url>
    <loc> /about </loc>
  </url>
</urlset>"#;
        let s = parse(src);
        assert!(s.has_declaration && s.has_namespace && s.has_lastmod);
        assert_eq!(
            s.locs,
            vec![("https://acme.test/".to_string(), 3), ("/about".to_string(), 5)]
        );
    }

    #[test]
    fn bare_urlset() {
        let s = parse("<urlset><url></url></urlset>");
        assert!(!s.has_declaration);
        assert!(!s.has_namespace);
        assert!(s.locs.is_empty());
    }
}
