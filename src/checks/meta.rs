//! META rules: head tags a page needs to be indexed and shared.
//!
//! Presence rules accept a framework declaration (Astro props, Next.js
//! `metadata`, `useSeoMeta`, ...) in place of a literal tag. Lengths are
//! counted in characters, not bytes.

use super::unreadable;
use crate::models::Severity::{Error, Warning};
use crate::parse::framework::HeadField;
use crate::parse::html::HtmlDocument;
use crate::parse::ParseError;
use crate::rules::{clip, fires, Occurrence, RuleSpec};

pub const TITLE_MIN: usize = 10;
pub const TITLE_MAX: usize = 60;
pub const DESCRIPTION_MIN: usize = 120;
pub const DESCRIPTION_MAX: usize = 160;

/// Link texts that say nothing about the target (compared lowercase).
pub const NON_DESCRIPTIVE_LINKS: &[&str] = &[
    "learn more",
    "read more",
    "click here",
    "here",
    "more",
    "link",
    "this",
    "more info",
    "info",
    "details",
    "see more",
    "view more",
    "continue",
    "continue reading",
];

fn chars(s: &str) -> usize {
    s.chars().count()
}

fn missing(d: &HtmlDocument, key: &str, field: Option<HeadField>) -> Vec<Occurrence> {
    let declared = field.is_some_and(|f| d.declares(f));
    fires(d.meta_content(key).is_none() && !declared, d.head_line)
}

fn missing_title(d: &HtmlDocument) -> Vec<Occurrence> {
    fires(d.title().is_none() && !d.declares(HeadField::Title), d.head_line)
}

fn title_too_long(d: &HtmlDocument) -> Vec<Occurrence> {
    d.title()
        .filter(|t| chars(&t.text) > TITLE_MAX)
        .map(|t| {
            let len = chars(&t.text);
            Occurrence::at(Some(t.line))
                .with("title", clip(&t.text, 50))
                .with("len", len)
                .with("excess", len - TITLE_MAX)
        })
        .into_iter()
        .collect()
}

fn title_too_short(d: &HtmlDocument) -> Vec<Occurrence> {
    d.title()
        .filter(|t| chars(&t.text) < TITLE_MIN)
        .map(|t| {
            Occurrence::at(Some(t.line))
                .with("title", &t.text)
                .with("len", chars(&t.text))
        })
        .into_iter()
        .collect()
}

fn missing_description(d: &HtmlDocument) -> Vec<Occurrence> {
    missing(d, "description", Some(HeadField::Description))
}

fn description_length(d: &HtmlDocument, long: bool) -> Vec<Occurrence> {
    let Some((text, line)) = d.meta_content("description") else {
        return Vec::new();
    };
    let len = chars(text);
    let hit = if long {
        len > DESCRIPTION_MAX
    } else {
        len < DESCRIPTION_MIN
    };
    let delta = if long {
        len.saturating_sub(DESCRIPTION_MAX)
    } else {
        DESCRIPTION_MIN.saturating_sub(len)
    };
    if hit {
        vec![Occurrence::at(Some(line)).with("len", len).with("delta", delta)]
    } else {
        Vec::new()
    }
}

fn description_too_long(d: &HtmlDocument) -> Vec<Occurrence> {
    description_length(d, true)
}

fn description_too_short(d: &HtmlDocument) -> Vec<Occurrence> {
    description_length(d, false)
}

fn missing_canonical(d: &HtmlDocument) -> Vec<Occurrence> {
    fires(
        d.canonical().is_none() && !d.declares(HeadField::Canonical),
        d.head_line,
    )
}

fn missing_viewport(d: &HtmlDocument) -> Vec<Occurrence> {
    missing(d, "viewport", None)
}

fn missing_og_title(d: &HtmlDocument) -> Vec<Occurrence> {
    missing(d, "og:title", Some(HeadField::OpenGraph))
}

fn missing_og_description(d: &HtmlDocument) -> Vec<Occurrence> {
    missing(d, "og:description", Some(HeadField::OpenGraph))
}

fn missing_og_image(d: &HtmlDocument) -> Vec<Occurrence> {
    missing(d, "og:image", Some(HeadField::OpenGraph))
}

fn og_image_relative(d: &HtmlDocument) -> Vec<Occurrence> {
    match d.meta_content("og:image") {
        Some((url, line)) if !url.starts_with("http") => {
            vec![Occurrence::at(Some(line)).with("url", url)]
        }
        _ => Vec::new(),
    }
}

fn missing_og_url(d: &HtmlDocument) -> Vec<Occurrence> {
    missing(d, "og:url", Some(HeadField::OpenGraph))
}

fn missing_twitter_card(d: &HtmlDocument) -> Vec<Occurrence> {
    missing(d, "twitter:card", Some(HeadField::Twitter))
}

fn missing_robots(d: &HtmlDocument) -> Vec<Occurrence> {
    missing(d, "robots", None)
}

fn vague_links(d: &HtmlDocument) -> Vec<Occurrence> {
    d.anchors
        .iter()
        .filter(|a| NON_DESCRIPTIVE_LINKS.contains(&a.text.to_lowercase().as_str()))
        .map(|a| Occurrence::at(Some(a.line)).with("text", &a.text))
        .collect()
}

pub static UNREADABLE: RuleSpec<ParseError> = RuleSpec {
    code: "META000",
    severity: Error,
    element: "file",
    message: "Page source must be UTF-8 text",
    current: Some("{detail}"),
    expected: Some("UTF-8 encoded text"),
    fix: "Re-save the file as UTF-8 and run the check again.",
    check: unreadable,
};

pub static RULES: &[RuleSpec<HtmlDocument>] = &[
    RuleSpec {
        code: "META001",
        severity: Error,
        element: "<title>",
        message: "Page must have exactly one <title> tag",
        current: None,
        expected: Some("<title>Page Title | Site Name</title>"),
        fix: "Add <title> tag inside <head>. Format: 'Page Title | Site Name'. Max 60 characters.",
        check: missing_title,
    },
    RuleSpec {
        code: "META002",
        severity: Error,
        element: "<title>",
        message: "Title must be ≤60 characters",
        current: Some("'{title}' ({len} chars)"),
        expected: Some("≤60 characters"),
        fix: "Shorten title to 60 chars. Remove {excess} characters.",
        check: title_too_long,
    },
    RuleSpec {
        code: "META003",
        severity: Warning,
        element: "<title>",
        message: "Title should be ≥10 characters for SEO",
        current: Some("'{title}' ({len} chars)"),
        expected: Some("10-60 characters"),
        fix: "Expand title to at least 10 characters with relevant keywords.",
        check: title_too_short,
    },
    RuleSpec {
        code: "META004",
        severity: Error,
        element: "<meta name=\"description\">",
        message: "Page must have meta description",
        current: None,
        expected: Some("<meta name=\"description\" content=\"...\">"),
        fix: "Add <meta name=\"description\" content=\"Your description here\"> inside <head>. 150-160 characters recommended.",
        check: missing_description,
    },
    RuleSpec {
        code: "META005",
        severity: Warning,
        element: "<meta name=\"description\">",
        message: "Description should be ≤160 characters",
        current: Some("({len} chars)"),
        expected: Some("≤160 characters"),
        fix: "Shorten description to 160 chars. Remove {delta} characters.",
        check: description_too_long,
    },
    RuleSpec {
        code: "META006",
        severity: Warning,
        element: "<meta name=\"description\">",
        message: "Description should be ≥120 characters",
        current: Some("({len} chars)"),
        expected: Some("120-160 characters"),
        fix: "Expand description to 120+ chars. Add {delta} more characters.",
        check: description_too_short,
    },
    RuleSpec {
        code: "META007",
        severity: Error,
        element: "<link rel=\"canonical\">",
        message: "Page must have canonical URL",
        current: None,
        expected: Some("<link rel=\"canonical\" href=\"https://...\">"),
        fix: "Add <link rel=\"canonical\" href=\"{FULL_PAGE_URL}\"> inside <head>. Use absolute URL.",
        check: missing_canonical,
    },
    RuleSpec {
        code: "META008",
        severity: Error,
        element: "<meta name=\"viewport\">",
        message: "Page must have viewport meta for mobile",
        current: None,
        expected: Some("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"),
        fix: "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"> inside <head>.",
        check: missing_viewport,
    },
    RuleSpec {
        code: "META009",
        severity: Error,
        element: "<meta property=\"og:title\">",
        message: "Page must have Open Graph title",
        current: None,
        expected: Some("<meta property=\"og:title\" content=\"...\">"),
        fix: "Add <meta property=\"og:title\" content=\"{PAGE_TITLE}\"> inside <head>.",
        check: missing_og_title,
    },
    RuleSpec {
        code: "META010",
        severity: Error,
        element: "<meta property=\"og:description\">",
        message: "Page must have Open Graph description",
        current: None,
        expected: Some("<meta property=\"og:description\" content=\"...\">"),
        fix: "Add <meta property=\"og:description\" content=\"{DESCRIPTION}\"> inside <head>.",
        check: missing_og_description,
    },
    RuleSpec {
        code: "META011",
        severity: Error,
        element: "<meta property=\"og:image\">",
        message: "Page must have Open Graph image",
        current: None,
        expected: Some("<meta property=\"og:image\" content=\"https://...\">"),
        fix: "Add <meta property=\"og:image\" content=\"{ABSOLUTE_IMAGE_URL}\"> inside <head>. Image: 1200x630px.",
        check: missing_og_image,
    },
    RuleSpec {
        code: "META012",
        severity: Error,
        element: "<meta property=\"og:image\">",
        message: "og:image must be absolute URL",
        current: Some("{url}"),
        expected: Some("https://yourdomain.com/path/to/image.png"),
        fix: "Change og:image from relative '{url}' to absolute URL. Prepend your domain.",
        check: og_image_relative,
    },
    RuleSpec {
        code: "META013",
        severity: Error,
        element: "<meta property=\"og:url\">",
        message: "Page must have Open Graph URL",
        current: None,
        expected: Some("<meta property=\"og:url\" content=\"https://...\">"),
        fix: "Add <meta property=\"og:url\" content=\"{CANONICAL_URL}\"> inside <head>.",
        check: missing_og_url,
    },
    RuleSpec {
        code: "META014",
        severity: Error,
        element: "<meta name=\"twitter:card\">",
        message: "Page must have Twitter Card type",
        current: None,
        expected: Some("<meta name=\"twitter:card\" content=\"summary_large_image\">"),
        fix: "Add <meta name=\"twitter:card\" content=\"summary_large_image\"> inside <head>.",
        check: missing_twitter_card,
    },
    RuleSpec {
        code: "META015",
        severity: Warning,
        element: "<meta name=\"robots\">",
        message: "Page should have robots directive",
        current: None,
        expected: Some("<meta name=\"robots\" content=\"index, follow\">"),
        fix: "Add <meta name=\"robots\" content=\"index, follow\"> inside <head>.",
        check: missing_robots,
    },
    RuleSpec {
        code: "META016",
        severity: Error,
        element: "<a>{text}</a>",
        message: "Link text must describe its target",
        current: Some("'{text}'"),
        expected: Some("Text naming the destination, e.g. 'Read the pricing guide'"),
        fix: "Replace '{text}' with text that says where the link goes.",
        check: vague_links,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::html;
    use crate::rules::evaluate;

    fn run(path: &str, src: &str) -> Vec<String> {
        let doc = html::parse(path, src);
        evaluate(&doc, path, RULES)
            .into_iter()
            .map(|f| f.code)
            .collect()
    }

    fn title_of(n: usize) -> String {
        format!("<title>{}</title>", "a".repeat(n))
    }

    const COMPLETE_HEAD: &str = r#"<head>
<meta name="description" content="DESC">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="robots" content="index, follow">
<link rel="canonical" href="https://acme.test/">
<meta property="og:title" content="Acme">
<meta property="og:description" content="Acme widgets">
<meta property="og:image" content="https://acme.test/og.png">
<meta property="og:url" content="https://acme.test/">
<meta name="twitter:card" content="summary_large_image">
TITLE
</head>"#;

    fn complete(title: &str, desc_len: usize) -> String {
        COMPLETE_HEAD
            .replace("DESC", &"d".repeat(desc_len))
            .replace("TITLE", title)
    }

    #[test]
    fn complete_head_is_clean() {
        assert!(run("index.html", &complete(&title_of(40), 140)).is_empty());
    }

    #[test]
    fn title_boundary_at_sixty() {
        assert!(!run("index.html", &complete(&title_of(60), 140)).contains(&"META002".to_string()));
        assert!(run("index.html", &complete(&title_of(61), 140)).contains(&"META002".to_string()));
    }

    #[test]
    fn missing_description_fires_once() {
        let src = complete(&title_of(40), 140).replace(r#"<meta name="description" content=""#, "<meta x=\"");
        let codes = run("index.html", &src);
        assert_eq!(codes.iter().filter(|c| *c == "META004").count(), 1);
    }

    #[test]
    fn bare_title_page() {
        let page = format!("<html>{}</html>", title_of(60));
        let doc = html::parse("index.html", &page);
        let findings = evaluate(&doc, "index.html", RULES);
        let codes: Vec<&str> = findings.iter().map(|f| f.code.as_str()).collect();
        for want in [
            "META004", "META007", "META008", "META009", "META010", "META011", "META013", "META014",
        ] {
            assert!(codes.contains(&want), "missing {want}");
        }
        assert!(!codes.contains(&"META002") && !codes.contains(&"META003"));
        // The eight above plus the robots warning.
        assert_eq!(codes.len(), 9);
        assert!(codes.contains(&"META015"));
    }

    #[test]
    fn description_length_warnings() {
        let codes = run("index.html", &complete(&title_of(40), 161));
        assert_eq!(codes, vec!["META005"]);
        let doc = html::parse("index.html", &complete(&title_of(40), 100));
        let f = evaluate(&doc, "index.html", RULES);
        assert_eq!(f[0].code, "META006");
        assert_eq!(f[0].fix, "Expand description to 120+ chars. Add 20 more characters.");
    }

    #[test]
    fn long_title_text_is_clipped() {
        let doc = html::parse("index.html", &complete(&title_of(70), 140));
        let f = evaluate(&doc, "index.html", RULES);
        assert_eq!(f[0].code, "META002");
        assert_eq!(f[0].current.as_deref(), Some(format!("'{}...' (70 chars)", "a".repeat(50)).as_str()));
        assert_eq!(f[0].fix, "Shorten title to 60 chars. Remove 10 characters.");
        assert_eq!(f[0].location.line, Some(11));
    }

    #[test]
    fn relative_og_image() {
        let src = complete(&title_of(40), 140).replace("https://acme.test/og.png", "/og.png");
        let doc = html::parse("index.html", &src);
        let f = evaluate(&doc, "index.html", RULES);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].code, "META012");
        assert_eq!(f[0].current.as_deref(), Some("/og.png"));
    }

    #[test]
    fn astro_props_satisfy_head_rules() {
        let src = r#"---
const { title, description } = Astro.props;
---
<BaseHead title={title} description={description} canonical={Astro.url} og={{ image }} twitter={{ card }} />
<meta name="viewport" content="width=device-width">
<meta name="robots" content="index">
"#;
        assert!(run("src/layouts/Layout.astro", src).is_empty());
    }

    #[test]
    fn vague_link_texts_each_reported() {
        let src = complete(&title_of(40), 140)
            + "\n<a href=\"/a\">Click here</a>\n<Link to=\"/b\">Pricing guide</Link>\n<a href=\"/c\">more</a>";
        let doc = html::parse("index.html", &src);
        let f = evaluate(&doc, "index.html", RULES);
        let lines: Vec<_> = f.iter().filter(|f| f.code == "META016").map(|f| f.location.line).collect();
        assert_eq!(lines, vec![Some(13), Some(15)]);
    }
}
