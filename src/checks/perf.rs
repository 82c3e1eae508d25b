//! PERF rules: markup patterns that hurt Core Web Vitals.

use super::unreadable;
use crate::models::Severity::{Error, Warning};
use crate::parse::html::{HtmlDocument, Tag};
use crate::parse::ParseError;
use crate::rules::{clip, fires, Occurrence, RuleSpec};

/// Attribute fragments that mark an image as above the fold.
const EAGER_HINTS: &[&str] = &["hero", "banner", "logo", "above"];

const LEGACY_FORMATS: &[&str] = &[".jpg", ".jpeg", ".png"];

fn src_of(tag: &Tag) -> String {
    clip(tag.attr("src").unwrap_or("unknown"), 30)
}

fn image(tag: &Tag) -> Occurrence {
    Occurrence::at(Some(tag.line))
        .with("tag", &tag.name)
        .with("src", src_of(tag))
}

fn missing_dimensions(d: &HtmlDocument) -> Vec<Occurrence> {
    d.images
        .iter()
        .filter(|t| !t.has_attr("width") || !t.has_attr("height"))
        .map(image)
        .collect()
}

fn missing_alt(d: &HtmlDocument) -> Vec<Occurrence> {
    let mut tags: Vec<&Tag> = d
        .images
        .iter()
        .chain(d.image_components.iter())
        .filter(|t| !t.has_attr("alt"))
        .collect();
    tags.sort_by_key(|t| t.line);
    tags.into_iter().map(image).collect()
}

fn not_lazy(d: &HtmlDocument) -> Vec<Occurrence> {
    d.images
        .iter()
        .filter(|t| {
            let raw = t.raw.to_lowercase();
            !t.has_attr("loading") && !EAGER_HINTS.iter().any(|h| raw.contains(h))
        })
        .map(image)
        .collect()
}

fn legacy_format(d: &HtmlDocument) -> Vec<Occurrence> {
    d.images
        .iter()
        .filter_map(|t| {
            let src = t.attr("src")?.to_lowercase();
            let ext = LEGACY_FORMATS.iter().find(|e| src.ends_with(**e))?;
            Some(image(t).with("ext", &ext[1..]))
        })
        .collect()
}

fn font_not_preloaded(d: &HtmlDocument) -> Vec<Occurrence> {
    if !d.head_like {
        return Vec::new();
    }
    d.font_urls
        .iter()
        .filter(|f| {
            !d.links
                .iter()
                .any(|l| l.rel_is("preload") && l.attr("href") == Some(f.text.as_str()))
        })
        .map(|f| {
            Occurrence::at(Some(f.line))
                .with("font", &f.text)
                .with("short", clip(&f.text, 30))
        })
        .collect()
}

fn missing_font_display(d: &HtmlDocument) -> Vec<Occurrence> {
    if !d.is_css {
        return Vec::new();
    }
    d.font_faces
        .iter()
        .filter(|f| !f.text.to_lowercase().contains("font-display"))
        .map(|f| Occurrence::at(Some(f.line)))
        .collect()
}

fn blocking_scripts(d: &HtmlDocument) -> Vec<Occurrence> {
    d.scripts
        .iter()
        .filter(|s| s.attr("src").is_some_and(|v| !v.is_empty()))
        .filter(|s| {
            let module = s.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("module"));
            !s.has_attr("async") && !s.has_attr("defer") && !module
        })
        .map(|s| Occurrence::at(Some(s.line)).with("src", clip(s.attr("src").unwrap_or(""), 50)))
        .collect()
}

fn missing_theme_color(d: &HtmlDocument) -> Vec<Occurrence> {
    fires(d.head_like && d.meta("theme-color").is_none(), d.head_line)
}

pub static UNREADABLE: RuleSpec<ParseError> = RuleSpec {
    code: "PERF000",
    severity: Error,
    element: "file",
    message: "Template must be UTF-8 text",
    current: Some("{detail}"),
    expected: Some("UTF-8 encoded text"),
    fix: "Re-save the file as UTF-8 and run the check again.",
    check: unreadable,
};

pub static RULES: &[RuleSpec<HtmlDocument>] = &[
    RuleSpec {
        code: "PERF001",
        severity: Error,
        element: "<img src=\"{src}\">",
        message: "Images must have width and height attributes",
        current: Some("Missing width/height"),
        expected: Some("<img src=\"...\" width=\"...\" height=\"...\">"),
        fix: "Add width and height attributes to <img src=\"{src}\"> to prevent CLS.",
        check: missing_dimensions,
    },
    RuleSpec {
        code: "PERF002",
        severity: Error,
        element: "<{tag} src=\"{src}\">",
        message: "Images must have alt attribute for accessibility",
        current: Some("Missing alt"),
        expected: Some("<img src=\"...\" alt=\"Description\">"),
        fix: "Add descriptive alt attribute to <{tag} src=\"{src}\">.",
        check: missing_alt,
    },
    RuleSpec {
        code: "PERF003",
        severity: Warning,
        element: "<img src=\"{src}\">",
        message: "Below-fold images should use lazy loading",
        current: Some("No loading attribute"),
        expected: Some("<img src=\"...\" loading=\"lazy\">"),
        fix: "Add loading=\"lazy\" to below-fold images for better LCP.",
        check: not_lazy,
    },
    RuleSpec {
        code: "PERF004",
        severity: Warning,
        element: "<img src=\"{src}\">",
        message: "Images should use modern formats (WebP/AVIF)",
        current: Some("{ext}"),
        expected: Some(".webp or .avif format"),
        fix: "Convert image to WebP/AVIF format, or use <picture> with multiple sources.",
        check: legacy_format,
    },
    RuleSpec {
        code: "PERF005",
        severity: Warning,
        element: "<link rel=\"preload\">",
        message: "Critical fonts should be preloaded",
        current: Some("Font not preloaded: {short}"),
        expected: Some("<link rel=\"preload\" href=\"...\" as=\"font\" type=\"font/woff2\" crossorigin>"),
        fix: "Add font preload: <link rel=\"preload\" href=\"{font}\" as=\"font\" type=\"font/woff2\" crossorigin>.",
        check: font_not_preloaded,
    },
    RuleSpec {
        code: "PERF006",
        severity: Error,
        element: "@font-face",
        message: "@font-face must have font-display property",
        current: Some("Missing font-display"),
        expected: Some("font-display: swap;"),
        fix: "Add 'font-display: swap;' to @font-face rule to prevent FOIT.",
        check: missing_font_display,
    },
    RuleSpec {
        code: "PERF007",
        severity: Warning,
        element: "<script src=\"{src}\">",
        message: "Render-blocking scripts should be deferred or async",
        current: Some("{src}"),
        expected: Some("<script defer> or <script type=\"module\">"),
        fix: "Add 'defer' or 'async' to the script, or load it as a module.",
        check: blocking_scripts,
    },
    RuleSpec {
        code: "PERF008",
        severity: Warning,
        element: "<meta name=\"theme-color\">",
        message: "Page should have theme-color for mobile browsers",
        current: None,
        expected: Some("<meta name=\"theme-color\" content=\"#ffffff\">"),
        fix: "Add <meta name=\"theme-color\" content=\"#YOUR_COLOR\"> inside <head>.",
        check: missing_theme_color,
    },
];
