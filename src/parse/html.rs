//! HTML/template head scanner.
//!
//! Not a DOM parser: a tag scanner tolerant of JSX/Astro attribute syntax
//! (`attr={expr}`), unclosed void elements and mixed case component names.
//! Lowercase `img` is an HTML image; `Image`, `Img` and `Picture` are
//! framework components. All occurrences are kept in document order.

use super::framework::{self, Framework};
use super::LineIndex;
use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([A-Za-z][A-Za-z0-9:-]*)((?:[^>"'{]|"[^"]*"|'[^']*'|\{[^}]*\})*)>"#)
        .expect("static regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"([A-Za-z_:@][-A-Za-z0-9_:.@]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|\{([^}]*)\}|([^\s"'>/`]+)))?"#,
    )
    .expect("static regex")
});

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title\b[^>]*>([^<]*)</title>").expect("static regex"));

static LINK_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?i:a|Link|NavLink)\s[^>]*>([^<]+)</(?i:a|Link|NavLink)>").expect("static regex")
});

static FONT_FACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)@font-face\s*\{([^}]*)\}").expect("static regex"));

static FONT_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(["']?([^"')\s]+\.(?:woff2?|ttf|otf))["']?\)"#).expect("static regex")
});

/// File-name fragments of layout/head components.
pub const HEAD_FILE_INDICATORS: &[&str] = &[
    "layout",
    "head",
    "seo",
    "meta",
    "base",
    "_app",
    "_document",
    "root",
    "basehead",
    "defaulthead",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attrs: Vec<(String, Option<String>)>,
    pub line: usize,
    pub raw: String,
}

impl Tag {
    /// Attribute value by case-insensitive name; boolean attributes yield `""`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Whether the whitespace-separated `rel` list contains `value`.
    pub fn rel_is(&self, value: &str) -> bool {
        self.attr("rel")
            .map(|r| r.split_whitespace().any(|t| t.eq_ignore_ascii_case(value)))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAt {
    pub text: String,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct HtmlDocument {
    pub path: String,
    pub source: String,
    pub framework: Framework,
    pub head_line: Option<usize>,
    /// Every `<title>` text, trimmed, in document order.
    pub titles: Vec<TextAt>,
    pub metas: Vec<Tag>,
    pub links: Vec<Tag>,
    pub images: Vec<Tag>,
    pub image_components: Vec<Tag>,
    pub scripts: Vec<Tag>,
    pub anchors: Vec<TextAt>,
    pub font_faces: Vec<TextAt>,
    pub font_urls: Vec<TextAt>,
    pub head_like: bool,
    /// A stylesheet (`.css`).
    pub is_css: bool,
}

impl HtmlDocument {
    /// First non-empty title; duplicates are ignored.
    pub fn title(&self) -> Option<&TextAt> {
        self.titles.first().filter(|t| !t.text.is_empty())
    }

    /// First `<meta>` whose `name` or `property` equals `key` (case-insensitive).
    pub fn meta(&self, key: &str) -> Option<&Tag> {
        self.metas.iter().find(|m| {
            m.attr("name").is_some_and(|n| n.eq_ignore_ascii_case(key))
                || m.attr("property").is_some_and(|n| n.eq_ignore_ascii_case(key))
        })
    }

    /// Non-empty `content` of the first matching meta, with its line.
    pub fn meta_content(&self, key: &str) -> Option<(&str, usize)> {
        let tag = self.meta(key)?;
        let content = tag.attr("content")?.trim();
        if content.is_empty() {
            None
        } else {
            Some((content, tag.line))
        }
    }

    pub fn canonical(&self) -> Option<&Tag> {
        self.links.iter().find(|l| l.rel_is("canonical"))
    }

    pub fn declares(&self, field: framework::HeadField) -> bool {
        framework::declares(self.framework, field, &self.source)
    }
}

/// Scan `source` (the contents of `path`).
pub fn parse(path: &str, source: &str) -> HtmlDocument {
    let lines = LineIndex::new(source);
    let mut doc = HtmlDocument {
        path: path.to_string(),
        source: source.to_string(),
        framework: framework::detect(path, source),
        head_line: None,
        titles: Vec::new(),
        metas: Vec::new(),
        links: Vec::new(),
        images: Vec::new(),
        image_components: Vec::new(),
        scripts: Vec::new(),
        anchors: Vec::new(),
        font_faces: Vec::new(),
        font_urls: Vec::new(),
        head_like: false,
        is_css: false,
    };

    for cap in TAG_RE.captures_iter(source) {
        let (Some(whole), Some(name), Some(raw)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            continue;
        };
        let name = name.as_str();
        let line = lines.line(whole.start());
        let bucket = match name {
            "Image" | "Img" | "Picture" => &mut doc.image_components,
            _ => match name.to_ascii_lowercase().as_str() {
                "head" => {
                    doc.head_line.get_or_insert(line);
                    continue;
                }
                "meta" => &mut doc.metas,
                "link" if name == "link" => &mut doc.links,
                "img" if name == "img" => &mut doc.images,
                "script" => &mut doc.scripts,
                _ => continue,
            },
        };
        bucket.push(Tag {
            name: name.to_string(),
            attrs: parse_attrs(raw.as_str()),
            line,
            raw: raw.as_str().trim().trim_end_matches('/').trim().to_string(),
        });
    }

    for cap in TITLE_RE.captures_iter(source) {
        if let (Some(whole), Some(text)) = (cap.get(0), cap.get(1)) {
            doc.titles.push(TextAt {
                text: text.as_str().trim().to_string(),
                line: lines.line(whole.start()),
            });
        }
    }
    doc.anchors = collect(&LINK_TEXT_RE, source, &lines);
    doc.font_faces = collect(&FONT_FACE_RE, source, &lines);
    doc.font_urls = collect(&FONT_URL_RE, source, &lines);

    let lower = path.to_lowercase();
    let file_name = lower.rsplit(['/', '\\']).next().unwrap_or(&lower);
    doc.head_like = doc.head_line.is_some()
        || HEAD_FILE_INDICATORS.iter().any(|i| file_name.contains(i));
    doc.is_css = file_name.ends_with(".css");
    doc
}

fn collect(re: &Regex, source: &str, lines: &LineIndex) -> Vec<TextAt> {
    re.captures_iter(source)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            Some(TextAt {
                text: cap.get(1)?.as_str().trim().to_string(),
                line: lines.line(whole.start()),
            })
        })
        .collect()
}

fn parse_attrs(raw: &str) -> Vec<(String, Option<String>)> {
    ATTR_RE
        .captures_iter(raw)
        .filter_map(|c| {
            let key = c.get(1)?.as_str().to_string();
            let val = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .or_else(|| c.get(5))
                .map(|m| m.as_str().to_string());
            Some((key, val))
        })
        .collect()
}
