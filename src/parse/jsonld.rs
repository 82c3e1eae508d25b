//! JSON-LD block extraction.
//!
//! Each `<script type="application/ld+json">` body is parsed on its own;
//! a syntax error is recorded on that block only. A file without script
//! blocks whose text starts with `{` or `[` is treated as one standalone
//! JSON-LD document.

use super::LineIndex;
use regex::Regex;
use serde_json::{Map, Value as Json};
use std::sync::LazyLock;

static LD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("static regex")
});

#[derive(Debug, Clone)]
pub struct JsonLdBlock {
    /// 1-based position among the file's blocks.
    pub index: usize,
    pub label: String,
    pub line: usize,
    /// Parsed JSON. Syntax errors and non-object documents are `Err`.
    pub value: Result<Json, String>,
}

/// One schema object, possibly expanded from `@graph` or a top-level array.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Index of the owning block.
    pub block: usize,
    pub label: String,
    pub line: usize,
    /// Own `@context`, or the enclosing `@graph` object's.
    pub context: Option<Json>,
    pub object: Map<String, Json>,
}

#[derive(Debug, Clone)]
pub struct JsonLdDocument {
    pub blocks: Vec<JsonLdBlock>,
    pub nodes: Vec<SchemaNode>,
    /// The file is a full HTML document (has `<html` or `<head`).
    pub is_html_page: bool,
}

impl JsonLdDocument {
    pub fn failed_blocks(&self) -> impl Iterator<Item = (&JsonLdBlock, &str)> {
        self.blocks
            .iter()
            .filter_map(|b| b.value.as_ref().err().map(|e| (b, e.as_str())))
    }

    pub fn nodes_of(&self, block: &JsonLdBlock) -> impl Iterator<Item = &SchemaNode> {
        let index = block.index;
        self.nodes.iter().filter(move |n| n.block == index)
    }
}

/// JSON-LD documents are objects, or arrays holding objects.
fn shape_error(value: &Json) -> Option<String> {
    let found = match value {
        Json::Object(_) => return None,
        Json::Array(items) if items.iter().any(Json::is_object) => return None,
        Json::Array(_) => "an array without objects",
        Json::String(_) => "a string",
        Json::Number(_) => "a number",
        Json::Bool(_) => "a boolean",
        Json::Null => "null",
    };
    Some(format!("expected a JSON object, found {found}"))
}

pub fn parse(source: &str) -> JsonLdDocument {
    let lines = LineIndex::new(source);
    let mut raw: Vec<(String, usize)> = LD_RE
        .captures_iter(source)
        .filter_map(|c| {
            let whole = c.get(0)?;
            Some((c.get(1)?.as_str().trim().to_string(), lines.line(whole.start())))
        })
        .collect();
    let trimmed = source.trim_start();
    if raw.is_empty() && (trimmed.starts_with('{') || trimmed.starts_with('[')) {
        let offset = source.len() - trimmed.len();
        raw.push((source.trim().to_string(), lines.line(offset)));
    }

    let total = raw.len();
    let blocks: Vec<JsonLdBlock> = raw
        .into_iter()
        .enumerate()
        .map(|(i, (body, line))| JsonLdBlock {
            index: i + 1,
            label: if total > 1 {
                format!("Schema {}", i + 1)
            } else {
                "Schema".to_string()
            },
            line,
            value: serde_json::from_str::<Json>(&body)
                .map_err(|e| e.to_string())
                .and_then(|v| match shape_error(&v) {
                    Some(e) => Err(e),
                    None => Ok(v),
                }),
        })
        .collect();

    let mut nodes = Vec::new();
    for b in &blocks {
        let Ok(value) = &b.value else { continue };
        expand(value, b, &mut nodes);
    }

    let lower = source.to_ascii_lowercase();
    JsonLdDocument {
        blocks,
        nodes,
        is_html_page: lower.contains("<html") || lower.contains("<head"),
    }
}

fn expand(value: &Json, block: &JsonLdBlock, out: &mut Vec<SchemaNode>) {
    let node = |label: String, context: Option<&Json>, object: &Map<String, Json>| SchemaNode {
        block: block.index,
        label,
        line: block.line,
        context: context.cloned(),
        object: object.clone(),
    };
    let label = &block.label;
    match value {
        Json::Object(obj) => match obj.get("@graph") {
            Some(Json::Array(items)) => {
                for (j, item) in items.iter().enumerate() {
                    if let Json::Object(o) = item {
                        let context = o.get("@context").or_else(|| obj.get("@context"));
                        out.push(node(format!("{label}[@graph][{j}]"), context, o));
                    }
                }
            }
            _ => out.push(node(label.clone(), obj.get("@context"), obj)),
        },
        Json::Array(items) => {
            for (j, item) in items.iter().enumerate() {
                if let Json::Object(o) = item {
                    out.push(node(format!("{label}[{j}]"), o.get("@context"), o));
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broken_block_does_not_hide_siblings() {
        let src = r#"<head>
<script type="application/ld+json">{"@context": "https://schema.org", "@type": "WebSite",}</script>
<script type="application/ld+json">
{"@context": "https://schema.org", "@type": "Person", "name": "Ada"}
</script>
</head>"#;
        let d = parse(src);
        assert_eq!(d.blocks.len(), 2);
        assert!(d.blocks[0].value.is_err());
        assert_eq!(d.failed_blocks().count(), 1);
        assert_eq!(d.nodes.len(), 1);
        assert_eq!(d.nodes[0].label, "Schema 2");
        assert_eq!(d.nodes[0].line, 3);
        assert!(d.is_html_page);
    }

    #[test]
    fn graph_is_expanded() {
        let src = r#"{"@context":"https://schema.org","@graph":[{"@type":"WebSite"},{"@type":"Organization"},"x"]}"#;
        let d = parse(src);
        assert_eq!(d.nodes.len(), 2);
        assert_eq!(d.nodes[1].label, "Schema[@graph][1]");
        assert!(d.nodes[1].context.is_some());
        assert!(!d.is_html_page);
    }

    #[test]
    fn non_object_json_is_rejected_per_block() {
        let src = "<script type=\"application/ld+json\">42</script>\n<script type=\"application/ld+json\">[]</script>";
        let d = parse(src);
        assert!(d.nodes.is_empty());
        let errors: Vec<_> = d.failed_blocks().map(|(_, e)| e.to_string()).collect();
        assert_eq!(
            errors,
            vec![
                "expected a JSON object, found a number",
                "expected a JSON object, found an array without objects"
            ]
        );
    }

    #[test]
    fn nodes_remember_their_block() {
        let src = "<script type=\"application/ld+json\">{\"@type\":\"A\"}</script>\n<script type=\"application/ld+json\">{\"@graph\":[{\"@type\":\"B\"},{\"@type\":\"C\"}]}</script>";
        let d = parse(src);
        assert_eq!(d.nodes_of(&d.blocks[1]).count(), 2);
        assert_eq!(d.blocks[1].label, "Schema 2");
    }

    #[test]
    fn plain_text_has_no_blocks() {
        assert!(parse("hello").blocks.is_empty());
    }
}
