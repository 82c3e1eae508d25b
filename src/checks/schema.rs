//! SCHEMA rules over the JSON-LD blocks of one file.
//!
//! A block that fails to parse yields SCHEMA001 and nothing else; its
//! siblings are still checked node by node.

use super::unreadable;
use crate::models::Severity::{Error, Warning};
use crate::parse::jsonld::{JsonLdDocument, SchemaNode};
use crate::parse::ParseError;
use crate::rules::{fires, Occurrence, RuleSpec};
use serde_json::Value as Json;

/// Required properties per schema.org `@type`.
pub const REQUIRED_PROPERTIES: &[(&str, &[&str])] = &[
    ("Organization", &["name", "url"]),
    ("LocalBusiness", &["name", "address"]),
    ("Article", &["headline", "author", "datePublished"]),
    ("BlogPosting", &["headline", "author", "datePublished"]),
    ("NewsArticle", &["headline", "author", "datePublished"]),
    ("Product", &["name", "description"]),
    ("WebSite", &["name", "url"]),
    ("WebPage", &["name"]),
    ("BreadcrumbList", &["itemListElement"]),
    ("FAQPage", &["mainEntity"]),
    ("HowTo", &["name", "step"]),
    ("Recipe", &["name", "recipeIngredient", "recipeInstructions"]),
    ("Event", &["name", "startDate", "location"]),
    ("Person", &["name"]),
    ("VideoObject", &["name", "description", "thumbnailUrl", "uploadDate"]),
];

const URL_PROPERTIES: &[&str] = &["url", "image", "logo", "sameAs"];

fn present(v: Option<&Json>) -> bool {
    match v {
        None | Some(Json::Null) => false,
        Some(Json::String(s)) => !s.is_empty(),
        Some(Json::Array(a)) => !a.is_empty(),
        Some(Json::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}

/// Effective `@type`: a string, or the first entry of an array.
fn node_type(n: &SchemaNode) -> Option<&str> {
    match n.object.get("@type")? {
        Json::String(s) if !s.is_empty() => Some(s.as_str()),
        Json::Array(items) => items.first().and_then(Json::as_str),
        _ => None,
    }
}

fn at(n: &SchemaNode) -> Occurrence {
    Occurrence::at(Some(n.line)).with("node", &n.label)
}

fn invalid_json(d: &JsonLdDocument) -> Vec<Occurrence> {
    d.failed_blocks()
        .map(|(b, e)| Occurrence::at(Some(b.line)).with("error", e))
        .collect()
}

/// One occurrence per block: a block lacks `@context` when any of its nodes
/// does, or when it has no nodes and no `@context` of its own.
fn missing_context(d: &JsonLdDocument) -> Vec<Occurrence> {
    d.blocks
        .iter()
        .filter_map(|b| {
            let value = b.value.as_ref().ok()?;
            let mut nodes = d.nodes_of(b).peekable();
            let lacking = if nodes.peek().is_some() {
                nodes.any(|n| !present(n.context.as_ref()))
            } else {
                !present(value.get("@context"))
            };
            lacking.then(|| Occurrence::at(Some(b.line)).with("node", &b.label))
        })
        .collect()
}

fn foreign_context(d: &JsonLdDocument) -> Vec<Occurrence> {
    d.nodes
        .iter()
        .filter_map(|n| {
            let ctx = n.context.as_ref().filter(|c| present(Some(*c)))?;
            let shown = match ctx {
                Json::String(s) => s.clone(),
                other => other.to_string(),
            };
            (!shown.contains("schema.org")).then(|| at(n).with("context", shown))
        })
        .collect()
}

fn missing_type(d: &JsonLdDocument) -> Vec<Occurrence> {
    d.nodes
        .iter()
        .filter(|n| !present(n.object.get("@type")))
        .map(at)
        .collect()
}

fn missing_required(d: &JsonLdDocument) -> Vec<Occurrence> {
    let mut out = Vec::new();
    for n in &d.nodes {
        let Some(ty) = node_type(n) else { continue };
        let Some((_, props)) = REQUIRED_PROPERTIES.iter().find(|(t, _)| *t == ty) else {
            continue;
        };
        for prop in props.iter().filter(|p| !n.object.contains_key(**p)) {
            out.push(at(n).with("type", ty).with("prop", prop));
        }
    }
    out
}

fn relative_urls(d: &JsonLdDocument) -> Vec<Occurrence> {
    let mut out = Vec::new();
    for n in &d.nodes {
        for prop in URL_PROPERTIES {
            let mut bad = |name: String, value: &str| {
                if !value.starts_with("http") {
                    out.push(at(n).with("prop", name).with("value", value));
                }
            };
            match n.object.get(*prop) {
                Some(Json::String(s)) if !s.is_empty() => bad(prop.to_string(), s),
                Some(Json::Object(o)) => {
                    if let Some(Json::String(id)) = o.get("@id") {
                        bad(format!("{prop}.@id"), id);
                    }
                }
                Some(Json::Array(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        if let Json::String(s) = item {
                            bad(format!("{prop}[{i}]"), s);
                        }
                    }
                }
                _ => {}
            }
        }
    }
    out
}

fn no_structured_data(d: &JsonLdDocument) -> Vec<Occurrence> {
    fires(d.is_html_page && d.blocks.is_empty(), None)
}

pub static UNREADABLE: RuleSpec<ParseError> = RuleSpec {
    code: "SCHEMA000",
    severity: Error,
    element: "file",
    message: "File must be UTF-8 text",
    current: Some("{detail}"),
    expected: Some("UTF-8 encoded text"),
    fix: "Re-save the file as UTF-8 and run the check again.",
    check: unreadable,
};

pub static RULES: &[RuleSpec<JsonLdDocument>] = &[
    RuleSpec {
        code: "SCHEMA001",
        severity: Error,
        element: "<script type=\"application/ld+json\">",
        message: "JSON-LD must be valid JSON",
        current: Some("Parse error: {error}"),
        expected: Some("Valid JSON object"),
        fix: "Fix the JSON-LD block: {error}. Check for missing commas, quotes, or brackets.",
        check: invalid_json,
    },
    RuleSpec {
        code: "SCHEMA002",
        severity: Error,
        element: "{node} @context",
        message: "JSON-LD must have @context",
        current: None,
        expected: Some("\"@context\": \"https://schema.org\""),
        fix: "Add \"@context\": \"https://schema.org\" as first property in JSON-LD object.",
        check: missing_context,
    },
    RuleSpec {
        code: "SCHEMA003",
        severity: Error,
        element: "{node} @context",
        message: "@context must reference schema.org",
        current: Some("{context}"),
        expected: Some("\"https://schema.org\""),
        fix: "Change @context from '{context}' to 'https://schema.org'.",
        check: foreign_context,
    },
    RuleSpec {
        code: "SCHEMA004",
        severity: Error,
        element: "{node} @type",
        message: "JSON-LD must have @type",
        current: None,
        expected: Some("\"@type\": \"Organization|Article|Product|...\""),
        fix: "Add \"@type\": \"YourSchemaType\" to specify the schema type.",
        check: missing_type,
    },
    RuleSpec {
        code: "SCHEMA005",
        severity: Error,
        element: "{node} @type={type}",
        message: "{type} requires '{prop}' property",
        current: Some("Missing: {prop}"),
        expected: Some("\"{prop}\": \"...\""),
        fix: "Add \"{prop}\" property to {type} schema. See schema.org/{type} for format.",
        check: missing_required,
    },
    RuleSpec {
        code: "SCHEMA006",
        severity: Error,
        element: "{node} {prop}",
        message: "{prop} must be a valid absolute URL",
        current: Some("{value}"),
        expected: Some("https://yourdomain.com/..."),
        fix: "Change '{prop}' from '{value}' to absolute URL starting with https://.",
        check: relative_urls,
    },
    RuleSpec {
        code: "SCHEMA007",
        severity: Warning,
        element: "<script type=\"application/ld+json\">",
        message: "Page should have JSON-LD structured data",
        current: None,
        expected: Some("<script type=\"application/ld+json\">{...}</script>"),
        fix: "Add <script type=\"application/ld+json\"> with schema data inside <head> or end of <body>.",
        check: no_structured_data,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::jsonld;
    use crate::rules::evaluate;

    fn findings(src: &str) -> Vec<crate::models::Finding> {
        evaluate(&jsonld::parse(src), "page.html", RULES)
    }

    fn script(body: &str) -> String {
        format!("<script type=\"application/ld+json\">{body}</script>\n")
    }

    #[test]
    fn missing_context_once_per_block_and_siblings_checked() {
        let src = format!(
            "<head>\n{}{}{}</head>",
            script(r#"{"@type":"Person","name":"Ada"}"#),
            script(r#"{"@context":"https://schema.org","@type":"Organization","name":"Acme"}"#),
            script(r#"{"@type":"WebPage","name":"Home"}"#),
        );
        let f = findings(&src);
        let ctx: Vec<_> = f.iter().filter(|f| f.code == "SCHEMA002").collect();
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx[0].location.line, Some(2));
        assert_eq!(ctx[1].element, "Schema 3 @context");
        // the well-formed sibling is still evaluated
        let req: Vec<_> = f.iter().filter(|f| f.code == "SCHEMA005").collect();
        assert_eq!(req.len(), 1);
        assert_eq!(req[0].message, "Organization requires 'url' property");
    }

    #[test]
    fn invalid_json_is_terminal_for_its_block_only() {
        let src = format!(
            "{}{}",
            script(r#"{"@context": "https://schema.org", "@type": }"#),
            script(r#"{"@context":"https://schema.org","@type":"Person"}"#),
        );
        let codes: Vec<_> = findings(&src).into_iter().map(|f| f.code).collect();
        assert_eq!(codes, vec!["SCHEMA001", "SCHEMA005"]);
    }

    #[test]
    fn graph_nodes_inherit_context() {
        let src = r#"{"@context":"https://schema.org","@graph":[
            {"@type":"WebSite","name":"Acme","url":"https://acme.test"},
            {"@type":["Organization","Brand"],"name":"Acme","url":"/","logo":{"@id":"/logo.png"},"sameAs":["https://x.test/acme","acme"]}
        ]}"#;
        let f = findings(src);
        let urls: Vec<_> = f
            .iter()
            .filter(|f| f.code == "SCHEMA006")
            .map(|f| f.element.as_str())
            .collect();
        assert_eq!(
            urls,
            vec![
                "Schema[@graph][1] url",
                "Schema[@graph][1] logo.@id",
                "Schema[@graph][1] sameAs[1]"
            ]
        );
        assert!(f.iter().all(|f| f.code == "SCHEMA006"));
    }

    #[test]
    fn graph_without_context_reported_once() {
        let src = script(
            r#"{"@graph":[{"@type":"Person","name":"A"},{"@type":"Person","name":"B"},{"@type":"Person","name":"C"}]}"#,
        );
        let f = findings(&src);
        let ctx: Vec<_> = f.iter().filter(|f| f.code == "SCHEMA002").collect();
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx[0].element, "Schema @context");
    }

    #[test]
    fn empty_graph_without_context_is_reported() {
        let codes: Vec<_> = findings(&script(r#"{"@graph":[]}"#))
            .into_iter()
            .map(|f| f.code)
            .collect();
        assert_eq!(codes, vec!["SCHEMA002"]);
        assert!(findings(&script(r#"{"@context":"https://schema.org","@graph":[]}"#)).is_empty());
    }

    #[test]
    fn scalar_block_is_invalid_json_ld() {
        let f = findings(&script("42"));
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].code, "SCHEMA001");
        assert_eq!(
            f[0].current.as_deref(),
            Some("Parse error: expected a JSON object, found a number")
        );
    }

    #[test]
    fn foreign_context_and_missing_type() {
        let f = findings(r#"{"@context":"https://example.org/vocab"}"#);
        let codes: Vec<_> = f.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["SCHEMA003", "SCHEMA004"]);
        assert_eq!(f[0].current.as_deref(), Some("https://example.org/vocab"));
    }

    #[test]
    fn html_page_without_json_ld_warns() {
        let f = findings("<html><head><title>x</title></head></html>");
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].code, "SCHEMA007");
        assert!(findings("export const x = 1;").is_empty());
    }
}
