//! Editor-hook adapter: validate the file a tool just wrote.
//!
//! Input is the post-tool event on stdin. The response is always JSON and
//! the process always exits 0; anything not worth validating is a skip.

use crate::checks::{validate_source, ArtifactKind};
use crate::models::ValidationReport;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

const WRITE_TOOLS: &[&str] = &["Edit", "Write", "MultiEdit"];

#[derive(Debug, Default, Deserialize)]
pub struct HookEvent {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: ToolInput,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub file_path: String,
}

/// Validate the event's file as `kind`; `None` means skip.
pub fn handle(kind: ArtifactKind, event: &str) -> Option<ValidationReport> {
    let event: HookEvent = match serde_json::from_str(event) {
        Ok(e) => e,
        Err(e) => {
            debug!(error = %e, "hook event is not JSON");
            return None;
        }
    };
    if !WRITE_TOOLS.contains(&event.tool_name.as_str()) {
        return None;
    }
    let file = event.tool_input.file_path;
    if file.is_empty() || !kind.wants(&file) {
        return None;
    }
    let path = Path::new(&file);
    if kind == ArtifactKind::Ai {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !name.contains("llms") && !name.contains("robots") {
            return None;
        }
    }
    if !path.is_file() {
        return None;
    }
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            debug!(file, error = %e, "hook skipped unreadable file");
            return None;
        }
    };
    if kind == ArtifactKind::Schema {
        let text = String::from_utf8_lossy(&bytes);
        if !text.contains("application/ld+json") && !text.contains("@context") {
            return None;
        }
    }
    Some(validate_source(kind, &file, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn event(tool: &str, path: &Path) -> String {
        json!({"tool_name": tool, "tool_input": {"file_path": path}}).to_string()
    }

    #[test]
    fn skips_reads_and_unrelated_files() {
        let td = tempdir().unwrap();
        let llms = td.path().join("llms.txt");
        std::fs::write(&llms, "Just some text").unwrap();
        assert!(handle(ArtifactKind::Ai, &event("Read", &llms)).is_none());
        assert!(handle(ArtifactKind::Sitemap, &event("Write", &llms)).is_none());
        assert!(handle(ArtifactKind::Ai, "not json").is_none());
        assert!(handle(ArtifactKind::Ai, &event("Edit", &td.path().join("robots.txt"))).is_none());
    }

    #[test]
    fn validates_written_llms_txt() {
        let td = tempdir().unwrap();
        let llms = td.path().join("llms.txt");
        std::fs::write(&llms, "Just some text").unwrap();
        let r = handle(ArtifactKind::Ai, &event("Write", &llms)).unwrap();
        let codes = r.codes();
        assert!(codes.contains(&"AI003"));
        assert!(codes.contains(&"AI004"));
        assert!(codes.contains(&"AI007"));
        assert!(!r.passed);
    }

    #[test]
    fn schema_hook_needs_json_ld() {
        let td = tempdir().unwrap();
        let page = td.path().join("BaseHead.astro");
        std::fs::write(&page, "<html><head><title>x</title></head></html>").unwrap();
        assert!(handle(ArtifactKind::Schema, &event("Edit", &page)).is_none());
        std::fs::write(
            &page,
            r#"<script type="application/ld+json">{"@type":"Person"}</script>"#,
        )
        .unwrap();
        let r = handle(ArtifactKind::Schema, &event("Edit", &page)).unwrap();
        assert!(r.codes().contains(&"SCHEMA002"));
    }
}
