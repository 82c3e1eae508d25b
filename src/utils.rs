//! Small helpers shared by the binary and the library.

use owo_colors::OwoColorize;
use std::path::Path;

fn colored() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// `note:` tag for advisory stderr messages.
pub fn note_prefix() -> String {
    if colored() {
        "note:".yellow().bold().to_string()
    } else {
        "note:".to_string()
    }
}

/// `info:` tag for progress messages.
pub fn info_prefix() -> String {
    if colored() {
        "info:".cyan().bold().to_string()
    } else {
        "info:".to_string()
    }
}

/// Render `p` relative to `root` when possible, with forward slashes.
pub fn display_path(root: &Path, p: &Path) -> String {
    let rel = match pathdiff::diff_paths(p, root) {
        Some(r) if !r.as_os_str().is_empty() && !r.starts_with("..") => r,
        _ => p.to_path_buf(),
    };
    rel.to_string_lossy().replace('\\', "/")
}
