//! `llms.txt` structure: `# Title` on line 1, a `> description` near the
//! top, and `## Section` headers.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmsTxt {
    pub title: Option<String>,
    pub description: Option<(String, usize)>,
    pub sections: Vec<(String, usize)>,
    /// Character count of the raw file.
    pub length: usize,
}

impl LlmsTxt {
    /// Section present whose header starts with `name` (case-insensitive).
    pub fn has_section(&self, name: &str) -> bool {
        let want = name.to_lowercase();
        self.sections
            .iter()
            .any(|(s, _)| s.to_lowercase().starts_with(&want))
    }
}

/// How many leading lines may hold the description.
const DESCRIPTION_WINDOW: usize = 5;

pub fn parse(source: &str) -> LlmsTxt {
    // Line numbers are relative to the file, leading blank lines included.
    let lead = source.len() - source.trim_start().len();
    let skipped = source[..lead].matches('\n').count();
    let lines: Vec<&str> = source.trim().lines().collect();

    let title = lines.first().and_then(|l| {
        let l = l.trim();
        l.strip_prefix("# ").map(|t| t.trim().to_string())
    });
    let description = lines
        .iter()
        .take(DESCRIPTION_WINDOW)
        .enumerate()
        .find_map(|(i, l)| {
            l.trim()
                .strip_prefix('>')
                .map(|d| (d.trim().to_string(), i + 1 + skipped))
        });
    let sections = lines
        .iter()
        .enumerate()
        .filter_map(|(i, l)| {
            l.trim()
                .strip_prefix("## ")
                .map(|s| (s.trim().to_string(), i + 1 + skipped))
        })
        .collect();

    LlmsTxt {
        title,
        description,
        sections,
        length: source.chars().count(),
    }
}
