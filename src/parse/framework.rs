//! Front-end framework detection for component-based `<head>` declarations.
//!
//! Astro, Next.js, Nuxt and friends often set the title or Open Graph tags
//! through props or metadata objects rather than literal tags. The head
//! rules consult `declares` before reporting a tag as missing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Astro,
    NextJs,
    TanStack,
    Nuxt,
    SvelteKit,
    Vite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadField {
    Title,
    Description,
    Canonical,
    OpenGraph,
    Twitter,
}

const FILE_PATTERNS: &[(Framework, &[&str])] = &[
    (Framework::Astro, &[".astro"]),
    (
        Framework::NextJs,
        &["_app.tsx", "_app.jsx", "layout.tsx", "layout.jsx", "page.tsx", "page.jsx"],
    ),
    (Framework::TanStack, &["__root.tsx", "root.tsx", "routetree.gen.ts"]),
    (Framework::Nuxt, &[".vue", "nuxt.config"]),
    (Framework::SvelteKit, &[".svelte", "svelte.config"]),
    (Framework::Vite, &[".tsx", ".jsx"]),
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

static CONTENT_PATTERNS: LazyLock<Vec<(Framework, Vec<Regex>)>> = LazyLock::new(|| {
    vec![
        (Framework::Astro, compile(&[r"^---[\s\S]*?\n---", r"Astro\.props", r"<slot\s*/?>"])),
        (
            Framework::NextJs,
            compile(&[r"next/head", r"next/image", r"getServerSideProps", r"getStaticProps", r"metadata\s*="]),
        ),
        (
            Framework::TanStack,
            compile(&[r"createFileRoute", r"createRootRoute", r"@tanstack/react-router"]),
        ),
        (Framework::Nuxt, compile(&[r"useHead\(", r"useSeoMeta\(", r"defineNuxtConfig"])),
        (Framework::SvelteKit, compile(&[r"<svelte:head>", r"\$app/"])),
        (Framework::Vite, compile(&[r"react-helmet", r"@vitejs/plugin-react"])),
    ]
});

type DeclTable = Vec<(Framework, HeadField, Vec<Regex>)>;

static DECLARATIONS: LazyLock<DeclTable> = LazyLock::new(|| {
    use Framework::*;
    use HeadField::*;
    let ci = |ps: &[&str]| -> Vec<Regex> {
        ps.iter()
            .filter_map(|p| Regex::new(&format!("(?is){p}")).ok())
            .collect()
    };
    vec![
        (Astro, Title, ci(&[r#"title\s*[=:]\s*[{"'`]"#, r"<title\s+set:html"])),
        (NextJs, Title, ci(&[r"metadata\s*[=:][^}]*title", r"generateMetadata"])),
        (TanStack, Title, ci(&[r"createRootRoute[^}]*head[^}]*title"])),
        (Nuxt, Title, ci(&[r"useHead\([^)]*title", r"useSeoMeta\([^)]*title"])),
        (SvelteKit, Title, ci(&[r"<svelte:head>[^<]*<title"])),
        (Vite, Title, ci(&[r"Helmet[^>]*>[^<]*title", r"<title>"])),
        (Astro, Description, ci(&[r#"description\s*[=:]\s*[{"'`]"#])),
        (NextJs, Description, ci(&[r"metadata\s*[=:][^}]*description", r"generateMetadata"])),
        (TanStack, Description, ci(&[r"createRootRoute[^}]*head[^}]*meta[^}]*description"])),
        (Nuxt, Description, ci(&[r"useHead\([^)]*description", r"useSeoMeta\([^)]*description"])),
        (Astro, Canonical, ci(&[r"canonical\s*[=:]"])),
        (NextJs, Canonical, ci(&[r"alternates\s*[=:][^}]*canonical", r"metadataBase"])),
        (Nuxt, Canonical, ci(&[r"useHead\([^)]*link[^)]*canonical"])),
        (Astro, OpenGraph, ci(&[r"og\s*[=:]\s*\{", r"openGraph\s*[=:]"])),
        (NextJs, OpenGraph, ci(&[r"openGraph\s*[=:]"])),
        (Nuxt, OpenGraph, ci(&[r"useSeoMeta\([^)]*og"])),
        (Astro, Twitter, ci(&[r"twitter\s*[=:]\s*\{"])),
        (NextJs, Twitter, ci(&[r"twitter\s*[=:]"])),
        (Nuxt, Twitter, ci(&[r"useSeoMeta\([^)]*twitter"])),
    ]
});

/// Dependency names that identify a framework, checked in order.
const PACKAGE_DEPENDENCIES: &[(Framework, &[&str])] = &[
    (Framework::Astro, &["astro"]),
    (Framework::NextJs, &["next"]),
    (Framework::TanStack, &["@tanstack/react-router", "@tanstack/start"]),
    (Framework::Nuxt, &["nuxt"]),
    (Framework::SvelteKit, &["@sveltejs/kit"]),
    (Framework::Vite, &["vite"]),
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, Json>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, Json>,
}

/// Detect the framework from the file path, then from content, then from
/// the nearest `package.json`; defaults to Vite.
pub fn detect(path: &str, content: &str) -> Framework {
    let lower = path.to_lowercase();
    for (fw, pats) in FILE_PATTERNS {
        if pats.iter().any(|p| lower.contains(p)) {
            return *fw;
        }
    }
    for (fw, pats) in CONTENT_PATTERNS.iter() {
        if pats.iter().any(|re| re.is_match(content)) {
            return *fw;
        }
    }
    detect_from_package_json(Path::new(path)).unwrap_or(Framework::Vite)
}

/// Walk up from `file` to the nearest `package.json` (stopping at a `.git`
/// directory) and map its dependencies to a framework.
pub fn detect_from_package_json(file: &Path) -> Option<Framework> {
    let mut dir = file.parent();
    while let Some(d) = dir {
        let manifest = d.join("package.json");
        if manifest.is_file() {
            let text = std::fs::read_to_string(&manifest).ok()?;
            let pkg: PackageJson = serde_json::from_str(&text).ok()?;
            let found = PACKAGE_DEPENDENCIES.iter().find_map(|(fw, names)| {
                names
                    .iter()
                    .any(|n| pkg.dependencies.contains_key(*n) || pkg.dev_dependencies.contains_key(*n))
                    .then_some(*fw)
            });
            debug!(manifest = %manifest.display(), framework = ?found, "framework from package.json");
            return found;
        }
        if d.join(".git").exists() {
            return None;
        }
        dir = d.parent();
    }
    None
}

/// Whether `content` declares `field` the way `fw` components usually do.
pub fn declares(fw: Framework, field: HeadField, content: &str) -> bool {
    DECLARATIONS
        .iter()
        .filter(|(f, h, _)| *f == fw && *h == field)
        .any(|(_, _, pats)| pats.iter().any(|re| re.is_match(content)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_wins_over_content() {
        assert_eq!(detect("src/layouts/Base.astro", ""), Framework::Astro);
        assert_eq!(detect("app/layout.tsx", "useHead("), Framework::NextJs);
        assert_eq!(detect("pages/index.vue", ""), Framework::Nuxt);
    }

    #[test]
    fn content_fallback_and_default() {
        assert_eq!(detect("x.html", "import Head from 'next/head'"), Framework::NextJs);
        assert_eq!(detect("index.html", "<title>Home</title>"), Framework::Vite);
    }

    fn project(package_json: Option<&str>) -> tempfile::TempDir {
        let td = tempfile::tempdir().unwrap();
        std::fs::create_dir(td.path().join(".git")).unwrap();
        std::fs::create_dir_all(td.path().join("app/blog")).unwrap();
        if let Some(pkg) = package_json {
            std::fs::write(td.path().join("package.json"), pkg).unwrap();
        }
        td
    }

    #[test]
    fn package_json_decides_inconclusive_files() {
        let td = project(Some(r#"{"dependencies":{"react":"18","next":"14.2.0"}}"#));
        let page = td.path().join("app/blog/page.js");
        let page = page.to_str().unwrap();
        assert_eq!(detect(page, "export default function Page() { return null }"), Framework::NextJs);
        // path and content still come first
        assert_eq!(detect(page, "useSeoMeta({ title })"), Framework::Nuxt);
    }

    #[test]
    fn dev_dependencies_count() {
        let td = project(Some(r#"{"devDependencies":{"@sveltejs/kit":"2"}}"#));
        assert_eq!(
            detect_from_package_json(&td.path().join("app/blog/x.js")),
            Some(Framework::SvelteKit)
        );
    }

    #[test]
    fn missing_or_broken_package_json_defaults_to_vite() {
        let td = project(None);
        let page = td.path().join("app/blog/page.js");
        assert_eq!(detect_from_package_json(&page), None);
        assert_eq!(detect(page.to_str().unwrap(), ""), Framework::Vite);

        let td = project(Some("{ not json"));
        assert_eq!(detect_from_package_json(&td.path().join("app/page.js")), None);
    }

    #[test]
    fn astro_props_declare_title_and_og() {
        let src = "---\nconst { title } = Astro.props;\n---\n<BaseHead title={title} og={{ image }} />";
        assert!(declares(Framework::Astro, HeadField::Title, src));
        assert!(declares(Framework::Astro, HeadField::OpenGraph, src));
        assert!(!declares(Framework::Astro, HeadField::Twitter, src));
    }

    #[test]
    fn vite_declares_nothing_but_title() {
        assert!(!declares(Framework::Vite, HeadField::Description, "<title>x</title>"));
        assert!(!declares(Framework::Vite, HeadField::OpenGraph, "og = {}"));
    }
}
