//! ASSET rules: the post-hoc check of a generated public directory.

use crate::models::Severity::{Error, Warning};
use crate::rules::{fires, Occurrence, RuleSpec};
use serde_json::Value as Json;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directories searched, in order, when no `--dir` is given.
pub const PUBLIC_DIRS: &[&str] = &["public", "static", "dist"];

pub const MANIFEST: &str = "site.webmanifest";

/// File name and expected PNG size; `None` skips the size check.
pub type AssetEntry = (&'static str, Option<(u32, u32)>);

pub const REQUIRED_ASSETS: &[AssetEntry] = &[
    ("favicon.ico", None),
    ("favicon-16x16.png", Some((16, 16))),
    ("favicon-32x32.png", Some((32, 32))),
    ("apple-touch-icon.png", Some((180, 180))),
    ("android-chrome-192x192.png", Some((192, 192))),
    ("android-chrome-512x512.png", Some((512, 512))),
    ("og-image.png", Some((1200, 630))),
];

pub const RECOMMENDED_ASSETS: &[AssetEntry] = &[
    ("favicon.svg", None),
    ("favicon-96x96.png", Some((96, 96))),
    ("apple-touch-icon-152x152.png", Some((152, 152))),
    ("apple-touch-icon-120x120.png", Some((120, 120))),
    ("maskable-icon-512x512.png", Some((512, 512))),
    ("mstile-70x70.png", Some((70, 70))),
    ("mstile-150x150.png", Some((150, 150))),
    ("mstile-310x310.png", Some((310, 310))),
    ("mstile-310x150.png", Some((310, 150))),
    ("twitter-image.png", Some((1200, 600))),
    (MANIFEST, None),
    ("browserconfig.xml", None),
];

pub const MANIFEST_REQUIRED: &[&str] = &[
    "name",
    "short_name",
    "description",
    "start_url",
    "display",
    "theme_color",
    "background_color",
    "icons",
];

pub const MANIFEST_RECOMMENDED: &[&str] = &["scope", "lang", "orientation"];

/// What the check pass found on disk.
#[derive(Debug, Clone, Default)]
pub struct AssetsDir {
    pub dir: Option<PathBuf>,
    pub present: BTreeSet<String>,
    pub dimensions: BTreeMap<String, (u32, u32)>,
    /// Parsed `site.webmanifest`, or the parse error.
    pub manifest: Option<Result<Json, String>>,
}

/// First of `public`, `static`, `dist` under `root`.
pub fn find_public_dir(root: &Path) -> Option<PathBuf> {
    PUBLIC_DIRS
        .iter()
        .map(|d| root.join(d))
        .find(|p| p.is_dir())
}

/// Inspect `dir` (when there is one) for every tabled asset.
pub fn scan(dir: Option<&Path>) -> AssetsDir {
    let Some(dir) = dir else {
        return AssetsDir::default();
    };
    let mut out = AssetsDir {
        dir: Some(dir.to_path_buf()),
        ..AssetsDir::default()
    };
    for (name, expected) in REQUIRED_ASSETS.iter().chain(RECOMMENDED_ASSETS) {
        let path = dir.join(name);
        if !path.is_file() {
            continue;
        }
        out.present.insert(name.to_string());
        if expected.is_some() {
            match image::image_dimensions(&path) {
                Ok(dims) => {
                    out.dimensions.insert(name.to_string(), dims);
                }
                Err(e) => debug!(file = %path.display(), error = %e, "unreadable image"),
            }
        }
    }
    if out.present.contains(MANIFEST) {
        out.manifest = Some(
            fs::read_to_string(dir.join(MANIFEST))
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str::<Json>(&s).map_err(|e| e.to_string())),
        );
    }
    out
}

fn no_public_dir(a: &AssetsDir) -> Vec<Occurrence> {
    fires(a.dir.is_none(), None)
}

fn required_missing(a: &AssetsDir, family: &str) -> Vec<Occurrence> {
    if a.dir.is_none() {
        return Vec::new();
    }
    REQUIRED_ASSETS
        .iter()
        .filter(|(name, _)| family_of(name) == family && !a.present.contains(*name))
        .map(|(name, _)| Occurrence::at(None).with("asset", name))
        .collect()
}

fn family_of(name: &str) -> &'static str {
    if name.contains("apple") {
        "apple"
    } else if name.contains("android") {
        "android"
    } else if name.contains("og-image") {
        "og"
    } else {
        "favicon"
    }
}

fn missing_favicon(a: &AssetsDir) -> Vec<Occurrence> {
    required_missing(a, "favicon")
}

fn missing_apple(a: &AssetsDir) -> Vec<Occurrence> {
    required_missing(a, "apple")
}

fn missing_android(a: &AssetsDir) -> Vec<Occurrence> {
    required_missing(a, "android")
}

fn missing_og(a: &AssetsDir) -> Vec<Occurrence> {
    required_missing(a, "og")
}

fn missing_recommended(a: &AssetsDir) -> Vec<Occurrence> {
    if a.dir.is_none() {
        return Vec::new();
    }
    RECOMMENDED_ASSETS
        .iter()
        .filter(|(name, _)| !a.present.contains(*name))
        .map(|(name, _)| Occurrence::at(None).with("asset", name))
        .collect()
}

fn wrong_dimensions(a: &AssetsDir) -> Vec<Occurrence> {
    REQUIRED_ASSETS
        .iter()
        .chain(RECOMMENDED_ASSETS)
        .filter_map(|(name, expected)| {
            let (ew, eh) = (*expected)?;
            let &(w, h) = a.dimensions.get(*name)?;
            ((w, h) != (ew, eh)).then(|| {
                Occurrence::at(None)
                    .with("asset", name)
                    .with("actual", format!("{w}x{h}"))
                    .with("expected", format!("{ew}x{eh}"))
            })
        })
        .collect()
}

fn manifest_object(a: &AssetsDir) -> Option<&serde_json::Map<String, Json>> {
    match a.manifest.as_ref()? {
        Ok(Json::Object(o)) => Some(o),
        _ => None,
    }
}

fn manifest_invalid(a: &AssetsDir) -> Vec<Occurrence> {
    match a.manifest.as_ref() {
        Some(Err(e)) => vec![Occurrence::at(None).with("error", e)],
        Some(Ok(v)) if !v.is_object() => {
            vec![Occurrence::at(None).with("error", "top-level value is not an object")]
        }
        _ => Vec::new(),
    }
}

fn fields_missing(a: &AssetsDir, fields: &[&'static str]) -> Vec<Occurrence> {
    let Some(m) = manifest_object(a) else {
        return Vec::new();
    };
    fields
        .iter()
        .filter(|f| !m.contains_key(**f))
        .map(|f| Occurrence::at(None).with("field", f))
        .collect()
}

fn manifest_required(a: &AssetsDir) -> Vec<Occurrence> {
    fields_missing(a, MANIFEST_REQUIRED)
}

fn manifest_recommended(a: &AssetsDir) -> Vec<Occurrence> {
    fields_missing(a, MANIFEST_RECOMMENDED)
}

/// Whether some icon lists `purpose`; an icon without one counts as `any`.
fn icon_purpose(a: &AssetsDir, purpose: &str) -> Vec<Occurrence> {
    let Some(Json::Array(icons)) = manifest_object(a).and_then(|m| m.get("icons")) else {
        return Vec::new();
    };
    let has = icons.iter().any(|icon| match icon.get("purpose") {
        Some(Json::String(p)) => p.split_whitespace().any(|t| t == purpose),
        None => purpose == "any",
        _ => false,
    });
    fires(!has, None)
}

fn no_any_icon(a: &AssetsDir) -> Vec<Occurrence> {
    icon_purpose(a, "any")
}

fn no_maskable_icon(a: &AssetsDir) -> Vec<Occurrence> {
    icon_purpose(a, "maskable")
}

pub static RULES: &[RuleSpec<AssetsDir>] = &[
    RuleSpec {
        code: "ASSET001",
        severity: Error,
        element: "public/",
        message: "Project must have a public, static or dist directory",
        current: Some("No public directory found"),
        expected: Some("public/ with generated assets"),
        fix: "Create public/ and run `seolint assets generate`.",
        check: no_public_dir,
    },
    RuleSpec {
        code: "ASSET002",
        severity: Error,
        element: "{asset}",
        message: "Missing required asset: {asset}",
        current: Some("File not found"),
        expected: Some("{asset}"),
        fix: "Generate {asset} with `seolint assets generate`.",
        check: missing_favicon,
    },
    RuleSpec {
        code: "ASSET003",
        severity: Error,
        element: "{asset}",
        message: "Missing required asset: {asset}",
        current: Some("File not found"),
        expected: Some("{asset}"),
        fix: "Generate {asset} with `seolint assets generate`.",
        check: missing_apple,
    },
    RuleSpec {
        code: "ASSET004",
        severity: Error,
        element: "{asset}",
        message: "Missing required asset: {asset}",
        current: Some("File not found"),
        expected: Some("{asset}"),
        fix: "Generate {asset} with `seolint assets generate`.",
        check: missing_android,
    },
    RuleSpec {
        code: "ASSET005",
        severity: Error,
        element: "{asset}",
        message: "Missing required asset: {asset}",
        current: Some("File not found"),
        expected: Some("{asset} (1200x630)"),
        fix: "Generate {asset} with `seolint assets generate`.",
        check: missing_og,
    },
    RuleSpec {
        code: "ASSET006",
        severity: Error,
        element: "site.webmanifest",
        message: "Manifest must have '{field}'",
        current: Some("Missing: {field}"),
        expected: Some("\"{field}\": ..."),
        fix: "Add '{field}' to site.webmanifest.",
        check: manifest_required,
    },
    RuleSpec {
        code: "ASSET007",
        severity: Warning,
        element: "{asset}",
        message: "Missing recommended asset: {asset}",
        current: Some("File not found"),
        expected: Some("{asset}"),
        fix: "Consider adding {asset} for complete coverage.",
        check: missing_recommended,
    },
    RuleSpec {
        code: "ASSET008",
        severity: Warning,
        element: "{asset}",
        message: "Image has wrong dimensions",
        current: Some("{actual}"),
        expected: Some("{expected}"),
        fix: "Regenerate {asset} at {expected}.",
        check: wrong_dimensions,
    },
    RuleSpec {
        code: "ASSET009",
        severity: Error,
        element: "site.webmanifest",
        message: "Manifest must be a valid JSON object",
        current: Some("Invalid JSON: {error}"),
        expected: Some("{\"name\": \"...\", ...}"),
        fix: "Fix JSON syntax in site.webmanifest.",
        check: manifest_invalid,
    },
    RuleSpec {
        code: "ASSET010",
        severity: Warning,
        element: "site.webmanifest",
        message: "Manifest should have '{field}'",
        current: Some("Missing: {field}"),
        expected: Some("\"{field}\": ..."),
        fix: "Consider adding '{field}' to site.webmanifest.",
        check: manifest_recommended,
    },
    RuleSpec {
        code: "ASSET011",
        severity: Warning,
        element: "site.webmanifest icons",
        message: "Manifest should have an icon with purpose 'any'",
        current: None,
        expected: Some("\"purpose\": \"any\""),
        fix: "Add 'purpose': 'any' to at least one icon.",
        check: no_any_icon,
    },
    RuleSpec {
        code: "ASSET012",
        severity: Warning,
        element: "site.webmanifest icons",
        message: "Manifest should have a maskable icon",
        current: None,
        expected: Some("\"purpose\": \"maskable\""),
        fix: "Add a maskable icon for Android adaptive icons.",
        check: no_maskable_icon,
    },
];
