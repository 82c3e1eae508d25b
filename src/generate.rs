//! Asset generator: one source logo in, the full icon matrix out.
//!
//! Every entry of [`SIZES`] is rendered by scaling the logo to fit a box
//! inside the target canvas (aspect ratio kept, centred) and written flat into
//! the output directory as PNG. `favicon.ico`, `site.webmanifest` and
//! `browserconfig.xml` are written alongside. Outputs depend only on the
//! inputs, so re-running overwrites files with identical bytes.

use crate::error::{Result, SeoError};
use crate::models::assets::{AssetManifest, AssetOutput, ManifestIcon, WebManifest};
use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageFormat, Rgba, RgbaImage};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

/// Canvas background of one generated image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Canvas {
    /// Transparent, logo fills the canvas.
    Transparent,
    /// Brand colour, logo fits within `fill` of each side.
    Brand { fill: f32 },
}

#[derive(Debug, Clone, Copy)]
pub struct IconSpec {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub canvas: Canvas,
}

const fn icon(name: &'static str, width: u32, height: u32) -> IconSpec {
    IconSpec {
        name,
        width,
        height,
        canvas: Canvas::Transparent,
    }
}

const fn branded(name: &'static str, width: u32, height: u32, fill: f32) -> IconSpec {
    IconSpec {
        name,
        width,
        height,
        canvas: Canvas::Brand { fill },
    }
}

pub const SIZES: &[IconSpec] = &[
    icon("favicon-16x16.png", 16, 16),
    icon("favicon-32x32.png", 32, 32),
    icon("favicon-96x96.png", 96, 96),
    icon("apple-touch-icon.png", 180, 180),
    icon("apple-touch-icon-120x120.png", 120, 120),
    icon("apple-touch-icon-152x152.png", 152, 152),
    icon("android-chrome-192x192.png", 192, 192),
    icon("android-chrome-512x512.png", 512, 512),
    branded("maskable-icon-512x512.png", 512, 512, 0.8),
    icon("mstile-70x70.png", 70, 70),
    icon("mstile-150x150.png", 150, 150),
    icon("mstile-310x310.png", 310, 310),
    icon("mstile-310x150.png", 310, 150),
    branded("og-image.png", 1200, 630, 0.6),
    branded("twitter-image.png", 1200, 600, 0.6),
];

/// Frames packed into `favicon.ico`.
const ICO_SIZES: &[u32] = &[16, 32];

/// Globs tried in order when no logo is passed explicitly.
pub const LOGO_SEARCH: &[&str] = &["public/logo.*", "src/assets/logo.*", "public/brand.*", "public/icon.*"];

/// Extensions the decoder can read.
const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "ico"];

/// Directory names browsers resolve `/favicon.ico` against.
const PUBLIC_ROOTS: &[&str] = &["public", "static", "dist"];

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("static regex"));

/// Parse `#RGB` or `#RRGGBB` into an opaque pixel.
pub fn parse_color(s: &str) -> Result<Rgba<u8>> {
    if !HEX_COLOR.is_match(s) {
        return Err(SeoError::InvalidColor(s.to_string()));
    }
    let hex = &s[1..];
    let digits: Vec<u8> = if hex.len() == 3 {
        hex.chars().flat_map(|c| [c, c]).map(|c| c as u8).collect()
    } else {
        hex.bytes().collect()
    };
    let channel = |i: usize| -> Result<u8> {
        let pair = std::str::from_utf8(&digits[i * 2..i * 2 + 2])
            .map_err(|_| SeoError::InvalidColor(s.to_string()))?;
        u8::from_str_radix(pair, 16).map_err(|_| SeoError::InvalidColor(s.to_string()))
    };
    Ok(Rgba([channel(0)?, channel(1)?, channel(2)?, 255]))
}

fn is_raster(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| RASTER_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Resolve the source logo: `explicit` first, then [`LOGO_SEARCH`] under
/// `root`. Vector-only hits fail with `UnsupportedSource`.
pub fn find_logo(root: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        if !p.is_file() {
            return Err(SeoError::MissingSource {
                searched: vec![p.display().to_string()],
            });
        }
        if !is_raster(p) {
            return Err(SeoError::UnsupportedSource(p.to_path_buf()));
        }
        return Ok(p.to_path_buf());
    }
    let mut vector: Option<PathBuf> = None;
    for pattern in LOGO_SEARCH {
        let full = format!("{}/{}", glob::Pattern::escape(&root.to_string_lossy()), pattern);
        let mut hits: Vec<PathBuf> = match glob::glob(&full) {
            Ok(paths) => paths.filter_map(|r| r.ok()).filter(|p| p.is_file()).collect(),
            Err(e) => {
                debug!(pattern, error = %e, "bad logo glob");
                continue;
            }
        };
        hits.sort();
        debug!(pattern, hits = hits.len(), "logo search");
        if let Some(hit) = hits.iter().find(|p| is_raster(p)) {
            return Ok(hit.clone());
        }
        if vector.is_none() {
            vector = hits.into_iter().next();
        }
    }
    match vector {
        Some(p) => Err(SeoError::UnsupportedSource(p)),
        None => Err(SeoError::MissingSource {
            searched: LOGO_SEARCH.iter().map(|s| s.to_string()).collect(),
        }),
    }
}

/// Whether `output` is a directory browsers serve from the site root.
/// `.` and `..` are resolved first; a directory that does not exist yet is
/// judged by its resolved parent.
pub fn is_public_root(output: &Path) -> bool {
    let resolved = fs::canonicalize(output).or_else(|_| {
        let name = output.file_name().ok_or(std::io::ErrorKind::NotFound)?;
        let parent = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::canonicalize(parent).map(|p| p.join(name))
    });
    resolved
        .as_deref()
        .unwrap_or(output)
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| PUBLIC_ROOTS.contains(&n))
}

/// Scale `logo` to fit `box_w`x`box_h`, never below one pixel.
fn fit(logo: &RgbaImage, box_w: u32, box_h: u32) -> RgbaImage {
    let (w, h) = logo.dimensions();
    let scale = f64::min(box_w as f64 / w as f64, box_h as f64 / h as f64);
    let nw = ((w as f64 * scale).round() as u32).clamp(1, box_w.max(1));
    let nh = ((h as f64 * scale).round() as u32).clamp(1, box_h.max(1));
    imageops::resize(logo, nw, nh, FilterType::Lanczos3)
}

/// Render one entry of the size table.
pub fn render(logo: &RgbaImage, spec: &IconSpec, brand: Rgba<u8>) -> RgbaImage {
    let (background, fill) = match spec.canvas {
        Canvas::Transparent => (Rgba([255, 255, 255, 0]), 1.0),
        Canvas::Brand { fill } => (brand, fill),
    };
    let box_w = ((spec.width as f32 * fill).round() as u32).max(1);
    let box_h = ((spec.height as f32 * fill).round() as u32).max(1);
    let scaled = fit(logo, box_w, box_h);
    let mut canvas = RgbaImage::from_pixel(spec.width, spec.height, background);
    let x = (spec.width - scaled.width()) / 2;
    let y = (spec.height - scaled.height()) / 2;
    imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);
    canvas
}

fn write_ico(logo: &RgbaImage, path: &Path) -> Result<()> {
    let mut frames = Vec::with_capacity(ICO_SIZES.len());
    for &size in ICO_SIZES {
        let img = render(logo, &icon("favicon.ico", size, size), Rgba([0, 0, 0, 0]));
        frames.push(IcoFrame::as_png(img.as_raw(), size, size, ExtendedColorType::Rgba8)?);
    }
    let file = fs::File::create(path)?;
    IcoEncoder::new(std::io::BufWriter::new(file)).encode_images(&frames)?;
    Ok(())
}

/// The `site.webmanifest` written for `name` and `color`.
pub fn web_manifest(name: &str, color: &str) -> WebManifest {
    let icon = |src: &str, sizes: &str, purpose: &str| ManifestIcon {
        src: src.to_string(),
        sizes: sizes.to_string(),
        mime: "image/png".to_string(),
        purpose: purpose.to_string(),
    };
    WebManifest {
        name: name.to_string(),
        short_name: name.to_string(),
        description: format!("{name} - Progressive Web App"),
        start_url: "/".to_string(),
        scope: "/".to_string(),
        display: "standalone".to_string(),
        orientation: "portrait-primary".to_string(),
        lang: "en".to_string(),
        theme_color: color.to_string(),
        background_color: "#ffffff".to_string(),
        icons: vec![
            icon("/android-chrome-192x192.png", "192x192", "any"),
            icon("/android-chrome-512x512.png", "512x512", "any"),
            icon("/maskable-icon-512x512.png", "512x512", "maskable"),
        ],
    }
}

/// `browserconfig.xml` listing the Windows tiles.
pub fn browserconfig(color: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<browserconfig>
  <msapplication>
    <tile>
      <square70x70logo src="/mstile-70x70.png"/>
      <square150x150logo src="/mstile-150x150.png"/>
      <square310x310logo src="/mstile-310x310.png"/>
      <wide310x150logo src="/mstile-310x150.png"/>
      <TileColor>{color}</TileColor>
    </tile>
  </msapplication>
</browserconfig>
"#
    )
}

/// Generate every asset into `output` and describe what was written.
///
/// The colour is validated and the logo resolved before anything touches
/// the output directory.
pub fn generate(
    root: &Path,
    logo: Option<&Path>,
    color: &str,
    name: &str,
    output: &Path,
) -> Result<AssetManifest> {
    let brand = parse_color(color)?;
    let source = find_logo(root, logo)?;
    let decoded = image::open(&source)?.to_rgba8();
    debug!(logo = %source.display(), w = decoded.width(), h = decoded.height(), "logo decoded");
    fs::create_dir_all(output)?;

    let mut outputs = BTreeMap::new();
    let mut record = |file: &str, dims: Option<(u32, u32)>| {
        outputs.insert(
            file.to_string(),
            AssetOutput {
                path: output.join(file).to_string_lossy().replace('\\', "/"),
                width: dims.map(|d| d.0),
                height: dims.map(|d| d.1),
            },
        );
    };

    for spec in SIZES {
        let img = render(&decoded, spec, brand);
        img.save_with_format(output.join(spec.name), ImageFormat::Png)?;
        debug!(file = spec.name, w = spec.width, h = spec.height, "asset written");
        record(spec.name, Some((spec.width, spec.height)));
    }

    write_ico(&decoded, &output.join("favicon.ico"))?;
    let largest = ICO_SIZES.iter().copied().max().unwrap_or(32);
    record("favicon.ico", Some((largest, largest)));

    let manifest = serde_json::to_string_pretty(&web_manifest(name, color))?;
    fs::write(output.join("site.webmanifest"), manifest + "\n")?;
    record("site.webmanifest", None);

    fs::write(output.join("browserconfig.xml"), browserconfig(color))?;
    record("browserconfig.xml", None);

    info!(count = outputs.len(), output = %output.display(), "assets generated");
    Ok(AssetManifest {
        source_logo: source.to_string_lossy().replace('\\', "/"),
        brand_color: color.to_string(),
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::check_assets;
    use tempfile::tempdir;

    fn write_logo(path: &Path, w: u32, h: u32) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbaImage::from_pixel(w, h, Rgba([200, 30, 30, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn colors() {
        assert_eq!(parse_color("#3B82F6").unwrap(), Rgba([0x3b, 0x82, 0xf6, 255]));
        assert_eq!(parse_color("#fff").unwrap(), Rgba([255, 255, 255, 255]));
        for bad in ["3B82F6", "#3B82F", "#ggg", "#3B82F6AA", ""] {
            assert_eq!(parse_color(bad).unwrap_err().code(), "ASSET_COLOR", "{bad}");
        }
    }

    #[test]
    fn generates_the_matrix_and_is_byte_identical_on_rerun() {
        let td = tempdir().unwrap();
        let root = td.path();
        write_logo(&root.join("public/logo.png"), 300, 100);
        let out = root.join("public");

        let first = generate(root, None, "#3B82F6", "Acme", &out).unwrap();
        assert_eq!(first.outputs.len(), SIZES.len() + 3);
        assert!(first.source_logo.ends_with("public/logo.png"));
        assert_eq!(first.outputs["og-image.png"].width, Some(1200));
        assert_eq!(first.outputs["site.webmanifest"].width, None);

        let snapshot: Vec<(String, Vec<u8>)> = first
            .outputs
            .keys()
            .map(|k| (k.clone(), std::fs::read(out.join(k)).unwrap()))
            .collect();
        let second = generate(root, None, "#3B82F6", "Acme", &out).unwrap();
        assert_eq!(first, second);
        for (name, bytes) in snapshot {
            assert_eq!(std::fs::read(out.join(&name)).unwrap(), bytes, "{name} changed");
        }
    }

    #[test]
    fn canvases_keep_aspect_and_background() {
        let logo = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
        let brand = Rgba([1, 2, 3, 255]);

        let fav = render(&logo, &SIZES[1], brand);
        assert_eq!(fav.dimensions(), (32, 32));
        assert_eq!(fav.get_pixel(0, 0)[3], 0);
        assert!(fav.get_pixel(16, 16)[3] > 200);

        let og = SIZES.iter().find(|s| s.name == "og-image.png").unwrap();
        let img = render(&logo, og, brand);
        assert_eq!(*img.get_pixel(0, 0), brand);
        assert_eq!(img.get_pixel(600, 315)[0], 0);
    }

    #[test]
    fn generated_directory_passes_the_check() {
        let td = tempdir().unwrap();
        write_logo(&td.path().join("logo.png"), 64, 64);
        let out = td.path().join("public");
        generate(td.path(), Some(&td.path().join("logo.png")), "#000", "Acme", &out).unwrap();
        let report = check_assets(td.path(), None);
        assert!(report.passed);
        assert_eq!(report.codes(), vec!["ASSET007"]);
        assert_eq!(report.findings[0].element, "favicon.svg");
    }

    #[test]
    fn missing_logo() {
        let td = tempdir().unwrap();
        let err = generate(td.path(), None, "#000", "Acme", &td.path().join("public")).unwrap_err();
        match err {
            SeoError::MissingSource { searched } => assert_eq!(searched.len(), LOGO_SEARCH.len()),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!td.path().join("public").exists());
    }

    #[test]
    fn vector_only_logo_is_unsupported() {
        let td = tempdir().unwrap();
        std::fs::create_dir_all(td.path().join("public")).unwrap();
        std::fs::write(td.path().join("public/logo.svg"), "<svg/>").unwrap();
        let err = find_logo(td.path(), None).unwrap_err();
        assert_eq!(err.code(), "ASSET_FMT");

        write_logo(&td.path().join("public/brand.png"), 8, 8);
        assert_eq!(find_logo(td.path(), None).unwrap(), td.path().join("public/brand.png"));
    }

    #[test]
    fn public_root_advisory() {
        assert!(is_public_root(Path::new("site/public")));
        assert!(is_public_root(Path::new("dist")));
        assert!(!is_public_root(Path::new("public/images")));

        let td = tempdir().unwrap();
        let public = td.path().join("public");
        fs::create_dir(&public).unwrap();
        fs::create_dir(public.join("icons")).unwrap();
        assert!(is_public_root(&public.join(".")));
        assert!(is_public_root(&public.join("icons/..")));
        assert!(!is_public_root(&public.join("icons")));
        assert!(!is_public_root(&public.join("new")));
        assert!(is_public_root(&td.path().join("static")));
    }
}
