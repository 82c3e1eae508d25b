//! Configuration discovery and effective settings resolution.
//!
//! seolint reads `seolint.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `lighthouse.url`: `http://localhost:3000`
//! - `lighthouse.target`: 100
//! - `lighthouse.timeout_secs`: 120
//! - `lighthouse.reports_dir`: `.seolint/reports`
//! - `lighthouse.save`: true
//! - `lighthouse.binary`: unset (PATH, then `npx`)
//! - `assets.output`: `public`, `assets.name`: `Site`, `assets.color`: `#3B82F6`
//!
//! Overrides precedence: CLI > config file > defaults. Paths from the config
//! file are relative to the repository root; paths from the CLI are taken
//! as given.

use crate::error::{Result, SeoError};
use crate::lighthouse::{DEFAULT_REPORTS_DIR, DEFAULT_TARGET, DEFAULT_TIMEOUT_SECS};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILES: &[&str] = &["seolint.toml", "seolint.yaml", "seolint.yml"];

pub const DEFAULT_URL: &str = "http://localhost:3000";
pub const DEFAULT_ASSETS_OUTPUT: &str = "public";
pub const DEFAULT_SITE_NAME: &str = "Site";
pub const DEFAULT_BRAND_COLOR: &str = "#3B82F6";

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// `[lighthouse]` section.
pub struct LighthouseCfg {
    pub url: Option<String>,
    pub target: Option<u8>,
    pub timeout_secs: Option<u64>,
    pub reports_dir: Option<String>,
    pub chrome_path: Option<String>,
    /// Path to the `lighthouse` executable.
    pub binary: Option<String>,
    pub save: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// `[assets]` section.
pub struct AssetsCfg {
    pub output: Option<String>,
    pub name: Option<String>,
    pub color: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// Root configuration loaded from `seolint.toml|yaml`.
pub struct SeoConfig {
    pub output: Option<String>,
    pub lighthouse: Option<LighthouseCfg>,
    pub assets: Option<AssetsCfg>,
}

/// Values supplied on the command line (and `CHROME_PATH`).
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub repo_root: Option<String>,
    pub json: bool,
    pub url: Option<String>,
    pub target: Option<u8>,
    pub timeout_secs: Option<u64>,
    pub no_save: bool,
    pub chrome_path: Option<PathBuf>,
    pub logo: Option<PathBuf>,
    pub color: Option<String>,
    pub name: Option<String>,
    pub assets_output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    /// Which config file was loaded, if any.
    pub config_file: Option<PathBuf>,
    pub output: String,
    pub url: String,
    pub target: u8,
    pub timeout_secs: u64,
    /// `None` when reports are not saved.
    pub reports_dir: Option<PathBuf>,
    pub chrome_path: Option<PathBuf>,
    pub lighthouse_bin: Option<PathBuf>,
    pub assets_output: PathBuf,
    pub site_name: String,
    pub brand_color: String,
    pub logo: Option<PathBuf>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `seolint.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `SeoConfig` from the first config file present under `root`.
///
/// A file that exists but does not parse is a `Config` error.
pub fn load_config(root: &Path) -> Result<Option<(SeoConfig, PathBuf)>> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        let s = fs::read_to_string(&path)?;
        let cfg: SeoConfig = if name.ends_with(".toml") {
            toml::from_str(&s).map_err(|e| SeoError::Config(format!("{name}: {e}")))?
        } else {
            serde_yaml::from_str(&s).map_err(|e| SeoError::Config(format!("{name}: {e}")))?
        };
        debug!(path = %path.display(), "config loaded");
        return Ok(Some((cfg, path)));
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides) -> Result<Effective> {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let start = fs::canonicalize(&start).unwrap_or(start);
    let repo_root = detect_repo_root(&start);
    let (cfg, config_file) = match load_config(&repo_root)? {
        Some((cfg, path)) => (cfg, Some(path)),
        None => (SeoConfig::default(), None),
    };
    let lh = cfg.lighthouse.unwrap_or_default();
    let assets = cfg.assets.unwrap_or_default();

    let output = if cli.json {
        "json".to_string()
    } else {
        cfg.output.unwrap_or_else(|| "human".to_string())
    };
    if output != "human" && output != "json" {
        return Err(SeoError::Config(format!(
            "output must be 'human' or 'json', got '{output}'"
        )));
    }

    let target = cli.target.or(lh.target).unwrap_or(DEFAULT_TARGET);
    if target > 100 {
        return Err(SeoError::Config(format!(
            "lighthouse.target must be 0-100, got {target}"
        )));
    }

    let save = !cli.no_save && lh.save.unwrap_or(true);
    let reports_dir = save.then(|| {
        repo_root.join(lh.reports_dir.as_deref().unwrap_or(DEFAULT_REPORTS_DIR))
    });

    let chrome_path = cli
        .chrome_path
        .clone()
        .or_else(|| lh.chrome_path.map(PathBuf::from));

    let lighthouse_bin = lh.binary.map(|b| repo_root.join(b));

    let assets_output = cli.assets_output.clone().unwrap_or_else(|| {
        repo_root.join(assets.output.as_deref().unwrap_or(DEFAULT_ASSETS_OUTPUT))
    });
    let logo = cli
        .logo
        .clone()
        .or_else(|| assets.logo.map(|l| repo_root.join(l)));

    Ok(Effective {
        output,
        url: cli.url.clone().or(lh.url).unwrap_or_else(|| DEFAULT_URL.to_string()),
        target,
        timeout_secs: cli
            .timeout_secs
            .or(lh.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
        reports_dir,
        chrome_path,
        lighthouse_bin,
        assets_output,
        site_name: cli
            .name
            .clone()
            .or(assets.name)
            .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
        brand_color: cli
            .color
            .clone()
            .or(assets.color)
            .unwrap_or_else(|| DEFAULT_BRAND_COLOR.to_string()),
        logo,
        config_file,
        repo_root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn at(root: &Path) -> Overrides {
        Overrides {
            repo_root: root.to_str().map(String::from),
            ..Overrides::default()
        }
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = &dir.path().canonicalize().unwrap();
        let mut f = fs::File::create(root.join("seolint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r##"
output = "json"
[lighthouse]
url = "http://localhost:4321"
target = 90
save = false
[assets]
name = "Acme"
color = "#112233"
logo = "brand/logo.png"
    "##
        )
        .unwrap();

        let nested = root.join("src/pages");
        fs::create_dir_all(&nested).unwrap();
        let eff = resolve_effective(&at(&nested)).unwrap();
        assert_eq!(&eff.repo_root, root);
        assert_eq!(eff.config_file, Some(root.join("seolint.toml")));
        assert_eq!(eff.output, "json");
        assert_eq!(eff.url, "http://localhost:4321");
        assert_eq!(eff.target, 90);
        assert_eq!(eff.reports_dir, None);
        assert_eq!(eff.site_name, "Acme");
        assert_eq!(eff.brand_color, "#112233");
        assert_eq!(eff.logo, Some(root.join("brand/logo.png")));
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = &dir.path().canonicalize().unwrap();
        fs::write(
            root.join("seolint.yaml"),
            "lighthouse:\n  timeout_secs: 30\n  chrome_path: /usr/bin/chromium\n  binary: node_modules/.bin/lighthouse\n",
        )
        .unwrap();

        let eff = resolve_effective(&at(root)).unwrap();
        assert_eq!(eff.output, "human");
        assert_eq!(eff.url, DEFAULT_URL);
        assert_eq!(eff.target, 100);
        assert_eq!(eff.timeout_secs, 30);
        assert_eq!(eff.chrome_path, Some(PathBuf::from("/usr/bin/chromium")));
        assert_eq!(eff.lighthouse_bin, Some(root.join("node_modules/.bin/lighthouse")));
        assert_eq!(eff.reports_dir, Some(root.join(".seolint/reports")));
        assert_eq!(eff.assets_output, root.join("public"));
        assert_eq!(eff.brand_color, DEFAULT_BRAND_COLOR);
    }

    #[test]
    fn test_cli_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("seolint.toml"),
            "[lighthouse]\ntarget = 90\nchrome_path = \"/opt/chrome\"\n[assets]\nname = \"Cfg\"\n",
        )
        .unwrap();
        let eff = resolve_effective(&Overrides {
            target: Some(75),
            json: true,
            no_save: true,
            chrome_path: Some(PathBuf::from("/env/chrome")),
            name: Some("Cli".into()),
            assets_output: Some(PathBuf::from("out/public")),
            ..at(root)
        })
        .unwrap();
        assert_eq!(eff.target, 75);
        assert_eq!(eff.output, "json");
        assert_eq!(eff.reports_dir, None);
        assert_eq!(eff.chrome_path, Some(PathBuf::from("/env/chrome")));
        assert_eq!(eff.site_name, "Cli");
        assert_eq!(eff.assets_output, PathBuf::from("out/public"));
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("seolint.toml"), "[lighthouse]\ntarget = 150\n").unwrap();
        assert_eq!(resolve_effective(&at(dir.path())).unwrap_err().code(), "CONFIG");

        fs::write(dir.path().join("seolint.toml"), "[lighthouse\n").unwrap();
        assert_eq!(resolve_effective(&at(dir.path())).unwrap_err().code(), "CONFIG");

        fs::write(dir.path().join("seolint.toml"), "colour = \"#fff\"\n").unwrap();
        assert_eq!(resolve_effective(&at(dir.path())).unwrap_err().code(), "CONFIG");
    }

    #[test]
    fn test_git_dir_bounds_discovery() {
        let dir = tempdir().unwrap();
        let root = &dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("web")).unwrap();
        let eff = resolve_effective(&at(&root.join("web"))).unwrap();
        assert_eq!(&eff.repo_root, root);
        assert!(eff.config_file.is_none());
    }
}
