//! seolint CLI binary entry point.
//! Resolves configuration, delegates to the library and maps outcomes to
//! exit codes: 0 when everything passed, 1 otherwise (clap exits 2 on bad
//! arguments).

use clap::Parser;
use seolint::checks::{self, ArtifactKind};
use seolint::cli::{AssetsCmd, Cli, Commands, Common, FileArgs};
use seolint::config::{self, Effective, Overrides};
use seolint::lighthouse::{self, LighthouseCli, RunOptions};
use seolint::{generate, hook, output, utils};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    // RUST_LOG wins over --verbose when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let code = match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            0
        }
        Commands::Meta(args) => validate(ArtifactKind::Meta, args),
        Commands::Schema(args) => validate(ArtifactKind::Schema, args),
        Commands::Ai(args) => validate(ArtifactKind::Ai, args),
        Commands::Perf(args) => validate(ArtifactKind::Perf, args),
        Commands::Sitemap(args) => validate(ArtifactKind::Sitemap, args),
        Commands::Assets { cmd } => match cmd {
            AssetsCmd::Generate {
                common,
                logo,
                color,
                name,
                output,
            } => generate_assets(Overrides {
                logo,
                color,
                name,
                assets_output: output,
                ..overrides(&common)
            }),
            AssetsCmd::Check { common, dir } => check_assets(&common, dir.as_deref()),
        },
        Commands::Lighthouse {
            common,
            url,
            target,
            timeout,
            no_save,
        } => run_lighthouse(Overrides {
            url,
            target,
            timeout_secs: timeout,
            no_save,
            chrome_path: std::env::var_os("CHROME_PATH").map(PathBuf::from),
            ..overrides(&common)
        }),
        Commands::Hook { kind } => run_hook(kind),
    };
    std::process::exit(code);
}

fn overrides(common: &Common) -> Overrides {
    Overrides {
        repo_root: common.repo_root.clone(),
        json: common.json,
        ..Overrides::default()
    }
}

/// Resolve config or print the error; `note_missing` adds the defaults note.
fn effective(o: &Overrides, note_missing: bool) -> Option<Effective> {
    match config::resolve_effective(o) {
        Ok(eff) => {
            if note_missing && eff.config_file.is_none() && eff.output != "json" {
                eprintln!(
                    "{} {}",
                    utils::note_prefix(),
                    "No seolint.toml found; using defaults."
                );
            }
            Some(eff)
        }
        Err(e) => {
            output::print_error(&e, if o.json { "json" } else { "human" });
            None
        }
    }
}

fn validate(kind: ArtifactKind, args: FileArgs) -> i32 {
    let Some(eff) = effective(&overrides(&args.common), false) else {
        return 1;
    };
    match checks::validate_paths(kind, Path::new("."), &args.files) {
        Ok(reports) => {
            output::print_reports(&reports, &eff.output);
            if reports.iter().all(|r| r.passed) {
                0
            } else {
                1
            }
        }
        Err(e) => {
            output::print_error(&e, &eff.output);
            1
        }
    }
}

fn check_assets(common: &Common, dir: Option<&Path>) -> i32 {
    let Some(eff) = effective(&overrides(common), false) else {
        return 1;
    };
    let report = checks::check_assets(&eff.repo_root, dir);
    output::print_reports(std::slice::from_ref(&report), &eff.output);
    if report.passed {
        0
    } else {
        1
    }
}

fn generate_assets(o: Overrides) -> i32 {
    let Some(eff) = effective(&o, true) else {
        return 1;
    };
    if eff.output != "json" && !generate::is_public_root(&eff.assets_output) {
        eprintln!(
            "{} Output directory is '{}'. Browsers request /favicon.ico and /apple-touch-icon.png from the site root; use --output public.",
            utils::note_prefix(),
            eff.assets_output.display()
        );
    }
    match generate::generate(
        &eff.repo_root,
        eff.logo.as_deref(),
        &eff.brand_color,
        &eff.site_name,
        &eff.assets_output,
    ) {
        Ok(manifest) => {
            output::print_assets(&manifest, &eff.assets_output, &eff.output);
            0
        }
        Err(e) => {
            output::print_error(&e, &eff.output);
            1
        }
    }
}

fn run_lighthouse(o: Overrides) -> i32 {
    let Some(eff) = effective(&o, true) else {
        return 1;
    };
    if eff.output != "json" {
        eprintln!(
            "{} Auditing {} (target {}, timeout {}s)",
            utils::info_prefix(),
            eff.url,
            eff.target,
            eff.timeout_secs
        );
    }
    let opts = RunOptions {
        target: eff.target,
        timeout: Duration::from_secs(eff.timeout_secs),
        reports_dir: eff.reports_dir.clone(),
    };
    let driver = LighthouseCli {
        binary: eff.lighthouse_bin.clone(),
        chrome_path: eff.chrome_path.clone(),
    };
    match lighthouse::run(&eff.url, &opts, &driver) {
        Ok((report, saved)) => {
            output::print_lighthouse(&report, saved.as_deref(), &eff.output);
            if report.passed {
                0
            } else {
                1
            }
        }
        Err(e) => {
            output::print_error(&e, &eff.output);
            1
        }
    }
}

fn run_hook(kind: ArtifactKind) -> i32 {
    let mut event = String::new();
    let report = match std::io::stdin().read_to_string(&mut event) {
        Ok(_) => hook::handle(kind, &event),
        Err(e) => {
            tracing::debug!(error = %e, "hook stdin unreadable");
            None
        }
    };
    println!("{}", output::compose_hook_response(report.as_ref()));
    0
}
