//! CLI argument parsing via `clap`.

use crate::checks::ArtifactKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "seolint",
    version,
    about = "Validate SEO artifacts, generate site icons, and gate Lighthouse scores",
    long_about = "seolint — validate HTML heads, JSON-LD, llms.txt/robots.txt, sitemaps and templates against fixed SEO rule tables, generate the favicon/app-icon matrix from one logo, and run Lighthouse against a local dev server.\n\nConfiguration precedence: CLI > seolint.toml > defaults.",
    after_help = "Examples:\n  seolint meta src/layouts/BaseLayout.astro\n  seolint schema dist/index.html --json\n  seolint ai public/\n  seolint assets generate --logo public/logo.png --color \"#3B82F6\" --name Acme\n  seolint lighthouse --url http://localhost:4321 --target 90",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(long, global = true, action = clap::ArgAction::SetTrue, help = "Debug logging on stderr (RUST_LOG also works)")]
    pub verbose: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Debug, Clone, Default)]
/// Flags shared by every command that prints a report.
pub struct Common {
    #[arg(long, help = "Repository root used for config discovery (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Print the structured JSON report instead of text")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
/// Files validated independently, reported in the order given.
pub struct FileArgs {
    #[command(flatten)]
    pub common: Common,
    #[arg(required = true, help = "Files to validate")]
    pub files: Vec<PathBuf>,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current seolint version.")]
    Version,
    /// Validate HTML head tags
    #[command(
        about = "Validate meta tags",
        long_about = "Check title, description, canonical, viewport, Open Graph, Twitter and robots tags. Framework head components (Astro, Next.js, Nuxt, SvelteKit, TanStack) count as declarations.",
        after_help = "Examples:\n  seolint meta index.html\n  seolint meta src/layouts/BaseLayout.astro --json"
    )]
    Meta(FileArgs),
    /// Validate JSON-LD structured data
    #[command(
        about = "Validate JSON-LD",
        long_about = "Check every <script type=\"application/ld+json\"> block (or a standalone JSON file) for @context, @type, required properties and absolute URLs."
    )]
    Schema(FileArgs),
    /// Validate llms.txt / robots.txt
    #[command(
        about = "Validate llms.txt and robots.txt",
        long_about = "Check llms.txt structure and robots.txt access for AI crawlers. A directory argument is checked for both files.",
        after_help = "Examples:\n  seolint ai public/\n  seolint ai public/robots.txt"
    )]
    Ai(FileArgs),
    /// Validate templates and CSS for Core Web Vitals issues
    #[command(
        about = "Validate performance patterns",
        long_about = "Check images, fonts, scripts and theme-color in templates and CSS."
    )]
    Perf(FileArgs),
    /// Validate sitemap.xml
    #[command(about = "Validate sitemap.xml")]
    Sitemap(FileArgs),
    /// Generate or check site assets
    Assets {
        #[command(subcommand)]
        cmd: AssetsCmd,
    },
    /// Run Lighthouse against a local server
    #[command(
        about = "Run a Lighthouse audit",
        long_about = "Audit a localhost URL once with headless Chrome, compare the four category scores with --target, and save a timestamped JSON report. Non-local hosts are refused.",
        after_help = "Examples:\n  seolint lighthouse --url http://localhost:3000\n  seolint lighthouse --url http://localhost:4321 --target 90 --no-save --json"
    )]
    Lighthouse {
        #[command(flatten)]
        common: Common,
        #[arg(long, help = "URL to audit; must be localhost (default: http://localhost:3000)")]
        url: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100), help = "Minimum score per category, 0-100 (default: 100)")]
        target: Option<u8>,
        #[arg(long, help = "Seconds before the browser session is killed (default: 120)")]
        timeout: Option<u64>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Do not write the report file")]
        no_save: bool,
    },
    /// Editor hook: validate the file named in a post-tool event on stdin
    #[command(
        about = "Run as an editor hook",
        long_about = "Read a post-tool event ({\"tool_name\", \"tool_input\": {\"file_path\"}}) from stdin, validate the file when relevant, and print a hook response. Always exits 0."
    )]
    Hook {
        #[arg(value_enum, help = "Validator to run")]
        kind: ArtifactKind,
    },
}

#[derive(Subcommand)]
/// Subcommands for `seolint assets`
pub enum AssetsCmd {
    /// Generate the icon matrix, manifest and browserconfig
    #[command(
        about = "Generate assets",
        long_about = "Render favicons, touch icons, Android/maskable icons, MS tiles and social images from one logo, plus site.webmanifest and browserconfig.xml. Without --logo, public/logo.*, src/assets/logo.*, public/brand.* and public/icon.* are searched."
    )]
    Generate {
        #[command(flatten)]
        common: Common,
        #[arg(long, help = "Source logo (raster)")]
        logo: Option<PathBuf>,
        #[arg(long, help = "Brand color as #RGB or #RRGGBB (default: #3B82F6)")]
        color: Option<String>,
        #[arg(long, help = "Site name for the manifest (default: Site)")]
        name: Option<String>,
        #[arg(long, help = "Output directory, the root of public/ (default: public)")]
        output: Option<PathBuf>,
    },
    /// Check a public directory for required assets
    #[command(about = "Check assets", long_about = "Verify required and recommended assets, PNG sizes and the web manifest.")]
    Check {
        #[command(flatten)]
        common: Common,
        #[arg(long, help = "Directory to check (default: first of public/, static/, dist/)")]
        dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_lighthouse_flags() {
        let cli = Cli::try_parse_from([
            "seolint", "lighthouse", "--url", "http://localhost:4321", "--target", "90", "--no-save", "--json",
        ])
        .unwrap();
        match cli.cmd {
            Commands::Lighthouse { common, url, target, no_save, .. } => {
                assert!(common.json);
                assert_eq!(url.as_deref(), Some("http://localhost:4321"));
                assert_eq!(target, Some(90));
                assert!(no_save);
            }
            _ => panic!("expected lighthouse"),
        }
        assert!(Cli::try_parse_from(["seolint", "lighthouse", "--target", "101"]).is_err());
    }

    #[test]
    fn validators_require_files() {
        assert!(Cli::try_parse_from(["seolint", "meta"]).is_err());
        let cli = Cli::try_parse_from(["seolint", "--verbose", "meta", "a.html", "b.html"]).unwrap();
        assert!(cli.verbose);
        match cli.cmd {
            Commands::Meta(args) => assert_eq!(args.files.len(), 2),
            _ => panic!("expected meta"),
        }
    }

    #[test]
    fn hook_kind_is_a_value_enum() {
        let cli = Cli::try_parse_from(["seolint", "hook", "sitemap"]).unwrap();
        assert!(matches!(cli.cmd, Commands::Hook { kind: ArtifactKind::Sitemap }));
    }
}
