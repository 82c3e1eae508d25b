//! Environment-level errors.
//!
//! Parser failures never surface here; they become findings. Everything in
//! this enum is fatal for the invocation and is rendered by the binary as a
//! code, a message and a fix instruction.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeoError {
    #[error("no source logo found (searched: {})", searched.join(", "))]
    MissingSource { searched: Vec<String> },

    #[error("unsupported source image '{}': only raster formats can be resized", .0.display())]
    UnsupportedSource(PathBuf),

    #[error("invalid brand color '{0}': expected #RGB or #RRGGBB")]
    InvalidColor(String),

    #[error("lighthouse must run against localhost, got '{0}'")]
    RemoteUrl(String),

    #[error("invalid url '{0}'")]
    InvalidUrl(String),

    #[error("server not reachable at {url}: {reason}")]
    ServerUnreachable { url: String, reason: String },

    #[error("lighthouse did not finish within {secs}s")]
    Timeout { secs: u64 },

    #[error("lighthouse not found: neither `lighthouse` nor `npx` is on PATH")]
    AuditToolMissing,

    #[error("lighthouse failed: {0}")]
    AuditFailed(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, SeoError>;

impl SeoError {
    /// Stable identifier printed next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            SeoError::MissingSource { .. } => "ASSET_SRC",
            SeoError::UnsupportedSource(_) => "ASSET_FMT",
            SeoError::InvalidColor(_) => "ASSET_COLOR",
            SeoError::RemoteUrl(_) => "LH_REMOTE",
            SeoError::InvalidUrl(_) => "LH_URL",
            SeoError::ServerUnreachable { .. } => "LH_CONN",
            SeoError::Timeout { .. } => "LH_TIMEOUT",
            SeoError::AuditToolMissing => "LH_TOOL",
            SeoError::AuditFailed(_) => "LH_FAIL",
            SeoError::Config(_) => "CONFIG",
            SeoError::Io(_) => "IO",
            SeoError::Json(_) => "JSON",
            SeoError::Image(_) => "IMAGE",
        }
    }

    /// Concrete instruction for the caller; nothing is retried automatically.
    pub fn fix(&self) -> String {
        match self {
            SeoError::MissingSource { .. } => {
                "Pass --logo <path> or add public/logo.png to the project.".into()
            }
            SeoError::UnsupportedSource(_) => {
                "Export the logo as PNG (512x512 or larger) and pass it with --logo.".into()
            }
            SeoError::InvalidColor(_) => "Use a hex color such as #3B82F6.".into(),
            SeoError::RemoteUrl(_) => {
                "Use http://localhost:3000 or http://localhost:4321 and start your dev server first (npm run dev)."
                    .into()
            }
            SeoError::InvalidUrl(_) => "Pass an absolute URL such as http://localhost:3000.".into(),
            SeoError::ServerUnreachable { url, .. } => format!(
                "Start your dev server before running validation (npm run dev). Expected URL: {url}"
            ),
            SeoError::Timeout { .. } => {
                "Check that the page finishes loading, then re-run (raise --timeout for slow builds)."
                    .into()
            }
            SeoError::AuditToolMissing => "Install Lighthouse: npm install -g lighthouse".into(),
            SeoError::AuditFailed(_) => {
                "Set CHROME_PATH to a local Chrome/Chromium binary and re-run.".into()
            }
            SeoError::Config(_) => "Fix seolint.toml (or seolint.yaml) and re-run.".into(),
            SeoError::Io(_) => "Check that the path exists and is writable.".into(),
            SeoError::Json(_) => "Check the JSON input for syntax errors.".into(),
            SeoError::Image(_) => "Re-export the source image; it could not be decoded or encoded.".into(),
        }
    }
}
