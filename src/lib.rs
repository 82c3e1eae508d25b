//! seolint core library.
//!
//! This crate exposes programmatic APIs for validating static SEO artifacts,
//! generating site icons, and gating Lighthouse scores on a local server.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `parse`: Artifact parsers (HTML head, JSON-LD, llms.txt, robots.txt, sitemap).
//! - `rules`: Declarative rule specs and the generic evaluator.
//! - `checks`: Rule tables per artifact kind and the file-level driver.
//! - `generate`: Icon matrix, web manifest and browserconfig generator.
//! - `lighthouse`: Localhost guard, reachability check, audit driver and report persistence.
//! - `hook`: Editor post-tool hook adapter.
//! - `models`: Findings, reports, Lighthouse and asset data models.
//! - `output`: Human/JSON printers.
//! - `error`: Environment-level error type.
//! - `utils`: Supporting helpers.
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod hook;
pub mod lighthouse;
pub mod models;
pub mod output;
pub mod parse;
pub mod rules;
pub mod utils;
