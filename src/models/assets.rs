//! Asset generator outputs and the web app manifest schema.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One written file; text outputs carry no dimensions.
pub struct AssetOutput {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Everything one generator run wrote, keyed by file name.
pub struct AssetManifest {
    pub source_logo: String,
    pub brand_color: String,
    pub outputs: BTreeMap<String, AssetOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// `site.webmanifest` per the W3C Web App Manifest fields we emit.
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub start_url: String,
    pub scope: String,
    pub display: String,
    pub orientation: String,
    pub lang: String,
    pub theme_color: String,
    pub background_color: String,
    pub icons: Vec<ManifestIcon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime: String,
    pub purpose: String,
}
