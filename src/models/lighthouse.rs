//! Lighthouse report schema persisted under the reports directory.

use super::Finding;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Category scores, each 0-100.
pub struct Scores {
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub seo: u8,
}

impl Scores {
    /// `(category id, score)` in Lighthouse's category order.
    pub fn entries(&self) -> [(&'static str, u8); 4] {
        [
            ("performance", self.performance),
            ("accessibility", self.accessibility),
            ("best-practices", self.best_practices),
            ("seo", self.seo),
        ]
    }

    pub fn all_at_least(&self, target: u8) -> bool {
        self.entries().iter().all(|(_, s)| *s >= target)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreWebVitals {
    /// Largest Contentful Paint, milliseconds.
    pub lcp_ms: Option<f64>,
    /// Cumulative Layout Shift, unitless.
    pub cls: Option<f64>,
    /// Interaction to Next Paint, milliseconds (needs user interaction; often absent in lab runs).
    pub inp_ms: Option<f64>,
    /// Max potential First Input Delay, milliseconds.
    pub fid_ms: Option<f64>,
    pub tbt_ms: Option<f64>,
    pub fcp_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseReport {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub target: u8,
    pub scores: Scores,
    pub core_web_vitals: CoreWebVitals,
    pub issues: Vec<Finding>,
    /// Failing audits before truncation to the digest.
    pub issue_count: usize,
    pub passed: bool,
}
