//! Singleton workspace context records read by the enrichment handlers.
//!
//! Each lives in its own collection under a fixed document id. Any of them may
//! be absent; handlers omit the corresponding prompt section when they are.

use serde::{Deserialize, Serialize};

use crate::entities::RecordMeta;

#[cfg(feature = "typescript")]
use ts_rs::TS;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct VisionRecord {
    #[serde(default)]
    pub statement: String,
    #[serde(default)]
    pub mission: String,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl VisionRecord {
    pub const DOCUMENT_ID: &'static str = "current";
}

/// Sections of the strategic-context document, keyed by section name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct StrategicContextRecord {
    #[serde(default)]
    pub sections: std::collections::BTreeMap<String, String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl StrategicContextRecord {
    pub const DOCUMENT_ID: &'static str = "current";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CompanyContextRecord {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub target_market: String,
    #[serde(default)]
    pub business_model: String,
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl CompanyContextRecord {
    pub const DOCUMENT_ID: &'static str = "current";

    /// One-paragraph rendering for prompt context.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        if !self.company_name.is_empty() {
            out.push_str(&format!("Company: {}\n", self.company_name));
        }
        if !self.industry.is_empty() {
            out.push_str(&format!("Industry: {}\n", self.industry));
        }
        if !self.summary.is_empty() {
            out.push_str(&format!("Summary: {}\n", self.summary));
        }
        if !self.target_market.is_empty() {
            out.push_str(&format!("Target market: {}\n", self.target_market));
        }
        if !self.business_model.is_empty() {
            out.push_str(&format!("Business model: {}\n", self.business_model));
        }
        if !self.competitors.is_empty() {
            out.push_str(&format!("Competitors: {}\n", self.competitors.join(", ")));
        }
        out
    }
}
