use serde::{Deserialize, Serialize};

use super::super::domain::Severity;

/// A published edition of the fire code, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireCodeDef {
    pub name: String,
    pub code: String,
    pub version: String,
    pub rules: Vec<FireCodeRule>,
}

/// A single fire-code rule. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireCodeRule {
    pub id: String,
    pub category: String,
    pub sub_category: String,
    pub rule_number: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub violations: Vec<String>,
    pub severity: Severity,
    /// Building use classifications the rule applies to.
    pub building_types: Vec<String>,
    #[serde(default)]
    pub applicable_areas: Vec<String>,
}

impl FireCodeRule {
    pub fn applies_to(&self, building_type: &str) -> bool {
        self.building_types
            .iter()
            .any(|candidate| candidate == building_type)
    }
}
