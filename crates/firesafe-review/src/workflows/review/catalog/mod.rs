//! Static fire-code rule table and its lookup accessors.

mod builtin;
pub mod schema;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use schema::{FireCodeDef, FireCodeRule};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to load rule catalog from {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("invalid rule catalog: {0}")]
    Invalid(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only collection of fire-code rules, loaded once.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    code: String,
    version: String,
    rules: Vec<FireCodeRule>,
}

impl RuleCatalog {
    /// Catalog backed by the rule table compiled into the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_def(builtin::egyptian_fire_code()?)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let def: FireCodeDef = serde_json::from_str(json)?;
        Self::from_def(def)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let def: FireCodeDef = serde_json::from_str(&content).map_err(|e| CatalogError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_def(def)
    }

    fn from_def(def: FireCodeDef) -> Result<Self, CatalogError> {
        validate(&def)?;
        Ok(Self {
            code: def.code,
            version: def.version,
            rules: def.rules,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn all(&self) -> &[FireCodeRule] {
        &self.rules
    }

    /// Rules whose category matches exactly.
    pub fn by_category(&self, category: &str) -> Vec<&FireCodeRule> {
        self.rules
            .iter()
            .filter(|rule| rule.category == category)
            .collect()
    }

    /// Rules listing `building_type` among their applicable building types.
    pub fn by_building_type(&self, building_type: &str) -> Vec<&FireCodeRule> {
        self.rules
            .iter()
            .filter(|rule| rule.applies_to(building_type))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&FireCodeRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .map(|rule| rule.category.as_str())
            .filter(|category| seen.insert(*category))
            .collect()
    }
}

fn validate(def: &FireCodeDef) -> Result<(), CatalogError> {
    if def.rules.is_empty() {
        return Err(CatalogError::Invalid("rules must not be empty".into()));
    }

    let mut ids = HashSet::new();
    for rule in &def.rules {
        if rule.id.trim().is_empty() {
            return Err(CatalogError::Invalid("rule id must not be empty".into()));
        }
        if !ids.insert(rule.id.as_str()) {
            return Err(CatalogError::Invalid(format!(
                "duplicate rule id '{}'",
                rule.id
            )));
        }
        if rule.title.trim().is_empty() {
            return Err(CatalogError::Invalid(format!(
                "rule '{}' has an empty title",
                rule.id
            )));
        }
        if rule.building_types.is_empty() {
            return Err(CatalogError::Invalid(format!(
                "rule '{}' applies to no building types",
                rule.id
            )));
        }
    }

    Ok(())
}
