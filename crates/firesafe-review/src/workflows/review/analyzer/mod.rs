//! Drawing analyzers.
//!
//! Nothing in this module reads drawing content. Every analyzer derives its
//! findings from file metadata, declared building data, or a seeded random
//! draw, and is a simulation of plan review rather than plan review itself.

mod cache;
mod heuristics;
mod simulated;

pub use cache::ExternalAnalysisCache;
pub use heuristics::KeywordHeuristicAnalyzer;
pub use simulated::SimulatedCodeAnalyzer;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{IssueCounts, IssueRecord, Project};

/// Issue tallies and commentary produced by one analyzer run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawingAnalysis {
    pub critical: u32,
    pub major: u32,
    pub minor: u32,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub missing_essentials: Vec<String>,
    /// Rule-level findings backing the counts, when the analyzer has them.
    #[serde(default)]
    pub findings: Vec<IssueRecord>,
}

impl DrawingAnalysis {
    pub fn counts(&self) -> IssueCounts {
        IssueCounts::new(self.critical, self.major, self.minor)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("drawing analyzer unavailable: {0}")]
    Unavailable(String),
    #[error("drawing analyzer rejected the project: {0}")]
    Rejected(String),
}

/// Secondary rule check consulted once per evaluation.
#[async_trait]
pub trait DrawingAnalyzer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    async fn analyze(&self, project: &Project) -> Result<DrawingAnalysis, AnalyzerError>;
}

#[async_trait]
impl<T> DrawingAnalyzer for Arc<T>
where
    T: DrawingAnalyzer + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn analyze(&self, project: &Project) -> Result<DrawingAnalysis, AnalyzerError> {
        (**self).analyze(project).await
    }
}

/// Analyzer used when none is configured: reports no issues at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalyzer;

#[async_trait]
impl DrawingAnalyzer for NoopAnalyzer {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn analyze(&self, _project: &Project) -> Result<DrawingAnalysis, AnalyzerError> {
        Ok(DrawingAnalysis::default())
    }
}
