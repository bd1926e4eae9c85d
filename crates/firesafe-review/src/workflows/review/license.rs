use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Datelike, Duration, Utc};

use super::domain::{License, LicenseStatus, Project, ProjectStatus};

/// Days a license stays valid after issue.
pub const LICENSE_VALIDITY_DAYS: i64 = 365;

/// Error raised when a license cannot be issued.
#[derive(Debug, thiserror::Error)]
pub enum LicenseError {
    #[error("project {0} is not approved for a license")]
    NotApproved(String),
}

/// Issues operating licenses for approved projects.
pub trait LicenseIssuer: Send + Sync {
    fn issue(&self, project: &Project, issued_at: DateTime<Utc>) -> Result<License, LicenseError>;
}

/// Numbers licenses `LIC-<year>-<sequence>` from a process-wide counter.
#[derive(Debug)]
pub struct SequentialLicenseIssuer {
    sequence: AtomicU64,
}

impl SequentialLicenseIssuer {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            sequence: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialLicenseIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl LicenseIssuer for SequentialLicenseIssuer {
    fn issue(&self, project: &Project, issued_at: DateTime<Utc>) -> Result<License, LicenseError> {
        if project.status != ProjectStatus::Approved {
            return Err(LicenseError::NotApproved(project.id.to_string()));
        }

        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let license_number = format!("LIC-{}-{seq:06}", issued_at.year());
        Ok(License {
            id: format!("license-{seq:06}"),
            project_id: project.id.clone(),
            document_path: format!("/licenses/{license_number}.pdf"),
            license_number,
            issued_at,
            expires_at: issued_at + Duration::days(LICENSE_VALIDITY_DAYS),
            status: LicenseStatus::Active,
        })
    }
}
