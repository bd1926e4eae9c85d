use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ProjectId, UserId};

/// Account that receives a copy of every user notification.
pub const ADMIN_USER_ID: &str = "admin-001";
pub const NOTIFICATIONS_FILE: &str = "firecode_notifications.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Notification content before the center assigns identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("notification store is corrupt: {0}")]
    Json(#[from] serde_json::Error),
    #[error("notification transport unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook used by the review service.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, draft: NotificationDraft) -> Result<Notification, NotificationError>;
}

/// In-process inbox for every portal user, newest first.
///
/// With a backing file every change is written through; the in-memory list is
/// updated first so a failed write never loses the notification.
#[derive(Debug)]
pub struct NotificationCenter {
    items: Mutex<Vec<Notification>>,
    path: Option<PathBuf>,
    sequence: AtomicU64,
}

impl NotificationCenter {
    pub fn in_memory() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            path: None,
            sequence: AtomicU64::new(1),
        }
    }

    /// Open (or start) `firecode_notifications.json` under `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, NotificationError> {
        let path = dir.as_ref().join(NOTIFICATIONS_FILE);
        let items: Vec<Notification> = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        let next = items
            .iter()
            .filter_map(|item| sequence_of(&item.id))
            .max()
            .unwrap_or(0)
            + 1;
        Ok(Self {
            items: Mutex::new(items),
            path: Some(path),
            sequence: AtomicU64::new(next),
        })
    }

    fn next_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("ntf-{seq:06}")
    }

    fn flush(&self, items: &[Notification]) -> Result<(), NotificationError> {
        if let Some(path) = &self.path {
            let bytes = serde_json::to_vec_pretty(items)?;
            fs::write(path, bytes)?;
        }
        Ok(())
    }

    pub fn all(&self) -> Vec<Notification> {
        self.items
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }

    pub fn by_user(&self, user_id: &UserId) -> Vec<Notification> {
        let guard = self.items.lock().expect("notification mutex poisoned");
        guard
            .iter()
            .filter(|item| &item.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn unread_count(&self, user_id: &UserId) -> usize {
        let guard = self.items.lock().expect("notification mutex poisoned");
        guard
            .iter()
            .filter(|item| &item.user_id == user_id && !item.read)
            .count()
    }

    /// Returns whether anything changed.
    pub fn mark_read(&self, user_id: &UserId, id: &str) -> Result<bool, NotificationError> {
        let mut guard = self.items.lock().expect("notification mutex poisoned");
        let Some(item) = guard
            .iter_mut()
            .find(|item| item.id == id && &item.user_id == user_id && !item.read)
        else {
            return Ok(false);
        };
        item.read = true;
        self.flush(&guard)?;
        Ok(true)
    }

    pub fn mark_all_read(&self, user_id: &UserId) -> Result<usize, NotificationError> {
        let mut guard = self.items.lock().expect("notification mutex poisoned");
        let mut changed = 0;
        for item in guard
            .iter_mut()
            .filter(|item| &item.user_id == user_id && !item.read)
        {
            item.read = true;
            changed += 1;
        }
        if changed > 0 {
            self.flush(&guard)?;
        }
        Ok(changed)
    }

    pub fn delete(&self, user_id: &UserId, id: &str) -> Result<bool, NotificationError> {
        self.remove_where(|item| &item.user_id == user_id && item.id == id)
            .map(|removed| removed > 0)
    }

    pub fn delete_all_read(&self, user_id: &UserId) -> Result<usize, NotificationError> {
        self.remove_where(|item| &item.user_id == user_id && item.read)
    }

    fn remove_where<F>(&self, predicate: F) -> Result<usize, NotificationError>
    where
        F: Fn(&Notification) -> bool,
    {
        let mut guard = self.items.lock().expect("notification mutex poisoned");
        let before = guard.len();
        guard.retain(|item| !predicate(item));
        let removed = before - guard.len();
        if removed > 0 {
            self.flush(&guard)?;
        }
        Ok(removed)
    }
}

fn sequence_of(id: &str) -> Option<u64> {
    let digits = id.strip_prefix("ntf-")?;
    let digits = digits.strip_suffix("-admin").unwrap_or(digits);
    digits.parse().ok()
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl NotificationSink for NotificationCenter {
    fn notify(&self, draft: NotificationDraft) -> Result<Notification, NotificationError> {
        let item = Notification {
            id: self.next_id(),
            user_id: draft.user_id,
            kind: draft.kind,
            title: draft.title,
            body: draft.body,
            project_id: draft.project_id,
            created_at: Utc::now(),
            read: false,
        };

        let mut guard = self.items.lock().expect("notification mutex poisoned");
        guard.insert(0, item.clone());
        if item.user_id.0 != ADMIN_USER_ID {
            let mirror = Notification {
                id: format!("{}-admin", item.id),
                user_id: UserId(ADMIN_USER_ID.to_string()),
                ..item.clone()
            };
            guard.insert(0, mirror);
        }
        self.flush(&guard)?;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(user: &str, title: &str) -> NotificationDraft {
        NotificationDraft {
            user_id: UserId(user.to_string()),
            kind: NotificationKind::Success,
            title: title.to_string(),
            body: "تم استلام مشروعك".to_string(),
            project_id: None,
        }
    }

    #[test]
    fn user_notifications_are_mirrored_to_admin() {
        let center = NotificationCenter::in_memory();
        let sent = center.notify(draft("applicant-1", "first")).expect("notify");

        let admin = center.by_user(&UserId(ADMIN_USER_ID.to_string()));
        assert_eq!(admin.len(), 1);
        assert_eq!(admin[0].id, format!("{}-admin", sent.id));
        assert_eq!(center.all().len(), 2);

        center.notify(draft(ADMIN_USER_ID, "direct")).expect("notify");
        assert_eq!(center.all().len(), 3);
    }

    #[test]
    fn newest_first_and_inbox_operations() {
        let center = NotificationCenter::in_memory();
        let user = UserId("applicant-1".to_string());
        let first = center.notify(draft("applicant-1", "first")).expect("notify");
        center.notify(draft("applicant-1", "second")).expect("notify");

        let inbox = center.by_user(&user);
        assert_eq!(inbox[0].title, "second");
        assert_eq!(center.unread_count(&user), 2);

        assert!(center.mark_read(&user, &first.id).expect("mark"));
        assert!(!center.mark_read(&user, &first.id).expect("mark"));
        assert_eq!(center.unread_count(&user), 1);

        assert_eq!(center.delete_all_read(&user).expect("delete"), 1);
        assert_eq!(center.mark_all_read(&user).expect("mark all"), 1);
        assert_eq!(center.unread_count(&user), 0);
        assert_eq!(
            center.unread_count(&UserId(ADMIN_USER_ID.to_string())),
            2,
            "admin copies are independent"
        );
    }

    #[test]
    fn file_backed_center_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let center = NotificationCenter::open(dir.path()).expect("open");
            center.notify(draft("applicant-9", "persisted")).expect("notify");
        }
        let reopened = NotificationCenter::open(dir.path()).expect("reopen");
        let inbox = reopened.by_user(&UserId("applicant-9".to_string()));
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].title, "persisted");

        let next = reopened.notify(draft("applicant-9", "later")).expect("notify");
        assert_ne!(next.id, inbox[0].id);
    }
}
