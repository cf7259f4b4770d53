//! Normalized entity structs.
//!
//! These are the plain records handed to the navigation engine by the
//! data-access layer. The engine never mutates them and never assumes
//! referential stability between two snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One conversation thread as reported by storage.
///
/// `parent_id` of `None` and `Some("")` both mean "root"; the hierarchy
/// builder treats them identically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thread {
    /// Opaque, globally unique identifier.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Creation time, epoch seconds.
    pub created_at: i64,
    /// Most recent message activity, epoch seconds.
    #[serde(default)]
    pub last_activity: Option<i64>,
}

impl Thread {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            created_at: 0,
            last_activity: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_created_at(mut self, ts: i64) -> Self {
        self.created_at = ts;
        self
    }

    pub fn with_last_activity(mut self, ts: i64) -> Self {
        self.last_activity = Some(ts);
        self
    }

    /// True when this thread sits at the top level of the tree.
    pub fn is_root(&self) -> bool {
        match &self.parent_id {
            None => true,
            Some(p) => p.is_empty(),
        }
    }

    /// Recency key used by the priority layout: last activity when known,
    /// creation time otherwise.
    pub fn recency(&self) -> i64 {
        self.last_activity.unwrap_or(self.created_at)
    }

    /// Creation time as UTC, for renderers that show absolute dates.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }
}

/// One chat channel. Channels form a flat list; they never nest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    /// Display name; the identifier doubles as the label when absent.
    #[serde(default)]
    pub name: Option<String>,
}

impl Channel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parent_id_counts_as_root() {
        let mut t = Thread::new("a", "alpha");
        assert!(t.is_root());
        t.parent_id = Some(String::new());
        assert!(t.is_root());
        t.parent_id = Some("b".into());
        assert!(!t.is_root());
    }

    #[test]
    fn recency_prefers_last_activity() {
        let t = Thread::new("a", "alpha").with_created_at(100);
        assert_eq!(t.recency(), 100);
        let t = t.with_last_activity(250);
        assert_eq!(t.recency(), 250);
    }

    #[test]
    fn created_at_utc_converts_epoch_seconds() {
        let t = Thread::new("a", "alpha").with_created_at(0);
        assert_eq!(
            t.created_at_utc().unwrap().to_rfc3339(),
            "1970-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn channel_label_falls_back_to_id() {
        assert_eq!(Channel::new("general").label(), "general");
        assert_eq!(Channel::named("c1", "General").label(), "General");
    }

    #[test]
    fn thread_serde_round_trip_defaults_optional_fields() {
        let json = serde_json::json!({
            "id": "t1",
            "name": "topic",
            "created_at": 42
        });
        let t: Thread = serde_json::from_value(json).unwrap();
        assert!(t.parent_id.is_none());
        assert!(t.last_activity.is_none());
    }
}
