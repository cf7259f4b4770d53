//! Collaborator interfaces for the navigation engine.
//!
//! The engine treats persistence as an external concern: threads,
//! channels, and the favorite/subscribe/mute sets live behind the
//! [`Directory`] trait and are re-fetched wholesale between input events.
//! [`MemoryDirectory`] is the in-memory implementation used by tests and
//! by embedders that keep their own state elsewhere.

use anyhow::{Result, bail};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::model::types::{Channel, Thread};

/// Read-only view of the data layer consumed by the navigation engine.
///
/// Every method must be cheap enough to call once per input event; the
/// engine never caches results across events.
pub trait Directory {
    /// Current thread snapshot, in stable storage order.
    fn threads(&self) -> Vec<Thread>;

    /// Current channel snapshot, in stable storage order.
    fn channels(&self) -> Vec<Channel>;

    /// Substring search over all known threads, including ones the user
    /// is not subscribed to. A failure here degrades to "no supplementary
    /// results" at the call site; it never blocks local filtering.
    fn search_threads(&self, text: &str) -> Result<Vec<Thread>>;

    fn is_favorited(&self, _id: &str) -> bool {
        false
    }

    fn is_subscribed(&self, _id: &str) -> bool {
        false
    }

    fn is_muted(&self, _id: &str) -> bool {
        false
    }

    fn unread_count(&self, _id: &str) -> usize {
        0
    }

    /// Unread @-mention count. Reserved extension point; implementations
    /// may always return zero.
    fn unread_mentions(&self, _id: &str) -> usize {
        0
    }

    /// Storage-side last-activity override, epoch seconds. Falls back to
    /// the timestamp carried on the [`Thread`] record itself.
    fn last_activity(&self, _id: &str) -> Option<i64> {
        None
    }

    fn open_question_count(&self) -> usize {
        0
    }

    fn stale_question_count(&self) -> usize {
        0
    }

    /// Avatar glyph for an agent thread, looked up by thread name.
    fn avatar(&self, _name: &str) -> Option<char> {
        None
    }
}

/// In-memory [`Directory`] backed by plain collections.
#[derive(Debug, Default, Clone)]
pub struct MemoryDirectory {
    pub threads: Vec<Thread>,
    pub channels: Vec<Channel>,
    pub favorites: FxHashSet<String>,
    pub subscribed: FxHashSet<String>,
    pub muted: FxHashSet<String>,
    pub unread: FxHashMap<String, usize>,
    pub mentions: FxHashMap<String, usize>,
    pub avatars: FxHashMap<String, char>,
    pub open_questions: usize,
    pub stale_questions: usize,
    /// When set, `search_threads` fails; used to exercise the degraded
    /// search path.
    pub fail_search: bool,
}

impl MemoryDirectory {
    pub fn new(threads: Vec<Thread>) -> Self {
        Self {
            threads,
            ..Self::default()
        }
    }

    pub fn with_channels(mut self, channels: Vec<Channel>) -> Self {
        self.channels = channels;
        self
    }

    pub fn favorite(mut self, id: impl Into<String>) -> Self {
        self.favorites.insert(id.into());
        self
    }

    pub fn subscribe(mut self, id: impl Into<String>) -> Self {
        self.subscribed.insert(id.into());
        self
    }

    pub fn mute(mut self, id: impl Into<String>) -> Self {
        self.muted.insert(id.into());
        self
    }

    pub fn avatar_glyph(mut self, name: impl Into<String>, glyph: char) -> Self {
        self.avatars.insert(name.into(), glyph);
        self
    }
}

impl Directory for MemoryDirectory {
    fn threads(&self) -> Vec<Thread> {
        self.threads.clone()
    }

    fn channels(&self) -> Vec<Channel> {
        self.channels.clone()
    }

    fn search_threads(&self, text: &str) -> Result<Vec<Thread>> {
        if self.fail_search {
            bail!("search backend unavailable");
        }
        let needle = text.to_lowercase();
        Ok(self
            .threads
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn is_favorited(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    fn is_subscribed(&self, id: &str) -> bool {
        self.subscribed.contains(id)
    }

    fn is_muted(&self, id: &str) -> bool {
        self.muted.contains(id)
    }

    fn unread_count(&self, id: &str) -> usize {
        self.unread.get(id).copied().unwrap_or(0)
    }

    fn unread_mentions(&self, id: &str) -> usize {
        self.mentions.get(id).copied().unwrap_or(0)
    }

    fn open_question_count(&self) -> usize {
        self.open_questions
    }

    fn stale_question_count(&self) -> usize {
        self.stale_questions
    }

    fn avatar(&self, name: &str) -> Option<char> {
        self.avatars.get(name).copied()
    }
}
