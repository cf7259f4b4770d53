//! Entry model: one navigable line in a panel.
//!
//! Entries are derived view data, rebuilt from the thread snapshot on
//! every layout pass. They carry just enough display metadata for the
//! renderer (`label_for`) and for selectability checks; they never own
//! tree structure — parent/child linkage stays in the hierarchy index.

use crate::model::types::Thread;

/// Virtual message-level collections reachable from the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageCollectionKind {
    OpenQuestions,
    StaleQuestions,
}

impl MessageCollectionKind {
    pub fn label(self) -> &'static str {
        match self {
            MessageCollectionKind::OpenQuestions => "open questions",
            MessageCollectionKind::StaleQuestions => "stale questions",
        }
    }
}

/// Virtual thread-level collections reachable from the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadCollectionKind {
    Muted,
}

impl ThreadCollectionKind {
    pub fn label(self) -> &'static str {
        match self {
            ThreadCollectionKind::Muted => "muted",
        }
    }
}

/// Display metadata attached to a thread line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadEntry {
    pub thread: Thread,
    /// Indent depth in display units, not literal tree depth.
    pub depth: usize,
    pub has_children: bool,
    /// Set only for "other threads, collapsed" lines; collapsed entries
    /// are never drillable regardless of `has_children`.
    pub collapsed: bool,
    pub favorited: bool,
    /// Marks the entry-0 back link emitted while drilled in.
    pub back_link: bool,
    pub unread: usize,
    pub mentions: usize,
    pub avatar: Option<char>,
}

impl ThreadEntry {
    pub fn id(&self) -> &str {
        &self.thread.id
    }
}

/// One addressable line in a navigation panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Pseudo-root "home" entry, present only at the top level.
    Main,
    Thread(ThreadEntry),
    /// Non-selectable divider; the label only selects a rendering style.
    Separator { label: &'static str },
    /// Non-selectable grouping caption.
    SectionHeader { label: &'static str },
    MessageCollection {
        kind: MessageCollectionKind,
        count: usize,
    },
    ThreadCollection {
        kind: ThreadCollectionKind,
        count: usize,
    },
}

impl Entry {
    /// Whether the cursor may rest on this entry.
    pub fn selectable(&self) -> bool {
        !matches!(
            self,
            Entry::Separator { .. } | Entry::SectionHeader { .. }
        )
    }

    /// Text the incremental filter matches against. `None` for entries
    /// that are excluded from match lists outright.
    pub fn filter_label(&self) -> Option<&str> {
        match self {
            Entry::Main => Some("main"),
            Entry::Thread(t) => Some(&t.thread.name),
            Entry::Separator { .. } | Entry::SectionHeader { .. } => None,
            Entry::MessageCollection { kind, .. } => Some(kind.label()),
            Entry::ThreadCollection { kind, .. } => Some(kind.label()),
        }
    }

    /// The thread entry payload, when this line wraps a thread.
    pub fn as_thread(&self) -> Option<&ThreadEntry> {
        match self {
            Entry::Thread(t) => Some(t),
            _ => None,
        }
    }
}

/// Pure display formatting for an entry.
///
/// Leading glyph priority: unread-mention indicator, then avatar, then
/// favorite star, then blank. Indentation is two spaces per depth unit.
pub fn label_for(entry: &Entry) -> String {
    match entry {
        Entry::Main => "  main".to_string(),
        Entry::Thread(t) if t.back_link => format!("◀ {}", t.thread.name),
        Entry::Thread(t) => {
            let glyph = if t.mentions > 0 {
                '@'
            } else if let Some(a) = t.avatar {
                a
            } else if t.favorited {
                '★'
            } else {
                ' '
            };
            let indent = "  ".repeat(t.depth);
            let mut label = format!("{glyph} {indent}{}", t.thread.name);
            if t.collapsed && t.has_children {
                label.push('…');
            }
            if t.unread > 0 {
                label.push_str(&format!(" ({})", t.unread));
            }
            label
        }
        Entry::Separator { label: "search" } => "── search ──".to_string(),
        Entry::Separator { .. } => "────".to_string(),
        Entry::SectionHeader { label } => format!("{label}:"),
        Entry::MessageCollection { kind, count } => {
            format!("  {} ({count})", kind.label())
        }
        Entry::ThreadCollection { kind, count } => {
            format!("  {} ({count})", kind.label())
        }
    }
}
