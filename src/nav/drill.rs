//! Drill stack: where in the thread tree the panel is zoomed into.
//!
//! The stack holds bare identifiers, never references; the current scope
//! is re-resolved against the live thread snapshot on every use so a
//! thread deleted mid-session degrades instead of dangling.

use smallvec::SmallVec;

use crate::model::types::Thread;

/// Ordered sequence of drilled-into thread identifiers, empty at top
/// level. Practically ≤ 5–6 deep; guarding against childless pushes is
/// the controller's job, not this type's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrillStack {
    stack: SmallVec<[String; 6]>,
}

impl DrillStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: impl Into<String>) {
        self.stack.push(id.into());
    }

    /// Removes and returns the top identifier; `None` on an empty stack.
    pub fn pop(&mut self) -> Option<String> {
        self.stack.pop()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn top(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Resolves the top identifier against the live collection.
    ///
    /// Returns `None` both for an empty stack and for a stale identifier
    /// whose thread has disappeared; the stale entry itself stays on the
    /// stack until explicitly popped.
    pub fn current_scope<'a>(&self, threads: &'a [Thread]) -> Option<&'a Thread> {
        let top = self.top()?;
        threads.iter().find(|t| t.id == top)
    }
}
