//! Incremental text filter over an entry sequence.
//!
//! One engine type serves both panels; the thread panel's supplementary
//! storage search is orchestrated by the controller, which re-merges the
//! results into the entry sequence before calling [`FilterEngine::recompute`].

use tracing::trace;

/// Filter state machine for one panel.
///
/// While inactive the match list is `None` and callers must treat the
/// full, unfiltered sequence as the active one. While active, matched
/// indices point into the unfiltered sequence and preserve its order.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    active: bool,
    text: String,
    matches: Option<Vec<usize>>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Activates filtering with empty text. An empty filter narrows
    /// nothing but still changes rendering, so the match list becomes
    /// live immediately.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Deactivates filtering and clears all derived state. The caller
    /// resets its scroll offset alongside this.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.text.clear();
        self.matches = None;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Recomputes the match list from the unfiltered candidate labels,
    /// in order. `None` labels mark entries excluded from matching
    /// regardless of text (separators, section headers).
    pub fn recompute<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        if !self.active {
            self.matches = None;
            return;
        }
        let needle = self.text.to_lowercase();
        let matched: Vec<usize> = labels
            .into_iter()
            .enumerate()
            .filter_map(|(i, label)| {
                let label = label?;
                (needle.is_empty() || label.as_ref().to_lowercase().contains(&needle))
                    .then_some(i)
            })
            .collect();
        trace!(text = %self.text, matched = matched.len(), "filter recompute");
        self.matches = Some(matched);
    }

    /// Matched indices, or `None` while inactive.
    pub fn matches(&self) -> Option<&[usize]> {
        self.matches.as_deref()
    }

    /// The active index list the scroll window and hit tester operate
    /// on: the match list while filtering, the identity list otherwise.
    pub fn active_indices(&self, unfiltered_len: usize) -> Vec<usize> {
        match &self.matches {
            Some(m) => m.clone(),
            None => (0..unfiltered_len).collect(),
        }
    }
}
