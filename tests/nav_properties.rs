//! Algebraic properties of the windowing, hit-testing, and hierarchy
//! layers, checked with proptest.

use proptest::prelude::*;

use chatnav::nav::drill::DrillStack;
use chatnav::nav::entry::Entry;
use chatnav::nav::hierarchy;
use chatnav::nav::scroll::{clamp_and_window, locate};
use chatnav::{MemoryDirectory, Thread};

/// Arbitrary forest: each thread may pick any earlier thread as parent,
/// so the parent relation is always acyclic and always resolvable.
fn arb_threads() -> impl Strategy<Value = Vec<Thread>> {
    prop::collection::vec(prop::option::of(0usize..8), 0..24).prop_map(|parents| {
        parents
            .into_iter()
            .enumerate()
            .map(|(i, parent)| {
                let mut t = Thread::new(format!("t{i}"), format!("thread-{i:02}"))
                    .with_created_at(i as i64);
                if let Some(p) = parent
                    && p < i
                {
                    t = t.with_parent(format!("t{p}"));
                }
                t
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn clamp_and_window_is_idempotent(
        len in 0usize..200,
        selected in 0usize..220,
        viewport in 0usize..30,
        offset in 0usize..250,
        focused: bool,
    ) {
        let active: Vec<usize> = (0..len).collect();
        let (off1, slice1) = clamp_and_window(&active, selected, viewport, offset, focused);
        let (off2, slice2) = clamp_and_window(&active, selected, viewport, off1, focused);
        prop_assert_eq!(off1, off2);
        prop_assert_eq!(slice1, slice2);
    }

    #[test]
    fn window_never_exceeds_viewport_or_bounds(
        len in 0usize..200,
        selected in 0usize..220,
        viewport in 0usize..30,
        offset in 0usize..250,
        focused: bool,
    ) {
        let active: Vec<usize> = (0..len).collect();
        let (off, slice) = clamp_and_window(&active, selected, viewport, offset, focused);
        prop_assert!(slice.len() <= viewport);
        prop_assert!(off <= len.saturating_sub(viewport));
        if focused && viewport > 0 && selected < len {
            prop_assert!(slice.contains(&selected));
        }
    }

    #[test]
    fn locate_inverts_the_visible_window(
        len in 1usize..200,
        selected in 0usize..200,
        viewport in 1usize..30,
        offset in 0usize..250,
        header in 1usize..3,
        focused: bool,
    ) {
        let active: Vec<usize> = (0..len).map(|i| i * 3 + 1).collect();
        let (off, slice) = clamp_and_window(&active, selected, viewport, offset, focused);
        for (row, &entry_idx) in slice.iter().enumerate() {
            let line = header + row;
            prop_assert_eq!(locate(line, header, &active, off), Some(entry_idx));
        }
        // Lines above the content region never resolve.
        for line in 0..header {
            prop_assert_eq!(locate(line, header, &active, off), None);
        }
    }

    #[test]
    fn exactly_one_main_or_back_link(threads in arb_threads(), drill_into in prop::option::of(0usize..24)) {
        let dir = MemoryDirectory::new(threads.clone());
        let mut drill = DrillStack::new();
        if let Some(i) = drill_into
            && let Some(t) = threads.get(i)
        {
            drill.push(t.id.clone());
        }
        let entries = hierarchy::build(&threads, &drill, &dir, &[]);
        let mains = entries.iter().filter(|e| matches!(e, Entry::Main)).count();
        let backs = entries
            .iter()
            .filter(|e| e.as_thread().is_some_and(|t| t.back_link))
            .count();
        let scoped = drill.current_scope(&threads).is_some();
        if scoped {
            prop_assert_eq!(mains, 0);
            prop_assert_eq!(backs, 1);
            prop_assert!(entries[0].as_thread().is_some_and(|t| t.back_link));
        } else {
            // Empty or stale stack both render the top level.
            prop_assert_eq!(mains, 1);
            prop_assert_eq!(backs, 0);
        }
    }

    #[test]
    fn parented_threads_never_appear_at_top_level(threads in arb_threads()) {
        let dir = MemoryDirectory::new(threads.clone());
        let entries = hierarchy::build(&threads, &DrillStack::new(), &dir, &[]);
        let ids: std::collections::HashSet<&str> =
            threads.iter().map(|t| t.id.as_str()).collect();
        for entry in &entries {
            if let Some(te) = entry.as_thread() {
                if let Some(p) = &te.thread.parent_id
                    && !p.is_empty()
                    && ids.contains(p.as_str())
                {
                    prop_assert!(false, "child {} emitted at top level", te.thread.id);
                }
            }
        }
    }

    #[test]
    fn display_path_is_bounded_on_acyclic_data(threads in arb_threads(), probe in 0usize..24) {
        if let Some(t) = threads.get(probe) {
            let path = hierarchy::display_path(&threads, &t.id).unwrap();
            prop_assert!(!path.is_empty());
            prop_assert_eq!(path.last().unwrap(), &t.name);
            prop_assert!(path.len() <= threads.len());
        }
    }
}
