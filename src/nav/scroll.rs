//! Virtual scroll window and screen-line hit testing.
//!
//! Both directions of the mapping between "entry position in the active
//! list" and "visible screen line" live in this module so they cannot
//! drift apart. Offsets are measured in visible-entry units, never text
//! lines; wrapped-label accounting happens one layer above.

/// Clamps `offset`, auto-scrolls to keep the selection visible when the
/// panel has focus, and returns the new offset plus the visible slice of
/// the active index list.
///
/// Idempotent: feeding the returned offset back in with unchanged inputs
/// is a no-op.
pub fn clamp_and_window<'a>(
    active: &'a [usize],
    selected: usize,
    viewport: usize,
    offset: usize,
    focused: bool,
) -> (usize, &'a [usize]) {
    let max_offset = active.len().saturating_sub(viewport);
    let mut offset = offset.min(max_offset);

    if focused && viewport > 0
        && let Some(pos) = active.iter().position(|&i| i == selected)
    {
        if pos >= offset + viewport {
            // Selection fell below the window: pin it to the last row.
            offset = pos + 1 - viewport;
        } else if pos < offset {
            // Selection fell above the window: pin it to the first row.
            offset = pos;
        }
    }
    offset = offset.min(max_offset);

    let end = (offset + viewport).min(active.len());
    let start = offset.min(end);
    (offset, &active[start..end])
}

/// Maps a clicked screen line (zero-based, relative to the panel's top
/// edge) back to an entry index in the unfiltered sequence.
///
/// Lines inside the header region never resolve. The caller must still
/// re-check the resolved entry's kind: separators and section headers
/// occupy screen lines but are not selectable.
pub fn locate(
    screen_line: usize,
    header_lines: usize,
    active: &[usize],
    offset: usize,
) -> Option<usize> {
    if screen_line < header_lines {
        return None;
    }
    let content_line = screen_line - header_lines;
    let position = content_line.checked_add(offset)?;
    active.get(position).copied()
}
