// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection snapping around no-focus runs and attachment markers.
//!
//! A no-focus run is a stretch of text carrying [`Attribute::NoFocus`]; the
//! caret never rests strictly inside one, and a range selection absorbs any
//! run or marker it cuts into. Snapping direction for a collapsed caret
//! follows the direction of travel relative to the previous selection.

use alloc::vec::Vec;
use core::ops::Range;

use attributed_buffer::AttributedString;

use crate::attribute::Attribute;

/// Snap a requested selection against the buffer's atomic regions.
///
/// `prev` is the selection the editor currently holds, `new` the raw
/// request. Both are byte ranges; `new` is clamped to the buffer before
/// snapping.
pub(crate) fn snap(
    buffer: &AttributedString<Attribute>,
    prev: &Range<usize>,
    new: Range<usize>,
) -> Range<usize> {
    let len = buffer.len();
    let mut start = new.start.min(len);
    let mut end = new.end.min(len).max(start);

    let runs = no_focus_runs(buffer);
    let markers = marker_spans(buffer);

    if start == end {
        let pos = start;
        if let Some(run) = runs
            .iter()
            .find(|run| run.start < pos && pos < run.end)
        {
            let snapped = if new.start > prev.start {
                run.end
            } else {
                run.start
            };
            start = snapped;
            end = snapped;
        }
        if let Some(marker) = markers
            .iter()
            .find(|marker| marker.start < start && start < marker.end)
        {
            return marker.clone();
        }
        return start..end;
    }

    // Endpoints strictly inside a run snap outward: the run is absorbed
    // whole rather than split.
    if let Some(run) = runs
        .iter()
        .find(|run| run.start < start && start < run.end)
    {
        start = run.start;
    }
    if let Some(run) = runs.iter().find(|run| run.start < end && end < run.end) {
        end = run.end;
    }

    // Extending a non-collapsed selection keeps its far anchor; a raw
    // request that lost the anchor to snapping gets it back here.
    if prev.start < prev.end {
        if new.start < prev.start && new.end <= prev.end {
            end = end.max(prev.end);
        }
        if new.end > prev.end && new.start >= prev.start {
            start = start.min(prev.start);
        }
    }

    // Absorb every marker the range properly overlaps. Absorption can pull
    // the range over further markers, so iterate to a fixed point.
    loop {
        let mut grew = false;
        for marker in &markers {
            if start < marker.end && end > marker.start {
                if marker.start < start {
                    start = marker.start;
                    grew = true;
                }
                if marker.end > end {
                    end = marker.end;
                    grew = true;
                }
            }
        }
        if !grew {
            return start..end;
        }
    }
}

/// The buffer's no-focus runs, merged where spans touch or overlap.
fn no_focus_runs(buffer: &AttributedString<Attribute>) -> Vec<Range<usize>> {
    let mut runs: Vec<Range<usize>> = buffer
        .spans()
        .filter(|(_, attr)| matches!(attr, Attribute::NoFocus))
        .map(|(range, _)| range.clone())
        .collect();
    runs.sort_by_key(|run| run.start);
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(last) if run.start <= last.end => last.end = last.end.max(run.end),
            _ => merged.push(run),
        }
    }
    merged
}

fn marker_spans(buffer: &AttributedString<Attribute>) -> Vec<Range<usize>> {
    buffer
        .spans()
        .filter(|(_, attr)| matches!(attr, Attribute::Attachment(_)))
        .map(|(range, _)| range.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::snap;
    use crate::attachment::AttachmentId;
    use crate::attribute::Attribute;
    use attributed_buffer::AttributedString;

    fn with_no_focus(text: &str, runs: &[core::ops::Range<usize>]) -> AttributedString<Attribute> {
        let mut buffer = AttributedString::new(text);
        for run in runs {
            buffer
                .apply_attribute(run.clone(), Attribute::NoFocus)
                .unwrap();
        }
        buffer
    }

    #[test]
    fn caret_moving_backward_snaps_to_run_start() {
        let buffer = with_no_focus("hello world!", &[4..8]);
        assert_eq!(snap(&buffer, &(11..11), 5..5), 4..4);
    }

    #[test]
    fn caret_moving_forward_snaps_to_run_end() {
        let buffer = with_no_focus("hello world!", &[4..8]);
        assert_eq!(snap(&buffer, &(3..3), 6..6), 8..8);
    }

    #[test]
    fn caret_on_run_boundary_is_left_alone() {
        let buffer = with_no_focus("hello world!", &[4..8]);
        assert_eq!(snap(&buffer, &(0..0), 4..4), 4..4);
        assert_eq!(snap(&buffer, &(11..11), 8..8), 8..8);
    }

    #[test]
    fn backward_extension_absorbs_run_and_keeps_far_anchor() {
        let buffer = with_no_focus("hello world!", &[4..8]);
        // Previous selection [8, 9); extending backward to a raw [6, 8)
        // snaps the head out of the run and keeps 9 as the anchor.
        assert_eq!(snap(&buffer, &(8..9), 6..8), 4..9);
    }

    #[test]
    fn forward_extension_keeps_near_anchor() {
        let buffer = with_no_focus("hello world!", &[4..8]);
        assert_eq!(snap(&buffer, &(2..3), 3..6), 2..8);
    }

    #[test]
    fn range_inside_plain_text_is_untouched() {
        let buffer = with_no_focus("hello world!", &[4..8]);
        assert_eq!(snap(&buffer, &(0..0), 9..11), 9..11);
    }

    #[test]
    fn adjacent_runs_merge_into_one_region() {
        let buffer = with_no_focus("hello world!", &[2..5, 5..9]);
        assert_eq!(snap(&buffer, &(11..11), 4..4), 2..2);
        assert_eq!(snap(&buffer, &(0..0), 6..6), 9..9);
    }

    #[test]
    fn range_absorbs_partially_overlapped_marker() {
        let mut buffer = AttributedString::new("ab\u{FFFC}cd");
        buffer
            .apply_attribute(2..5, Attribute::Attachment(AttachmentId::from_raw(7)))
            .unwrap();
        assert_eq!(snap(&buffer, &(0..0), 1..3), 1..5);
        assert_eq!(snap(&buffer, &(0..0), 3..6), 2..6);
        // Touching a marker boundary does not absorb it.
        assert_eq!(snap(&buffer, &(0..0), 0..2), 0..2);
        assert_eq!(snap(&buffer, &(7..7), 5..6), 5..6);
    }

    #[test]
    fn request_is_clamped_to_the_buffer() {
        let buffer = with_no_focus("abc", &[]);
        assert_eq!(snap(&buffer, &(0..0), 2..99), 2..3);
        assert_eq!(snap(&buffer, &(0..0), 50..99), 3..3);
    }
}
