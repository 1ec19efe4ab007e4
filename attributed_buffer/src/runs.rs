// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Run segmentation for [`AttributedString`].
//!
//! Given a buffer with overlapping attribute spans, [`Runs`] yields
//! non-overlapping, contiguous sub-ranges on which the set of active
//! attributes is constant.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::Range;

use crate::AttributedString;

/// Iterator over contiguous attribute runs of an [`AttributedString`].
///
/// Each yielded [`Run`] is a non-empty byte range that no attribute span
/// boundary crosses. Runs are yielded left to right and cover the requested
/// range exactly.
///
/// Every call to [`AttributedString::runs`] produces a fresh iterator over a
/// snapshot of the span list; no cursor state is shared between calls.
#[derive(Debug)]
pub struct Runs<'a, Attr: Debug> {
    buffer: &'a AttributedString<Attr>,
    boundaries: Vec<usize>,
    index: usize,
}

impl<'a, Attr: Debug> Runs<'a, Attr> {
    pub(crate) fn new(buffer: &'a AttributedString<Attr>, range: Range<usize>) -> Self {
        let mut boundaries = Vec::with_capacity(2 + buffer.spans_len().saturating_mul(2));
        boundaries.push(range.start);
        boundaries.push(range.end);
        for (span, _) in buffer.spans() {
            if span.start > range.start && span.start < range.end {
                boundaries.push(span.start);
            }
            if span.end > range.start && span.end < range.end {
                boundaries.push(span.end);
            }
        }
        boundaries.sort_unstable();
        boundaries.dedup();
        Self {
            buffer,
            boundaries,
            index: 0,
        }
    }
}

impl<'a, Attr: Debug> Iterator for Runs<'a, Attr> {
    type Item = Run<'a, Attr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index + 1 >= self.boundaries.len() {
            return None;
        }
        let start = self.boundaries[self.index];
        let end = self.boundaries[self.index + 1];
        self.index += 1;
        debug_assert!(start < end, "boundaries are sorted and deduped");
        Some(Run {
            range: start..end,
            text: &self.buffer.as_str()[start..end],
            spans: self.buffer.spans_slice(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Remaining runs are remaining adjacent boundary pairs: [i, i + 1).
        let remaining = self.boundaries.len().saturating_sub(self.index + 1);
        (remaining, Some(remaining))
    }
}

impl<Attr: Debug> ExactSizeIterator for Runs<'_, Attr> {}

/// A contiguous sub-range of the buffer with a constant active attribute set.
#[derive(Debug)]
pub struct Run<'a, Attr: Debug> {
    range: Range<usize>,
    text: &'a str,
    spans: &'a [(Range<usize>, Attr)],
}

impl<'a, Attr: Debug> Run<'a, Attr> {
    /// The byte range this run covers.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The text of this run.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Iterate the attributes active over this run, in application order.
    ///
    /// Zero-length spans are never active.
    pub fn attrs(&self) -> impl Iterator<Item = &'a Attr> + use<'a, Attr> {
        let range = self.range.clone();
        self.spans.iter().filter_map(move |(span, attr)| {
            // A run never crosses a span boundary, so covering the run start
            // means covering the whole run.
            if span.start <= range.start && span.end >= range.end && !span.is_empty() {
                Some(attr)
            } else {
                None
            }
        })
    }
}
