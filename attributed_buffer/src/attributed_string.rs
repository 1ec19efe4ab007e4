// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::Range;

use crate::text_range::validate_range;
use crate::{RangeError, Runs};

/// A mutable block of text with attributes applied to byte ranges within it.
///
/// Attribute spans are kept in application order. Mutating the text through
/// [`replace_range`](Self::replace_range) keeps the spans consistent with the
/// edited text:
///
/// - spans entirely before the edit are untouched, spans entirely after it shift;
/// - spans strictly containing the edit stretch or shrink by the length delta;
/// - spans partially overlapping the edit are clamped to the surviving text;
/// - spans entirely within the replaced range are dropped, and inserted text
///   adopts no spans.
#[derive(Debug, Clone)]
pub struct AttributedString<Attr: Debug> {
    text: String,
    spans: Vec<(Range<usize>, Attr)>,
}

// Not derived: the derive would demand `Attr: Default`, which an empty
// buffer has no use for.
impl<Attr: Debug> Default for AttributedString<Attr> {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl<Attr: Debug> AttributedString<Attr> {
    /// Create an `AttributedString` with no attributes applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    /// Borrow the underlying text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the length of the underlying text, in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if the underlying text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Return whether `index` is a UTF-8 character boundary in the text.
    pub fn is_char_boundary(&self, index: usize) -> bool {
        self.text.is_char_boundary(index)
    }

    /// Borrow the text within `range`.
    pub fn slice(&self, range: Range<usize>) -> Result<&str, RangeError> {
        validate_range(&self.text, &range)?;
        Ok(&self.text[range])
    }

    /// Apply an `attribute` to a `range` within the text.
    pub fn apply_attribute(&mut self, range: Range<usize>, attribute: Attr) -> Result<(), RangeError> {
        validate_range(&self.text, &range)?;
        self.spans.push((range, attribute));
        Ok(())
    }

    /// Iterate over all attribute spans in application order.
    pub fn spans(&self) -> impl ExactSizeIterator<Item = (&Range<usize>, &Attr)> {
        self.spans.iter().map(|(range, attr)| (range, attr))
    }

    /// Returns the number of attribute spans applied to the text.
    pub fn spans_len(&self) -> usize {
        self.spans.len()
    }

    /// Get an iterator over the attributes whose spans contain the given `index`.
    ///
    /// This doesn't handle conflicting attributes, it just reports everything.
    pub fn attributes_at(&self, index: usize) -> impl Iterator<Item = &Attr> {
        self.spans.iter().filter_map(move |(span, attr)| {
            if span.contains(&index) {
                Some(attr)
            } else {
                None
            }
        })
    }

    /// Get an iterator over the spans that overlap the given `range`.
    ///
    /// This doesn't handle conflicting attributes, it just reports everything.
    pub fn attributes_for_range(
        &self,
        range: Range<usize>,
    ) -> impl Iterator<Item = (&Range<usize>, &Attr)> {
        self.spans.iter().filter_map(move |(span, attr)| {
            if span.start < range.end && span.end > range.start {
                Some((span, attr))
            } else {
                None
            }
        })
    }

    /// Remove all applied attribute spans.
    pub fn clear_attributes(&mut self) {
        self.spans.clear();
    }

    /// Iterate the non-overlapping runs of `range`, partitioned at span boundaries.
    ///
    /// Each run reports the attributes active over it. Zero-length spans never
    /// contribute to a run's active set, but their boundaries still split runs.
    pub fn runs(&self, range: Range<usize>) -> Result<Runs<'_, Attr>, RangeError> {
        validate_range(&self.text, &range)?;
        Ok(Runs::new(self, range))
    }

    /// Remove attributes matching `pred` from `range`.
    ///
    /// Spans that straddle the removal range are split; the pieces outside the
    /// range survive in place.
    pub fn remove_attributes_where(
        &mut self,
        range: Range<usize>,
        pred: impl Fn(&Attr) -> bool,
    ) -> Result<(), RangeError>
    where
        Attr: Clone,
    {
        validate_range(&self.text, &range)?;
        let mut out = Vec::with_capacity(self.spans.len());
        for (span, attr) in self.spans.drain(..) {
            if !pred(&attr) || span.end <= range.start || span.start >= range.end {
                out.push((span, attr));
                continue;
            }
            if span.start < range.start {
                out.push((span.start..range.start, attr.clone()));
            }
            if span.end > range.end {
                out.push((range.end..span.end, attr));
            }
        }
        self.spans = out;
        Ok(())
    }

    /// Replace the text in `range` with `replacement`, keeping spans consistent.
    ///
    /// Returns the signed change in length, in bytes.
    pub fn replace_range(
        &mut self,
        range: Range<usize>,
        replacement: &str,
    ) -> Result<isize, RangeError> {
        validate_range(&self.text, &range)?;
        let removed = range.end - range.start;
        let inserted = replacement.len();
        let delta = inserted as isize - removed as isize;

        self.text.replace_range(range.clone(), replacement);

        let (rs, re) = (range.start, range.end);
        self.spans.retain_mut(|(span, _)| {
            // Swallowed entirely (including spans exactly equal to the edit):
            // the text they described is gone.
            if span.start >= rs && span.end <= re {
                return false;
            }
            span.start = if span.start >= re {
                span.start - removed + inserted
            } else if span.start > rs {
                // Started inside the removed text: clamp past the insertion.
                rs + inserted
            } else {
                span.start
            };
            span.end = if span.end <= rs {
                span.end
            } else if span.end < re {
                // Ended inside the removed text: clamp before the insertion.
                rs
            } else {
                span.end - removed + inserted
            };
            span.start < span.end
        });

        Ok(delta)
    }

    pub(crate) fn spans_slice(&self) -> &[(Range<usize>, Attr)] {
        &self.spans
    }
}

impl<Attr: Debug> From<&str> for AttributedString<Attr> {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl<Attr: Debug> From<String> for AttributedString<Attr> {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
