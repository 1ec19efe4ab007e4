// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::{Endpoint, RangeError};

/// A validated byte range into a UTF-8 text buffer.
///
/// This is a convenience wrapper around `Range<usize>` that carries invariants useful for
/// attributed buffer APIs:
///
/// - `start <= end`
/// - `start` and `end` are within the text bounds
/// - `start` and `end` lie on UTF-8 codepoint boundaries
///
/// Validating once lets callers pass the range to APIs that can be infallible with respect to
/// range correctness.
///
/// ## Important
///
/// A `TextRange` does not encode which buffer state it was validated against. Any mutation of
/// the buffer invalidates previously created `TextRange`s; it is the caller's responsibility
/// not to reuse them across edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextRange {
    start: usize,
    end: usize,
}

impl TextRange {
    /// Returns a validated `TextRange` for the provided text.
    #[inline]
    pub fn new(text: &str, range: Range<usize>) -> Result<Self, RangeError> {
        validate_range(text, &range)?;
        Ok(Self {
            start: range.start,
            end: range.end,
        })
    }

    /// Creates a `TextRange` without validation.
    ///
    /// This is intended for internal callers that already maintain range invariants.
    #[must_use]
    #[inline]
    pub const fn new_unchecked(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The start byte offset.
    #[must_use]
    #[inline]
    pub const fn start(self) -> usize {
        self.start
    }

    /// The end byte offset (exclusive).
    #[must_use]
    #[inline]
    pub const fn end(self) -> usize {
        self.end
    }

    /// The length of the range in bytes.
    #[must_use]
    #[inline]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the range is empty.
    #[must_use]
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Returns this range as a `Range<usize>`.
    #[must_use]
    #[inline]
    pub fn as_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<TextRange> for Range<usize> {
    #[inline]
    fn from(value: TextRange) -> Self {
        value.as_range()
    }
}

#[inline]
pub(crate) fn validate_range(text: &str, range: &Range<usize>) -> Result<(), RangeError> {
    let text_len = text.len();
    if range.start > range.end {
        return Err(RangeError::invalid_range(range.start, range.end, text_len));
    }
    if range.start > text_len || range.end > text_len {
        return Err(RangeError::invalid_bounds(range.start, range.end, text_len));
    }
    if !text.is_char_boundary(range.start) {
        return Err(RangeError::not_on_char_boundary(
            text,
            range.start,
            range.end,
            Endpoint::Start,
            range.start,
        ));
    }
    if !text.is_char_boundary(range.end) {
        return Err(RangeError::not_on_char_boundary(
            text,
            range.start,
            range.end,
            Endpoint::End,
            range.end,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{TextRange, validate_range};
    use crate::{Endpoint, RangeErrorKind};

    #[test]
    fn validates_ok_ranges() {
        let t = "Hello!";
        assert!(validate_range(t, &(0..0)).is_ok());
        assert!(validate_range(t, &(0..6)).is_ok());
        assert!(TextRange::new(t, 1..3).is_ok());
    }

    #[test]
    #[expect(
        clippy::reversed_empty_ranges,
        reason = "We want an invalid range for testing."
    )]
    fn rejects_start_greater_than_end() {
        let err = TextRange::new("Hello!", 4..3).unwrap_err();
        assert_eq!(err.kind(), RangeErrorKind::InvalidRange);
        assert_eq!(err.start(), 4);
        assert_eq!(err.end(), 3);
        assert_eq!(err.len(), 6);
    }

    #[test]
    fn rejects_out_of_bounds() {
        let err = TextRange::new("Hello!", 0..7).unwrap_err();
        assert_eq!(err.kind(), RangeErrorKind::InvalidBounds);
        assert_eq!(err.start(), 0);
        assert_eq!(err.end(), 7);
        assert_eq!(err.len(), 6);
    }

    #[test]
    fn rejects_not_on_char_boundary() {
        // "é" is 2 bytes in UTF-8; index 1 is not a boundary.
        let err = TextRange::new("éclair", 1..2).unwrap_err();
        assert_eq!(err.kind(), RangeErrorKind::NotOnCharBoundary);
        let b = err.boundary().expect("boundary info");
        assert_eq!(b.which, Endpoint::Start);
        assert_eq!(b.index, 1);

        let err = TextRange::new("éclair", 0..1).unwrap_err();
        let b = err.boundary().expect("boundary info");
        assert_eq!(b.which, Endpoint::End);
    }

    #[test]
    fn range_accessors() {
        let r = TextRange::new_unchecked(2, 5);
        assert_eq!(r.start(), 2);
        assert_eq!(r.end(), 5);
        assert_eq!(r.len(), 3);
        assert!(!r.is_empty());
        assert_eq!(r.as_range(), 2..5);
    }
}
