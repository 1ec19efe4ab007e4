// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Error type for range-taking buffer operations.
///
/// Carries a [`RangeErrorKind`] plus the attempted range and the buffer
/// length at the time of failure. Boundary failures additionally record the
/// enclosing UTF-8 character span of the offending index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeError {
    kind: RangeErrorKind,
    start: usize,
    end: usize,
    len: usize,
    boundary: Option<BoundaryInfo>,
}

#[expect(
    clippy::len_without_is_empty,
    reason = "`RangeError::len` reports buffer length context; `is_empty` would be misleading."
)]
impl RangeError {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> RangeErrorKind {
        self.kind
    }

    /// The start byte index of the range provided by the caller.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The end byte index of the range provided by the caller.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The length in bytes of the buffer at the time of the error.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Extra details for boundary-related errors, if available.
    pub fn boundary(&self) -> Option<BoundaryInfo> {
        self.boundary
    }

    pub(crate) fn invalid_bounds(start: usize, end: usize, len: usize) -> Self {
        Self {
            kind: RangeErrorKind::InvalidBounds,
            start,
            end,
            len,
            boundary: None,
        }
    }

    pub(crate) fn invalid_range(start: usize, end: usize, len: usize) -> Self {
        Self {
            kind: RangeErrorKind::InvalidRange,
            start,
            end,
            len,
            boundary: None,
        }
    }

    pub(crate) fn not_on_char_boundary(
        text: &str,
        start: usize,
        end: usize,
        which: Endpoint,
        index: usize,
    ) -> Self {
        let (char_start, char_end) = enclosing_char_span(text, index).unwrap_or((index, index));
        Self {
            kind: RangeErrorKind::NotOnCharBoundary,
            start,
            end,
            len: text.len(),
            boundary: Some(BoundaryInfo {
                which,
                index,
                char_start,
                char_end,
            }),
        }
    }
}

impl core::fmt::Display for RangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            RangeErrorKind::InvalidBounds => write!(
                f,
                "range {}..{} out of bounds for len {}",
                self.start, self.end, self.len
            ),
            RangeErrorKind::InvalidRange => {
                write!(f, "invalid range {}..{}: start > end", self.start, self.end)
            }
            RangeErrorKind::NotOnCharBoundary => {
                if let Some(b) = self.boundary {
                    let which = match b.which {
                        Endpoint::Start => "start",
                        Endpoint::End => "end",
                    };
                    write!(
                        f,
                        "range {}..{}: {which} index {} not on UTF-8 boundary (char {}..{})",
                        self.start, self.end, b.index, b.char_start, b.char_end
                    )
                } else {
                    write!(
                        f,
                        "range {}..{} not on UTF-8 boundary",
                        self.start, self.end
                    )
                }
            }
        }
    }
}

impl core::error::Error for RangeError {}

/// The category of a [`RangeError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum RangeErrorKind {
    /// Provided range indices were out of bounds relative to the buffer length.
    InvalidBounds,

    /// The provided range had `start > end`.
    InvalidRange,

    /// Either `start` or `end` was not aligned to a UTF-8 character boundary.
    NotOnCharBoundary,
}

/// Identifies which endpoint of a range failed boundary validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// The `start` endpoint of the range.
    Start,

    /// The `end` endpoint of the range.
    End,
}

/// Details about an index that was not on a UTF-8 character boundary.
///
/// Returned by [`RangeError::boundary`] when the error kind is
/// [`RangeErrorKind::NotOnCharBoundary`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoundaryInfo {
    /// Which endpoint (`start` or `end`) was invalid.
    pub which: Endpoint,

    /// The offending byte index.
    pub index: usize,

    /// The start byte index of the enclosing UTF-8 codepoint.
    pub char_start: usize,

    /// The end byte index (exclusive) of the enclosing UTF-8 codepoint.
    pub char_end: usize,
}

fn enclosing_char_span(text: &str, index: usize) -> Option<(usize, usize)> {
    if index > text.len() {
        return None;
    }
    if text.is_char_boundary(index) {
        return Some((index, index));
    }
    // A UTF-8 sequence is at most 4 bytes, so both walks terminate quickly.
    let mut start = index;
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = index;
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::{Endpoint, RangeError, RangeErrorKind};
    use alloc::format;

    #[test]
    fn display_invalid_bounds() {
        let err = RangeError::invalid_bounds(0, 7, 6);
        assert_eq!(err.kind(), RangeErrorKind::InvalidBounds);
        let msg = format!("{err}");
        assert!(msg.contains("0..7"));
        assert!(msg.contains("len 6"));
    }

    #[test]
    fn display_invalid_range() {
        let err = RangeError::invalid_range(4, 3, 6);
        assert_eq!(err.kind(), RangeErrorKind::InvalidRange);
        let msg = format!("{err}");
        assert!(msg.contains("4..3"));
        assert!(msg.contains("start > end"));
    }

    #[test]
    fn boundary_info_reports_enclosing_char() {
        // "é" is 2 bytes in UTF-8; index 1 is not a boundary.
        let err = RangeError::not_on_char_boundary("éclair", 1, 2, Endpoint::Start, 1);
        assert_eq!(err.kind(), RangeErrorKind::NotOnCharBoundary);
        let b = err.boundary().expect("boundary info");
        assert_eq!(b.which, Endpoint::Start);
        assert_eq!(b.index, 1);
        assert_eq!(b.char_start, 0);
        assert_eq!(b.char_end, 2);
        let msg = format!("{err}");
        assert!(msg.contains("index 1"));
        assert!(msg.contains("char 0..2"));
    }
}
