// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use peniko::kurbo::{Point, Rect};

/// Capability trait over the host's text layout engine.
///
/// The editor drives invalidation through this trait and consults it for
/// geometry; it never performs layout itself. `()` is the null provider,
/// for hosts (and tests) that run without layout.
pub trait LayoutProvider {
    /// Text in `range` changed; layout for it is stale.
    fn invalidate_layout(&mut self, range: Range<usize>) {
        let _ = range;
    }

    /// Display for `range` must be redrawn without relayout.
    fn invalidate_display(&mut self, range: Range<usize>) {
        let _ = range;
    }

    /// The union of the bounding rectangles of the glyphs in `range`.
    fn bounding_rect(&self, range: Range<usize>) -> Rect {
        let _ = range;
        Rect::ZERO
    }

    /// The byte index of the character at `point`, if any.
    fn character_index(&self, point: Point) -> Option<usize> {
        let _ = point;
        None
    }

    /// The byte range of the line fragment containing `index`, if layout
    /// has produced one.
    ///
    /// Layout may lag the buffer, so recently edited ranges can return
    /// `None` until the next pass.
    fn line_fragment_range(&self, index: usize) -> Option<Range<usize>> {
        let _ = index;
        None
    }
}

impl LayoutProvider for () {}
