// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use peniko::kurbo::Point;

use crate::attribute::{Attribute, ContentName};

/// Structural keys the editor intercepts before committing their text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditorKey {
    /// The Enter / Return key (`"\n"`).
    Enter,
    /// The Tab key (`"\t"`).
    Tab,
    /// The Backspace key.
    Backspace,
}

bitflags::bitflags! {
    /// Keyboard modifier state accompanying an [`EditorKey`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 1 << 0;
        /// Alt / Option.
        const ALT = 1 << 1;
        /// Control.
        const CONTROL = 1 << 2;
        /// The platform command key.
        const COMMAND = 1 << 3;
    }
}

/// A delegate's verdict on an intercepted key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Let the editor apply the key's default edit.
    Continue,
    /// The delegate handled the key; the default edit is suppressed.
    Suppress,
}

/// Observer of editor activity.
///
/// Every method has a no-op default; implement only what you need. `()` is
/// the null delegate.
pub trait EditorDelegate {
    /// The editor gained focus with the given selection.
    fn on_focus_gained(&mut self, selection: Range<usize>) {
        let _ = selection;
    }

    /// The editor lost focus. The editor's focus state is already cleared
    /// when this fires.
    fn on_focus_lost(&mut self) {}

    /// The selection settled on a new range.
    ///
    /// `attributes` are the attributes in effect at the head of the new
    /// selection and `content_type` the block content name there.
    fn on_selection_changed(
        &mut self,
        old: Range<usize>,
        new: Range<usize>,
        attributes: &[Attribute],
        content_type: &ContentName,
    ) {
        let _ = (old, new, attributes, content_type);
    }

    /// A structural key arrived at `selection`, before its default edit.
    fn on_key_received(
        &mut self,
        key: EditorKey,
        modifiers: Modifiers,
        selection: Range<usize>,
    ) -> KeyOutcome {
        let _ = (key, modifiers, selection);
        KeyOutcome::Continue
    }

    /// Text in `range` changed (post-edit coordinates, one call per
    /// coalesced batch).
    fn on_text_changed(&mut self, range: Range<usize>) {
        let _ = range;
    }

    /// The editor was tapped at `point`, resolving to the character at
    /// `range`.
    fn on_tapped(&mut self, point: Point, range: Range<usize>) {
        let _ = (point, range);
    }

    /// A layout pass finished; `complete` is `false` for partial passes.
    fn on_layout_finished(&mut self, complete: bool) {
        let _ = complete;
    }
}

impl EditorDelegate for () {}
