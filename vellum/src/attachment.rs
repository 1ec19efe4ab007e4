// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use core::fmt::Debug;

use hashbrown::HashMap;

use crate::attribute::ContentName;

/// The character standing in for an attachment in the buffer.
///
/// An attachment occupies exactly one character position; its byte range has
/// length [`MARKER_LEN`].
pub const MARKER_CHAR: char = '\u{FFFC}';

/// The length in bytes of [`MARKER_CHAR`] in UTF-8.
pub const MARKER_LEN: usize = 3;

pub(crate) const MARKER_STR: &str = "\u{FFFC}";

/// A non-owning handle to an [`Attachment`] held in a store's registry.
///
/// Handles stay valid across edits; once the attachment's marker is deleted
/// from the buffer, lookups through the handle return `None`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttachmentId(u64);

impl AttachmentId {
    /// Construct an id from its raw value.
    ///
    /// Useful for tests and for callers persisting handles; an id only means
    /// something to the registry that issued it.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value of this id.
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

/// How an attachment is sized relative to its container.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SizingPolicy {
    /// Size to the embedded content's natural size.
    MatchContent,

    /// Span the full width of the container.
    FullWidth,

    /// A fixed width in points.
    Fixed(f64),
}

/// Whether an attachment participates in text flow as a block or inline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttachmentKind {
    /// The attachment occupies its own paragraph-level slot.
    Block,

    /// The attachment flows inline with surrounding text.
    Inline,
}

/// The capability an object needs to be embedded in the buffer.
///
/// Concrete embedded types (a panel, a nested editor, a custom view model)
/// implement this to give the core a content name for enumeration; everything
/// else about them is opaque to the core.
pub trait EmbeddedContent: Debug {
    /// The content name reported for this object's segments.
    fn content_name(&self) -> ContentName;
}

/// An embedded object occupying exactly one character position in the buffer.
///
/// The buffer itself stores only an [`AttachmentId`]-tagged marker character;
/// the attachment lives in the store's registry and is dropped when the
/// marker is deleted.
#[derive(Debug)]
pub struct Attachment {
    content: Box<dyn EmbeddedContent>,
    kind: AttachmentKind,
    sizing: SizingPolicy,
    select_before_delete: bool,
    is_selected: bool,
}

impl Attachment {
    /// Create an attachment around `content`.
    pub fn new(
        content: Box<dyn EmbeddedContent>,
        kind: AttachmentKind,
        sizing: SizingPolicy,
    ) -> Self {
        Self {
            content,
            kind,
            sizing,
            select_before_delete: false,
            is_selected: false,
        }
    }

    /// Require a deletion to first select this attachment.
    ///
    /// With this set, the first backspace over the attachment selects it and
    /// removes nothing; only a second backspace deletes it.
    pub fn with_select_before_delete(mut self) -> Self {
        self.select_before_delete = true;
        self
    }

    /// The embedded content.
    pub fn content(&self) -> &dyn EmbeddedContent {
        &*self.content
    }

    /// The content name of the embedded content.
    pub fn content_name(&self) -> ContentName {
        self.content.content_name()
    }

    /// Whether this attachment is block or inline content.
    pub fn kind(&self) -> AttachmentKind {
        self.kind
    }

    /// The sizing policy for this attachment.
    pub fn sizing(&self) -> SizingPolicy {
        self.sizing
    }

    /// Whether deletion requires a prior selection of this attachment.
    pub fn select_before_delete(&self) -> bool {
        self.select_before_delete
    }

    /// Whether this attachment is currently selected for deletion.
    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.is_selected = selected;
    }
}

/// Owning registry of attachments, keyed by id.
#[derive(Debug, Default)]
pub(crate) struct AttachmentRegistry {
    map: HashMap<AttachmentId, Attachment>,
    next: u64,
}

impl AttachmentRegistry {
    pub(crate) fn insert(&mut self, attachment: Attachment) -> AttachmentId {
        self.next += 1;
        let id = AttachmentId(self.next);
        self.map.insert(id, attachment);
        id
    }

    pub(crate) fn get(&self, id: AttachmentId) -> Option<&Attachment> {
        self.map.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: AttachmentId) -> Option<&mut Attachment> {
        self.map.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: AttachmentId) -> Option<Attachment> {
        self.map.remove(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}
