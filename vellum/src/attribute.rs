// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::borrow::Cow;

use crate::attachment::AttachmentId;

/// The name of a kind of editor content.
///
/// Names classify the segments produced by content enumeration ("paragraph",
/// "panel", ...) and tag buffer ranges through
/// [`Attribute::BlockContentType`] and [`Attribute::InlineContentType`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ContentName(Cow<'static, str>);

impl ContentName {
    /// Plain paragraph text. The default name for text content.
    pub const PARAGRAPH: Self = Self(Cow::Borrowed("paragraph"));

    /// A plain text run without block semantics.
    pub const TEXT: Self = Self(Cow::Borrowed("text"));

    /// Content that can be displayed but never focused or edited.
    pub const VIEW_ONLY: Self = Self(Cow::Borrowed("viewOnly"));

    /// Content of unknown provenance.
    pub const UNKNOWN: Self = Self(Cow::Borrowed("unknown"));

    /// Create a content name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for ContentName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ContentName({:?})", self.0)
    }
}

impl core::fmt::Display for ContentName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ContentName {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

/// A semantic attribute applied to a range of the buffer.
///
/// This is the closed set of attributes the core understands; anything else a
/// caller wants to track rides on the content types it defines through
/// [`ContentName`]. Unknown attribute keys have no representation and are
/// rejected at the API boundary by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attribute {
    /// Marks an attachment marker position. The range carrying this
    /// attribute is exactly one character wide.
    Attachment(AttachmentId),

    /// Names the block-level content type of the tagged range.
    BlockContentType(ContentName),

    /// Names the inline content type of the tagged range.
    InlineContentType(ContentName),

    /// The tagged range cannot hold focus; selections skip over it.
    NoFocus,
}

impl Attribute {
    /// The key-only discriminant of this attribute.
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Attachment(_) => AttributeKind::Attachment,
            Self::BlockContentType(_) => AttributeKind::BlockContentType,
            Self::InlineContentType(_) => AttributeKind::InlineContentType,
            Self::NoFocus => AttributeKind::NoFocus,
        }
    }
}

/// The key of an [`Attribute`], used to remove attributes without knowing
/// their values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Key of [`Attribute::Attachment`].
    Attachment,

    /// Key of [`Attribute::BlockContentType`].
    BlockContentType,

    /// Key of [`Attribute::InlineContentType`].
    InlineContentType,

    /// Key of [`Attribute::NoFocus`].
    NoFocus,
}
