// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content encoding and decoding capability traits.
//!
//! The core produces [`ContentItem`]s and consumes [`AttributedRun`]s; the
//! conversions to and from any external representation (structured data,
//! markup, ...) live with the caller behind these traits.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::attribute::{Attribute, ContentName};
use crate::content::ContentItem;

/// An owned piece of attributed text: decoder output and gateway input.
///
/// Attribute ranges are relative to the run's own text; the store rebases
/// them when the run is inserted.
#[derive(Clone, Debug, Default)]
pub struct AttributedRun {
    /// The run's text.
    pub text: String,

    /// Attribute spans over `text`, in run-relative byte ranges.
    pub attributes: Vec<(Range<usize>, Attribute)>,
}

impl AttributedRun {
    /// A run of plain text with no attributes.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: Vec::new(),
        }
    }

    /// Add an attribute over a run-relative range.
    pub fn with_attribute(mut self, range: Range<usize>, attribute: Attribute) -> Self {
        self.attributes.push((range, attribute));
        self
    }
}

/// Encodes enumerated content into an external representation.
///
/// Returning `None` skips the item; [`Editor::transform_contents`] collects
/// only the successfully encoded values.
///
/// [`Editor::transform_contents`]: crate::Editor::transform_contents
pub trait ContentEncoder {
    /// The external representation produced per item.
    type Encoded;

    /// Encode one content item, or decline it.
    fn encode(&self, item: &ContentItem<'_>) -> Option<Self::Encoded>;
}

/// Decodes an opaque external value into an insertable attributed run.
pub trait ContentDecoder {
    /// The external value consumed.
    type Value;

    /// Decode `value` as content named `name`, or decline it.
    fn decode(&self, name: &ContentName, value: Self::Value) -> Option<AttributedRun>;
}

#[cfg(test)]
mod tests {
    use super::AttributedRun;
    use crate::attribute::Attribute;

    #[test]
    fn builder_collects_attributes() {
        let run = AttributedRun::plain("hello").with_attribute(0..5, Attribute::NoFocus);
        assert_eq!(run.text, "hello");
        assert_eq!(run.attributes.len(), 1);
        assert_eq!(run.attributes[0].0, 0..5);
    }
}
