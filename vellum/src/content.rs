// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content enumeration.
//!
//! [`ContentIter`] walks a buffer left to right and classifies it into typed
//! segments: coalesced text runs and attachment markers. Segmentation is
//! derived on demand and never stored; every call to
//! [`TextStore::contents`](crate::TextStore::contents) starts a fresh scan
//! over the buffer as it is at that moment.

use attributed_buffer::AttributedString;
use core::ops::Range;

use crate::attachment::{AttachmentId, AttachmentKind, AttachmentRegistry};
use crate::attribute::{Attribute, ContentName};

/// How text runs are partitioned during enumeration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum EnumerationMode {
    /// Partition at paragraph breaks and block content type changes, so no
    /// text segment spans two paragraphs. A newline terminates the segment
    /// it ends.
    #[default]
    Block,

    /// Plain scan: only attachment markers partition the text.
    Inline,
}

/// A typed, read-only view of a sub-range of the buffer.
///
/// Items borrow the buffer and are never persisted; re-derive them after any
/// mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentItem<'a> {
    /// A coalesced run of plain text.
    Text {
        /// The block content name of the run.
        name: ContentName,
        /// The byte range of the run in the buffer.
        range: Range<usize>,
        /// The run's text.
        text: &'a str,
    },

    /// A single attachment marker.
    Attachment {
        /// The content name of the embedded object.
        name: ContentName,
        /// The byte range of the marker in the buffer.
        range: Range<usize>,
        /// Handle to the attachment in the store's registry.
        id: AttachmentId,
        /// Whether the attachment is block or inline content.
        kind: AttachmentKind,
    },
}

impl ContentItem<'_> {
    /// The content name of this item.
    pub fn name(&self) -> &ContentName {
        match self {
            Self::Text { name, .. } | Self::Attachment { name, .. } => name,
        }
    }

    /// The byte range this item covers.
    pub fn range(&self) -> Range<usize> {
        match self {
            Self::Text { range, .. } | Self::Attachment { range, .. } => range.clone(),
        }
    }
}

/// Lazy iterator over the typed content of a buffer range.
#[derive(Debug)]
pub struct ContentIter<'a> {
    buffer: &'a AttributedString<Attribute>,
    registry: &'a AttachmentRegistry,
    range: Range<usize>,
    mode: EnumerationMode,
    pos: usize,
}

impl<'a> ContentIter<'a> {
    pub(crate) fn new(
        buffer: &'a AttributedString<Attribute>,
        registry: &'a AttachmentRegistry,
        range: Range<usize>,
        mode: EnumerationMode,
    ) -> Self {
        let pos = range.start;
        Self {
            buffer,
            registry,
            range,
            mode,
            pos,
        }
    }

    fn attachment_span_at(&self, index: usize) -> Option<(Range<usize>, AttachmentId)> {
        self.buffer.spans().find_map(|(span, attr)| match attr {
            Attribute::Attachment(id) if span.contains(&index) => Some((span.clone(), *id)),
            _ => None,
        })
    }

    fn block_name_at(&self, index: usize) -> ContentName {
        self.buffer
            .attributes_at(index)
            .find_map(|attr| match attr {
                Attribute::BlockContentType(name) => Some(name.clone()),
                _ => None,
            })
            .unwrap_or(ContentName::PARAGRAPH)
    }
}

impl<'a> Iterator for ContentIter<'a> {
    type Item = ContentItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.range.end {
            return None;
        }
        let start = self.pos;

        if let Some((span, id)) = self.attachment_span_at(start) {
            let end = span.end.min(self.range.end);
            self.pos = end;
            let (name, kind) = self
                .registry
                .get(id)
                .map(|a| (a.content_name(), a.kind()))
                .unwrap_or((ContentName::UNKNOWN, AttachmentKind::Inline));
            return Some(ContentItem::Attachment {
                name,
                range: start..end,
                id,
                kind,
            });
        }

        let name = self.block_name_at(start);
        let mut end = self.range.end;
        for (i, ch) in self.buffer.as_str()[start..self.range.end].char_indices() {
            let abs = start + i;
            if abs > start
                && (self.attachment_span_at(abs).is_some() || self.block_name_at(abs) != name)
            {
                end = abs;
                break;
            }
            if self.mode == EnumerationMode::Block && ch == '\n' {
                // The newline belongs to the paragraph it terminates.
                end = abs + 1;
                break;
            }
        }
        self.pos = end;
        Some(ContentItem::Text {
            name,
            range: start..end,
            text: &self.buffer.as_str()[start..end],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentItem, ContentIter, EnumerationMode};
    use crate::attachment::{
        Attachment, AttachmentKind, AttachmentRegistry, EmbeddedContent, MARKER_STR, SizingPolicy,
    };
    use crate::attribute::{Attribute, ContentName};
    use alloc::boxed::Box;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;
    use attributed_buffer::AttributedString;

    #[derive(Debug)]
    struct Panel;

    impl EmbeddedContent for Panel {
        fn content_name(&self) -> ContentName {
            ContentName::new("panel")
        }
    }

    fn buffer_with_marker() -> (AttributedString<Attribute>, AttachmentRegistry) {
        let mut registry = AttachmentRegistry::default();
        let id = registry.insert(Attachment::new(
            Box::new(Panel),
            AttachmentKind::Inline,
            SizingPolicy::MatchContent,
        ));
        let text = format!("ab{MARKER_STR}cd");
        let mut buffer = AttributedString::new(text);
        buffer
            .apply_attribute(2..2 + MARKER_STR.len(), Attribute::Attachment(id))
            .unwrap();
        (buffer, registry)
    }

    #[test]
    fn marker_partitions_text_runs() {
        let (buffer, registry) = buffer_with_marker();
        let len = buffer.len();
        let items: Vec<_> =
            ContentIter::new(&buffer, &registry, 0..len, EnumerationMode::Block).collect();
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[0], ContentItem::Text { text: "ab", .. }));
        assert!(matches!(
            &items[1],
            ContentItem::Attachment {
                kind: AttachmentKind::Inline,
                ..
            }
        ));
        assert_eq!(items[1].name().as_str(), "panel");
        assert!(matches!(&items[2], ContentItem::Text { text: "cd", .. }));
    }

    #[test]
    fn newline_terminates_its_paragraph() {
        let registry = AttachmentRegistry::default();
        let buffer = AttributedString::<Attribute>::new("ab\ncd");
        let items: Vec<_> =
            ContentIter::new(&buffer, &registry, 0..5, EnumerationMode::Block).collect();
        let texts: Vec<_> = items
            .iter()
            .map(|i| match i {
                ContentItem::Text { text, .. } => *text,
                ContentItem::Attachment { .. } => panic!("unexpected attachment"),
            })
            .collect();
        assert_eq!(texts, ["ab\n", "cd"]);
    }

    #[test]
    fn inline_mode_ignores_paragraph_breaks() {
        let registry = AttachmentRegistry::default();
        let buffer = AttributedString::<Attribute>::new("ab\ncd");
        let items: Vec<_> =
            ContentIter::new(&buffer, &registry, 0..5, EnumerationMode::Inline).collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], ContentItem::Text { text: "ab\ncd", .. }));
    }

    #[test]
    fn block_content_type_change_splits_runs() {
        let registry = AttachmentRegistry::default();
        let mut buffer = AttributedString::<Attribute>::new("abcdef");
        buffer
            .apply_attribute(2..4, Attribute::BlockContentType(ContentName::new("quote")))
            .unwrap();
        let items: Vec<_> =
            ContentIter::new(&buffer, &registry, 0..6, EnumerationMode::Block).collect();
        let names: Vec<_> = items.iter().map(|i| String::from(i.name().as_str())).collect();
        assert_eq!(names, ["paragraph", "quote", "paragraph"]);
    }

    #[test]
    fn enumeration_is_idempotent() {
        let (buffer, registry) = buffer_with_marker();
        let len = buffer.len();
        let a: Vec<_> =
            ContentIter::new(&buffer, &registry, 0..len, EnumerationMode::Block).collect();
        let b: Vec<_> =
            ContentIter::new(&buffer, &registry, 0..len, EnumerationMode::Block).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn sub_range_enumeration_clamps_markers() {
        let (buffer, registry) = buffer_with_marker();
        // Start inside the trailing text.
        let len = buffer.len();
        let items: Vec<_> =
            ContentIter::new(&buffer, &registry, len - 2..len, EnumerationMode::Block).collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], ContentItem::Text { text: "cd", .. }));
    }
}
