// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use core::ops::{Deref, DerefMut, Range};

use attributed_buffer::{AttributedString, RangeError, TextRange};
use smallvec::SmallVec;

use crate::attachment::{Attachment, AttachmentId, AttachmentRegistry, MARKER_STR};
use crate::attribute::{Attribute, AttributeKind};
use crate::codec::AttributedRun;
use crate::content::{ContentIter, EnumerationMode};

/// The coalesced result of one edit or one batch of edits.
///
/// `range` is the edited range in post-edit coordinates (the union of the
/// batch's edited ranges when several are coalesced) and `delta` the summed
/// signed change in length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEdit {
    /// The edited byte range, in post-edit coordinates.
    pub range: Range<usize>,

    /// The signed change in buffer length, in bytes.
    pub delta: isize,
}

/// The single gateway through which all buffer mutation passes.
///
/// Owns the attributed buffer and the attachment registry. Every mutation
/// records a [`PendingEdit`]; the pipeline collects it through
/// [`take_pending_edit`](Self::take_pending_edit) once the outermost editing
/// bracket is closed and notifies the processing chain exactly once.
///
/// Ranges that partially overlap an attachment marker are always expanded to
/// cover the whole marker: an attachment is atomic and is removed whole,
/// never split. Attachments whose markers are deleted are dropped from the
/// registry.
#[derive(Debug, Default)]
pub struct TextStore {
    buffer: AttributedString<Attribute>,
    attachments: AttachmentRegistry,
    editing_depth: u32,
    pending: Option<PendingEdit>,
    change_in_length: isize,
}

impl TextStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store over initial plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            buffer: AttributedString::new(text),
            ..Self::default()
        }
    }

    /// Read access to the attributed buffer.
    pub fn buffer(&self) -> &AttributedString<Attribute> {
        &self.buffer
    }

    /// Borrow the buffer text.
    pub fn as_str(&self) -> &str {
        self.buffer.as_str()
    }

    /// The buffer length in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The empty range at the end of the buffer.
    pub fn text_end_range(&self) -> Range<usize> {
        self.len()..self.len()
    }

    /// Enumerate the typed content of `range` (the whole buffer when `None`).
    pub fn contents(
        &self,
        range: Option<Range<usize>>,
        mode: EnumerationMode,
    ) -> Result<ContentIter<'_>, RangeError> {
        let range = range.unwrap_or(0..self.len());
        let range = TextRange::new(self.as_str(), range)?.as_range();
        Ok(ContentIter::new(&self.buffer, &self.attachments, range, mode))
    }

    /// The attachment markers whose ranges properly overlap `range`.
    pub(crate) fn markers_in(
        &self,
        range: &Range<usize>,
    ) -> SmallVec<[(Range<usize>, AttachmentId); 2]> {
        self.buffer
            .spans()
            .filter_map(|(span, attr)| match attr {
                Attribute::Attachment(id) if span.start < range.end && span.end > range.start => {
                    Some((span.clone(), *id))
                }
                _ => None,
            })
            .collect()
    }

    /// Expand `range` to fully cover every marker it partially overlaps.
    pub(crate) fn expand_over_markers(&self, range: Range<usize>) -> Range<usize> {
        let mut expanded = range;
        loop {
            let mut grew = false;
            for (span, _) in self.markers_in(&expanded) {
                if span.start < expanded.start {
                    expanded.start = span.start;
                    grew = true;
                }
                if span.end > expanded.end {
                    expanded.end = span.end;
                    grew = true;
                }
            }
            if !grew {
                return expanded;
            }
        }
    }

    /// Replace the characters in `range` with plain `text`.
    ///
    /// A range partially overlapping a marker is treated as a full-marker
    /// replace; the attachments in the replaced range are dropped.
    pub fn replace_characters(
        &mut self,
        range: Range<usize>,
        text: &str,
    ) -> Result<(), RangeError> {
        // Expand before validating: a range cutting into the middle of a
        // marker is a legal full-marker replace, not a boundary error.
        let expanded = self.expand_over_markers(range);
        let expanded = TextRange::new(self.as_str(), expanded)?.as_range();
        let removed: SmallVec<[AttachmentId; 2]> = self
            .markers_in(&expanded)
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        let delta = self.buffer.replace_range(expanded.clone(), text)?;
        for id in removed {
            self.attachments.remove(id);
        }
        self.record_edit(expanded.start..expanded.start + text.len(), delta);
        Ok(())
    }

    /// Replace the characters in `range` with an attributed run.
    pub fn replace_with_run(
        &mut self,
        range: Range<usize>,
        run: &AttributedRun,
    ) -> Result<(), RangeError> {
        // Validate the run-relative spans against the run's own text so a bad
        // run is rejected wholesale, before the buffer is touched.
        for (rel, _) in &run.attributes {
            TextRange::new(&run.text, rel.clone())?;
        }
        let base = self.expand_over_markers(range.clone()).start;
        self.replace_characters(range, &run.text)?;
        for (rel, attr) in &run.attributes {
            self.buffer
                .apply_attribute(base + rel.start..base + rel.end, attr.clone())?;
        }
        Ok(())
    }

    /// Insert `attachment` at `range`, replacing any existing content there.
    ///
    /// Writes exactly one tagged marker character into the buffer and hands
    /// back the handle to the registered attachment.
    pub fn insert_attachment(
        &mut self,
        range: Range<usize>,
        attachment: Attachment,
    ) -> Result<AttachmentId, RangeError> {
        let expanded = self.expand_over_markers(range);
        let expanded = TextRange::new(self.as_str(), expanded)?.as_range();
        let removed: SmallVec<[AttachmentId; 2]> = self
            .markers_in(&expanded)
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        let delta = self.buffer.replace_range(expanded.clone(), MARKER_STR)?;
        for id in removed {
            self.attachments.remove(id);
        }
        let id = self.attachments.insert(attachment);
        let marker = expanded.start..expanded.start + MARKER_STR.len();
        self.buffer
            .apply_attribute(marker.clone(), Attribute::Attachment(id))?;
        self.record_edit(marker, delta);
        Ok(id)
    }

    /// Apply `attribute` over `range`.
    pub fn add_attribute(
        &mut self,
        range: Range<usize>,
        attribute: Attribute,
    ) -> Result<(), RangeError> {
        self.buffer.apply_attribute(range.clone(), attribute)?;
        self.record_edit(range, 0);
        Ok(())
    }

    /// Remove all attributes of `kind` from `range`.
    ///
    /// Removing [`AttributeKind::Attachment`] also drops the attachments
    /// whose markers lie in the range from the registry; the marker
    /// characters themselves stay and must be deleted through
    /// [`replace_characters`](Self::replace_characters).
    pub fn remove_attributes(
        &mut self,
        range: Range<usize>,
        kind: AttributeKind,
    ) -> Result<(), RangeError> {
        if kind == AttributeKind::Attachment {
            for (_, id) in self.markers_in(&range) {
                self.attachments.remove(id);
            }
        }
        self.buffer
            .remove_attributes_where(range.clone(), |attr| attr.kind() == kind)?;
        self.record_edit(range, 0);
        Ok(())
    }

    /// The attachment behind `id`, if its marker is still in the buffer's
    /// registry.
    pub fn attachment(&self, id: AttachmentId) -> Option<&Attachment> {
        self.attachments.get(id)
    }

    /// The number of live attachments.
    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    /// The current buffer range of the attachment's marker.
    ///
    /// Returns `None` once the marker has been deleted; a detached attachment
    /// is an empty result, never an error.
    pub fn attachment_range(&self, id: AttachmentId) -> Option<Range<usize>> {
        self.buffer.spans().find_map(|(span, attr)| match attr {
            Attribute::Attachment(other) if *other == id => Some(span.clone()),
            _ => None,
        })
    }

    /// Toggle the two-phase-delete selection flag of an attachment.
    ///
    /// Returns `false` if the attachment is detached.
    pub fn mark_selected(&mut self, id: AttachmentId, selected: bool) -> bool {
        match self.attachments.get_mut(id) {
            Some(attachment) => {
                attachment.set_selected(selected);
                true
            }
            None => false,
        }
    }

    /// Clear the selected flag of every attachment whose marker is not
    /// fully covered by `selection`.
    pub(crate) fn deselect_outside(&mut self, selection: &Range<usize>) {
        let spans: SmallVec<[(Range<usize>, AttachmentId); 2]> = self
            .buffer
            .spans()
            .filter_map(|(span, attr)| match attr {
                Attribute::Attachment(id) => Some((span.clone(), *id)),
                _ => None,
            })
            .collect();
        for (span, id) in spans {
            if selection.start > span.start || span.end > selection.end {
                if let Some(attachment) = self.attachments.get_mut(id) {
                    attachment.set_selected(false);
                }
            }
        }
    }

    /// Open an editing bracket; notifications are held until the matching
    /// [`end_editing`](Self::end_editing).
    pub fn begin_editing(&mut self) {
        self.editing_depth += 1;
    }

    /// Close an editing bracket.
    pub fn end_editing(&mut self) {
        debug_assert!(self.editing_depth > 0, "unbalanced end_editing");
        self.editing_depth = self.editing_depth.saturating_sub(1);
    }

    /// Open an editing bracket that is guaranteed to close, even on early
    /// return.
    pub fn transaction(&mut self) -> Transaction<'_> {
        self.begin_editing();
        Transaction { store: self }
    }

    /// Returns `true` while an editing bracket is open.
    pub fn is_editing(&self) -> bool {
        self.editing_depth > 0
    }

    /// Take the coalesced edit awaiting notification.
    ///
    /// Returns `None` while an editing bracket is open: observers are
    /// notified exactly once per outermost bracket.
    pub fn take_pending_edit(&mut self) -> Option<PendingEdit> {
        if self.editing_depth == 0 {
            self.pending.take()
        } else {
            None
        }
    }

    /// The summed change in length since layout last caught up.
    ///
    /// Layout may lag storage by one pending edit; consumers of
    /// geometry-derived ranges compensate with this delta instead of assuming
    /// layout is current.
    pub fn change_in_length(&self) -> isize {
        self.change_in_length
    }

    /// Reset [`change_in_length`](Self::change_in_length); layout has caught
    /// up with storage.
    pub fn acknowledge_layout(&mut self) {
        self.change_in_length = 0;
    }

    fn record_edit(&mut self, range: Range<usize>, delta: isize) {
        self.change_in_length += delta;
        self.pending = Some(match self.pending.take() {
            Some(prior) => {
                // The prior range predates this edit; shift its endpoints
                // through the edit so the union stays in post-edit
                // coordinates. Endpoints inside the replaced text collapse
                // onto the replacement.
                let removed = range.len().wrapping_add_signed(-delta);
                let pre_end = range.start + removed;
                let start = if prior.range.start >= pre_end {
                    prior.range.start.saturating_add_signed(delta)
                } else {
                    prior.range.start.min(range.start)
                };
                let end = if prior.range.end >= pre_end {
                    prior.range.end.saturating_add_signed(delta)
                } else if prior.range.end > range.start {
                    range.end
                } else {
                    prior.range.end
                };
                PendingEdit {
                    range: start.min(range.start)..end.max(range.end),
                    delta: prior.delta + delta,
                }
            }
            None => PendingEdit { range, delta },
        });
    }
}

/// RAII editing bracket over a [`TextStore`].
///
/// Dereferences to the store; dropping it closes the bracket.
#[derive(Debug)]
pub struct Transaction<'a> {
    store: &'a mut TextStore,
}

impl Deref for Transaction<'_> {
    type Target = TextStore;

    fn deref(&self) -> &TextStore {
        self.store
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut TextStore {
        self.store
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.store.end_editing();
    }
}

#[cfg(test)]
mod tests {
    use super::{PendingEdit, TextStore};
    use crate::attachment::{
        Attachment, AttachmentKind, EmbeddedContent, MARKER_LEN, SizingPolicy,
    };
    use crate::attribute::{Attribute, AttributeKind, ContentName};
    use crate::codec::AttributedRun;
    use alloc::boxed::Box;
    use alloc::vec::Vec;
    use attributed_buffer::RangeErrorKind;

    #[derive(Debug)]
    struct Panel;

    impl EmbeddedContent for Panel {
        fn content_name(&self) -> ContentName {
            ContentName::new("panel")
        }
    }

    fn panel() -> Attachment {
        Attachment::new(Box::new(Panel), AttachmentKind::Block, SizingPolicy::FullWidth)
    }

    #[test]
    fn replace_records_one_pending_edit() {
        let mut store = TextStore::with_text("hello world");
        store.replace_characters(0..5, "goodbye").unwrap();
        assert_eq!(store.as_str(), "goodbye world");
        assert_eq!(
            store.take_pending_edit(),
            Some(PendingEdit {
                range: 0..7,
                delta: 2,
            })
        );
        assert_eq!(store.take_pending_edit(), None);
    }

    #[test]
    fn out_of_bounds_replace_is_rejected_wholesale() {
        let mut store = TextStore::with_text("abc");
        let err = store.replace_characters(1..9, "x").unwrap_err();
        assert_eq!(err.kind(), RangeErrorKind::InvalidBounds);
        assert_eq!(store.as_str(), "abc");
        assert_eq!(store.take_pending_edit(), None);
    }

    #[test]
    fn insert_attachment_writes_one_marker() {
        let mut store = TextStore::with_text("abcd");
        let id = store.insert_attachment(2..2, panel()).unwrap();
        assert_eq!(store.len(), 4 + MARKER_LEN);
        assert_eq!(store.attachment_range(id), Some(2..2 + MARKER_LEN));
        assert_eq!(store.attachment(id).unwrap().content_name().as_str(), "panel");
    }

    #[test]
    fn partial_marker_overlap_removes_whole_marker() {
        let mut store = TextStore::with_text("abcd");
        let id = store.insert_attachment(2..2, panel()).unwrap();
        store.take_pending_edit();
        // Delete a range that cuts into the middle of the marker.
        store.replace_characters(1..3, "").unwrap();
        assert_eq!(store.as_str(), "acd");
        assert_eq!(store.attachment_range(id), None);
        assert!(store.attachment(id).is_none());
        assert_eq!(store.attachment_count(), 0);
        let edit = store.take_pending_edit().unwrap();
        assert_eq!(edit.delta, -(1 + MARKER_LEN as isize));
    }

    #[test]
    fn mid_marker_insert_attachment_replaces_whole_marker() {
        let mut store = TextStore::with_text("ab");
        let first = store.insert_attachment(1..1, panel()).unwrap();
        // The range cuts into the middle of the first marker's bytes.
        let second = store.insert_attachment(2..3, panel()).unwrap();
        assert!(store.attachment(first).is_none());
        assert_eq!(store.attachment_range(second), Some(1..1 + MARKER_LEN));
        assert_eq!(store.len(), 2 + MARKER_LEN);
    }

    #[test]
    fn mid_char_range_outside_markers_is_still_rejected() {
        let mut store = TextStore::with_text("aé");
        let err = store.replace_characters(2..3, "x").unwrap_err();
        assert_eq!(err.kind(), RangeErrorKind::NotOnCharBoundary);
        assert_eq!(store.as_str(), "aé");
    }

    #[test]
    fn replacing_marker_range_replaces_attachment() {
        let mut store = TextStore::with_text("ab");
        let first = store.insert_attachment(1..1, panel()).unwrap();
        let second = store
            .insert_attachment(1..1 + MARKER_LEN, panel())
            .unwrap();
        assert!(store.attachment(first).is_none());
        assert_eq!(store.attachment_range(second), Some(1..1 + MARKER_LEN));
        assert_eq!(store.len(), 2 + MARKER_LEN);
    }

    #[test]
    fn transaction_coalesces_notifications() {
        let mut store = TextStore::with_text("abcdef");
        {
            let mut tx = store.transaction();
            tx.replace_characters(0..1, "X").unwrap();
            tx.replace_characters(5..6, "Y").unwrap();
            // Bracket still open: nothing to take.
            assert_eq!(tx.take_pending_edit(), None);
        }
        let edit = store.take_pending_edit().unwrap();
        assert_eq!(edit.range, 0..6);
        assert_eq!(edit.delta, 0);
    }

    #[test]
    fn coalesced_range_stays_in_post_edit_coordinates() {
        let mut store = TextStore::with_text("abcdef");
        {
            let mut tx = store.transaction();
            tx.replace_characters(5..6, "XYZ").unwrap();
            // A later edit before the first one shifts it left.
            tx.replace_characters(0..1, "").unwrap();
        }
        assert_eq!(store.as_str(), "bcdeXYZ");
        let edit = store.take_pending_edit().unwrap();
        assert_eq!(edit.range, 0..7);
        assert_eq!(edit.delta, 1);
        assert!(edit.range.end <= store.len());
    }

    #[test]
    fn coalescing_shifts_an_earlier_edit_at_the_same_position() {
        let mut store = TextStore::with_text("ab");
        {
            let mut tx = store.transaction();
            tx.replace_characters(1..1, "X").unwrap();
            tx.replace_characters(1..1, "Y").unwrap();
        }
        assert_eq!(store.as_str(), "aYXb");
        let edit = store.take_pending_edit().unwrap();
        assert_eq!(edit.range, 1..3);
        assert_eq!(edit.delta, 2);
    }

    #[test]
    fn transaction_closes_on_early_return() {
        let mut store = TextStore::with_text("abc");
        {
            let mut tx = store.transaction();
            // A failing edit inside the bracket must still close it.
            assert!(tx.replace_characters(0..9, "x").is_err());
        }
        assert!(!store.is_editing());
    }

    #[test]
    fn change_in_length_accumulates_until_layout_acknowledges() {
        let mut store = TextStore::with_text("abc");
        store.replace_characters(0..0, "123").unwrap();
        store.replace_characters(0..2, "").unwrap();
        assert_eq!(store.change_in_length(), 1);
        store.acknowledge_layout();
        assert_eq!(store.change_in_length(), 0);
    }

    #[test]
    fn replace_with_run_rebases_attributes() {
        let mut store = TextStore::with_text("abcd");
        let run = AttributedRun::plain("XY").with_attribute(0..2, Attribute::NoFocus);
        store.replace_with_run(2..2, &run).unwrap();
        assert_eq!(store.as_str(), "abXYcd");
        let spans: Vec<_> = store
            .buffer()
            .spans()
            .map(|(r, a)| (r.clone(), a.clone()))
            .collect();
        assert_eq!(spans, [(2..4, Attribute::NoFocus)]);
    }

    #[test]
    fn replace_with_run_rejects_bad_relative_spans() {
        let mut store = TextStore::with_text("abcd");
        let run = AttributedRun::plain("XY").with_attribute(0..3, Attribute::NoFocus);
        assert!(store.replace_with_run(0..0, &run).is_err());
        // Rejected wholesale: no partial apply.
        assert_eq!(store.as_str(), "abcd");
    }

    #[test]
    fn remove_attachment_attributes_detaches() {
        let mut store = TextStore::with_text("ab");
        let id = store.insert_attachment(1..1, panel()).unwrap();
        store
            .remove_attributes(0..store.len(), AttributeKind::Attachment)
            .unwrap();
        assert!(store.attachment(id).is_none());
        assert_eq!(store.attachment_range(id), None);
        // The marker character itself survives attribute removal.
        assert_eq!(store.len(), 2 + MARKER_LEN);
    }

    #[test]
    fn mark_selected_on_detached_attachment_fails() {
        let mut store = TextStore::with_text("ab");
        let id = store.insert_attachment(1..1, panel()).unwrap();
        assert!(store.mark_selected(id, true));
        store.replace_characters(1..1 + MARKER_LEN, "").unwrap();
        assert!(!store.mark_selected(id, true));
    }
}
