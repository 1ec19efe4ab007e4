// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::{Deref, DerefMut, Range};

use attributed_buffer::{RangeError, TextRange};
use peniko::kurbo::{Point, Rect};

use crate::attachment::{Attachment, AttachmentId};
use crate::attribute::{Attribute, AttributeKind, ContentName};
use crate::codec::ContentEncoder;
use crate::content::{ContentIter, EnumerationMode};
use crate::delegate::{EditorDelegate, EditorKey, KeyOutcome, Modifiers};
use crate::layout::LayoutProvider;
use crate::processor::{EditCommand, ProcessingChain};
use crate::selection::snap;
use crate::store::TextStore;

/// The editing pipeline.
///
/// All user and host edits enter here; the editor routes them through key
/// interception, the atomic-region checks, the store, and the processing
/// chain, then settles the selection and notifies the delegate. It owns the
/// store outright, so nothing mutates the buffer behind its back.
#[derive(Debug)]
pub struct Editor<D: EditorDelegate = (), L: LayoutProvider = ()> {
    store: TextStore,
    chain: ProcessingChain,
    delegate: D,
    layout: L,
    selection: Range<usize>,
    focused: bool,
}

impl Editor<(), ()> {
    /// An editor with no delegate and no layout, as used headless.
    pub fn headless(text: impl Into<String>) -> Self {
        Self::with_text(text, (), ())
    }
}

impl<D: EditorDelegate, L: LayoutProvider> Editor<D, L> {
    /// An empty editor.
    pub fn new(delegate: D, layout: L) -> Self {
        Self::with_text(String::new(), delegate, layout)
    }

    /// An editor over initial plain text.
    pub fn with_text(text: impl Into<String>, delegate: D, layout: L) -> Self {
        Self {
            store: TextStore::with_text(text),
            chain: ProcessingChain::new(),
            delegate,
            layout,
            selection: 0..0,
            focused: false,
        }
    }

    /// The buffer text.
    pub fn as_str(&self) -> &str {
        self.store.as_str()
    }

    /// The buffer length in bytes.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Read access to the store.
    pub fn store(&self) -> &TextStore {
        &self.store
    }

    /// The current selection.
    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Whether the editor currently has focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The processing chain, for registering processors.
    pub fn chain_mut(&mut self) -> &mut ProcessingChain {
        &mut self.chain
    }

    /// The delegate.
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// The delegate, mutably.
    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    /// The layout provider.
    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// The layout provider, mutably.
    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    /// Enumerate the typed content of `range` (the whole buffer when
    /// `None`).
    pub fn contents(
        &self,
        range: Option<Range<usize>>,
        mode: EnumerationMode,
    ) -> Result<ContentIter<'_>, RangeError> {
        self.store.contents(range, mode)
    }

    /// Encode the content of `range` through `encoder`, skipping items the
    /// encoder declines.
    pub fn transform_contents<E: ContentEncoder>(
        &self,
        range: Option<Range<usize>>,
        mode: EnumerationMode,
        encoder: &E,
    ) -> Result<Vec<E::Encoded>, RangeError> {
        Ok(self
            .store
            .contents(range, mode)?
            .filter_map(|item| encoder.encode(&item))
            .collect())
    }

    /// Type `text` at the current selection.
    ///
    /// `"\n"` and `"\t"` are routed through key interception first, like
    /// the physical keys.
    pub fn insert(&mut self, text: &str) -> Result<(), RangeError> {
        match text {
            "\n" => self.key(EditorKey::Enter, Modifiers::empty()),
            "\t" => self.key(EditorKey::Tab, Modifiers::empty()),
            _ => self.commit_insert(text),
        }
    }

    /// Delete backward from the current selection.
    pub fn backspace(&mut self) -> Result<(), RangeError> {
        self.key(EditorKey::Backspace, Modifiers::empty())
    }

    /// Feed a structural key through the pipeline.
    ///
    /// The delegate sees the key first and may suppress its default edit;
    /// modifier state is passed through untouched, so a shift-Enter reaches
    /// the delegate as such.
    pub fn key(&mut self, key: EditorKey, modifiers: Modifiers) -> Result<(), RangeError> {
        let verdict = self
            .delegate
            .on_key_received(key, modifiers, self.selection.clone());
        if verdict == KeyOutcome::Suppress {
            return Ok(());
        }
        match key {
            EditorKey::Enter => self.commit_insert("\n"),
            EditorKey::Tab => self.commit_insert("\t"),
            EditorKey::Backspace => self.commit_backspace(),
        }
    }

    /// Replace `range` programmatically.
    ///
    /// Goes through the gateway and the processing chain, but skips key
    /// interception and the two-phase delete check.
    pub fn replace_characters(
        &mut self,
        range: Range<usize>,
        text: &str,
    ) -> Result<(), RangeError> {
        let prev = self.selection.clone();
        self.chain.will_process(&self.store, range.clone(), text);
        self.store.replace_characters(range, text)?;
        self.settle(prev);
        Ok(())
    }

    /// Apply `attribute` over `range`.
    pub fn add_attribute(
        &mut self,
        range: Range<usize>,
        attribute: Attribute,
    ) -> Result<(), RangeError> {
        let prev = self.selection.clone();
        self.store.add_attribute(range, attribute)?;
        self.settle(prev);
        Ok(())
    }

    /// Remove all attributes of `kind` from `range`.
    pub fn remove_attributes(
        &mut self,
        range: Range<usize>,
        kind: AttributeKind,
    ) -> Result<(), RangeError> {
        let prev = self.selection.clone();
        self.store.remove_attributes(range, kind)?;
        self.settle(prev);
        Ok(())
    }

    /// Insert `attachment` at `range`, replacing any content there. The
    /// caret lands after the marker.
    pub fn insert_attachment(
        &mut self,
        range: Range<usize>,
        attachment: Attachment,
    ) -> Result<AttachmentId, RangeError> {
        let prev = self.selection.clone();
        let id = self.store.insert_attachment(range, attachment)?;
        if let Some(marker) = self.store.attachment_range(id) {
            self.selection = marker.end..marker.end;
        }
        self.settle(prev);
        Ok(id)
    }

    /// The attachment behind `id`, if still attached.
    pub fn attachment(&self, id: AttachmentId) -> Option<&Attachment> {
        self.store.attachment(id)
    }

    /// The current marker range of an attachment.
    pub fn attachment_range(&self, id: AttachmentId) -> Option<Range<usize>> {
        self.store.attachment_range(id)
    }

    /// The on-screen frame of an attachment's marker, per the layout.
    pub fn attachment_frame(&self, id: AttachmentId) -> Option<Rect> {
        let range = self.store.attachment_range(id)?;
        Some(self.layout.bounding_rect(range))
    }

    /// Move the selection.
    ///
    /// The request is snapped against no-focus runs and markers; the
    /// delegate and the chain are notified only if the settled selection
    /// differs from the current one.
    pub fn set_selection(&mut self, range: Range<usize>) -> Result<(), RangeError> {
        TextRange::new(self.store.as_str(), range.clone())?;
        let prev = self.selection.clone();
        let snapped = snap(self.store.buffer(), &prev, range);
        if snapped == prev {
            return Ok(());
        }
        self.selection = snapped.clone();
        self.store.deselect_outside(&snapped);
        self.notify_selection(prev, snapped.clone());
        let commands = self.chain.selection_changed(&self.store, snapped);
        self.apply_commands(commands);
        let prev = self.selection.clone();
        self.settle(prev);
        Ok(())
    }

    /// Open an edit batch: all edits until the guard drops coalesce into
    /// one notification round.
    pub fn batch(&mut self) -> EditorBatch<'_, D, L> {
        self.store.begin_editing();
        EditorBatch {
            prev: self.selection.clone(),
            editor: self,
        }
    }

    /// The editor gained focus.
    pub fn focus_gained(&mut self) {
        self.focused = true;
        self.delegate.on_focus_gained(self.selection.clone());
        let selection = self.selection.clone();
        self.notify_selection(selection.clone(), selection);
    }

    /// The editor lost focus.
    ///
    /// Focus state and attachment selection are cleared before the
    /// delegate hears about it, so a delegate reading back sees the editor
    /// already inactive.
    pub fn focus_lost(&mut self) {
        self.focused = false;
        self.store.deselect_outside(&(0..0));
        self.delegate.on_focus_lost();
    }

    /// A tap landed at `point`; resolve it to a character range and tell
    /// the delegate.
    pub fn tap(&mut self, point: Point) {
        let Some(index) = self.layout.character_index(point) else {
            return;
        };
        let text = self.store.as_str();
        let range = if index >= text.len() {
            text.len()..text.len()
        } else {
            let start = floor_char_boundary(text, index);
            start..next_char_boundary(text, start)
        };
        self.delegate.on_tapped(point, range);
    }

    /// A layout pass finished; storage and layout agree again.
    pub fn layout_finished(&mut self, complete: bool) {
        self.store.acknowledge_layout();
        self.delegate.on_layout_finished(complete);
    }

    /// The byte range of the line containing `at`, per the layout.
    ///
    /// Layout may lag the buffer by one edit; the fragment found is widened
    /// by the outstanding change in length so callers see current
    /// coordinates. Returns `None` when layout has no fragment at or before
    /// `at`.
    pub fn line_range(&self, at: usize) -> Option<Range<usize>> {
        let text = self.store.as_str();
        let mut index = at.min(text.len());
        loop {
            if let Some(fragment) = self.layout.line_fragment_range(index) {
                let end = fragment
                    .end
                    .saturating_add_signed(self.store.change_in_length())
                    .min(text.len());
                return Some(fragment.start.min(end)..end);
            }
            if index == 0 {
                return None;
            }
            index = floor_char_boundary(text, index - 1);
        }
    }

    fn commit_insert(&mut self, text: &str) -> Result<(), RangeError> {
        let prev = self.selection.clone();
        let target = self.store.expand_over_markers(prev.clone());
        self.chain.will_process(&self.store, target.clone(), text);
        self.store.replace_characters(target.clone(), text)?;
        let caret = target.start + text.len();
        self.selection = caret..caret;
        self.settle(prev);
        Ok(())
    }

    fn commit_backspace(&mut self) -> Result<(), RangeError> {
        let prev = self.selection.clone();
        let target = if prev.is_empty() {
            if prev.start == 0 {
                return Ok(());
            }
            floor_char_boundary(self.store.as_str(), prev.start - 1)..prev.start
        } else {
            prev.clone()
        };
        let target = self.store.expand_over_markers(target);

        // Two-phase delete: a deletion covering exactly one guarded,
        // not-yet-selected attachment selects it instead of deleting. The
        // next backspace goes through.
        let markers = self.store.markers_in(&target);
        if let [(marker, id)] = markers.as_slice() {
            let guarded = self
                .store
                .attachment(*id)
                .is_some_and(|a| a.select_before_delete() && !a.is_selected());
            if guarded {
                let marker = marker.clone();
                self.store.mark_selected(*id, true);
                // Selection highlight changed without a text edit.
                self.layout.invalidate_display(marker.clone());
                self.selection = marker.clone();
                if marker != prev {
                    self.notify_selection(prev, marker);
                }
                return Ok(());
            }
        }

        self.chain.will_process(&self.store, target.clone(), "");
        self.store.replace_characters(target.clone(), "")?;
        self.selection = target.start..target.start;
        self.settle(prev);
        Ok(())
    }

    /// Drain pending edits through the chain, then settle the selection.
    ///
    /// Each coalesced edit gets one chain dispatch, one layout
    /// invalidation, and one `on_text_changed`. Commands queued by
    /// processors are applied between rounds and feed back into the loop.
    fn settle(&mut self, prev: Range<usize>) {
        while let Some(edit) = self.store.take_pending_edit() {
            let dispatch = self.chain.dispatch(
                &self.store,
                self.selection.clone(),
                edit.range.clone(),
                edit.delta,
            );
            self.apply_commands(dispatch.commands);
            self.layout.invalidate_layout(edit.range.clone());
            self.delegate.on_text_changed(edit.range);
        }
        let snapped = snap(self.store.buffer(), &prev, self.selection.clone());
        self.selection = snapped.clone();
        self.store.deselect_outside(&snapped);
        if snapped != prev {
            self.notify_selection(prev, snapped);
        }
    }

    /// Apply deferred commands in request order. A command with a stale
    /// range is logged and skipped; the rest still apply.
    fn apply_commands(&mut self, commands: Vec<EditCommand>) {
        for command in commands {
            let result = match command {
                EditCommand::Replace { range, text } => {
                    self.store.replace_characters(range, &text)
                }
                EditCommand::ReplaceWithRun { range, run } => {
                    self.store.replace_with_run(range, &run)
                }
                EditCommand::AddAttribute { range, attribute } => {
                    self.store.add_attribute(range, attribute)
                }
                EditCommand::RemoveAttributes { range, kind } => {
                    self.store.remove_attributes(range, kind)
                }
                EditCommand::SetSelection { range } => {
                    let snapped = snap(self.store.buffer(), &self.selection.clone(), range);
                    self.selection = snapped;
                    Ok(())
                }
            };
            if let Err(err) = result {
                log::warn!("deferred edit command failed: {err}");
            }
        }
    }

    fn notify_selection(&mut self, old: Range<usize>, new: Range<usize>) {
        let attributes: Vec<Attribute> = self
            .store
            .buffer()
            .attributes_at(new.start)
            .cloned()
            .collect();
        let content_type = self.block_content_type_at(new.start);
        self.delegate
            .on_selection_changed(old, new, &attributes, &content_type);
    }

    /// The block content name governing `index`; plain text is paragraph
    /// content.
    fn block_content_type_at(&self, index: usize) -> ContentName {
        self.store
            .buffer()
            .attributes_at(index)
            .find_map(|attr| match attr {
                Attribute::BlockContentType(name) => Some(name.clone()),
                _ => None,
            })
            .unwrap_or(ContentName::PARAGRAPH)
    }
}

impl<D: EditorDelegate + Default, L: LayoutProvider + Default> Default for Editor<D, L> {
    fn default() -> Self {
        Self::new(D::default(), L::default())
    }
}

/// RAII edit batch over an [`Editor`].
///
/// Dereferences to the editor; dropping it closes the batch, runs the
/// processing chain once over the coalesced edit, and settles the
/// selection.
#[derive(Debug)]
pub struct EditorBatch<'a, D: EditorDelegate, L: LayoutProvider> {
    editor: &'a mut Editor<D, L>,
    prev: Range<usize>,
}

impl<D: EditorDelegate, L: LayoutProvider> Deref for EditorBatch<'_, D, L> {
    type Target = Editor<D, L>;

    fn deref(&self) -> &Editor<D, L> {
        self.editor
    }
}

impl<D: EditorDelegate, L: LayoutProvider> DerefMut for EditorBatch<'_, D, L> {
    fn deref_mut(&mut self) -> &mut Editor<D, L> {
        self.editor
    }
}

impl<D: EditorDelegate, L: LayoutProvider> Drop for EditorBatch<'_, D, L> {
    fn drop(&mut self) {
        self.editor.store.end_editing();
        let prev = core::mem::replace(&mut self.prev, 0..0);
        self.editor.settle(prev);
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    index
        + text[index..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(0)
}
