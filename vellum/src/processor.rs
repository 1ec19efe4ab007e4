// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use attributed_buffer::{AttributedString, RangeError};

use crate::attachment::{Attachment, AttachmentId};
use crate::attribute::{Attribute, AttributeKind};
use crate::codec::AttributedRun;
use crate::content::{ContentIter, EnumerationMode};
use crate::store::TextStore;

/// Relative importance of a processor within the chain.
///
/// The chain runs processors in descending priority; within one priority,
/// registration order decides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProcessingPriority {
    /// Runs after every other priority.
    Low,
    /// The default.
    Medium,
    /// Runs before [`Medium`](Self::Medium) and [`Low`](Self::Low).
    High,
    /// A claim at this priority interrupts every processor that already ran
    /// in the same dispatch.
    Exclusive,
}

/// Whether a processor claimed an edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Processed {
    /// The edit was claimed; the chain stops here.
    Handled,
    /// The edit was not claimed; the chain continues.
    NotHandled,
}

/// A recoverable processor failure.
///
/// The chain logs the failure and treats the processor as having declined
/// the edit; processing always continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessorError {
    message: Cow<'static, str>,
}

impl ProcessorError {
    /// Create an error with a human-readable message.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ProcessorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "text processor failed: {}", self.message)
    }
}

impl core::error::Error for ProcessorError {}

/// A mutation requested from inside a dispatch.
///
/// Processors observe a store that is mid-notification and must not mutate
/// it re-entrantly; they queue commands instead, and the editor applies the
/// queue in order once the dispatch returns.
#[derive(Clone, Debug)]
pub enum EditCommand {
    /// Replace `range` with plain text.
    Replace {
        /// The byte range to replace.
        range: Range<usize>,
        /// The replacement text.
        text: String,
    },
    /// Replace `range` with an attributed run.
    ReplaceWithRun {
        /// The byte range to replace.
        range: Range<usize>,
        /// The replacement run.
        run: AttributedRun,
    },
    /// Apply an attribute over `range`.
    AddAttribute {
        /// The byte range to attribute.
        range: Range<usize>,
        /// The attribute to apply.
        attribute: Attribute,
    },
    /// Remove all attributes of one kind from `range`.
    RemoveAttributes {
        /// The byte range to strip.
        range: Range<usize>,
        /// Which attribute kind to remove.
        kind: AttributeKind,
    },
    /// Move the selection.
    SetSelection {
        /// The requested selection, snapped on application.
        range: Range<usize>,
    },
}

/// What a processor sees and may request during a dispatch.
///
/// Read access goes straight to the store; writes are deferred through
/// [`EditCommand`]s.
#[derive(Debug)]
pub struct ProcessorScope<'a> {
    store: &'a TextStore,
    selection: Range<usize>,
    commands: Vec<EditCommand>,
}

impl<'a> ProcessorScope<'a> {
    pub(crate) fn new(store: &'a TextStore, selection: Range<usize>) -> Self {
        Self {
            store,
            selection,
            commands: Vec::new(),
        }
    }

    pub(crate) fn into_commands(self) -> Vec<EditCommand> {
        self.commands
    }

    /// The buffer text.
    pub fn as_str(&self) -> &'a str {
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

    /// The attributed buffer.
    pub fn buffer(&self) -> &'a AttributedString<Attribute> {
        self.store.buffer()
    }

    /// The selection as of this dispatch.
    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Enumerate the typed content of `range` (the whole buffer when
    /// `None`).
    pub fn contents(
        &self,
        range: Option<Range<usize>>,
        mode: EnumerationMode,
    ) -> Result<ContentIter<'a>, RangeError> {
        self.store.contents(range, mode)
    }

    /// The attachment behind `id`, if still attached.
    pub fn attachment(&self, id: AttachmentId) -> Option<&'a Attachment> {
        self.store.attachment(id)
    }

    /// The current marker range of an attachment.
    pub fn attachment_range(&self, id: AttachmentId) -> Option<Range<usize>> {
        self.store.attachment_range(id)
    }

    /// Queue a plain-text replacement.
    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.commands.push(EditCommand::Replace {
            range,
            text: text.into(),
        });
    }

    /// Queue an attributed replacement.
    pub fn replace_with_run(&mut self, range: Range<usize>, run: AttributedRun) {
        self.commands.push(EditCommand::ReplaceWithRun { range, run });
    }

    /// Queue an attribute application.
    pub fn add_attribute(&mut self, range: Range<usize>, attribute: Attribute) {
        self.commands.push(EditCommand::AddAttribute { range, attribute });
    }

    /// Queue an attribute removal.
    pub fn remove_attributes(&mut self, range: Range<usize>, kind: AttributeKind) {
        self.commands.push(EditCommand::RemoveAttributes { range, kind });
    }

    /// Queue a selection move.
    pub fn set_selection(&mut self, range: Range<usize>) {
        self.commands.push(EditCommand::SetSelection { range });
    }
}

/// A unit of text processing hooked into the editing pipeline.
///
/// Processors are notified after every committed edit and may react by
/// queueing further edits on the scope.
pub trait TextProcessing: fmt::Debug {
    /// A stable name identifying the processor; used for unregistration and
    /// interruption reporting.
    fn name(&self) -> &str;

    /// This processor's chain priority.
    fn priority(&self) -> ProcessingPriority {
        ProcessingPriority::Medium
    }

    /// Called before an interactive edit is committed.
    ///
    /// `replaced` is the range about to be replaced (pre-edit coordinates)
    /// and `replacement` the incoming text.
    fn will_process(&mut self, store: &TextStore, replaced: Range<usize>, replacement: &str) {
        let _ = (store, replaced, replacement);
    }

    /// React to a committed edit.
    ///
    /// `edited` is the coalesced edited range in post-edit coordinates and
    /// `delta` the signed change in length. Returning
    /// [`Processed::Handled`] stops the chain for this edit.
    fn process(
        &mut self,
        scope: &mut ProcessorScope<'_>,
        edited: Range<usize>,
        delta: isize,
    ) -> Result<Processed, ProcessorError>;

    /// Called when a processor that ran earlier in a dispatch is preempted
    /// by an exclusive claim. `by` names the claiming processor.
    fn process_interrupted(&mut self, by: &str, edited: Range<usize>) {
        let _ = (by, edited);
    }

    /// Called when the selection settles on a new range.
    fn selection_changed(&mut self, scope: &mut ProcessorScope<'_>, selection: Range<usize>) {
        let _ = (scope, selection);
    }
}

/// The outcome of one chain dispatch.
#[derive(Debug)]
pub(crate) struct Dispatch {
    /// Whether any processor claimed the edit.
    pub(crate) handled: bool,
    /// Mutations queued by the processors, in request order.
    pub(crate) commands: Vec<EditCommand>,
}

/// An ordered chain of [`TextProcessing`] implementations.
#[derive(Debug, Default)]
pub struct ProcessingChain {
    processors: Vec<Box<dyn TextProcessing>>,
}

impl ProcessingChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor.
    ///
    /// The chain stays sorted by descending priority; among equal
    /// priorities, earlier registrations run first.
    pub fn register(&mut self, processor: Box<dyn TextProcessing>) {
        let at = self
            .processors
            .partition_point(|p| p.priority() >= processor.priority());
        self.processors.insert(at, processor);
    }

    /// Remove and return the first processor with the given name.
    pub fn unregister(&mut self, name: &str) -> Option<Box<dyn TextProcessing>> {
        let at = self.processors.iter().position(|p| p.name() == name)?;
        Some(self.processors.remove(at))
    }

    /// The number of registered processors.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Returns `true` if no processors are registered.
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub(crate) fn will_process(
        &mut self,
        store: &TextStore,
        replaced: Range<usize>,
        replacement: &str,
    ) {
        for processor in &mut self.processors {
            processor.will_process(store, replaced.clone(), replacement);
        }
    }

    /// Run the chain over a committed edit.
    pub(crate) fn dispatch(
        &mut self,
        store: &TextStore,
        selection: Range<usize>,
        edited: Range<usize>,
        delta: isize,
    ) -> Dispatch {
        let mut scope = ProcessorScope::new(store, selection);
        let mut handled = false;
        let mut ran: Vec<usize> = Vec::new();
        for i in 0..self.processors.len() {
            let priority = self.processors[i].priority();
            let outcome = self.processors[i].process(&mut scope, edited.clone(), delta);
            match outcome {
                Ok(Processed::Handled) => {
                    if priority == ProcessingPriority::Exclusive {
                        let claimant = String::from(self.processors[i].name());
                        for &j in &ran {
                            self.processors[j].process_interrupted(&claimant, edited.clone());
                        }
                    }
                    handled = true;
                    break;
                }
                Ok(Processed::NotHandled) => {
                    ran.push(i);
                }
                Err(err) => {
                    log::warn!(
                        "text processor {:?} failed on {edited:?}: {err}",
                        self.processors[i].name(),
                    );
                    ran.push(i);
                }
            }
        }
        Dispatch {
            handled,
            commands: scope.into_commands(),
        }
    }

    /// Notify every processor of a settled selection change.
    pub(crate) fn selection_changed(
        &mut self,
        store: &TextStore,
        selection: Range<usize>,
    ) -> Vec<EditCommand> {
        let mut scope = ProcessorScope::new(store, selection.clone());
        for processor in &mut self.processors {
            processor.selection_changed(&mut scope, selection.clone());
        }
        scope.into_commands()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Processed, ProcessingChain, ProcessingPriority, ProcessorError, ProcessorScope,
        TextProcessing,
    };
    use crate::store::TextStore;
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use core::ops::Range;

    type Trace = Rc<RefCell<Vec<String>>>;

    #[derive(Debug)]
    struct Scripted {
        name: &'static str,
        priority: ProcessingPriority,
        outcome: Result<Processed, ProcessorError>,
        trace: Trace,
    }

    impl TextProcessing for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> ProcessingPriority {
            self.priority
        }

        fn process(
            &mut self,
            _scope: &mut ProcessorScope<'_>,
            _edited: Range<usize>,
            _delta: isize,
        ) -> Result<Processed, ProcessorError> {
            self.trace.borrow_mut().push(self.name.into());
            self.outcome.clone()
        }

        fn process_interrupted(&mut self, by: &str, _edited: Range<usize>) {
            self.trace
                .borrow_mut()
                .push(alloc::format!("{}:interrupted-by:{by}", self.name));
        }
    }

    fn scripted(
        name: &'static str,
        priority: ProcessingPriority,
        outcome: Result<Processed, ProcessorError>,
        trace: &Trace,
    ) -> Box<Scripted> {
        Box::new(Scripted {
            name,
            priority,
            outcome,
            trace: trace.clone(),
        })
    }

    #[test]
    fn chain_runs_in_descending_priority_then_registration_order() {
        let trace: Trace = Trace::default();
        let mut chain = ProcessingChain::new();
        chain.register(scripted(
            "low",
            ProcessingPriority::Low,
            Ok(Processed::NotHandled),
            &trace,
        ));
        chain.register(scripted(
            "high",
            ProcessingPriority::High,
            Ok(Processed::NotHandled),
            &trace,
        ));
        chain.register(scripted(
            "medium-a",
            ProcessingPriority::Medium,
            Ok(Processed::NotHandled),
            &trace,
        ));
        chain.register(scripted(
            "medium-b",
            ProcessingPriority::Medium,
            Ok(Processed::NotHandled),
            &trace,
        ));
        let store = TextStore::with_text("abc");
        let outcome = chain.dispatch(&store, 0..0, 0..3, 0);
        assert!(!outcome.handled);
        assert_eq!(*trace.borrow(), ["high", "medium-a", "medium-b", "low"]);
    }

    #[test]
    fn first_handled_short_circuits() {
        let trace: Trace = Trace::default();
        let mut chain = ProcessingChain::new();
        chain.register(scripted(
            "claims",
            ProcessingPriority::Medium,
            Ok(Processed::Handled),
            &trace,
        ));
        chain.register(scripted(
            "starved",
            ProcessingPriority::Low,
            Ok(Processed::NotHandled),
            &trace,
        ));
        let store = TextStore::with_text("abc");
        let outcome = chain.dispatch(&store, 0..0, 0..3, 0);
        assert!(outcome.handled);
        assert_eq!(*trace.borrow(), ["claims"]);
    }

    #[test]
    fn exclusive_claim_interrupts_already_run_processors() {
        let trace: Trace = Trace::default();
        let mut chain = ProcessingChain::new();
        chain.register(scripted(
            "bystander",
            ProcessingPriority::High,
            Ok(Processed::NotHandled),
            &trace,
        ));
        // Registered after, but Exclusive outranks High.
        chain.register(scripted(
            "claimant",
            ProcessingPriority::Exclusive,
            Ok(Processed::Handled),
            &trace,
        ));
        let store = TextStore::with_text("abc");
        let outcome = chain.dispatch(&store, 0..0, 0..3, 0);
        assert!(outcome.handled);
        // Exclusive runs first here, so nothing has run yet to interrupt.
        assert_eq!(*trace.borrow(), ["claimant"]);

        trace.borrow_mut().clear();
        // Demote the claimant below the bystander: now the bystander runs
        // first and gets interrupted when the exclusive claim lands.
        let claimant = chain.unregister("claimant").unwrap();
        let mut reordered = ProcessingChain::new();
        reordered.register(scripted(
            "bystander",
            ProcessingPriority::Exclusive,
            Ok(Processed::NotHandled),
            &trace,
        ));
        reordered.register(claimant);
        let outcome = reordered.dispatch(&store, 0..0, 0..3, 0);
        assert!(outcome.handled);
        assert_eq!(
            *trace.borrow(),
            ["bystander", "claimant", "bystander:interrupted-by:claimant"]
        );
    }

    #[test]
    fn failing_processor_is_skipped_and_chain_continues() {
        let trace: Trace = Trace::default();
        let mut chain = ProcessingChain::new();
        chain.register(scripted(
            "broken",
            ProcessingPriority::High,
            Err(ProcessorError::new("scripted failure")),
            &trace,
        ));
        chain.register(scripted(
            "survivor",
            ProcessingPriority::Low,
            Ok(Processed::Handled),
            &trace,
        ));
        let store = TextStore::with_text("abc");
        let outcome = chain.dispatch(&store, 0..0, 0..3, 0);
        assert!(outcome.handled);
        assert_eq!(*trace.borrow(), ["broken", "survivor"]);
    }

    #[test]
    fn unregister_by_name() {
        let trace: Trace = Trace::default();
        let mut chain = ProcessingChain::new();
        chain.register(scripted(
            "only",
            ProcessingPriority::Medium,
            Ok(Processed::NotHandled),
            &trace,
        ));
        assert_eq!(chain.len(), 1);
        assert!(chain.unregister("missing").is_none());
        assert!(chain.unregister("only").is_some());
        assert!(chain.is_empty());
    }

    #[test]
    fn scope_queues_commands_in_request_order() {
        #[derive(Debug)]
        struct Queuer;

        impl TextProcessing for Queuer {
            fn name(&self) -> &str {
                "queuer"
            }

            fn process(
                &mut self,
                scope: &mut ProcessorScope<'_>,
                edited: Range<usize>,
                _delta: isize,
            ) -> Result<Processed, ProcessorError> {
                scope.replace(edited.clone(), "x");
                scope.set_selection(edited.start..edited.start);
                Ok(Processed::NotHandled)
            }
        }

        let mut chain = ProcessingChain::new();
        chain.register(Box::new(Queuer));
        let store = TextStore::with_text("abc");
        let outcome = chain.dispatch(&store, 0..0, 1..2, 0);
        assert_eq!(outcome.commands.len(), 2);
        assert!(matches!(
            &outcome.commands[0],
            super::EditCommand::Replace { range, text } if *range == (1..2) && text == "x"
        ));
        assert!(matches!(
            &outcome.commands[1],
            super::EditCommand::SetSelection { range } if *range == (1..1)
        ));
    }
}
