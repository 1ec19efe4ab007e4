// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A rich-text editing core: an attributed buffer with embedded
//! attachments, a mutation gateway, and an edit-interception pipeline.
//!
//! The crate is headless. It owns the text, the attributes, and the editing
//! semantics; rendering, layout, and platform input stay on the host side
//! of two small traits ([`LayoutProvider`], [`EditorDelegate`]).
//!
//! The pieces, inside out:
//!
//! - [`TextStore`] is the single gateway to the buffer. Edits that cut into
//!   an attachment marker are widened to remove the attachment whole, and
//!   every mutation is recorded so observers get exactly one notification
//!   per edit (or per [`Editor::batch`]).
//! - [`Attachment`]s embed non-text content behind a one-character marker
//!   in the buffer; [`ContentIter`] enumerates text and attachments as
//!   typed [`ContentItem`]s.
//! - [`ProcessingChain`] runs [`TextProcessing`] hooks over every committed
//!   edit, in priority order, with re-entrant mutation deferred through
//!   [`EditCommand`]s.
//! - [`Editor`] ties it together: key interception, two-phase deletion of
//!   guarded attachments, selection snapping around no-focus runs, and
//!   delegate notification.
//!
//! ```
//! use vellum::Editor;
//!
//! let mut editor = Editor::headless("");
//! editor.insert("hello").unwrap();
//! editor.backspace().unwrap();
//! assert_eq!(editor.as_str(), "hell");
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): passes `std` through to dependencies. The
//!   crate itself is `no_std`.
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

extern crate alloc;

mod attachment;
mod attribute;
mod codec;
mod content;
mod delegate;
mod editor;
mod layout;
mod processor;
mod selection;
mod store;

pub use attributed_buffer::{AttributedString, RangeError, RangeErrorKind, TextRange};

pub use crate::attachment::{
    Attachment, AttachmentId, AttachmentKind, EmbeddedContent, MARKER_CHAR, MARKER_LEN,
    SizingPolicy,
};
pub use crate::attribute::{Attribute, AttributeKind, ContentName};
pub use crate::codec::{AttributedRun, ContentDecoder, ContentEncoder};
pub use crate::content::{ContentItem, ContentIter, EnumerationMode};
pub use crate::delegate::{EditorDelegate, EditorKey, KeyOutcome, Modifiers};
pub use crate::editor::{Editor, EditorBatch};
pub use crate::layout::LayoutProvider;
pub use crate::processor::{
    EditCommand, Processed, ProcessingChain, ProcessingPriority, ProcessorError, ProcessorScope,
    TextProcessing,
};
pub use crate::store::{PendingEdit, TextStore, Transaction};
