// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A mutable UTF-8 text buffer with attributes applied to byte ranges.
//!
//! The buffer stores the text contiguously and keeps attribute spans as
//! `(Range<usize>, Attr)` pairs in application order. Unlike a read-only
//! attributed string, [`AttributedString::replace_range`] rewrites the text
//! and keeps the spans consistent: spans around the edit shift, spans
//! containing it stretch, and spans the edit swallows are dropped.
//!
//! All range-taking operations validate bounds and UTF-8 character
//! boundaries up front and report failures through [`RangeError`];
//! [`TextRange`] lets callers validate once and reuse the result.
//!
//! ## Features
//!
//! - `std` (enabled by default): This is currently unused and is provided for forward compatibility.
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

mod attributed_string;
mod error;
mod runs;
mod text_range;

pub use crate::attributed_string::AttributedString;
pub use crate::error::{BoundaryInfo, Endpoint, RangeError, RangeErrorKind};
pub use crate::runs::{Run, Runs};
pub use crate::text_range::TextRange;
