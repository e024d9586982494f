// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recursive-descent body parser (C3): consumes the flat token stream
//! produced by `dlbc-lexer` (C2) into a typed [`dlbc_core::Body`].
//!
//! This crate never reads raw script text itself; it always starts from
//! `dlbc_lexer::tokenize`'s output. `dlbc-script` (C4) is the only intended
//! caller for node bodies; `dlbc-i18n` (C7) reuses this crate (with a
//! command whitelist) for translation file values.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod parser;

pub use parser::{parse_body, ParseContext};
