// SPDX-License-Identifier: MIT OR Apache-2.0
//! Translator: splices a [`dlbc_core::TranslationMap`] into a cloned
//! dialogue or node, selecting context-appropriate variants along the way.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod select;
mod tables;
mod translator;

pub use select::select_variant;
pub use tables::TranslationTables;
pub use translator::{translate_dialogue, translate_node};
