//! A single labeled unit of dialogue.

use crate::body::Body;
use crate::header::Header;

/// A node: a header plus a body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    /// The node's header (title, speaker, etc.).
    pub header: Header,
    /// The node's body (segments + replies).
    pub body: Body,
}

impl Node {
    /// Construct a node from a header and a body.
    #[must_use]
    pub fn new(header: Header, body: Body) -> Self {
        Self { header, body }
    }

    /// The node's title, shorthand for `self.header.title`.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.header.title
    }
}
