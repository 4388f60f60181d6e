//! Wonder Nest DOM
//!
//! Arena-allocated document tree. Every element carries a computed-style
//! snapshot and a bounding box so that auditing code can query the page the
//! way a browser would answer `getComputedStyle` and `getBoundingClientRect`.

mod classlist;
mod document;
mod geometry;
mod node;
mod style;
mod tree;

pub use classlist::DOMTokenList;
pub use document::Document;
pub use geometry::DOMRect;
pub use node::{Attribute, ElementData, Node, NodeData, TextData};
pub use style::{ComputedStyle, leading_number};
pub use tree::{Children, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this id refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
