//! Capability set the patch engine and mount renderer need from a host.
//!
//! The engine never looks at a live tree except through [`LiveTree`], so any
//! mutable tree (a browser DOM, a terminal buffer, the in-memory
//! [`crate::host::memory::MemoryTree`]) can be reconciled.

use std::fmt;

use thiserror::Error;

use crate::vnode::AttrValue;

/// A host refused a primitive operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LiveTreeError {
    #[error("unknown node handle")]
    UnknownNode,
    #[error("node is not an element")]
    NotAnElement,
    #[error("node already has a parent")]
    AlreadyAttached,
    #[error("appending a node into its own subtree")]
    Cycle,
}

/// A mutable tree of elements and text nodes addressed by opaque handles.
///
/// Handles stay valid when siblings are inserted, replaced, or removed; the
/// patch engine relies on this to address children by their original
/// position.
pub trait LiveTree {
    type Node: Clone + Eq + fmt::Debug;

    /// Child handles of `node`, in order. Text nodes have none.
    fn children(&self, node: &Self::Node) -> Result<Vec<Self::Node>, LiveTreeError>;

    fn is_text(&self, node: &Self::Node) -> Result<bool, LiveTreeError>;

    /// Create a detached, empty element.
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Create a detached text node.
    fn create_text(&mut self, text: &str) -> Self::Node;

    /// Bind `value` under `key`, overwriting any previous binding. The host
    /// owns the translation of structured values (style maps, handlers).
    fn set_attribute(
        &mut self,
        node: &Self::Node,
        key: &str,
        value: &AttrValue,
    ) -> Result<(), LiveTreeError>;

    /// Drop whatever is bound under `key`. Missing keys are not an error.
    fn remove_attribute(&mut self, node: &Self::Node, key: &str) -> Result<(), LiveTreeError>;

    /// Append a detached `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), LiveTreeError>;

    /// Put `new` where `old` is in its parent and detach `old`. When `old`
    /// has no parent nothing is attached.
    fn replace_node(&mut self, old: &Self::Node, new: &Self::Node) -> Result<(), LiveTreeError>;

    /// Detach `node` from its parent.
    fn remove_node(&mut self, node: &Self::Node) -> Result<(), LiveTreeError>;
}
