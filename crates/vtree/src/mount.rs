//! Mount renderer: materialize a virtual tree into a live tree from scratch.
//!
//! [`materialize`] is also what [`crate::apply`] uses for `Replace`, so a
//! replaced node is built exactly like a freshly mounted one.

use tracing::debug;

use crate::live::LiveTree;
use crate::patch::PatchError;
use crate::vnode::{Child, VNode};

/// Build a detached live node for `child`, including all descendants.
pub fn materialize<T: LiveTree>(tree: &mut T, child: &Child) -> Result<T::Node, PatchError> {
    match child {
        Child::Text(text) => Ok(tree.create_text(text)),
        Child::Element(node) => materialize_element(tree, node),
    }
}

/// Build a detached live element: attributes in mapping order, then the
/// children in order.
pub fn materialize_element<T: LiveTree>(tree: &mut T, node: &VNode) -> Result<T::Node, PatchError> {
    let el = tree.create_element(&node.tag);
    for (key, value) in &node.attributes {
        tree.set_attribute(&el, key, value)?;
    }
    for child in &node.children {
        let live = materialize(tree, child)?;
        tree.append_child(&el, &live)?;
    }
    Ok(el)
}

/// Materialize `node` and append it to `container`. Returns the new handle.
pub fn mount<T: LiveTree>(tree: &mut T, node: &VNode, container: &T::Node) -> Result<T::Node, PatchError> {
    debug!(tag = %node.tag, "mounting virtual tree");
    let el = materialize_element(tree, node)?;
    tree.append_child(container, &el)?;
    Ok(el)
}

/// Like [`mount`], for a child entry that may be text.
pub fn mount_child<T: LiveTree>(tree: &mut T, child: &Child, container: &T::Node) -> Result<T::Node, PatchError> {
    let live = materialize(tree, child)?;
    tree.append_child(container, &live)?;
    Ok(live)
}
