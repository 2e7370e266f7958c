//! Patch engine: replay an edit script against a live tree.
//!
//! The engine works on the script and the [`LiveTree`] alone; it never sees
//! the virtual trees the script was computed from. Side effects stay inside
//! the subtree of the node the script addresses.

use tracing::{debug, error, trace};

use crate::live::LiveTree;
use crate::mount::{materialize, mount_child};
use crate::patch::{AttrChange, AttrChanges, ChildEdit, Patch, PatchError};

/// Apply `patches` in order to `node`.
///
/// Returns the handle now standing where `node` stood: `node` itself, the
/// replacement after a `Replace`, or `None` once the node was removed.
pub fn apply_patches<T: LiveTree>(
    tree: &mut T,
    node: T::Node,
    patches: &[Patch],
) -> Result<Option<T::Node>, PatchError> {
    debug!(?node, patches = patches.len(), "applying edit script");
    apply_all(tree, node, patches)
}

fn apply_all<T: LiveTree>(
    tree: &mut T,
    node: T::Node,
    patches: &[Patch],
) -> Result<Option<T::Node>, PatchError> {
    let mut current = Some(node);
    for patch in patches {
        let Some(target) = current.take() else {
            return Err(desync(PatchError::NodeRemoved));
        };
        current = apply_patch(tree, target, patch)?;
    }
    Ok(current)
}

/// Apply a single patch to `node`. See [`apply_patches`] for the result.
pub fn apply_patch<T: LiveTree>(
    tree: &mut T,
    node: T::Node,
    patch: &Patch,
) -> Result<Option<T::Node>, PatchError> {
    trace!(?node, op = patch.op_name(), "applying patch");
    match patch {
        Patch::Replace(Some(child)) => {
            let replacement = materialize(tree, child)?;
            tree.replace_node(&node, &replacement)?;
            Ok(Some(replacement))
        }
        Patch::Replace(None) | Patch::Remove => {
            tree.remove_node(&node)?;
            Ok(None)
        }
        Patch::UpdateAttributes(changes) => {
            expect_element(tree, &node, patch.op_name())?;
            update_attributes(tree, &node, changes)?;
            Ok(Some(node))
        }
        Patch::UpdateChildren(edits) => {
            expect_element(tree, &node, patch.op_name())?;
            update_children(tree, &node, edits)?;
            Ok(Some(node))
        }
    }
}

fn expect_element<T: LiveTree>(tree: &T, node: &T::Node, op: &'static str) -> Result<(), PatchError> {
    if tree.is_text(node)? {
        return Err(desync(PatchError::ShapeMismatch { op, found: "text" }));
    }
    Ok(())
}

fn update_attributes<T: LiveTree>(tree: &mut T, node: &T::Node, changes: &AttrChanges) -> Result<(), PatchError> {
    for (key, change) in changes {
        match change {
            AttrChange::Set(value) => tree.set_attribute(node, key, value)?,
            AttrChange::Remove => tree.remove_attribute(node, key)?,
        }
    }
    Ok(())
}

/// Children are looked up once, before any edit runs, and every edit
/// addresses that list by original index. Replacing or removing a child
/// therefore never shifts the target of a later edit.
fn update_children<T: LiveTree>(tree: &mut T, parent: &T::Node, edits: &[ChildEdit]) -> Result<(), PatchError> {
    let original = tree.children(parent)?;
    let mut next_append = original.len();
    for edit in edits {
        match edit {
            ChildEdit::At {
                index,
                patch: Patch::Replace(Some(added)),
            } if *index >= original.len() => {
                if *index != next_append {
                    return Err(desync(PatchError::NonContiguousInsert {
                        index: *index,
                        expected: next_append,
                    }));
                }
                mount_child(tree, added, parent)?;
                next_append += 1;
            }
            ChildEdit::At { index, patch } => {
                let child = child_at(&original, *index)?;
                apply_patch(tree, child, patch)?;
            }
            ChildEdit::Update { index, patches } => {
                let child = child_at(&original, *index)?;
                apply_all(tree, child, patches)?;
            }
        }
    }
    Ok(())
}

fn child_at<N: Clone>(children: &[N], index: usize) -> Result<N, PatchError> {
    children.get(index).cloned().ok_or_else(|| {
        desync(PatchError::IndexOutOfRange {
            index,
            len: children.len(),
        })
    })
}

fn desync(err: PatchError) -> PatchError {
    error!(%err, "edit script does not match the live tree");
    err
}
