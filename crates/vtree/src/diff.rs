//! Diff engine: compute the edit script between two virtual trees.
//!
//! Comparison is positional. Children are paired by index only, so an
//! element inserted in the middle of a list makes every following sibling
//! compare against the wrong counterpart, which usually turns into one
//! `Replace` per remaining position. The script is still correct, just not
//! minimal.

use tracing::debug;

use crate::patch::{AttrChange, AttrChanges, ChildEdit, Patch};
use crate::vnode::{AttrValue, Attributes, Child, VNode};

// ── Attribute comparison ──────────────────────────────────────────────────

/// Decides whether an attribute kept its value between two trees.
pub trait AttrCompare {
    fn same(&self, key: &str, old: &AttrValue, new: &AttrValue) -> bool;
}

/// Default comparison, chosen per value kind.
///
/// Strings and booleans compare by value, numbers numerically with `NaN`
/// equal to itself, style mappings structurally regardless of declaration
/// order, and handlers by identity. Values of different kinds always differ.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueKindCompare;

impl AttrCompare for ValueKindCompare {
    fn same(&self, _key: &str, old: &AttrValue, new: &AttrValue) -> bool {
        match (old, new) {
            (AttrValue::Str(a), AttrValue::Str(b)) => a == b,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Number(a), AttrValue::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (AttrValue::Style(a), AttrValue::Style(b)) => a == b,
            (AttrValue::Handler(a), AttrValue::Handler(b)) => a.same_as(b),
            _ => false,
        }
    }
}

impl<F> AttrCompare for F
where
    F: Fn(&str, &AttrValue, &AttrValue) -> bool,
{
    fn same(&self, key: &str, old: &AttrValue, new: &AttrValue) -> bool {
        self(key, old, new)
    }
}

// ── Public API ────────────────────────────────────────────────────────────

/// Edit script that turns the live form of `old` into the live form of
/// `new`. Returns an empty script when nothing differs.
pub fn diff(old: &VNode, new: &VNode) -> Vec<Patch> {
    diff_with(old, new, &ValueKindCompare)
}

/// Like [`diff`], with a caller-supplied attribute comparison.
pub fn diff_with<C: AttrCompare + ?Sized>(old: &VNode, new: &VNode, cmp: &C) -> Vec<Patch> {
    let mut patches = Vec::new();
    diff_node(&mut patches, old, new, cmp);
    debug!(tag = %new.tag, patches = patches.len(), "diffed virtual trees");
    patches
}

// ── Core recursive differ ─────────────────────────────────────────────────

fn diff_node<C: AttrCompare + ?Sized>(patches: &mut Vec<Patch>, old: &VNode, new: &VNode, cmp: &C) {
    if old.tag != new.tag {
        patches.push(Patch::Replace(Some(Child::Element(new.clone()))));
        return;
    }

    let changes = diff_attributes(&old.attributes, &new.attributes, cmp);
    if !changes.is_empty() {
        patches.push(Patch::UpdateAttributes(changes));
    }

    let edits = diff_children(&old.children, &new.children, cmp);
    if !edits.is_empty() {
        patches.push(Patch::UpdateChildren(edits));
    }
}

fn diff_attributes<C: AttrCompare + ?Sized>(old: &Attributes, new: &Attributes, cmp: &C) -> AttrChanges {
    let mut changes = AttrChanges::new();
    for (key, new_val) in new {
        let unchanged = old
            .get(key)
            .is_some_and(|old_val| cmp.same(key, old_val, new_val));
        if !unchanged {
            changes.insert(key.clone(), AttrChange::Set(new_val.clone()));
        }
    }
    for key in old.keys() {
        if !new.contains_key(key) {
            changes.insert(key.clone(), AttrChange::Remove);
        }
    }
    changes
}

fn diff_children<C: AttrCompare + ?Sized>(old: &[Child], new: &[Child], cmp: &C) -> Vec<ChildEdit> {
    let mut edits = Vec::new();
    for index in 0..old.len().max(new.len()) {
        match (old.get(index), new.get(index)) {
            (None, Some(added)) => edits.push(ChildEdit::At {
                index,
                patch: Patch::Replace(Some(added.clone())),
            }),
            (Some(_), None) => edits.push(ChildEdit::At {
                index,
                patch: Patch::Remove,
            }),
            (Some(Child::Element(a)), Some(Child::Element(b))) if a.tag == b.tag => {
                let mut nested = Vec::new();
                diff_node(&mut nested, a, b, cmp);
                if !nested.is_empty() {
                    edits.push(ChildEdit::Update { index, patches: nested });
                }
            }
            // Text on either side, or elements of different kinds.
            (Some(a), Some(b)) => {
                if a != b {
                    edits.push(ChildEdit::At {
                        index,
                        patch: Patch::Replace(Some(b.clone())),
                    });
                }
            }
            (None, None) => unreachable!("index below the longer length"),
        }
    }
    edits
}
