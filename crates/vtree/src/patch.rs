//! Edit scripts: the difference between two virtual trees.
//!
//! A script is produced by [`crate::diff::diff`] and replayed by
//! [`crate::apply::apply_patches`]. Scripts are plain data and can be
//! encoded with [`crate::codec::json`].

use indexmap::IndexMap;
use thiserror::Error;

use crate::live::LiveTreeError;
use crate::vnode::{AttrValue, Child};

// ── Error ─────────────────────────────────────────────────────────────────

/// A script could not be applied to the live tree it was handed.
///
/// Every variant except [`PatchError::Host`] means the script and the live
/// tree are out of sync.
#[derive(Debug, Error, PartialEq)]
pub enum PatchError {
    #[error("child index {index} out of range for {len} live children")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("cannot apply `{op}` to a {found} node")]
    ShapeMismatch { op: &'static str, found: &'static str },
    #[error("node was already removed by an earlier patch")]
    NodeRemoved,
    #[error("insertion at child index {index}, expected index {expected}")]
    NonContiguousInsert { index: usize, expected: usize },
    #[error(transparent)]
    Host(#[from] LiveTreeError),
}

// ── Attribute changes ─────────────────────────────────────────────────────

/// New state of a single attribute.
///
/// Removal is its own variant so that "gone" never collapses into "set to
/// an empty or false value".
#[derive(Debug, Clone, PartialEq)]
pub enum AttrChange {
    Set(AttrValue),
    Remove,
}

/// Changed attributes of one element, keyed by attribute name.
pub type AttrChanges = IndexMap<String, AttrChange>;

// ── Patch ─────────────────────────────────────────────────────────────────

/// One mutation of the live node the enclosing script addresses.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Discard the live node and mount this one in its place. `None`
    /// deletes without replacement.
    Replace(Option<Child>),
    /// Only attributes changed; children are untouched.
    UpdateAttributes(AttrChanges),
    /// Per-position edits of the children. Positions without difference
    /// have no entry.
    UpdateChildren(Vec<ChildEdit>),
    /// Delete the live node.
    Remove,
}

impl Patch {
    pub fn replace(node: impl Into<Child>) -> Self {
        Patch::Replace(Some(node.into()))
    }

    /// Short name used in logs, errors, and the JSON codec.
    pub fn op_name(&self) -> &'static str {
        match self {
            Patch::Replace(_) => "replace",
            Patch::UpdateAttributes(_) => "attrs",
            Patch::UpdateChildren(_) => "children",
            Patch::Remove => "remove",
        }
    }
}

/// Edit addressed to one child position.
///
/// Indices always refer to the children as they were before any edit of the
/// same [`Patch::UpdateChildren`] ran.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildEdit {
    /// Recurse into the child at `index`.
    Update { index: usize, patches: Vec<Patch> },
    /// Apply `patch` to the child at `index`. A `Replace` at or past the end
    /// of the children appends.
    At { index: usize, patch: Patch },
}

impl ChildEdit {
    pub fn index(&self) -> usize {
        match self {
            ChildEdit::Update { index, .. } | ChildEdit::At { index, .. } => *index,
        }
    }
}
