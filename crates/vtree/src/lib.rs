//! vtree: virtual tree reconciliation.
//!
//! Keeps a declarative description of markup (a *virtual tree*) and turns the
//! difference between two versions into a minimal edit script that is
//! replayed against a live, host-owned tree instead of rebuilding it.
//!
//! ```
//! use vtree::{apply_patches, diff, mount, MemoryTree, VNode};
//!
//! let old = VNode::new("div").with_child(VNode::new("p").with_child("Old"));
//! let new = VNode::new("div").with_child(VNode::new("p").with_child("New"));
//!
//! let mut host = MemoryTree::new();
//! let body = host.document();
//! let root = mount(&mut host, &old, &body).unwrap();
//!
//! apply_patches(&mut host, root, &diff(&old, &new)).unwrap();
//! assert_eq!(host.inner_html(&body), "<div><p>New</p></div>");
//! ```
//!
//! Leaf-first layout:
//!
//! - [`vnode`], [`patch`]: data only
//! - [`diff`]: edit script between two virtual trees
//! - [`live`]: what a host must provide
//! - [`mount`], [`apply`]: materialize and patch live trees
//! - [`host::memory`]: in-memory host
//! - [`html`], [`codec`], [`cli`]: tooling

pub mod vnode;
pub mod patch;
pub mod live;
pub mod diff;
pub mod mount;
pub mod apply;
pub mod host;
pub mod html;
pub mod codec;
pub mod cli;

pub use apply::{apply_patch, apply_patches};
pub use diff::{diff, diff_with, AttrCompare, ValueKindCompare};
pub use host::memory::{MemoryTree, NodeId, Snapshot};
pub use live::{LiveTree, LiveTreeError};
pub use mount::{materialize, mount, mount_child};
pub use patch::{AttrChange, AttrChanges, ChildEdit, Patch, PatchError};
pub use vnode::{h, AttrValue, Child, Event, EventHandler, VNode};
