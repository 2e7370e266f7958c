//! HTML serializer for live trees held in a [`MemoryTree`].
//!
//! Virtual trees are serialized by mounting them into a scratch
//! [`MemoryTree`] first, so the markup of a virtual tree is by construction
//! the markup its mounted form would produce.

use crate::host::memory::{MemoryTree, NodeId};
use crate::live::LiveTree;
use crate::mount::materialize_element;
use crate::patch::PatchError;
use crate::vnode::VNode;

/// Serializer options.
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    /// Indentation unit, e.g. `"  "`. Empty means compact output on one line.
    pub tab: String,
}

impl HtmlOptions {
    pub fn indented(tab: impl Into<String>) -> Self {
        Self { tab: tab.into() }
    }
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Serialize the subtree rooted at `id`.
pub fn to_html(tree: &MemoryTree, id: &NodeId, options: &HtmlOptions) -> String {
    node_to_html(tree, id, &options.tab, "")
}

/// Serialize a virtual tree as it would appear once mounted.
pub fn vnode_to_html(node: &VNode, options: &HtmlOptions) -> Result<String, PatchError> {
    let mut scratch = MemoryTree::new();
    let root = materialize_element(&mut scratch, node)?;
    Ok(to_html(&scratch, &root, options))
}

fn node_to_html(tree: &MemoryTree, id: &NodeId, tab: &str, indent: &str) -> String {
    if let Some(text) = tree.text(id) {
        return format!("{}{}", indent, escape_text(text));
    }
    let Some(tag) = tree.tag(id) else {
        return String::new();
    };
    let children = tree.children(id).unwrap_or_default();
    let do_indent = !tab.is_empty();
    let children_indent = format!("{indent}{tab}");
    let text_only = children.iter().all(|c| tree.text(c).is_some());

    let children_str = if text_only {
        children
            .iter()
            .filter_map(|c| tree.text(c))
            .map(escape_text)
            .collect::<String>()
    } else {
        let mut s = String::new();
        for child in &children {
            if do_indent {
                s.push('\n');
            }
            s.push_str(&node_to_html(tree, child, tab, &children_indent));
        }
        s
    };

    let mut attr_str = String::new();
    for (k, v) in tree.rendered_attributes(id) {
        attr_str.push(' ');
        attr_str.push_str(&k);
        attr_str.push_str("=\"");
        attr_str.push_str(&escape_attr(&v));
        attr_str.push('"');
    }

    let closing_indent = if do_indent && !text_only {
        format!("\n{indent}")
    } else {
        String::new()
    };
    format!("{indent}<{tag}{attr_str}>{children_str}{closing_indent}</{tag}>")
}
