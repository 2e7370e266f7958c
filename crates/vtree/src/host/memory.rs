//! Arena-backed live tree.
//!
//! Nodes live in a `Vec` and are addressed by index, so handles survive any
//! amount of re-parenting. Detached nodes are never freed; a `MemoryTree` is
//! meant for tests, tooling, and server-side rendering, not long-lived UIs.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use tracing::trace;

use crate::html::{self, HtmlOptions};
use crate::live::{LiveTree, LiveTreeError};
use crate::vnode::{AttrValue, Event, EventHandler, StyleMap};

/// Handle of a node inside a [`MemoryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    attributes: IndexMap<String, String>,
    /// Kebab-cased property → value.
    style: StyleMap,
    /// Attribute key (`onClick`) → handler.
    listeners: IndexMap<String, EventHandler>,
}

#[derive(Debug, Clone)]
enum Payload {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Slot {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    payload: Payload,
}

/// Structural view of a live subtree for comparisons.
///
/// Attribute order and handler identity are not part of the snapshot, so a
/// patched tree and a freshly mounted one compare equal whenever they render
/// the same markup and listen to the same events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Text(String),
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        style: BTreeMap<String, String>,
        listeners: BTreeSet<String>,
        children: Vec<Snapshot>,
    },
}

/// In-memory [`LiveTree`] host.
///
/// Binding rules for [`AttrValue`]s:
///
/// - handlers become listeners; the event name is the key without its `on`
///   prefix, lower-cased (`onClick` → `click`);
/// - `style` takes either a declaration string (`"color: red;"`) or a
///   [`AttrValue::Style`] mapping and replaces all previous declarations;
///   camelCase property names are stored kebab-cased;
/// - `true` binds an empty attribute, `false` removes it;
/// - strings bind verbatim, numbers in their shortest decimal form.
///
/// Every tree starts with a detached `<body>` element, the [`document`]
/// container that mounted trees are usually appended to.
///
/// [`document`]: MemoryTree::document
#[derive(Debug, Clone)]
pub struct MemoryTree {
    slots: Vec<Slot>,
}

const DOCUMENT: NodeId = NodeId(0);

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    pub fn new() -> Self {
        let mut tree = Self { slots: Vec::new() };
        tree.alloc(Payload::Element(Element {
            tag: "body".to_owned(),
            ..Element::default()
        }));
        tree
    }

    /// Root container of this tree.
    pub fn document(&self) -> NodeId {
        DOCUMENT
    }

    fn alloc(&mut self, payload: Payload) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot {
            parent: None,
            children: Vec::new(),
            payload,
        });
        id
    }

    fn slot(&self, id: &NodeId) -> Result<&Slot, LiveTreeError> {
        self.slots.get(id.index()).ok_or(LiveTreeError::UnknownNode)
    }

    fn slot_mut(&mut self, id: &NodeId) -> Result<&mut Slot, LiveTreeError> {
        self.slots.get_mut(id.index()).ok_or(LiveTreeError::UnknownNode)
    }

    fn element(&self, id: &NodeId) -> Option<&Element> {
        match &self.slots.get(id.index())?.payload {
            Payload::Element(el) => Some(el),
            Payload::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: &NodeId) -> Result<&mut Element, LiveTreeError> {
        match &mut self.slot_mut(id)?.payload {
            Payload::Element(el) => Ok(el),
            Payload::Text(_) => Err(LiveTreeError::NotAnElement),
        }
    }

    pub fn parent(&self, id: &NodeId) -> Option<NodeId> {
        self.slots.get(id.index())?.parent
    }

    pub fn tag(&self, id: &NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Contents of a text node.
    pub fn text(&self, id: &NodeId) -> Option<&str> {
        match &self.slots.get(id.index())?.payload {
            Payload::Text(s) => Some(s),
            Payload::Element(_) => None,
        }
    }

    pub fn attribute(&self, id: &NodeId, key: &str) -> Option<&str> {
        self.element(id)?.attributes.get(key).map(String::as_str)
    }

    /// Style property by its kebab-cased name.
    pub fn style(&self, id: &NodeId, property: &str) -> Option<&str> {
        self.element(id)?.style.get(property).map(String::as_str)
    }

    /// Attribute keys that currently hold a handler.
    pub fn listeners(&self, id: &NodeId) -> Vec<&str> {
        self.element(id)
            .map(|el| el.listeners.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Invoke every handler on `id` registered for `event.kind`. Returns
    /// whether any handler ran. Events do not bubble.
    pub fn dispatch(&self, id: &NodeId, event: &Event) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        let mut handled = false;
        for (key, handler) in &el.listeners {
            if event_name(key) == event.kind {
                handler.call(event);
                handled = true;
            }
        }
        handled
    }

    /// Attributes as they appear in markup, `style` last.
    pub fn rendered_attributes(&self, id: &NodeId) -> Vec<(String, String)> {
        let Some(el) = self.element(id) else {
            return Vec::new();
        };
        let mut out: Vec<(String, String)> = el
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if !el.style.is_empty() {
            out.push(("style".to_owned(), render_style(&el.style)));
        }
        out
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: &NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: &NodeId, out: &mut String) {
        let Some(slot) = self.slots.get(id.index()) else {
            return;
        };
        match &slot.payload {
            Payload::Text(s) => out.push_str(s),
            Payload::Element(_) => {
                for child in &slot.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Compact markup of `id` itself.
    pub fn outer_html(&self, id: &NodeId) -> String {
        html::to_html(self, id, &HtmlOptions::default())
    }

    /// Compact markup of the children of `id`.
    pub fn inner_html(&self, id: &NodeId) -> String {
        self.slots
            .get(id.index())
            .map(|slot| slot.children.iter().map(|c| self.outer_html(c)).collect())
            .unwrap_or_default()
    }

    pub fn to_html(&self, id: &NodeId, options: &HtmlOptions) -> String {
        html::to_html(self, id, options)
    }

    pub fn snapshot(&self, id: &NodeId) -> Option<Snapshot> {
        let slot = self.slots.get(id.index())?;
        Some(match &slot.payload {
            Payload::Text(s) => Snapshot::Text(s.clone()),
            Payload::Element(el) => Snapshot::Element {
                tag: el.tag.clone(),
                attributes: el.attributes.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                style: el.style.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                listeners: el.listeners.keys().cloned().collect(),
                children: slot
                    .children
                    .iter()
                    .filter_map(|c| self.snapshot(c))
                    .collect(),
            },
        })
    }

    fn detach(&mut self, id: &NodeId) -> Result<(), LiveTreeError> {
        let Some(parent) = self.slot(id)?.parent else {
            return Ok(());
        };
        self.slot_mut(&parent)?.children.retain(|c| c != id);
        self.slot_mut(id)?.parent = None;
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: &NodeId, of: &NodeId) -> bool {
        let mut cursor = Some(*of);
        while let Some(id) = cursor {
            if id == *ancestor {
                return true;
            }
            cursor = self.parent(&id);
        }
        false
    }
}

impl LiveTree for MemoryTree {
    type Node = NodeId;

    fn children(&self, node: &NodeId) -> Result<Vec<NodeId>, LiveTreeError> {
        Ok(self.slot(node)?.children.clone())
    }

    fn is_text(&self, node: &NodeId) -> Result<bool, LiveTreeError> {
        Ok(matches!(self.slot(node)?.payload, Payload::Text(_)))
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Payload::Element(Element {
            tag: tag.to_owned(),
            ..Element::default()
        }))
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Payload::Text(text.to_owned()))
    }

    fn set_attribute(&mut self, node: &NodeId, key: &str, value: &AttrValue) -> Result<(), LiveTreeError> {
        trace!(?node, key, kind = value.kind(), "set attribute");
        let el = self.element_mut(node)?;
        if let AttrValue::Handler(handler) = value {
            el.attributes.shift_remove(key);
            if key == "style" {
                el.style.clear();
            }
            el.listeners.insert(key.to_owned(), handler.clone());
            return Ok(());
        }
        el.listeners.shift_remove(key);
        if key == "style" {
            el.style = match value {
                AttrValue::Style(map) => map.iter().map(|(k, v)| (kebab_case(k), v.clone())).collect(),
                AttrValue::Str(s) => parse_declarations(s),
                _ => StyleMap::new(),
            };
            return Ok(());
        }
        match value {
            AttrValue::Bool(false) => {
                el.attributes.shift_remove(key);
            }
            other => {
                el.attributes.insert(key.to_owned(), stringify(other));
            }
        }
        Ok(())
    }

    fn remove_attribute(&mut self, node: &NodeId, key: &str) -> Result<(), LiveTreeError> {
        trace!(?node, key, "remove attribute");
        let el = self.element_mut(node)?;
        el.attributes.shift_remove(key);
        el.listeners.shift_remove(key);
        if key == "style" {
            el.style.clear();
        }
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), LiveTreeError> {
        self.element_mut(parent)?;
        if self.slot(child)?.parent.is_some() {
            return Err(LiveTreeError::AlreadyAttached);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(LiveTreeError::Cycle);
        }
        self.slot_mut(parent)?.children.push(*child);
        self.slot_mut(child)?.parent = Some(*parent);
        Ok(())
    }

    fn replace_node(&mut self, old: &NodeId, new: &NodeId) -> Result<(), LiveTreeError> {
        if old == new {
            self.slot(old)?;
            return Ok(());
        }
        if self.slot(new)?.parent.is_some() {
            return Err(LiveTreeError::AlreadyAttached);
        }
        let Some(parent) = self.slot(old)?.parent else {
            return Ok(());
        };
        if self.is_ancestor_or_self(new, &parent) {
            return Err(LiveTreeError::Cycle);
        }
        let siblings = &mut self.slot_mut(&parent)?.children;
        if let Some(pos) = siblings.iter().position(|c| c == old) {
            siblings[pos] = *new;
        }
        self.slot_mut(old)?.parent = None;
        self.slot_mut(new)?.parent = Some(parent);
        Ok(())
    }

    fn remove_node(&mut self, node: &NodeId) -> Result<(), LiveTreeError> {
        self.detach(node)
    }
}

// ── Binding helpers ───────────────────────────────────────────────────────

/// `onClick` → `click`, `onchange` → `change`.
fn event_name(key: &str) -> String {
    key.strip_prefix("on").unwrap_or(key).to_lowercase()
}

/// `fontSize` → `font-size`. Names already in kebab case pass through.
fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Parse `"a: b; c: d;"`. Declarations without a colon are dropped.
fn parse_declarations(s: &str) -> StyleMap {
    s.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((kebab_case(name), value.trim().to_owned()))
        })
        .collect()
}

fn render_style(style: &StyleMap) -> String {
    style
        .iter()
        .map(|(k, v)| format!("{k}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn stringify(value: &AttrValue) -> String {
    match value {
        AttrValue::Str(s) => s.clone(),
        AttrValue::Bool(true) => String::new(),
        AttrValue::Bool(false) => "false".to_owned(),
        AttrValue::Number(n) => format_number(*n),
        AttrValue::Style(map) => render_style(map),
        AttrValue::Handler(h) => h.label().to_owned(),
    }
}
