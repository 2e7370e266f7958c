//! Virtual tree model: elements, text leaves, and attribute values.
//!
//! A virtual tree is the declarative description of the markup a host should
//! display. Trees are plain data: [`crate::diff`] only borrows them and
//! [`crate::apply`] never sees them at all.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

// ── Events ─────────────────────────────────────────────────────────────────

/// An event delivered by a host to a registered [`EventHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Lower-case event name, e.g. `"click"`.
    pub kind: String,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

/// A callable bound through an `on*` attribute.
///
/// Handlers compare by identity: two handlers are equal only when they share
/// the same allocation, so a freshly built closure always counts as changed.
/// The label is carried for encoding and debug output only.
#[derive(Clone)]
pub struct EventHandler {
    label: String,
    callback: Rc<dyn Fn(&Event)>,
}

impl EventHandler {
    pub fn new(label: impl Into<String>, callback: impl Fn(&Event) + 'static) -> Self {
        Self {
            label: label.into(),
            callback: Rc::new(callback),
        }
    }

    /// A handler that ignores every event. Used when decoding trees from JSON.
    pub fn noop(label: impl Into<String>) -> Self {
        Self::new(label, |_| {})
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn call(&self, event: &Event) {
        (self.callback)(event)
    }

    /// Identity comparison; labels are ignored.
    pub fn same_as(&self, other: &EventHandler) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({})", self.label)
    }
}

// ── Attribute values ───────────────────────────────────────────────────────

/// Nested `style` mapping: property name → value.
pub type StyleMap = IndexMap<String, String>;

/// Value stored under an attribute key.
///
/// The host decides how each kind is bound; see
/// [`crate::host::memory::MemoryTree`] for the reference rules.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Bool(bool),
    Number(f64),
    /// Structured style declarations.
    Style(StyleMap),
    /// Event handler, bound as a listener rather than an attribute.
    Handler(EventHandler),
}

impl AttrValue {
    /// Build a [`AttrValue::Style`] from `(property, value)` pairs.
    pub fn style<K, V>(declarations: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        AttrValue::Style(
            declarations
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AttrValue::Str(_) => "string",
            AttrValue::Bool(_) => "boolean",
            AttrValue::Number(_) => "number",
            AttrValue::Style(_) => "style",
            AttrValue::Handler(_) => "handler",
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<i32> for AttrValue {
    fn from(n: i32) -> Self {
        AttrValue::Number(f64::from(n))
    }
}

impl From<EventHandler> for AttrValue {
    fn from(h: EventHandler) -> Self {
        AttrValue::Handler(h)
    }
}

/// Attribute mapping of a [`VNode`].
///
/// Equality ignores insertion order; insertion order is still the order in
/// which attributes are bound on mount.
pub type Attributes = IndexMap<String, AttrValue>;

// ── Nodes ──────────────────────────────────────────────────────────────────

/// A child entry: either a nested element or a text leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Element(VNode),
    Text(String),
}

impl Child {
    pub fn is_text(&self) -> bool {
        matches!(self, Child::Text(_))
    }
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Self {
        Child::Element(node)
    }
}

impl From<&str> for Child {
    fn from(s: &str) -> Self {
        Child::Text(s.to_owned())
    }
}

impl From<String> for Child {
    fn from(s: String) -> Self {
        Child::Text(s)
    }
}

/// One element of the virtual tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VNode {
    /// Element kind. Opaque to the diff engine, interpreted by the host.
    pub tag: String,
    pub attributes: Attributes,
    /// Ordered children; position is what pairs old and new children.
    pub children: Vec<Child>,
}

impl VNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Depth-first, pre-order walk over this element and its descendants.
    pub fn walk(&self) -> Walker<'_> {
        Walker {
            stack: vec![Visit::Element(self)],
        }
    }
}

/// Build a [`VNode`] from a tag, an attribute list, and children.
///
/// ```
/// use vtree::vnode::{h, AttrValue, Child};
///
/// let node = h("div", [("id", AttrValue::from("foo"))], ["Hello, World!"]);
/// assert_eq!(node.tag, "div");
/// assert_eq!(node.children, vec![Child::Text("Hello, World!".into())]);
/// ```
pub fn h<'a, C>(
    tag: impl Into<String>,
    attributes: impl IntoIterator<Item = (&'a str, AttrValue)>,
    children: impl IntoIterator<Item = C>,
) -> VNode
where
    C: Into<Child>,
{
    VNode {
        tag: tag.into(),
        attributes: attributes
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect(),
        children: children.into_iter().map(Into::into).collect(),
    }
}

// ── Walker ─────────────────────────────────────────────────────────────────

/// A node reached by [`Walker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visit<'a> {
    Element(&'a VNode),
    Text(&'a str),
}

/// Iterator over a virtual tree, depth-first and pre-order.
pub struct Walker<'a> {
    stack: Vec<Visit<'a>>,
}

impl<'a> Iterator for Walker<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let visit = self.stack.pop()?;
        if let Visit::Element(node) = visit {
            // Reverse so the first child is popped first.
            for child in node.children.iter().rev() {
                self.stack.push(match child {
                    Child::Element(el) => Visit::Element(el),
                    Child::Text(s) => Visit::Text(s),
                });
            }
        }
        Some(visit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h_builds_node_with_text_child() {
        let node = h("div", [("id", AttrValue::from("foo"))], ["Hello, World!"]);
        assert_eq!(node.tag, "div");
        assert_eq!(node.attributes.get("id"), Some(&AttrValue::from("foo")));
        assert_eq!(node.children, vec![Child::Text("Hello, World!".into())]);
    }

    #[test]
    fn h_builds_nested_children() {
        let inner = h("div", [("id", AttrValue::from("foo"))], ["Hello, World!"]);
        let outer = h("div", [("id", AttrValue::from("bar"))], [inner.clone()]);
        assert_eq!(outer.children, vec![Child::Element(inner)]);
    }

    #[test]
    fn builder_matches_h() {
        let built = VNode::new("p").with_attr("class", "x").with_child("hi");
        let from_h = h("p", [("class", AttrValue::from("x"))], ["hi"]);
        assert_eq!(built, from_h);
    }

    #[test]
    fn attribute_equality_ignores_order() {
        let a = VNode::new("a").with_attr("x", "1").with_attr("y", "2");
        let b = VNode::new("a").with_attr("y", "2").with_attr("x", "1");
        assert_eq!(a, b);
    }

    #[test]
    fn handlers_compare_by_identity() {
        let h1 = EventHandler::noop("click");
        let h2 = EventHandler::noop("click");
        assert_eq!(h1, h1.clone());
        assert_ne!(h1, h2);
    }

    #[test]
    fn handler_call_runs_callback() {
        use std::cell::Cell;
        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        let handler = EventHandler::new("click", move |e| {
            assert_eq!(e.kind, "click");
            seen.set(seen.get() + 1);
        });
        handler.call(&Event::new("click"));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn walk_is_pre_order() {
        let tree = VNode::new("div")
            .with_child("a")
            .with_child(VNode::new("span").with_child("b"))
            .with_child("c");
        let seen: Vec<String> = tree
            .walk()
            .map(|v| match v {
                Visit::Element(n) => n.tag.clone(),
                Visit::Text(s) => s.to_owned(),
            })
            .collect();
        assert_eq!(seen, vec!["div", "a", "span", "b", "c"]);
    }
}
