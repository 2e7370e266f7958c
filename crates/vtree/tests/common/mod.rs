#![allow(dead_code)]

use proptest::prelude::*;
use vtree::vnode::Attributes;
use vtree::{mount, AttrValue, Child, EventHandler, LiveTree, MemoryTree, NodeId, VNode};

/// Mount `node` into a fresh `<body>` and return the host, the body and the
/// mounted root.
pub fn mounted(node: &VNode) -> (MemoryTree, NodeId, NodeId) {
    let mut host = MemoryTree::new();
    let body = host.document();
    let root = mount(&mut host, node, &body).expect("mount into fresh body");
    (host, body, root)
}

/// The single element currently mounted under `body`.
pub fn only_child(host: &MemoryTree, body: &NodeId) -> NodeId {
    let children = host.children(body).expect("body is live");
    assert_eq!(children.len(), 1, "body should hold exactly one root");
    children[0]
}

// ── Strategies ────────────────────────────────────────────────────────────

fn tag() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["div", "p", "span", "li"]).prop_map(String::from)
}

fn attr_key() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["id", "title", "hidden", "style", "onClick"])
}

fn attr_value() -> impl Strategy<Value = AttrValue> {
    prop_oneof![
        "[a-c]{0,2}".prop_map(AttrValue::Str),
        any::<bool>().prop_map(AttrValue::Bool),
        (-2i32..4).prop_map(AttrValue::from),
        prop::collection::vec(
            (prop::sample::select(vec!["color", "fontSize", "margin-top", "$handler"]), "[a-c]{1,2}"),
            0..3
        )
        .prop_map(|declarations| AttrValue::style(declarations)),
        "[a-b]".prop_map(|label| AttrValue::Handler(EventHandler::noop(label))),
        "(color|margin): [a-c]{1,2};".prop_map(AttrValue::Str),
    ]
}

fn attributes() -> impl Strategy<Value = Attributes> {
    prop::collection::vec((attr_key(), attr_value()), 0..4)
        .prop_map(|pairs| pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

/// Small random virtual trees with mixed element and text children.
pub fn vnode() -> impl Strategy<Value = VNode> {
    let leaf = (tag(), attributes()).prop_map(|(tag, attributes)| VNode {
        tag,
        attributes,
        children: Vec::new(),
    });
    leaf.prop_recursive(3, 24, 4, |inner| {
        let child = prop_oneof![
            "[xy]{0,2}".prop_map(Child::Text),
            inner.prop_map(Child::Element),
        ];
        (tag(), attributes(), prop::collection::vec(child, 0..4)).prop_map(
            |(tag, attributes, children)| VNode {
                tag,
                attributes,
                children,
            },
        )
    })
}

/// A copy of `node` with small local edits, one per element, picked by
/// consuming `choices`. Pairs built this way share most of their structure,
/// which unrelated random trees rarely do.
pub fn perturb(node: &VNode, choices: &mut impl Iterator<Item = u8>) -> VNode {
    let mut out = node.clone();
    match choices.next().unwrap_or(0) % 8 {
        1 => {
            out.children.pop();
        }
        2 => out.children.push(Child::Text("added".into())),
        3 => {
            if let Some(text) = out.children.iter_mut().find(|c| c.is_text()) {
                *text = Child::Text("changed".into());
            }
        }
        4 => {
            if out.attributes.shift_remove("id").is_none() {
                out.attributes.insert("id".into(), AttrValue::from("added"));
            }
        }
        5 => out.tag = format!("{}-x", out.tag),
        6 => out.children.insert(0, Child::Element(VNode::new("em"))),
        _ => {}
    }
    out.children = out
        .children
        .iter()
        .map(|child| match child {
            Child::Element(el) => Child::Element(perturb(el, choices)),
            text => text.clone(),
        })
        .collect();
    out
}
