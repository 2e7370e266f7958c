//! JSON codec for virtual trees and edit scripts.
//!
//! Virtual trees use the JsonML layout: an element is
//! `[tag, attrs?, ...children]` where `attrs` is an object (or `null`) and
//! strings are text children. Attribute values map as follows:
//!
//! | attribute value | JSON |
//! |---|---|
//! | string / boolean / number | string / boolean / number |
//! | style mapping | object of strings, `$`-prefixed properties as `$$…` |
//! | handler | `{"$handler": label}` |
//!
//! Non-finite numbers have no JSON form and are written as strings
//! (`"NaN"`), which a host renders identically.
//!
//! Edit scripts are arrays of patch objects:
//!
//! ```json
//! {"op": "replace", "node": <child or null>}
//! {"op": "remove"}
//! {"op": "attrs", "changes": {"id": "new", "title": null}}
//! {"op": "children", "edits": [{"index": 0, "patches": [...]},
//!                              {"index": 1, "patch": {...}}]}
//! ```
//!
//! In `changes`, `null` is the removal marker; no attribute value encodes to
//! `null`, so it cannot be confused with a value.

use serde_json::{json, Map, Number, Value};
use thiserror::Error;

use crate::host::memory::format_number;
use crate::patch::{AttrChange, AttrChanges, ChildEdit, Patch};
use crate::vnode::{AttrValue, Attributes, Child, EventHandler, StyleMap, VNode};

const HANDLER_KEY: &str = "$handler";

#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    #[error("invalid node: {0}")]
    InvalidNode(String),
    #[error("invalid value for attribute `{key}`: {reason}")]
    InvalidAttribute { key: String, reason: String },
    #[error("invalid patch: {0}")]
    InvalidPatch(String),
}

// ── Virtual trees ─────────────────────────────────────────────────────────

pub fn vnode_to_json(node: &VNode) -> Value {
    let mut arr = Vec::with_capacity(node.children.len() + 2);
    arr.push(Value::String(node.tag.clone()));
    if !node.attributes.is_empty() {
        let attrs: Map<String, Value> = node
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), attr_value_to_json(v)))
            .collect();
        arr.push(Value::Object(attrs));
    }
    arr.extend(node.children.iter().map(child_to_json));
    Value::Array(arr)
}

pub fn child_to_json(child: &Child) -> Value {
    match child {
        Child::Text(s) => Value::String(s.clone()),
        Child::Element(node) => vnode_to_json(node),
    }
}

pub fn vnode_from_json(value: &Value) -> Result<VNode, CodecError> {
    let arr = value
        .as_array()
        .ok_or_else(|| CodecError::InvalidNode("element must be an array".into()))?;
    let tag = arr
        .first()
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CodecError::InvalidNode("element must start with a non-empty tag".into()))?;

    let mut rest = &arr[1..];
    let mut attributes = Attributes::new();
    match rest.first() {
        Some(Value::Object(map)) => {
            for (key, v) in map {
                attributes.insert(key.clone(), attr_value_from_json(key, v)?);
            }
            rest = &rest[1..];
        }
        Some(Value::Null) => rest = &rest[1..],
        _ => {}
    }

    let children = rest.iter().map(child_from_json).collect::<Result<Vec<_>, _>>()?;
    Ok(VNode {
        tag: tag.to_owned(),
        attributes,
        children,
    })
}

pub fn child_from_json(value: &Value) -> Result<Child, CodecError> {
    match value {
        Value::String(s) => Ok(Child::Text(s.clone())),
        Value::Array(_) => vnode_from_json(value).map(Child::Element),
        other => Err(CodecError::InvalidNode(format!(
            "child must be a string or an array, got {other}"
        ))),
    }
}

// ── Attribute values ──────────────────────────────────────────────────────

pub fn attr_value_to_json(value: &AttrValue) -> Value {
    match value {
        AttrValue::Str(s) => Value::String(s.clone()),
        AttrValue::Bool(b) => Value::Bool(*b),
        AttrValue::Number(n) => number_to_json(*n),
        AttrValue::Style(style) => Value::Object(
            style
                .iter()
                .map(|(k, v)| (escape_property(k), Value::String(v.clone())))
                .collect(),
        ),
        AttrValue::Handler(h) => {
            let mut m = Map::new();
            m.insert(HANDLER_KEY.to_owned(), Value::String(h.label().to_owned()));
            Value::Object(m)
        }
    }
}

fn number_to_json(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(format_number(n)))
}

/// Style properties starting with `$` get one more `$` on the wire, which
/// keeps them apart from the `$handler` tag.
fn escape_property(prop: &str) -> String {
    if prop.starts_with('$') {
        format!("${prop}")
    } else {
        prop.to_owned()
    }
}

/// Inverse of [`escape_property`]. `None` for an unescaped `$` property.
fn unescape_property(prop: &str) -> Option<String> {
    match prop.strip_prefix('$') {
        Some(rest) if rest.starts_with('$') => Some(rest.to_owned()),
        Some(_) => None,
        None => Some(prop.to_owned()),
    }
}

/// Decode one attribute value. Handlers decode to labelled no-op handlers.
pub fn attr_value_from_json(key: &str, value: &Value) -> Result<AttrValue, CodecError> {
    let invalid = |reason: &str| CodecError::InvalidAttribute {
        key: key.to_owned(),
        reason: reason.to_owned(),
    };
    match value {
        Value::String(s) => Ok(AttrValue::Str(s.clone())),
        Value::Bool(b) => Ok(AttrValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(AttrValue::Number).ok_or_else(|| invalid("number out of range")),
        Value::Object(map) => {
            if let Some(label) = map.get(HANDLER_KEY) {
                let label = label.as_str().ok_or_else(|| invalid("handler label must be a string"))?;
                return Ok(AttrValue::Handler(EventHandler::noop(label)));
            }
            let mut style = StyleMap::new();
            for (prop, v) in map {
                let prop = unescape_property(prop)
                    .ok_or_else(|| invalid("style properties starting with `$` must be escaped as `$$`"))?;
                let v = match v {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
                    _ => return Err(invalid("style values must be strings or numbers")),
                };
                style.insert(prop, v);
            }
            Ok(AttrValue::Style(style))
        }
        Value::Null => Err(invalid("null is not an attribute value")),
        Value::Array(_) => Err(invalid("arrays are not attribute values")),
    }
}

// ── Patches ───────────────────────────────────────────────────────────────

/// Serialize a single [`Patch`].
pub fn to_json(patch: &Patch) -> Value {
    match patch {
        Patch::Replace(node) => json!({
            "op": "replace",
            "node": node.as_ref().map(child_to_json).unwrap_or(Value::Null),
        }),
        Patch::Remove => json!({ "op": "remove" }),
        Patch::UpdateAttributes(changes) => {
            let changes: Map<String, Value> = changes
                .iter()
                .map(|(k, change)| {
                    let v = match change {
                        AttrChange::Set(v) => attr_value_to_json(v),
                        AttrChange::Remove => Value::Null,
                    };
                    (k.clone(), v)
                })
                .collect();
            json!({ "op": "attrs", "changes": changes })
        }
        Patch::UpdateChildren(edits) => {
            let edits: Vec<Value> = edits
                .iter()
                .map(|edit| match edit {
                    ChildEdit::Update { index, patches } => json!({
                        "index": index,
                        "patches": to_json_patch(patches),
                    }),
                    ChildEdit::At { index, patch } => json!({
                        "index": index,
                        "patch": to_json(patch),
                    }),
                })
                .collect();
            json!({ "op": "children", "edits": edits })
        }
    }
}

/// Serialize an edit script.
pub fn to_json_patch(patches: &[Patch]) -> Value {
    Value::Array(patches.iter().map(to_json).collect())
}

/// Deserialize a single [`Patch`].
pub fn from_json(value: &Value) -> Result<Patch, CodecError> {
    let obj = value
        .as_object()
        .ok_or_else(|| CodecError::InvalidPatch("patch must be an object".into()))?;
    let op = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| CodecError::InvalidPatch("missing \"op\"".into()))?;
    match op {
        "replace" => match obj.get("node") {
            None | Some(Value::Null) => Ok(Patch::Replace(None)),
            Some(node) => Ok(Patch::Replace(Some(child_from_json(node)?))),
        },
        "remove" => Ok(Patch::Remove),
        "attrs" => {
            let map = obj
                .get("changes")
                .and_then(Value::as_object)
                .ok_or_else(|| CodecError::InvalidPatch("\"attrs\" needs a \"changes\" object".into()))?;
            let mut changes = AttrChanges::new();
            for (key, v) in map {
                let change = match v {
                    Value::Null => AttrChange::Remove,
                    other => AttrChange::Set(attr_value_from_json(key, other)?),
                };
                changes.insert(key.clone(), change);
            }
            Ok(Patch::UpdateAttributes(changes))
        }
        "children" => {
            let edits = obj
                .get("edits")
                .and_then(Value::as_array)
                .ok_or_else(|| CodecError::InvalidPatch("\"children\" needs an \"edits\" array".into()))?;
            edits
                .iter()
                .map(child_edit_from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Patch::UpdateChildren)
        }
        other => Err(CodecError::InvalidPatch(format!("unknown op: {other}"))),
    }
}

fn child_edit_from_json(value: &Value) -> Result<ChildEdit, CodecError> {
    let index = value
        .get("index")
        .and_then(Value::as_u64)
        .ok_or_else(|| CodecError::InvalidPatch("child edit needs a non-negative \"index\"".into()))?
        as usize;
    if let Some(patches) = value.get("patches") {
        return Ok(ChildEdit::Update {
            index,
            patches: from_json_patch(patches)?,
        });
    }
    if let Some(patch) = value.get("patch") {
        return Ok(ChildEdit::At {
            index,
            patch: from_json(patch)?,
        });
    }
    Err(CodecError::InvalidPatch(
        "child edit needs \"patches\" or \"patch\"".into(),
    ))
}

/// Deserialize an edit script.
pub fn from_json_patch(value: &Value) -> Result<Vec<Patch>, CodecError> {
    value
        .as_array()
        .ok_or_else(|| CodecError::InvalidPatch("edit script must be an array".into()))?
        .iter()
        .map(from_json)
        .collect()
}
