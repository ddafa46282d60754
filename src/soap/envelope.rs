//! SOAP 1.1 envelope codec, document/literal wrapped style.
//!
//! Requests put the operation's input element as the single body child,
//! with parameter members serialized in schema-declared order regardless of
//! payload insertion order. The same payload therefore always produces the
//! same bytes.
//!
//! Responses are read back into the untyped value tree: repeated sibling
//! elements fold into a list, and the conventional single `*Result` member
//! of a wrapped response is unwrapped so callers see the content directly.

use std::fmt::Write;

use anyhow::anyhow;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use paleo_core::{OperationSchema, PaleoError, ParameterElement, Payload, Value, ValueMap};

use crate::soap::xml::{self, escape_text, XmlNode};

const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Serialize one call: `element` under `namespace` wrapping the payload.
pub fn build_request(
    element: &str,
    namespace: &str,
    schema: &OperationSchema,
    payload: &Payload,
) -> String {
    let mut out = String::with_capacity(512);
    out.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    let _ = write!(out, r#"<s:Envelope xmlns:s="{ENVELOPE_NS}"><s:Body>"#);
    let _ = write!(out, r#"<{element} xmlns="{}">"#, escape_text(namespace));
    for key in ordered_keys(payload, Some(&schema.elements)) {
        write_member(
            &mut out,
            key,
            &payload[key],
            child_declaration(Some(&schema.elements), key),
        );
    }
    let _ = write!(out, "</{element}></s:Body></s:Envelope>");
    out
}

/// Payload keys in schema-declared order first, then any remainder in
/// payload order. The degenerate no-schema case keeps payload order whole.
fn ordered_keys<'a>(
    map: &'a Payload,
    declared: Option<&'a [ParameterElement]>,
) -> Vec<&'a str> {
    let mut keys: Vec<&str> = Vec::with_capacity(map.len());
    if let Some(declared) = declared {
        for element in declared {
            if map.contains_key(element.name.as_str()) {
                keys.push(element.name.as_str());
            }
        }
    }
    for key in map.keys() {
        if !keys.contains(&key.as_str()) {
            keys.push(key);
        }
    }
    keys
}

fn child_declaration<'a>(
    declared: Option<&'a [ParameterElement]>,
    name: &str,
) -> Option<&'a [ParameterElement]> {
    declared?
        .iter()
        .find(|element| element.name == name)?
        .nested()
}

fn write_member(out: &mut String, name: &str, value: &Value, declared: Option<&[ParameterElement]>) {
    match value {
        Value::Text(text) => {
            let _ = write!(out, "<{name}>{}</{name}>", escape_text(text));
        }
        Value::Bytes(bytes) => {
            let _ = write!(out, "<{name}>{}</{name}>", BASE64.encode(bytes));
        }
        Value::Map(map) => {
            let _ = write!(out, "<{name}>");
            for key in ordered_keys(map, declared) {
                write_member(out, key, &map[key], child_declaration(declared, key));
            }
            let _ = write!(out, "</{name}>");
        }
        Value::List(items) => {
            for item in items {
                write_member(out, name, item, declared);
            }
        }
    }
}

/// Read a response body back into the value tree.
///
/// `Ok(None)` is an empty SOAP body. A fault becomes [`PaleoError::Fault`]
/// whatever the HTTP status was; anything else unparseable is a transport
/// failure.
pub fn parse_response(body: &str) -> Result<Option<Value>, PaleoError> {
    let root = xml::parse(body)
        .map_err(|e| PaleoError::Transport(e.context("unparseable SOAP response")))?;
    if root.name != "Envelope" {
        return Err(PaleoError::Transport(anyhow!(
            "response root is <{}>, not a SOAP envelope",
            root.name
        )));
    }
    let body_node = root
        .child("Body")
        .ok_or_else(|| PaleoError::Transport(anyhow!("SOAP envelope has no Body")))?;
    let Some(first) = body_node.children.first() else {
        return Ok(None);
    };
    if first.name == "Fault" {
        return Err(PaleoError::Fault {
            code: first
                .child("faultcode")
                .map(|node| node.text.clone())
                .unwrap_or_default(),
            message: first
                .child("faultstring")
                .map(|node| node.text.clone())
                .unwrap_or_default(),
        });
    }
    Ok(Some(unwrap_result(element_value(first))))
}

fn element_value(node: &XmlNode) -> Value {
    if node.children.is_empty() {
        return Value::Text(node.text.clone());
    }
    let mut map = ValueMap::new();
    for child in &node.children {
        let value = element_value(child);
        match map.get_mut(&child.name) {
            Some(Value::List(items)) => items.push(value),
            Some(existing) => {
                let first = existing.clone();
                *existing = Value::List(vec![first, value]);
            }
            None => {
                map.insert(child.name.clone(), value);
            }
        }
    }
    Value::Map(map)
}

// Wrapped responses carry a single `<OperazioneResult>` member; hand its
// content to the caller directly, the way dynamic SOAP clients do.
fn unwrap_result(value: Value) -> Value {
    match value {
        Value::Map(mut map)
            if map.len() == 1 && map.keys().next().is_some_and(|key| key.ends_with("Result")) =>
        {
            match map.swap_remove_index(0) {
                Some((_, inner)) => inner,
                None => Value::Map(map),
            }
        }
        other => other,
    }
}
