//! Minimal XML tree for WSDL documents and SOAP bodies.
//!
//! Element names are stored namespace-stripped because every consumer here
//! matches on local names; deployments disagree on prefixes even for the
//! same schema. Attribute keys are kept as written since some carry their
//! own meaning in full (`soapAction`, `targetNamespace`).

use anyhow::{anyhow, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub text: String,
}

impl XmlNode {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First child element with this local name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|node| node.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |node| node.name == name)
    }
}

/// Drop any namespace prefix from a qualified name, `tns:Elemento` style.
pub fn local_part(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Parse a complete document into a tree of local-named elements.
pub fn parse(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(node_from(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let node = node_from(e)?;
                place(node, &mut stack, &mut root);
            }
            Ok(Event::End(_)) => {
                let completed = stack.pop().context("unexpected closing tag")?;
                place(completed, &mut stack, &mut root);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().context("invalid character data")?;
                append_text(&mut stack, &text);
            }
            Ok(Event::CData(ref e)) => {
                let text =
                    std::str::from_utf8(e.as_ref()).context("CDATA section is not UTF-8")?;
                append_text(&mut stack, text);
            }
            Ok(Event::Eof) => {
                if let Some(open) = stack.last() {
                    return Err(anyhow!("unclosed element <{}>", open.name));
                }
                break;
            }
            Ok(_) => {} // declarations, comments, PIs
            Err(e) => {
                return Err(anyhow!(
                    "XML parse error at position {}: {e}",
                    reader.error_position()
                ));
            }
        }
    }

    root.ok_or_else(|| anyhow!("document has no root element"))
}

fn node_from(e: &BytesStart) -> Result<XmlNode> {
    let name = std::str::from_utf8(e.local_name().as_ref())
        .context("element name is not UTF-8")?
        .to_string();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.context("malformed attribute")?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .context("attribute key is not UTF-8")?
            .to_string();
        let value = attr
            .unescape_value()
            .context("invalid attribute value")?
            .to_string();
        attributes.push((key, value));
    }
    Ok(XmlNode {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

// Completed elements carry their text edge-trimmed; interior whitespace is
// content (line-wrapped base64 stays intact).
fn place(mut node: XmlNode, stack: &mut Vec<XmlNode>, root: &mut Option<XmlNode>) {
    if node.text.starts_with(char::is_whitespace) || node.text.ends_with(char::is_whitespace) {
        node.text = node.text.trim().to_string();
    }
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else {
        *root = Some(node);
    }
}

// Whitespace-only runs between elements are formatting, not content.
fn append_text(stack: &mut [XmlNode], text: &str) {
    if text.chars().all(char::is_whitespace) {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent.text.push_str(text);
    }
}

/// Escape text content for embedding in an XML document. Single pass, no
/// allocation when nothing needs escaping.
pub fn escape_text(s: &str) -> Cow<'_, str> {
    if !s.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_with_stripped_prefixes() {
        let tree = parse(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                 <s:Body>
                   <Risposta><Esito>OK</Esito></Risposta>
                 </s:Body>
               </s:Envelope>"#,
        )
        .unwrap();
        assert_eq!(tree.name, "Envelope");
        let body = tree.child("Body").unwrap();
        let esito = body.child("Risposta").unwrap().child("Esito").unwrap();
        assert_eq!(esito.text, "OK");
    }

    #[test]
    fn keeps_attribute_keys_as_written() {
        let tree = parse(r#"<wsdl:part name="parameters" element="tns:Cerca"/>"#).unwrap();
        assert_eq!(tree.name, "part");
        assert_eq!(tree.attr("name"), Some("parameters"));
        assert_eq!(tree.attr("element"), Some("tns:Cerca"));
        assert_eq!(local_part(tree.attr("element").unwrap()), "Cerca");
    }

    #[test]
    fn collects_text_and_cdata_skipping_formatting_whitespace() {
        let tree = parse("<File>\n  <![CDATA[Y2lh]]>bw==\n</File>").unwrap();
        assert_eq!(tree.text, "Y2lhbw==");
    }

    #[test]
    fn unescapes_entities() {
        let tree = parse(r#"<Nome attr="a&amp;b">P &lt; Q</Nome>"#).unwrap();
        assert_eq!(tree.text, "P < Q");
        assert_eq!(tree.attr("attr"), Some("a&b"));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse("<aperto>").is_err());
        assert!(parse("solo testo").is_err());
    }

    #[test]
    fn escape_round_trips_reserved_characters() {
        assert_eq!(escape_text("pulito"), "pulito");
        assert_eq!(
            escape_text(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&apos;"
        );
    }
}
