//! Minimal XHTML element tree.
//!
//! Parses a content document into an owned [`Element`] tree via quick-xml.
//! The tree is read-only for the rest of the pipeline: the reducer walks it
//! but never mutates it.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// A single element in a parsed content document.
///
/// Holds the tag name (namespace prefix stripped), the attributes in
/// document order, the child elements, and the text that belongs directly
/// to this element (text that is not inside any child).
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    /// Create an empty element with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            ..Element::default()
        }
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Find the first element with the given tag name, depth-first,
    /// including this element itself.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(tag))
    }
}

/// Parse a content document into its root element.
///
/// Strips a UTF-8 BOM if present and resolves the predefined XML entities.
/// Malformed XML is a hard error: a document that cannot be parsed into a
/// tree at all aborts the run.
pub fn parse_document(bytes: &[u8]) -> Result<Element> {
    let text = String::from_utf8(strip_bom(bytes).to_vec())?;
    let mut reader = Reader::from_str(&text);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(element_from(&e)?),
            Ok(Event::Empty(e)) => {
                let element = element_from(&e)?;
                attach(element, &mut stack, &mut root);
            }
            Ok(Event::End(_)) => {
                if let Some(element) = stack.pop() {
                    attach(element, &mut stack, &mut root);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                // Handle entity references like &apos; &lt; etc
                if let Some(top) = stack.last_mut() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    let resolved = match entity.as_ref() {
                        "apos" => "'",
                        "quot" => "\"",
                        "lt" => "<",
                        "gt" => ">",
                        "amp" => "&",
                        _ => "",
                    };
                    top.text.push_str(resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    root.ok_or_else(|| Error::MissingElement("document root".into()))
}

fn element_from(start: &BytesStart) -> Result<Element> {
    let name = start.name();
    let tag = String::from_utf8_lossy(local_name(name.as_ref())).into_owned();

    let mut attrs = Vec::new();
    for attr in start.attributes().flatten() {
        let key = String::from_utf8_lossy(local_name(attr.key.as_ref())).into_owned();
        let value = String::from_utf8(attr.value.to_vec())?;
        attrs.push((key, value));
    }

    Ok(Element {
        tag,
        attrs,
        children: Vec::new(),
        text: String::new(),
    })
}

/// Append a completed element to its parent, or make it the document root
/// if the stack is empty. Stray siblings after the root are ignored.
fn attach(element: Element, stack: &mut Vec<Element>, root: &mut Option<Element>) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    }
}

/// Strip UTF-8 BOM (byte order mark) if present
fn strip_bom(data: &[u8]) -> &[u8] {
    // UTF-8 BOM: EF BB BF
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}

/// Extract local name from potentially namespaced XML name
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}
