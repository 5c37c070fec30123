//! Minimal owned XML element tree built on quick-xml events.
//!
//! E-utilities documents are small (one article per request), so the whole
//! document is materialized and queried by element name. Namespaces are
//! ignored: elements are keyed by their local name.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Errors raised while building an [`XmlElement`] tree
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// The underlying reader rejected the document
    #[error("malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),

    /// Start and end tags do not balance
    #[error("unbalanced XML: {0}")]
    Unbalanced(String),

    /// No root element was found
    #[error("document has no root element")]
    Empty,
}

/// A node in the element tree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with its children, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    name: String,
    children: Vec<XmlNode>,
    // Set when some text directly inside this element could not be decoded.
    malformed: bool,
}

impl XmlElement {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
            malformed: false,
        }
    }

    /// Parse a document and return its root element
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    stack.push(XmlElement::new(name));
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    attach(&mut stack, &mut root, XmlElement::new(name))?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlError::Unbalanced("unexpected end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    if let Some(parent) = stack.last_mut() {
                        match e.unescape() {
                            Ok(text) if !text.is_empty() => {
                                parent.children.push(XmlNode::Text(text.into_owned()));
                            }
                            Ok(_) => {}
                            Err(err) => {
                                tracing::debug!("Undecodable text in <{}>: {}", parent.name, err);
                                parent.malformed = true;
                            }
                        }
                    }
                }
                Event::CData(e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e).into_owned();
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::Unbalanced(format!("<{}> is never closed", open.name)));
        }

        root.ok_or(XmlError::Empty)
    }

    /// Local name of this element
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Child elements, skipping text nodes
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// All direct children with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.name == name)
    }

    /// First descendant with the given name, in document order
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Text content of this element and all its descendants, whitespace collapsed
    ///
    /// Empty when any text in the subtree could not be decoded (for example an
    /// entity the document never declares).
    pub fn text(&self) -> String {
        let mut raw = String::new();
        if !self.collect_text(&mut raw) {
            return String::new();
        }
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Text of the first direct child with the given name, or empty
    pub fn child_text(&self, name: &str) -> String {
        self.child(name).map(XmlElement::text).unwrap_or_default()
    }

    fn collect_text(&self, out: &mut String) -> bool {
        if self.malformed {
            return false;
        }
        for node in &self.children {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => {
                    if !element.collect_text(out) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(XmlError::Unbalanced(format!(
                "second root element <{}>",
                element.name
            )))
        }
    }
    Ok(())
}
