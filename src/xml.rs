//! In-memory XML documents
//!
//! Metadata documents are built as a small element tree first and serialized
//! afterwards, so every field element exists even when its value is unknown.
//! Serialization uses `quick-xml`'s indenting writer.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

const INDENT_WIDTH: usize = 2;

/// Errors that can occur while writing or reading XML documents
#[derive(Debug, Error)]
pub enum XmlError {
    /// Serializing the element tree failed
    #[error("Failed to write XML: {0}")]
    Write(String),

    /// Serialized output was not valid UTF-8
    #[error("Serialized XML is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Failed to read an XML file from disk
    #[error("Failed to read XML file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse an XML file
    #[error("Failed to parse XML file {path}: {reason}")]
    ParseFailed { path: PathBuf, reason: String },
}

/// A single XML element with attributes, optional text and children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Text content, or an empty string when none is set
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the text only when a value is present; the element stays either way
    pub fn set_optional_text<T: Into<String>>(&mut self, text: Option<T>) -> &mut Self {
        if let Some(text) = text {
            self.text = Some(text.into());
        }
        self
    }

    /// Sets or replaces an attribute
    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key.to_string(), value)),
        }
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Appends a new child element and returns it for further editing
    pub fn sub_element(&mut self, name: &str) -> &mut Element {
        let index = self.sub_element_index(name);
        &mut self.children[index]
    }

    /// Appends a new child element and returns its position
    ///
    /// The position stays valid as long as no children are removed, which
    /// this type never does.
    pub fn sub_element_index(&mut self, name: &str) -> usize {
        self.children.push(Element::new(name));
        self.children.len() - 1
    }

    /// Child at a position returned by [`Element::sub_element_index`]
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn child_at_mut(&mut self, index: usize) -> &mut Element {
        &mut self.children[index]
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// A complete XML document ready to be written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: Element,
}

impl XmlDocument {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Serializes the document with an XML declaration and indentation
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Writes the serialized document into `output`
    pub fn write_to<W: Write>(&self, output: W) -> Result<(), XmlError> {
        let mut writer = Writer::new_with_indent(output, b' ', INDENT_WIDTH);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| XmlError::Write(e.to_string()))?;
        write_element(&mut writer, &self.root)?;

        writer
            .get_mut()
            .write_all(b"\n")
            .map_err(|e| XmlError::Write(e.to_string()))
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let text = element.text.as_deref().filter(|t| !t.is_empty());

    if text.is_none() && element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmlError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError::Write(e.to_string()))?;

    if let Some(text) = text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| XmlError::Write(e.to_string()))?;
    }

    for child in &element.children {
        write_element(writer, child)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| XmlError::Write(e.to_string()))
}

/// Identity of a show as recorded in an existing show metadata file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowIdentity {
    pub id: u64,
    pub name: String,
}

/// Reads the show id and title from an existing show metadata file
///
/// The id is taken from a `tvdbid` element, or from an `id` element without
/// a `moviedb` attribute. Returns `None` when either value is missing.
pub fn read_show_identity(path: &Path) -> Result<Option<ShowIdentity>, XmlError> {
    let content = fs::read_to_string(path).map_err(|e| XmlError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    let mut current_element = String::new();
    let mut id: Option<String> = None;
    let mut name: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let foreign_id = e
                    .attributes()
                    .flatten()
                    .any(|attr| attr.key.as_ref() == b"moviedb");
                current_element = if tag == "id" && foreign_id {
                    String::new()
                } else {
                    tag
                };
            }
            Ok(Event::End(_)) => current_element.clear(),
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().trim().to_string();
                if text.is_empty() {
                    continue;
                }
                match current_element.as_str() {
                    "tvdbid" | "id" if id.is_none() => id = Some(text),
                    "title" if name.is_none() => name = Some(text),
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(XmlError::ParseFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
            _ => {}
        }
    }

    let identity = match (id.and_then(|i| i.parse::<u64>().ok()), name) {
        (Some(id), Some(name)) => Some(ShowIdentity { id, name }),
        _ => None,
    };

    Ok(identity)
}
