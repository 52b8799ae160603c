//! SOAP envelope construction and a small XML tree for reading responses.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// SOAP 1.1 envelope namespace (`soapenv`).
pub const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
/// Admin service namespace (`soap`); also the `SOAPAction` prefix.
pub const SERVICE_NS: &str = "http://soap.admin.openexchange.com";
/// Context and credential data objects (`xsd`).
pub const CONTEXT_NS: &str = "http://dataobjects.soap.admin.openexchange.com/xsd";
/// User and group data objects (`xsd1`).
pub const DATA_NS: &str = "http://dataobjects.rmi.admin.openexchange.com/xsd";

/// Append-only builder for the body of a SOAP request.
///
/// Text content is escaped; tag names are trusted and written verbatim.
#[derive(Debug, Default)]
pub(crate) struct XmlBuilder {
    buf: String,
}

impl XmlBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `<tag>value</tag>`
    pub(crate) fn text(mut self, tag: &str, value: &str) -> Self {
        self.open(tag);
        self.buf.push_str(&escape(value));
        self.close(tag);
        self
    }

    /// Like [`XmlBuilder::text`], skipped entirely when `value` is `None`.
    pub(crate) fn text_opt(self, tag: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.text(tag, value),
            None => self,
        }
    }

    /// One `<tag>` element per value, in order.
    pub(crate) fn texts<S: AsRef<str>>(self, tag: &str, values: &[S]) -> Self {
        values
            .iter()
            .fold(self, |builder, value| builder.text(tag, value.as_ref()))
    }

    /// `<tag/>`
    pub(crate) fn empty(mut self, tag: &str) -> Self {
        self.buf.push('<');
        self.buf.push_str(tag);
        self.buf.push_str("/>");
        self
    }

    /// `<tag>true</tag>` / `<tag>false</tag>`
    pub(crate) fn flag(self, tag: &str, value: bool) -> Self {
        self.text(tag, if value { "true" } else { "false" })
    }

    /// `<tag>…</tag>` with content produced by `content`.
    pub(crate) fn nest(mut self, tag: &str, content: impl FnOnce(XmlBuilder) -> XmlBuilder) -> Self {
        self.open(tag);
        let inner = content(XmlBuilder::new());
        self.buf.push_str(&inner.buf);
        self.close(tag);
        self
    }

    fn open(&mut self, tag: &str) {
        self.buf.push('<');
        self.buf.push_str(tag);
        self.buf.push('>');
    }

    fn close(&mut self, tag: &str) {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
    }

    pub(crate) fn finish(self) -> String {
        self.buf
    }
}

/// Wrap the request content for `action` in a complete SOAP envelope.
pub(crate) fn envelope(action: &str, content: XmlBuilder) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soapenv:Envelope xmlns:soapenv="{envelope}" xmlns:soap="{service}" xmlns:xsd="{context}" xmlns:xsd1="{data}">"#,
            "<soapenv:Header/><soapenv:Body><soap:{action}>{content}</soap:{action}></soapenv:Body>",
            "</soapenv:Envelope>"
        ),
        envelope = ENVELOPE_NS,
        service = SERVICE_NS,
        context = CONTEXT_NS,
        data = DATA_NS,
        action = action,
        content = content.finish(),
    )
}

/// Element of a parsed XML document, addressed by local (prefix-free) name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn named(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            ..Self::default()
        }
    }

    /// Parse a document and return its root element.
    pub fn parse(xml: &str) -> Result<XmlNode, String> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => stack.push(XmlNode::named(&e)),
                Ok(Event::Empty(e)) => attach(&mut stack, &mut root, XmlNode::named(&e))?,
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(|e| format!("invalid text: {e}"))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Ok(Event::End(_)) => {
                    let node = stack.pop().ok_or("unbalanced end tag")?;
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(format!(
                        "XML parse error at position {}: {e}",
                        reader.buffer_position()
                    ))
                }
                Ok(_) => {}
            }
        }

        if !stack.is_empty() {
            return Err("unexpected end of document".to_string());
        }
        root.ok_or_else(|| "document has no root element".to_string())
    }

    /// First direct child with the given local name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of the first direct child with the given name.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }

    /// First descendant (depth-first, self included) with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// The operation response element inside `Envelope/Body`.
    #[must_use]
    pub fn soap_response(&self) -> Option<&XmlNode> {
        self.find("Body").and_then(|body| body.children.first())
    }
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), String> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        Ok(())
    } else if root.is_none() {
        *root = Some(node);
        Ok(())
    } else {
        Err("multiple root elements".to_string())
    }
}
