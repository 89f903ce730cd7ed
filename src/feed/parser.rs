//! Streaming flattener for FPDS ATOM pages
//!
//! Each `<entry>` becomes one [`RawRecord`]. Element local names below the
//! entry are joined with `__` (namespace prefixes dropped), leaf text is the
//! value, and attributes become `<path>__<attribute>`:
//!
//! ```text
//! <content><ns1:award><ns1:contractData>
//!   <ns1:contractActionType description="DELIVERY ORDER">C</ns1:contractActionType>
//!
//! content__award__contractData__contractActionType              = "C"
//! content__award__contractData__contractActionType__description = "DELIVERY ORDER"
//! ```

use crate::error::{Error, Result};
use crate::types::RawRecord;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::Value;

const SEPARATOR: &str = "__";

/// One parsed page of the feed
#[derive(Debug, Default)]
pub struct FeedPage {
    /// Flattened entries, in feed order
    pub records: Vec<RawRecord>,
    /// Whether the page advertised a `rel="next"` link
    pub has_next: bool,
}

struct Frame {
    name: String,
    text: String,
    has_children: bool,
}

#[derive(Default)]
struct EntryBuilder {
    record: RawRecord,
    stack: Vec<Frame>,
}

impl EntryBuilder {
    fn key_for(&self, name: &str) -> String {
        let mut key = String::new();
        for frame in &self.stack {
            key.push_str(&frame.name);
            key.push_str(SEPARATOR);
        }
        key.push_str(name);
        key
    }

    fn open(&mut self, name: String, element: &BytesStart<'_>) -> Result<()> {
        self.leaf(&name, element)?;
        self.stack.push(Frame {
            name,
            text: String::new(),
            has_children: false,
        });
        Ok(())
    }

    /// Record a child element's attributes and mark its parent as a branch
    fn leaf(&mut self, name: &str, element: &BytesStart<'_>) -> Result<()> {
        if let Some(parent) = self.stack.last_mut() {
            parent.has_children = true;
        }
        let key = self.key_for(name);
        for attr in element.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let attr_name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            self.record.insert(
                format!("{key}{SEPARATOR}{attr_name}"),
                Value::String(value),
            );
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(frame) = self.stack.last_mut() {
            frame.text.push_str(text);
        }
    }

    fn close(&mut self) {
        if let Some(frame) = self.stack.pop()
            && !frame.has_children
            && !frame.text.is_empty()
        {
            let key = self.key_for(&frame.name);
            self.record.insert(key, Value::String(frame.text));
        }
    }

    fn finish(mut self) -> RawRecord {
        if !self.record.contains_key("contract_type") {
            let kind = if self.has_key_under("content__award__") {
                Some("AWARD")
            } else if self.has_key_under("content__IDV__") {
                Some("IDV")
            } else {
                None
            };
            if let Some(kind) = kind {
                self.record
                    .insert("contract_type".into(), Value::String(kind.into()));
            }
        }
        self.record
    }

    fn has_key_under(&self, prefix: &str) -> bool {
        self.record.keys().any(|k| k.starts_with(prefix))
    }
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn is_next_link(element: &BytesStart<'_>) -> Result<bool> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == b"rel" {
            return Ok(attr.unescape_value()? == "next");
        }
    }
    Ok(false)
}

/// Parse one ATOM page into flattened records
///
/// # Errors
///
/// Returns [`Error::Xml`] for malformed XML and [`Error::Feed`] when the
/// document has no `<feed>` root (FPDS serves HTML error pages with a 200
/// status on some failures).
pub fn parse_feed_page(xml: &str) -> Result<FeedPage> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut page = FeedPage::default();
    let mut saw_feed = false;
    let mut entry: Option<EntryBuilder> = None;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                let name = local_name(&element);
                match entry.as_mut() {
                    Some(current) => current.open(name, &element)?,
                    None if name == "entry" => entry = Some(EntryBuilder::default()),
                    None if name == "feed" => saw_feed = true,
                    None => {
                        if name == "link" && is_next_link(&element)? {
                            page.has_next = true;
                        }
                    }
                }
            }
            Event::Empty(element) => {
                let name = local_name(&element);
                match entry.as_mut() {
                    Some(current) => current.leaf(&name, &element)?,
                    None => {
                        if name == "link" && is_next_link(&element)? {
                            page.has_next = true;
                        }
                    }
                }
            }
            Event::Text(text) => {
                if let Some(current) = entry.as_mut() {
                    current.text(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = entry.as_mut() {
                    current.text(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                let closes_entry = entry.as_ref().is_some_and(|e| e.stack.is_empty());
                if closes_entry {
                    if let Some(done) = entry.take() {
                        page.records.push(done.finish());
                    }
                } else if let Some(current) = entry.as_mut() {
                    current.close();
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_feed {
        return Err(Error::Feed("response has no ATOM <feed> root".into()));
    }

    Ok(page)
}
