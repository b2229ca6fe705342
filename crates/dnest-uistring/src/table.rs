//! Message table parsing.

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info};

use crate::{Error, Result};

const MESSAGE_TAG: &[u8] = b"message";
const ID_ATTRIBUTE: &str = "mid";

/// Message id → text lookup loaded from a UIString XML file.
///
/// Every `<message mid="…">` element in the document contributes one entry,
/// wherever it is nested. Text and CDATA content are concatenated verbatim;
/// a message without content maps to an empty string. When an id appears
/// twice the later message wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiStringTable {
    messages: BTreeMap<u32, String>,
}

impl UiStringTable {
    /// Load a table from an XML file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading UI strings: {}", path.display());

        let xml = std::fs::read_to_string(path)?;
        Self::parse(&xml)
    }

    /// Parse a table from XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);

        let mut messages = BTreeMap::new();
        // Id and accumulated text of the message being read
        let mut current: Option<(u32, String)> = None;

        loop {
            let position = reader.buffer_position() as u64;
            match reader.read_event() {
                Ok(Event::Start(e)) if e.name().as_ref() == MESSAGE_TAG => {
                    current = Some((message_id(&e, position)?, String::new()));
                }
                Ok(Event::Empty(e)) if e.name().as_ref() == MESSAGE_TAG => {
                    messages.insert(message_id(&e, position)?, String::new());
                }
                Ok(Event::End(e)) if e.name().as_ref() == MESSAGE_TAG => {
                    if let Some((id, text)) = current.take() {
                        messages.insert(id, text);
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some((_, text)) = current.as_mut() {
                        let unescaped = e.unescape().map_err(|err| Error::Xml {
                            position,
                            message: err.to_string(),
                        })?;
                        text.push_str(&unescaped);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some((_, text)) = current.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(Error::Xml {
                        position: reader.error_position() as u64,
                        message: e.to_string(),
                    })
                }
            }
        }

        debug!(count = messages.len(), "UI strings loaded");
        Ok(Self { messages })
    }

    /// Look up a message by id.
    #[inline]
    pub fn get(&self, id: u32) -> Option<&str> {
        self.messages.get(&id).map(String::as_str)
    }

    /// Check whether an id is present.
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.messages.contains_key(&id)
    }

    /// Number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterate over `(id, text)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.messages.iter().map(|(id, text)| (*id, text.as_str()))
    }
}

fn message_id(element: &BytesStart<'_>, position: u64) -> Result<u32> {
    let attribute = element
        .try_get_attribute(ID_ATTRIBUTE)
        .map_err(|e| Error::Xml {
            position,
            message: e.to_string(),
        })?
        .ok_or(Error::MissingMessageId { position })?;

    let value = attribute.unescape_value().map_err(|e| Error::Xml {
        position,
        message: e.to_string(),
    })?;

    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidMessageId {
            value: value.clone().into_owned(),
            position,
        })
}
