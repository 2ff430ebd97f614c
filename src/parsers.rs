//! Low-level helpers for streaming over LaunchBox XML documents.
//!
//! Every LaunchBox data file shares the same shape: a single `<LaunchBox>`
//! root whose children are flat records made of text-only elements. The
//! helpers here walk that shape without building a DOM.

use std::io::BufRead;

use quick_xml::{events::Event, name::QName, Reader};

use crate::error::ImportError;

/// Tag name of the root element every LaunchBox document must carry.
pub const ROOT_TAG: &str = "LaunchBox";

/// Advances `reader` past the document prolog to the root element and checks
/// its tag name.
pub fn expect_root<R: BufRead>(
    reader: &mut Reader<R>,
    buf: &mut Vec<u8>,
) -> Result<(), ImportError> {
    loop {
        buf.clear();
        match reader.read_event_into(buf)? {
            Event::Start(ref e) if e.name().as_ref() == ROOT_TAG.as_bytes() => return Ok(()),
            Event::Start(ref e) => {
                return Err(ImportError::malformed(format!(
                    "expected a `<{ROOT_TAG}>` root node, found `<{}>`",
                    String::from_utf8_lossy(e.name().as_ref())
                )));
            }
            Event::Eof => {
                return Err(ImportError::malformed(format!(
                    "no `<{ROOT_TAG}>` root node found"
                )));
            }
            _ => {}
        }
    }
}

/// One step over the root's direct children: returns the next child element's
/// tag name, or `None` once the root element closes.
///
/// Self-closing children carry no text fields and are skipped here.
pub fn next_child<R: BufRead>(
    reader: &mut Reader<R>,
    buf: &mut Vec<u8>,
) -> Result<Option<String>, ImportError> {
    loop {
        buf.clear();
        match reader.read_event_into(buf)? {
            Event::Start(ref e) => {
                return Ok(Some(
                    String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                ));
            }
            Event::End(_) | Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Skips over the element named `tag`, including everything nested in it.
pub fn skip_current<R: BufRead>(
    reader: &mut Reader<R>,
    tag: &str,
    buf: &mut Vec<u8>,
) -> Result<(), ImportError> {
    buf.clear();
    reader.read_to_end_into(QName(tag.as_bytes()), buf)?;
    Ok(())
}

/// Collects the text-only direct children of the element named `parent` as
/// `(tag, trimmed text)` pairs, in document order. Grandchildren are skipped
/// whole.
pub fn collect_text_children<R: BufRead>(
    reader: &mut Reader<R>,
    parent: &str,
    buf: &mut Vec<u8>,
) -> Result<Vec<(String, String)>, ImportError> {
    let mut out = Vec::new();
    loop {
        buf.clear();
        match reader.read_event_into(buf)? {
            Event::Start(ref e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let text = read_element_text(reader, &tag)?;
                out.push((tag, text));
            }
            Event::End(ref e) if e.name().as_ref() == parent.as_bytes() => return Ok(out),
            Event::Eof => {
                return Err(ImportError::malformed(format!(
                    "`<{parent}>` element not closed"
                )));
            }
            _ => {}
        }
    }
}

/// Accumulates the text content of the element named `tag` up to its end tag,
/// skipping any nested elements.
fn read_element_text<R: BufRead>(reader: &mut Reader<R>, tag: &str) -> Result<String, ImportError> {
    let mut text = String::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Text(ref e) => text.push_str(&e.unescape()?),
            Event::Start(ref e) => {
                let mut skip_buf = Vec::new();
                reader.read_to_end_into(e.to_end().name(), &mut skip_buf)?;
            }
            Event::End(ref e) if e.name().as_ref() == tag.as_bytes() => {
                return Ok(text.trim().to_owned());
            }
            Event::Eof => {
                return Err(ImportError::malformed(format!(
                    "`<{tag}>` element not closed"
                )));
            }
            _ => {}
        }
    }
}
