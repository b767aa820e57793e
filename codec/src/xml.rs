//! Reading element trees from XML map exports.
//!
//! ```xml
//! <Map>
//!   <levels>
//!     <level name="a-00" x="0" y="-184">
//!       <solids>0011
//! 0011</solids>
//!     </level>
//!   </levels>
//! </Map>
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use wire::Limits;

use crate::element::Element;
use crate::error::{CodecError, CodecResult, LimitKind};

/// Parses an XML document into an element tree ready for [`encode_map`].
///
/// Attribute text is typed with [`ScalarValue::infer`]. Text inside an
/// element without children becomes its inner text, kept verbatim so tile
/// grids keep their blank rows; whitespace-only text is dropped. Comments,
/// processing instructions and the declaration are skipped.
///
/// Nesting is bounded by the default decode depth, so anything read here can
/// be decoded again with default options.
///
/// [`encode_map`]: crate::encode_map
/// [`ScalarValue::infer`]: crate::ScalarValue::infer
pub fn element_from_xml(xml: &str) -> CodecResult<Element> {
    let max_depth = Limits::default().max_depth;
    let mut reader = Reader::from_str(xml);

    // Open elements with the text collected directly inside them.
    let mut stack: Vec<(Element, String)> = Vec::new();
    let mut root: Option<Element> = None;
    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                check_depth(stack.len() + 1, max_depth)?;
                stack.push((read_element(e)?, String::new()));
            }
            Event::Empty(ref e) => {
                check_depth(stack.len() + 1, max_depth)?;
                attach(&mut stack, &mut root, read_element(e)?)?;
            }
            Event::Text(ref t) => {
                if let Some((_, text)) = stack.last_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(ref c) => {
                if let Some((_, text)) = stack.last_mut() {
                    let data = std::str::from_utf8(c)
                        .map_err(|e| CodecError::Xml(format!("CDATA is not UTF-8: {e}")))?;
                    text.push_str(data);
                }
            }
            Event::End(_) => {
                let Some((mut element, text)) = stack.pop() else {
                    return Err(CodecError::Xml("unexpected closing tag".into()));
                };
                if element.children.is_empty() && !text.trim().is_empty() {
                    element = element.with_text(text);
                }
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some((element, _)) = stack.last() {
        return Err(CodecError::Xml(format!("element <{}> is never closed", element.name)));
    }
    let root = root.ok_or_else(|| CodecError::Xml("document has no root element".into()))?;
    tracing::debug!(
        root = %root.name,
        elements = root.count_elements(),
        "read xml map"
    );
    Ok(root)
}

fn check_depth(depth: usize, max_depth: usize) -> CodecResult<()> {
    if depth > max_depth {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::ElementDepth,
            limit: max_depth,
            actual: depth,
        });
    }
    Ok(())
}

fn read_element(start: &BytesStart<'_>) -> CodecResult<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        element = element.with_text_attr(key, &attr.unescape_value()?);
    }
    Ok(element)
}

fn attach(
    stack: &mut [(Element, String)],
    root: &mut Option<Element>,
    element: Element,
) -> CodecResult<()> {
    if let Some((parent, _)) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(CodecError::Xml(format!(
            "second root element <{}>",
            element.name
        )));
    } else {
        *root = Some(element);
    }
    Ok(())
}
