use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Malformed feed markup, with the position where reading stopped.
#[derive(Debug, Clone, Error)]
#[error("XML parse error at byte {position}: {message}")]
pub struct FeedParseError {
    pub position: u64,
    pub message: String,
}

/// Article links pulled out of one feed document.
#[derive(Debug, Default)]
pub struct LinkExtraction {
    /// Trimmed `<link>` text of each `<item>`, in document order.
    pub links: Vec<String>,
    /// Items that had no `<link>` or only whitespace in it.
    pub skipped: usize,
    /// First markup problem met; `links` holds whatever survived it.
    pub malformed: Option<FeedParseError>,
}

/// Extract the article link of every `<item>` element.
///
/// Only the first unprefixed `<link>` inside an item counts, so
/// `<atom:link>` self-references are ignored. Text and CDATA content are
/// both accepted and the XML builtin entities are unescaped.
///
/// Parsing never fails outright. A link with a bad entity reference costs
/// only its own item. A document cut off inside an `<item>` keeps that
/// item's link if the `<link>` element had closed. Any other markup error
/// stops the scan, and the links found so far are returned. In every case
/// `malformed` records the first problem.
pub fn extract_item_links(body: &str) -> LinkExtraction {
    // quick-xml (0.37) never expands <!ENTITY> declarations; only the
    // five XML builtins are unescaped, so hostile feeds cannot pull in
    // external entities.
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut result = LinkExtraction::default();
    let mut buf = Vec::new();

    let mut in_item = false;
    // First link of the current item, once its element has closed
    let mut item_link: Option<String> = None;
    // Text gathered while inside that first <link>
    let mut capture: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => {
                    in_item = true;
                    item_link = None;
                    capture = None;
                }
                b"link" if in_item && item_link.is_none() && capture.is_none() => {
                    capture = Some(String::new());
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"link" => {
                if in_item && item_link.is_none() && capture.is_none() {
                    item_link = Some(String::new());
                }
            }
            Ok(Event::Text(e)) if capture.is_some() => match e.unescape() {
                Ok(unescaped) => {
                    if let Some(text) = capture.as_mut() {
                        text.push_str(&unescaped);
                    }
                }
                Err(err) => {
                    // Bad entity: give up on this item only
                    result.malformed.get_or_insert_with(|| FeedParseError {
                        position: reader.buffer_position(),
                        message: err.to_string(),
                    });
                    capture = None;
                    item_link = Some(String::new());
                }
            },
            Ok(Event::CData(e)) => {
                if let Some(text) = capture.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"link" => {
                    if let Some(text) = capture.take() {
                        item_link = Some(text);
                    }
                }
                b"item" if in_item => {
                    in_item = false;
                    match item_link.take().map(|l| l.trim().to_string()) {
                        Some(link) if !link.is_empty() => result.links.push(link),
                        _ => result.skipped += 1,
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => {
                if in_item {
                    if let Some(link) = item_link.take().map(|l| l.trim().to_string()) {
                        if !link.is_empty() {
                            result.links.push(link);
                        }
                    }
                    result.malformed.get_or_insert_with(|| FeedParseError {
                        position: reader.buffer_position(),
                        message: "unexpected end of document inside <item>".to_string(),
                    });
                }
                break;
            }
            Err(e) => {
                result.malformed.get_or_insert_with(|| FeedParseError {
                    position: reader.error_position(),
                    message: e.to_string(),
                });
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    result
}
