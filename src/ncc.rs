//! DAISY 2.02 navigation control center (`ncc.html`).
//!
//! The NCC is an XHTML file whose headings (`<h1>`..`<h6>`) and page spans
//! (`<span class="page-normal">` and friends) each wrap a link into a SMIL
//! document, e.g. `<h2 id="cn23541"><a href="s0823.smil#tx24767">R</a></h2>`.

use indexmap::IndexSet;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::anchor::AnchorKind;
use crate::book::Metadata;
use crate::smil::parse_clock_value;
use crate::util::{attr_value, is_smil, local_name, normalize_label, resolve_entity, split_href};

/// A heading or page entry of the NCC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NccEntry {
    pub kind: AnchorKind,
    pub label: String,
    /// SMIL document the entry links into.
    pub document: String,
    /// Identifier inside that document.
    pub target: String,
}

/// Everything the navigator needs from `ncc.html`.
#[derive(Debug, Clone, Default)]
pub struct Ncc {
    pub metadata: Metadata,
    /// Every SMIL document referenced, in first-occurrence order.
    pub documents: Vec<String>,
    pub entries: Vec<NccEntry>,
}

struct OpenLink {
    href: String,
    label: String,
}

/// Parse an NCC document.
///
/// Real-world NCC files are not always well formed, so mismatched end tags
/// are tolerated.
pub fn parse_ncc(content: &str) -> Result<Ncc, quick_xml::Error> {
    let mut reader = Reader::from_str(content);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut metadata = Metadata::default();
    let mut documents: IndexSet<String> = IndexSet::new();
    let mut entries = Vec::new();

    // The heading or page element we are inside, with its tag name
    let mut context: Option<(AnchorKind, Vec<u8>)> = None;
    let mut link: Option<OpenLink> = None;
    let mut in_title = false;
    let mut title_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"a" => {
                        if let Some(href) = href_of(&e) {
                            note_document(&mut documents, &href);
                            link = Some(OpenLink {
                                href,
                                label: String::new(),
                            });
                        }
                    }
                    b"title" => in_title = true,
                    b"meta" => read_meta(&e, &mut metadata),
                    _ => {
                        if let Some(kind) = anchor_kind(local, &e) {
                            context = Some((kind, local.to_vec()));
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"a" => {
                        if let Some(href) = href_of(&e) {
                            note_document(&mut documents, &href);
                        }
                    }
                    b"meta" => read_meta(&e, &mut metadata),
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                let text = String::from_utf8_lossy(e.as_ref());
                if let Some(open) = link.as_mut() {
                    open.label.push_str(&text);
                } else if in_title {
                    title_text.push_str(&text);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_entity(&entity) {
                    if let Some(open) = link.as_mut() {
                        open.label.push_str(&resolved);
                    } else if in_title {
                        title_text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"a" => {
                        if let (Some(open), Some((kind, _))) = (link.take(), context.as_ref()) {
                            let (document, target) = split_href(&open.href);
                            if let Some(target) = target
                                && is_smil(&document)
                            {
                                entries.push(NccEntry {
                                    kind: *kind,
                                    label: normalize_label(&open.label),
                                    document,
                                    target: target.to_string(),
                                });
                            }
                        }
                    }
                    b"title" => in_title = false,
                    _ => {
                        if context.as_ref().is_some_and(|(_, tag)| tag.as_slice() == local) {
                            context = None;
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e),
            _ => {}
        }
    }

    if metadata.title.is_empty() {
        metadata.title = normalize_label(&title_text);
    }

    Ok(Ncc {
        metadata,
        documents: documents.into_iter().collect(),
        entries,
    })
}

fn href_of(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"href")
        .map(|attr| attr_value(&attr))
}

fn note_document(documents: &mut IndexSet<String>, href: &str) {
    let (document, _) = split_href(href);
    if is_smil(&document) {
        documents.insert(document);
    }
}

/// Headings are `h1`..`h6`; pages are spans classed `page-normal`,
/// `page-front` or `page-special`.
fn anchor_kind(local: &[u8], e: &BytesStart<'_>) -> Option<AnchorKind> {
    match local {
        b"h1" | b"h2" | b"h3" | b"h4" | b"h5" | b"h6" => Some(AnchorKind::Heading),
        b"span" => {
            let is_page = e
                .attributes()
                .flatten()
                .filter(|attr| attr.key.as_ref() == b"class")
                .any(|attr| {
                    attr_value(&attr)
                        .split_ascii_whitespace()
                        .any(|class| class.starts_with("page-"))
                });
            is_page.then_some(AnchorKind::Page)
        }
        _ => None,
    }
}

fn read_meta(e: &BytesStart<'_>, metadata: &mut Metadata) {
    let mut name = None;
    let mut content = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"name" => name = Some(attr_value(&attr).to_ascii_lowercase()),
            b"content" => content = Some(attr_value(&attr)),
            _ => {}
        }
    }

    let (Some(name), Some(content)) = (name, content) else {
        return;
    };
    match name.as_str() {
        "dc:title" => metadata.title = content,
        "dc:creator" => metadata.authors.push(content),
        "dc:identifier" => metadata.identifier = content,
        "dc:language" => metadata.language = content,
        "ncc:totaltime" => metadata.total_time = parse_clock_value(&content),
        _ => {}
    }
}
