//! DAISY 3 package (OPF) and navigation (NCX) files.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::book::Metadata;
use crate::smil::{Clip, ClipError, clip_from_element, is_audio, parse_clock_value};
use crate::util::{attr_value, local_name, normalize_label, resolve_entity};

/// Media type DAISY 3 uses for the NCX.
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// A manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub href: String,
    pub media_type: String,
}

/// Parsed OPF package data.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub metadata: Metadata,
    /// Maps manifest id -> item
    pub manifest: HashMap<String, ManifestItem>,
    pub spine_ids: Vec<String>,
    /// Manifest id named by the spine's `toc` attribute.
    pub toc_id: Option<String>,
}

impl Package {
    /// The NCX href: the spine's `toc` item, else the first manifest item of
    /// the NCX media type.
    pub fn ncx_href(&self) -> Option<&str> {
        if let Some(item) = self.toc_id.as_ref().and_then(|id| self.manifest.get(id)) {
            return Some(&item.href);
        }
        let mut candidates: Vec<&ManifestItem> = self
            .manifest
            .values()
            .filter(|item| item.media_type == NCX_MEDIA_TYPE)
            .collect();
        candidates.sort_by(|a, b| a.href.cmp(&b.href));
        candidates.first().map(|item| item.href.as_str())
    }
}

/// Parse an OPF package document.
pub fn parse_opf(content: &str) -> Result<Package, quick_xml::Error> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut package = Package::default();
    let mut in_metadata = false;
    let mut current_element: Option<String> = None;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref()).to_ascii_lowercase();

                match local.as_slice() {
                    b"metadata" | b"dc-metadata" => in_metadata = true,
                    b"title" | b"creator" | b"language" | b"identifier" => {
                        if in_metadata {
                            current_element = Some(String::from_utf8_lossy(&local).to_string());
                            buf_text.clear();
                        }
                    }
                    b"spine" => package.toc_id = attribute(&e, b"toc"),
                    b"item" => add_manifest_item(&e, &mut package),
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"item" => add_manifest_item(&e, &mut package),
                    b"itemref" => {
                        if let Some(idref) = attribute(&e, b"idref") {
                            package.spine_ids.push(idref);
                        }
                    }
                    b"meta" => {
                        if attribute(&e, b"name").as_deref() == Some("dtb:totalTime") {
                            package.metadata.total_time = attribute(&e, b"content")
                                .and_then(|value| parse_clock_value(&value));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if current_element.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if current_element.is_some() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        buf_text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref()).to_ascii_lowercase();

                if local == b"metadata" {
                    in_metadata = false;
                }

                if let Some(ref elem) = current_element {
                    let metadata = &mut package.metadata;
                    match elem.as_str() {
                        "title" => metadata.title = buf_text.clone(),
                        "creator" => metadata.authors.push(buf_text.clone()),
                        "language" => metadata.language = buf_text.clone(),
                        "identifier" if metadata.identifier.is_empty() => {
                            metadata.identifier = buf_text.clone()
                        }
                        _ => {}
                    }
                    current_element = None;
                    buf_text.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e),
            _ => {}
        }
    }

    Ok(package)
}

fn add_manifest_item(e: &BytesStart<'_>, package: &mut Package) {
    let mut id = String::new();
    let mut href = String::new();
    let mut media_type = String::new();

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => id = attr_value(&attr),
            b"href" => href = attr_value(&attr),
            b"media-type" => media_type = attr_value(&attr),
            _ => {}
        }
    }

    if !id.is_empty() {
        package.manifest.insert(id, ManifestItem { href, media_type });
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| attr_value(&attr))
}

// ----------------------------------------------------------------------------
// NCX
// ----------------------------------------------------------------------------

/// A navigation target of the NCX with its label and self-describing clip.
#[derive(Debug, Clone, PartialEq)]
pub struct NavTarget {
    pub label: String,
    pub clip: Clip,
}

/// Heading and page targets of an NCX, each in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavTargets {
    /// `navMap` points, nested ones included, in pre-order.
    pub headings: Vec<NavTarget>,
    /// `pageList` targets.
    pub pages: Vec<NavTarget>,
    /// Targets dropped because their label had no `<audio>`.
    pub skipped: usize,
}

#[derive(Default)]
struct PendingTarget {
    label: Option<String>,
    clip: Option<Clip>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    NavMap,
    PageList,
}

/// Parse the `navMap` and `pageList` of an NCX document.
pub fn parse_ncx(content: &str) -> Result<NavTargets, ClipError> {
    let mut reader = Reader::from_str(content);

    let mut section: Option<Section> = None;
    // Indices into `pending` of the open navPoint/pageTarget elements
    let mut stack: Vec<usize> = Vec::new();
    let mut pending: Vec<(Section, PendingTarget)> = Vec::new();
    let mut in_label = false;
    let mut in_text = false;

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"navMap" => section = Some(Section::NavMap),
                    b"pageList" => section = Some(Section::PageList),
                    b"navPoint" | b"pageTarget" => {
                        if let Some(section) = section {
                            stack.push(pending.len());
                            pending.push((section, PendingTarget::default()));
                        }
                    }
                    b"navLabel" => in_label = true,
                    b"text" => in_text = in_label,
                    _ if is_audio(&e) => set_clip(&e, offset, in_label, &stack, &mut pending)?,
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if is_audio(&e) {
                    set_clip(&e, offset, in_label, &stack, &mut pending)?;
                }
            }
            Event::Text(e) => {
                if in_text {
                    append_label(&String::from_utf8_lossy(e.as_ref()), &stack, &mut pending);
                }
            }
            Event::GeneralRef(e) => {
                if in_text && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    append_label(&resolved, &stack, &mut pending);
                }
            }
            Event::End(e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"navMap" | b"pageList" => section = None,
                    b"navPoint" | b"pageTarget" => {
                        stack.pop();
                    }
                    b"navLabel" => in_label = false,
                    b"text" => in_text = false,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut targets = NavTargets::default();
    for (section, target) in pending {
        let (Some(clip), label) = (target.clip, target.label) else {
            targets.skipped += 1;
            continue;
        };
        let target = NavTarget {
            label: label.map(|l| normalize_label(&l)).unwrap_or_default(),
            clip,
        };
        match section {
            Section::NavMap => targets.headings.push(target),
            Section::PageList => targets.pages.push(target),
        }
    }

    Ok(targets)
}

fn current<'a>(
    stack: &[usize],
    pending: &'a mut [(Section, PendingTarget)],
) -> Option<&'a mut PendingTarget> {
    let idx = *stack.last()?;
    pending.get_mut(idx).map(|(_, target)| target)
}

fn set_clip(
    e: &BytesStart<'_>,
    offset: usize,
    in_label: bool,
    stack: &[usize],
    pending: &mut [(Section, PendingTarget)],
) -> Result<(), ClipError> {
    if !in_label {
        return Ok(());
    }
    if let Some(target) = current(stack, pending)
        && target.clip.is_none()
    {
        target.clip = Some(clip_from_element(e, offset)?);
    }
    Ok(())
}

fn append_label(text: &str, stack: &[usize], pending: &mut [(Section, PendingTarget)]) {
    if let Some(target) = current(stack, pending) {
        target.label.get_or_insert_with(String::new).push_str(text);
    }
}
