//! Heading and page anchors, and how DAISY 2.02 anchor targets are located.

use memchr::memmem;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::options::TargetLookup;
use crate::smil::Clip;

/// What an anchor marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorKind {
    Heading,
    Page,
}

/// A DAISY 2.02 anchor: a label pointing at an identifier inside a SMIL document.
///
/// Its clip is only known once `target` has been located in the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAnchor {
    pub label: String,
    pub target: String,
}

/// A DAISY 3 anchor, which carries its own clip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipAnchor {
    pub label: String,
    /// Fragment index position of `clip.src`.
    pub position: usize,
    pub clip: Clip,
}

/// The anchors owned by one SMIL document, in navigation-document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorBlock {
    pub headings: Vec<TextAnchor>,
    pub pages: Vec<TextAnchor>,
}

impl AnchorBlock {
    pub fn of_kind(&self, kind: AnchorKind) -> &[TextAnchor] {
        match kind {
            AnchorKind::Heading => &self.headings,
            AnchorKind::Page => &self.pages,
        }
    }

    pub fn push(&mut self, kind: AnchorKind, anchor: TextAnchor) {
        match kind {
            AnchorKind::Heading => self.headings.push(anchor),
            AnchorKind::Page => self.pages.push(anchor),
        }
    }
}

/// Finds the byte offset of an anchor target inside a SMIL document's text.
pub trait AnchorLocator: Send + Sync {
    fn locate(&self, text: &str, target: &str) -> Option<usize>;
}

/// Exact text search for the identifier.
///
/// This is what existing players do, and it accepts books whose identifiers
/// are not attribute values. It can be fooled by an identifier that also
/// occurs earlier as a substring of other text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringLocator;

impl AnchorLocator for SubstringLocator {
    fn locate(&self, text: &str, target: &str) -> Option<usize> {
        if target.is_empty() {
            return None;
        }
        memmem::find(text.as_bytes(), target.as_bytes())
    }
}

/// Offset of the start tag of the element whose `id` attribute equals the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdAttributeLocator;

impl AnchorLocator for IdAttributeLocator {
    fn locate(&self, text: &str, target: &str) -> Option<usize> {
        let mut reader = Reader::from_str(text);

        loop {
            let offset = reader.buffer_position() as usize;
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    let matches = e
                        .attributes()
                        .flatten()
                        .any(|attr| attr.key.as_ref() == b"id" && attr.value.as_ref() == target.as_bytes());
                    if matches {
                        return Some(offset);
                    }
                }
                Ok(Event::Eof) | Err(_) => return None,
                _ => {}
            }
        }
    }
}

impl TargetLookup {
    pub(crate) fn locator(self) -> Box<dyn AnchorLocator> {
        match self {
            TargetLookup::Substring => Box::new(SubstringLocator),
            TargetLookup::IdAttribute => Box::new(IdAttributeLocator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMIL: &str = r#"<smil><body>
<par id="par_1"><text src="book.html#h1" id="tx1"/><audio src="a.mp3" clip-begin="npt=0s" clip-end="npt=1s"/></par>
<par id="par_2"><text src="book.html#h2" id="tx12"/><audio src="a.mp3" clip-begin="npt=1s" clip-end="npt=2s"/></par>
</body></smil>"#;

    #[test]
    fn test_substring_finds_first_occurrence() {
        let offset = SubstringLocator.locate(SMIL, "tx12").unwrap();
        assert!(SMIL[offset..].starts_with("tx12"));
        // "tx1" is a prefix of "tx12", but its own occurrence comes first
        let offset = SubstringLocator.locate(SMIL, "tx1").unwrap();
        assert!(SMIL[offset..].starts_with("tx1\""));
        assert_eq!(SubstringLocator.locate(SMIL, "tx99"), None);
        assert_eq!(SubstringLocator.locate(SMIL, ""), None);
    }

    #[test]
    fn test_id_attribute_ignores_coincidental_text() {
        let offset = IdAttributeLocator.locate(SMIL, "par_2").unwrap();
        assert!(SMIL[offset..].starts_with("<par id=\"par_2\""));
        // "h2" appears inside a src value, never as an id
        assert_eq!(IdAttributeLocator.locate(SMIL, "h2"), None);
        assert!(SubstringLocator.locate(SMIL, "h2").is_some());
    }

    #[test]
    fn test_anchor_block_by_kind() {
        let mut block = AnchorBlock::default();
        block.push(
            AnchorKind::Page,
            TextAnchor {
                label: "12".into(),
                target: "tx1".into(),
            },
        );
        assert!(block.of_kind(AnchorKind::Heading).is_empty());
        assert_eq!(block.of_kind(AnchorKind::Page)[0].label, "12");
    }

    #[test]
    fn test_target_lookup_builds_locator() {
        let locator = TargetLookup::IdAttribute.locator();
        assert!(locator.locate(SMIL, "par_1").is_some());
        assert!(locator.locate(SMIL, "book.html").is_none());
    }
}
