//! Text decoding and small XML helpers shared by the document parsers.

use std::borrow::Cow;

use encoding_rs::Encoding;
use percent_encoding::percent_decode_str;
use quick_xml::events::attributes::Attribute;

/// Encodings tried, in order, when a document carries no byte order mark.
///
/// Windows-1251 comes before Windows-1252 because many talking books
/// produced with legacy tools are Cyrillic.
pub const DEFAULT_ENCODINGS: &[&Encoding] = &[
    encoding_rs::UTF_8,
    encoding_rs::WINDOWS_1251,
    encoding_rs::WINDOWS_1252,
];

// ============================================================================
// Text Decoding
// ============================================================================

/// Decode bytes to a string using the first encoding that accepts them.
///
/// This function:
/// 1. Honours a byte order mark if present
/// 2. Otherwise tries each candidate in order, rejecting any that would need
///    replacement characters
///
/// Returns `None` if no candidate decodes the input cleanly.
pub fn decode_text<'a>(bytes: &'a [u8], candidates: &[&'static Encoding]) -> Option<Cow<'a, str>> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..]);
    }

    candidates
        .iter()
        .find_map(|encoding| encoding.decode_without_bom_handling_and_without_replacement(bytes))
}

/// Human-readable list of encoding names, for error messages.
pub fn encoding_names(candidates: &[&'static Encoding]) -> String {
    candidates
        .iter()
        .map(|e| e.name())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// XML Helpers
// ============================================================================

/// Extract local name from namespaced XML name (e.g., "dc:title" -> "title").
pub fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Attribute value with XML escapes resolved.
///
/// Values with broken escapes are returned verbatim rather than rejected.
pub fn attr_value(attr: &Attribute<'_>) -> String {
    let raw = String::from_utf8_lossy(&attr.value);
    match quick_xml::escape::unescape(&raw) {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => raw.into_owned(),
    }
}

/// Resolve XML entity references (plus `nbsp`, which HTML navigation files use freely).
pub fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        "nbsp" => return Some("\u{a0}".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}

/// Split an href like `s0823.smil#tx24767` into a percent-decoded document
/// name and the fragment identifier.
pub fn split_href(href: &str) -> (String, Option<&str>) {
    let (path, fragment) = match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (href, None),
    };
    let path = percent_decode_str(path).decode_utf8_lossy().into_owned();
    (path, fragment.filter(|f| !f.is_empty()))
}

/// Whether a document name points at a SMIL file.
pub fn is_smil(name: &str) -> bool {
    name.rsplit('.')
        .next()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("smil"))
        && name.contains('.')
}

/// Collapse runs of whitespace in a label, as browsers do when rendering.
pub fn normalize_label(label: &str) -> String {
    label
        .split(|c: char| c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        let text = decode_text("Заголовок".as_bytes(), DEFAULT_ENCODINGS).unwrap();
        assert_eq!(text, "Заголовок");
    }

    #[test]
    fn test_decode_falls_back_to_cp1251() {
        // "Глава" in Windows-1251
        let bytes = [0xC3, 0xEB, 0xE0, 0xE2, 0xE0];
        let text = decode_text(&bytes, DEFAULT_ENCODINGS).unwrap();
        assert_eq!(text, "Глава");
    }

    #[test]
    fn test_decode_honours_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"<smil/>");
        let text = decode_text(&bytes, &[encoding_rs::WINDOWS_1252]).unwrap();
        assert_eq!(text, "<smil/>");
    }

    #[test]
    fn test_decode_rejects_when_no_candidate_fits() {
        let bytes = [0xC3, 0x28];
        assert!(decode_text(&bytes, &[encoding_rs::UTF_8]).is_none());
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!(encoding_names(DEFAULT_ENCODINGS), "UTF-8, windows-1251, windows-1252");
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"title"), b"title");
        assert_eq!(local_name(b"dc:Title"), b"Title");
        assert_eq!(local_name(b""), b"");
    }

    #[test]
    fn test_resolve_entity() {
        assert_eq!(resolve_entity("amp"), Some("&".to_string()));
        assert_eq!(resolve_entity("nbsp"), Some("\u{a0}".to_string()));
        assert_eq!(resolve_entity("#65"), Some("A".to_string()));
        assert_eq!(resolve_entity("#x2019"), Some("\u{2019}".to_string()));
        assert_eq!(resolve_entity("mdash"), None);
    }

    #[test]
    fn test_split_href() {
        assert_eq!(
            split_href("s0823.smil#tx24767"),
            ("s0823.smil".to_string(), Some("tx24767"))
        );
        assert_eq!(split_href("part%201.smil"), ("part 1.smil".to_string(), None));
        assert_eq!(split_href("a.smil#"), ("a.smil".to_string(), None));
    }

    #[test]
    fn test_is_smil() {
        assert!(is_smil("s0001.smil"));
        assert!(is_smil("S0001.SMIL"));
        assert!(!is_smil("ncc.html"));
        assert!(!is_smil("smil"));
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Chapter\n   One "), "Chapter One");
    }
}
