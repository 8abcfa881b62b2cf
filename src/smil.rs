//! SMIL synchronization documents: timed audio clips in document order.
//!
//! Both supported layouts store one SMIL file per audio fragment. DAISY 2.02
//! writes `clip-begin="npt=451.216s"`, DAISY 3 writes `clipBegin="0:07:31.216"`;
//! [`parse_clips`] accepts either spelling and any SMIL clock value.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::util::{attr_value, local_name};

/// One timed interval of a fragment's audio.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Audio fragment path, as written in the `src` attribute.
    pub src: String,
    /// Start time in seconds (inclusive).
    pub begin: f64,
    /// End time in seconds (exclusive).
    pub end: f64,
    /// Byte offset of the `<audio` tag in the decoded document text.
    pub offset: usize,
}

impl Clip {
    /// Half-open containment: `begin <= time < end`.
    pub fn contains(&self, time: f64) -> bool {
        self.begin <= time && time < self.end
    }
}

/// Errors raised while reading clips out of a SMIL or NCX document.
#[derive(thiserror::Error, Debug)]
pub enum ClipError {
    /// `attribute` is `src`, `clip-begin` or `clip-end` (DAISY 3's `clipBegin`
    /// and `clipEnd` are reported under the same names).
    #[error("audio element at byte {offset} has no {attribute} attribute")]
    MissingAttribute {
        attribute: &'static str,
        offset: usize,
    },

    #[error("invalid clock value {value:?} at byte {offset}")]
    InvalidClock { value: String, offset: usize },

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
}

/// Parse every `<audio>` element of a SMIL document, in document order.
pub fn parse_clips(text: &str) -> std::result::Result<Vec<Clip>, ClipError> {
    let mut reader = Reader::from_str(text);
    let mut clips = Vec::new();

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if is_audio(&e) => {
                clips.push(clip_from_element(&e, offset)?);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
    }

    Ok(clips)
}

/// The `src` of the first `<audio>` element, without parsing the rest of the document.
pub fn first_audio_src(text: &str) -> std::result::Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(text);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if is_audio(&e) => {
                let src = e
                    .attributes()
                    .flatten()
                    .find(|attr| attr.key.as_ref() == b"src")
                    .map(|attr| attr_value(&attr))
                    .filter(|src| !src.is_empty());
                if src.is_some() {
                    return Ok(src);
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

pub(crate) fn is_audio(e: &BytesStart<'_>) -> bool {
    local_name(e.name().as_ref()) == b"audio"
}

/// Build a [`Clip`] from an `<audio>` start tag found at `offset`.
pub(crate) fn clip_from_element(
    e: &BytesStart<'_>,
    offset: usize,
) -> std::result::Result<Clip, ClipError> {
    let mut src = None;
    let mut begin = None;
    let mut end = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"src" => src = Some(attr_value(&attr)),
            b"clip-begin" | b"clipBegin" => begin = Some(attr_value(&attr)),
            b"clip-end" | b"clipEnd" => end = Some(attr_value(&attr)),
            _ => {}
        }
    }

    let src = src.ok_or(ClipError::MissingAttribute {
        attribute: "src",
        offset,
    })?;
    let begin = begin.ok_or(ClipError::MissingAttribute {
        attribute: "clip-begin",
        offset,
    })?;
    let end = end.ok_or(ClipError::MissingAttribute {
        attribute: "clip-end",
        offset,
    })?;

    let seconds = |value: String| {
        parse_clock_value(&value).ok_or(ClipError::InvalidClock { value, offset })
    };

    Ok(Clip {
        src,
        begin: seconds(begin)?,
        end: seconds(end)?,
        offset,
    })
}

// ============================================================================
// Clock Values
// ============================================================================

/// Parse a SMIL clock value into seconds.
///
/// Accepts an optional `npt=` prefix (SMIL 1.0), full clock values
/// (`1:02:03.250`), partial clock values (`02:03.250`) and timecounts
/// (`3.25s`, `250ms`, `2min`, `1h`, or a bare number of seconds).
pub fn parse_clock_value(value: &str) -> Option<f64> {
    let value = value.trim();
    let value = value.strip_prefix("npt=").unwrap_or(value);

    if value.contains(':') {
        let parts: Vec<&str> = value.split(':').collect();
        let (hours, minutes, seconds) = match parts.as_slice() {
            [h, m, s] => (parse_whole(h)?, parse_whole(m)?, parse_decimal(s)?),
            [m, s] => (0, parse_whole(m)?, parse_decimal(s)?),
            _ => return None,
        };
        if minutes >= 60 || seconds >= 60.0 {
            return None;
        }
        return Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds);
    }

    let (number, scale) = if let Some(n) = value.strip_suffix("ms") {
        (n, 0.001)
    } else if let Some(n) = value.strip_suffix("min") {
        (n, 60.0)
    } else if let Some(n) = value.strip_suffix('h') {
        (n, 3600.0)
    } else if let Some(n) = value.strip_suffix('s') {
        (n, 1.0)
    } else {
        (value, 1.0)
    };

    parse_decimal(number).map(|n| n * scale)
}

fn parse_whole(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_decimal(s: &str) -> Option<f64> {
    let valid = s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && s.bytes().any(|b| b.is_ascii_digit())
        && s.bytes().filter(|&b| b == b'.').count() <= 1;
    if !valid {
        return None;
    }
    s.parse().ok()
}

// ============================================================================
// Parsed Documents
// ============================================================================

/// A SMIL document with its decoded text and parsed clips.
///
/// The text is kept because DAISY 2.02 anchors are resolved by searching it.
#[derive(Debug)]
pub struct SmilDocument {
    name: String,
    text: String,
    clips: Vec<Clip>,
}

impl SmilDocument {
    pub fn parse(name: impl Into<String>, text: String) -> Result<Self> {
        let name = name.into();
        let clips = parse_clips(&text).map_err(|e| Error::clip(name.clone(), e))?;
        Ok(Self { name, text, clips })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Index of the clip containing `time`.
    pub fn clip_at(&self, time: f64) -> Option<usize> {
        self.clips.iter().position(|clip| clip.contains(time))
    }

    /// First clip whose `<audio` tag starts after byte `offset`.
    pub fn clip_after(&self, offset: usize) -> Option<&Clip> {
        let idx = self.clips.partition_point(|clip| clip.offset <= offset);
        self.clips.get(idx)
    }
}
