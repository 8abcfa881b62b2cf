//! Heading and page traversal over DAISY 2.02 anchors.
//!
//! These anchors only name an identifier inside a SMIL document. The target
//! is located in the document text, and the anchor's clip is the first
//! `<audio>` after that offset. Clip offsets order anchors against the
//! playback position, so the search never needs timestamps from the NCC.

use std::collections::HashMap;

use crate::anchor::{AnchorBlock, AnchorKind, AnchorLocator, TextAnchor};
use crate::error::{Error, Result};
use crate::index::{Fragment, FragmentIndex};
use crate::loader::Loader;
use crate::smil::SmilDocument;

use super::NavItem;

/// What one heading or page search needs from the book.
pub(super) struct Search<'a> {
    index: &'a FragmentIndex,
    blocks: &'a HashMap<String, AnchorBlock>,
    locator: &'a dyn AnchorLocator,
    kind: AnchorKind,
}

impl<'a> Search<'a> {
    pub fn new(
        index: &'a FragmentIndex,
        blocks: &'a HashMap<String, AnchorBlock>,
        locator: &'a dyn AnchorLocator,
        kind: AnchorKind,
    ) -> Self {
        Self {
            index,
            blocks,
            locator,
            kind,
        }
    }

    /// Anchors of the searched kind owned by `document`.
    fn anchors(&self, document: &str) -> &'a [TextAnchor] {
        self.blocks
            .get(document)
            .map(|block| block.of_kind(self.kind))
            .unwrap_or_default()
    }

    fn locate(&self, document: &SmilDocument, anchor: &TextAnchor) -> Result<usize> {
        self.locator
            .locate(document.text(), &anchor.target)
            .ok_or_else(|| Error::MissingAnchorTarget {
                document: document.name().to_string(),
                target: anchor.target.clone(),
            })
    }

    /// First anchor located after `cursor` that has a clip to play.
    ///
    /// With no cursor every anchor qualifies.
    fn first_after(&self, document: &SmilDocument, cursor: Option<usize>) -> Result<Option<NavItem>> {
        for anchor in self.anchors(document.name()) {
            let offset = self.locate(document, anchor)?;
            if cursor.is_some_and(|cursor| offset <= cursor) {
                continue;
            }
            if let Some(clip) = document.clip_after(offset) {
                return Ok(Some(NavItem::labelled(clip, &anchor.label)));
            }
        }
        Ok(None)
    }

    /// Last anchor located before `reference` that has a clip to play.
    ///
    /// With no reference every anchor qualifies.
    fn last_before(
        &self,
        document: &SmilDocument,
        reference: Option<usize>,
    ) -> Result<Option<NavItem>> {
        for anchor in self.anchors(document.name()).iter().rev() {
            let offset = self.locate(document, anchor)?;
            if reference.is_some_and(|reference| offset >= reference) {
                continue;
            }
            if let Some(clip) = document.clip_after(offset) {
                return Ok(Some(NavItem::labelled(clip, &anchor.label)));
            }
        }
        Ok(None)
    }

    /// Fragments from `positions` whose document owns anchors of the searched kind.
    fn candidates(&self, positions: impl Iterator<Item = usize>) -> impl Iterator<Item = Fragment<'a>> {
        positions
            .map_while(move |position| self.index.get(position))
            .filter(move |fragment| !self.anchors(fragment.document).is_empty())
    }
}

/// Next heading or page after `time`.
pub(super) fn next(
    search: &Search<'_>,
    loader: &mut Loader,
    fragment: Fragment<'_>,
    time: f64,
) -> Result<Option<NavItem>> {
    let document = loader.smil(fragment.document)?;
    let cursor = forward_cursor(&document, time);
    if let Some(item) = search.first_after(&document, cursor)? {
        return Ok(Some(item));
    }

    for following in search.candidates(fragment.position + 1..) {
        let document = loader.smil(following.document)?;
        if let Some(item) = search.first_after(&document, None)? {
            return Ok(Some(item));
        }
    }
    Ok(None)
}

/// Previous heading or page before the clip playing at `time`.
pub(super) fn prev(
    search: &Search<'_>,
    loader: &mut Loader,
    fragment: Fragment<'_>,
    time: f64,
) -> Result<Option<NavItem>> {
    let document = loader.smil(fragment.document)?;
    if let Some(reference) = backward_reference(&document, time)
        && let Some(item) = search.last_before(&document, Some(reference))?
    {
        return Ok(Some(item));
    }

    for preceding in search.candidates((1..fragment.position).rev()) {
        let document = loader.smil(preceding.document)?;
        if let Some(item) = search.last_before(&document, None)? {
            return Ok(Some(item));
        }
    }
    Ok(None)
}

/// Offset of the clip playing at `time`, or of the last clip started by then.
fn forward_cursor(document: &SmilDocument, time: f64) -> Option<usize> {
    let clips = document.clips();
    match document.clip_at(time) {
        Some(current) => Some(clips[current].offset),
        None => clips.iter().rev().find(|clip| clip.begin <= time).map(|clip| clip.offset),
    }
}

/// Offset of the clip before the one playing at `time`, or of the last clip
/// finished by then.
fn backward_reference(document: &SmilDocument, time: f64) -> Option<usize> {
    let clips = document.clips();
    match document.clip_at(time) {
        Some(current) => current.checked_sub(1).map(|prev| clips[prev].offset),
        None => clips.iter().rev().find(|clip| clip.end <= time).map(|clip| clip.offset),
    }
}
