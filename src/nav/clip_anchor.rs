//! Heading and page traversal over DAISY 3 anchors, which carry their clips.
//!
//! Anchors are in playback order, so both directions are a linear scan
//! comparing `(position, time)` against each anchor's clip.

use crate::anchor::ClipAnchor;

use super::NavItem;

/// First anchor in a later fragment, or in the same fragment starting after `time`.
pub(super) fn next(anchors: &[ClipAnchor], position: usize, time: f64) -> Option<NavItem> {
    anchors
        .iter()
        .find(|anchor| {
            anchor.position > position || (anchor.position == position && anchor.clip.begin > time)
        })
        .map(to_item)
}

/// Last anchor wholly before the cursor.
///
/// An anchor in the current fragment counts as before only once its clip has
/// ended, so a `time` equal to a clip end favours the later unit.
pub(super) fn prev(anchors: &[ClipAnchor], position: usize, time: f64) -> Option<NavItem> {
    anchors
        .iter()
        .take_while(|anchor| {
            anchor.position < position || (anchor.position == position && anchor.clip.end <= time)
        })
        .last()
        .map(to_item)
}

fn to_item(anchor: &ClipAnchor) -> NavItem {
    NavItem::labelled(&anchor.clip, &anchor.label)
}
