//! Phrase traversal, shared by both layouts.

use crate::error::Result;
use crate::index::{Fragment, FragmentIndex};
use crate::loader::Loader;

use super::NavItem;

/// The clip after the one containing `time`, else the first clip of the next
/// fragment.
///
/// A time that no clip contains goes straight to the next fragment.
pub(super) fn next(
    index: &FragmentIndex,
    loader: &mut Loader,
    fragment: Fragment<'_>,
    time: f64,
) -> Result<Option<NavItem>> {
    let document = loader.smil(fragment.document)?;
    if let Some(current) = document.clip_at(time)
        && let Some(clip) = document.clips().get(current + 1)
    {
        return Ok(Some(NavItem::phrase(clip)));
    }

    let Some(following) = index.get(fragment.position + 1) else {
        return Ok(None);
    };
    let document = loader.smil(following.document)?;
    Ok(document.clips().first().map(NavItem::phrase))
}

/// The clip before the one containing `time`, else the last clip of the
/// previous fragment.
pub(super) fn prev(
    index: &FragmentIndex,
    loader: &mut Loader,
    fragment: Fragment<'_>,
    time: f64,
) -> Result<Option<NavItem>> {
    let document = loader.smil(fragment.document)?;
    if let Some(current) = document.clip_at(time)
        && current > 0
    {
        return Ok(Some(NavItem::phrase(&document.clips()[current - 1])));
    }

    let Some(preceding) = index.get(fragment.position - 1) else {
        return Ok(None);
    };
    let document = loader.smil(preceding.document)?;
    Ok(document.clips().last().map(NavItem::phrase))
}
