//! Navigation by phrase, heading and page, forward and backward.
//!
//! A [`Navigator`] is opened once per book. Each call takes the current audio
//! fragment and playback time and returns the next (or previous) unit, or
//! `None` when the book runs out in that direction.

mod clip_anchor;
mod phrase;
mod text_anchor;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::anchor::{AnchorKind, AnchorLocator, ClipAnchor};
use crate::book::{Anchors, Book, Metadata};
use crate::error::Result;
use crate::index::FragmentIndex;
use crate::io::{BookSource, DirSource};
use crate::layout::Layout;
use crate::loader::Loader;
use crate::options::OpenOptions;
use crate::smil::Clip;

/// Navigation granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NavOption {
    /// One clip.
    #[default]
    Phrase,
    Heading,
    Page,
}

impl NavOption {
    fn anchor_kind(self) -> Option<AnchorKind> {
        match self {
            NavOption::Phrase => None,
            NavOption::Heading => Some(AnchorKind::Heading),
            NavOption::Page => Some(AnchorKind::Page),
        }
    }
}

impl fmt::Display for NavOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavOption::Phrase => f.write_str("phrase"),
            NavOption::Heading => f.write_str("heading"),
            NavOption::Page => f.write_str("page"),
        }
    }
}

impl FromStr for NavOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phrase" => Ok(NavOption::Phrase),
            "heading" => Ok(NavOption::Heading),
            "page" => Ok(NavOption::Page),
            other => Err(format!("unknown navigation unit: {other}")),
        }
    }
}

/// Which way to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

/// The unit a navigation call lands on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NavItem {
    pub audio_path: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Heading or page label; `None` for phrases.
    pub label: Option<String>,
}

impl NavItem {
    pub(crate) fn phrase(clip: &Clip) -> Self {
        Self {
            audio_path: clip.src.clone(),
            start_time: clip.begin,
            end_time: clip.end,
            label: None,
        }
    }

    pub(crate) fn labelled(clip: &Clip, label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            ..Self::phrase(clip)
        }
    }
}

impl fmt::Display for NavItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:.3}, {:.3})",
            self.audio_path, self.start_time, self.end_time
        )?;
        if let Some(label) = &self.label {
            write!(f, " {label:?}")?;
        }
        Ok(())
    }
}

/// An opened talking book plus the session's navigation granularity.
pub struct Navigator {
    book: Book,
    loader: Loader,
    locator: Box<dyn AnchorLocator>,
    option: NavOption,
}

impl Navigator {
    /// Open a book directory with default options.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(dir, OpenOptions::default())
    }

    pub fn open_with(dir: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let source = DirSource::new(dir.as_ref())?;
        Self::from_source(source, options)
    }

    /// Open a book from any [`BookSource`].
    ///
    /// Detects the layout and builds the fragment index and anchor lists.
    /// This reads every SMIL document once, so it is slow for large books.
    pub fn from_source(source: impl BookSource + 'static, options: OpenOptions) -> Result<Self> {
        let loader = Loader::new(Box::new(source), options.encodings, options.cache_capacity);
        let book = Book::load(&loader)?;
        Ok(Self {
            book,
            loader,
            locator: options.target_lookup.locator(),
            option: NavOption::default(),
        })
    }

    pub fn layout(&self) -> Layout {
        self.book.layout
    }

    pub fn metadata(&self) -> &Metadata {
        &self.book.metadata
    }

    pub fn index(&self) -> &FragmentIndex {
        &self.book.index
    }

    pub fn option(&self) -> NavOption {
        self.option
    }

    pub fn set_option(&mut self, option: NavOption) {
        self.option = option;
    }

    /// Replace the strategy used to find DAISY 2.02 anchor targets.
    pub fn set_locator(&mut self, locator: Box<dyn AnchorLocator>) {
        self.locator = locator;
    }

    /// Audio fragments in playback order.
    pub fn list_audio_fragments(&self) -> Vec<&str> {
        self.book.index.audio_paths()
    }

    /// Next unit of the session granularity after `time` in `audio_path`.
    pub fn get_next(&mut self, audio_path: &str, time: f64) -> Result<Option<NavItem>> {
        self.navigate(self.option, Direction::Forward, audio_path, time)
    }

    /// Previous unit of the session granularity before `time` in `audio_path`.
    pub fn get_prev(&mut self, audio_path: &str, time: f64) -> Result<Option<NavItem>> {
        self.navigate(self.option, Direction::Backward, audio_path, time)
    }

    /// Move by `option` in `direction` without touching the session granularity.
    ///
    /// Returns [`Error::UnknownFragment`](crate::Error::UnknownFragment) if
    /// `audio_path` is not part of the book, and `Ok(None)` past either end.
    pub fn navigate(
        &mut self,
        option: NavOption,
        direction: Direction,
        audio_path: &str,
        time: f64,
    ) -> Result<Option<NavItem>> {
        let index = &self.book.index;
        let fragment = index.lookup(audio_path)?;
        tracing::trace!(
            "{:?} {} from {} (position {}) at {}s",
            direction,
            option,
            audio_path,
            fragment.position,
            time
        );

        let loader = &mut self.loader;
        let item = match (option.anchor_kind(), &self.book.anchors, direction) {
            (None, _, Direction::Forward) => phrase::next(index, loader, fragment, time)?,
            (None, _, Direction::Backward) => phrase::prev(index, loader, fragment, time)?,
            (Some(kind), Anchors::Clip { headings, pages }, Direction::Forward) => {
                clip_anchor::next(clip_anchors(kind, headings, pages), fragment.position, time)
            }
            (Some(kind), Anchors::Clip { headings, pages }, Direction::Backward) => {
                clip_anchor::prev(clip_anchors(kind, headings, pages), fragment.position, time)
            }
            (Some(kind), Anchors::Text(blocks), Direction::Forward) => {
                let search = text_anchor::Search::new(index, blocks, &*self.locator, kind);
                text_anchor::next(&search, loader, fragment, time)?
            }
            (Some(kind), Anchors::Text(blocks), Direction::Backward) => {
                let search = text_anchor::Search::new(index, blocks, &*self.locator, kind);
                text_anchor::prev(&search, loader, fragment, time)?
            }
        };

        match &item {
            Some(item) => tracing::trace!("Landed on {}", item),
            None => tracing::trace!("No {} {:?} of {}", option, direction, audio_path),
        }
        Ok(item)
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("layout", &self.book.layout)
            .field("fragments", &self.book.index.len())
            .field("option", &self.option)
            .field("cached_documents", &self.loader.cache().len())
            .finish()
    }
}

fn clip_anchors<'a>(
    kind: AnchorKind,
    headings: &'a [ClipAnchor],
    pages: &'a [ClipAnchor],
) -> &'a [ClipAnchor] {
    match kind {
        AnchorKind::Heading => headings,
        AnchorKind::Page => pages,
    }
}
