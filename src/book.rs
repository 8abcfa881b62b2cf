//! An opened talking book: layout, fragment index, anchors and metadata.

use std::collections::HashMap;
use std::time::Instant;

use crate::anchor::{AnchorBlock, AnchorKind, ClipAnchor, TextAnchor};
use crate::error::{Error, Result};
use crate::index::FragmentIndex;
use crate::layout::{self, Layout, LayoutFiles};
use crate::loader::Loader;
use crate::ncc::parse_ncc;
use crate::package::{NavTarget, parse_ncx, parse_opf};

/// Book metadata (Dublin Core plus the total playing time).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Metadata {
    pub title: String,
    pub authors: Vec<String>,
    pub identifier: String,
    pub language: String,
    /// Total playing time in seconds.
    pub total_time: Option<f64>,
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Heading and page anchors in the shape their layout provides.
#[derive(Debug, Clone)]
pub(crate) enum Anchors {
    /// DAISY 2.02: anchor blocks keyed by the SMIL document that owns them.
    Text(HashMap<String, AnchorBlock>),
    /// DAISY 3: anchors that carry their own clips, in NCX order.
    Clip {
        headings: Vec<ClipAnchor>,
        pages: Vec<ClipAnchor>,
    },
}

/// Everything built once when a book is opened.
#[derive(Debug, Clone)]
pub(crate) struct Book {
    pub layout: Layout,
    pub index: FragmentIndex,
    pub anchors: Anchors,
    pub metadata: Metadata,
}

impl Book {
    pub fn load(loader: &Loader) -> Result<Self> {
        let start = Instant::now();

        let files = layout::detect(loader.list()?)?;
        let book = match &files {
            LayoutFiles::Daisy202 { ncc } => load_daisy202(loader, ncc)?,
            LayoutFiles::Daisy3 { package, ncx } => load_daisy3(loader, package, ncx)?,
        };

        tracing::info!(
            "Opened {} book \"{}\": {} fragments in {:?}",
            book.layout,
            book.metadata.title,
            book.index.len(),
            start.elapsed()
        );
        Ok(book)
    }
}

// ============================================================================
// DAISY 2.02
// ============================================================================

fn load_daisy202(loader: &Loader, ncc_name: &str) -> Result<Book> {
    let text = loader.read_text(ncc_name)?;
    let ncc = parse_ncc(&text).map_err(|e| Error::xml(ncc_name, e))?;

    let index = FragmentIndex::build(ncc.documents.iter().map(String::as_str), loader)?;

    let mut blocks: HashMap<String, AnchorBlock> = HashMap::new();
    for entry in ncc.entries {
        blocks.entry(entry.document).or_default().push(
            entry.kind,
            TextAnchor {
                label: entry.label,
                target: entry.target,
            },
        );
    }

    Ok(Book {
        layout: Layout::Daisy202,
        index,
        anchors: Anchors::Text(blocks),
        metadata: ncc.metadata,
    })
}

// ============================================================================
// DAISY 3
// ============================================================================

fn load_daisy3(loader: &Loader, package_name: &str, listed_ncx: &str) -> Result<Book> {
    let text = loader.read_text(package_name)?;
    let package = parse_opf(&text).map_err(|e| Error::xml(package_name, e))?;

    let documents = package
        .spine_ids
        .iter()
        .map(|id| {
            package
                .manifest
                .get(id)
                .map(|item| item.href.as_str())
                .ok_or_else(|| Error::MissingManifestEntry {
                    package: package_name.to_string(),
                    id: id.clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let index = FragmentIndex::build(documents, loader)?;

    let ncx_name = package.ncx_href().unwrap_or(listed_ncx);
    let text = loader.read_text(ncx_name)?;
    let targets = parse_ncx(&text).map_err(|e| Error::clip(ncx_name, e))?;
    if targets.skipped > 0 {
        tracing::warn!("{}: {} entries without audio ignored", ncx_name, targets.skipped);
    }

    let headings = clip_anchors(targets.headings, AnchorKind::Heading, &index);
    let pages = clip_anchors(targets.pages, AnchorKind::Page, &index);

    Ok(Book {
        layout: Layout::Daisy3,
        index,
        anchors: Anchors::Clip { headings, pages },
        metadata: package.metadata,
    })
}

fn clip_anchors(targets: Vec<NavTarget>, kind: AnchorKind, index: &FragmentIndex) -> Vec<ClipAnchor> {
    targets
        .into_iter()
        .filter_map(|target| match index.position_of(&target.clip.src) {
            Some(position) => Some(ClipAnchor {
                label: target.label,
                position,
                clip: target.clip,
            }),
            None => {
                tracing::warn!(
                    "Dropping {:?} anchor {:?}: audio {} is not indexed",
                    kind,
                    target.label,
                    target.clip.src
                );
                None
            }
        })
        .collect()
}
