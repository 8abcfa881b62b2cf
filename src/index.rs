//! The fragment index: position <-> audio path <-> SMIL document.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::loader::Loader;
use crate::smil::first_audio_src;

/// One indexed audio fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    /// 1-based sequence position.
    pub position: usize,
    pub audio_path: &'a str,
    pub document: &'a str,
}

/// Ordered, immutable map from audio fragment to the SMIL document that
/// plays it.
///
/// Positions are contiguous from 1 in document order; audio paths and
/// documents are each unique.
#[derive(Debug, Clone, Default)]
pub struct FragmentIndex {
    /// audio path -> document, in position order
    fragments: IndexMap<String, String>,
}

impl FragmentIndex {
    /// Build the index from an ordered list of SMIL documents.
    ///
    /// Documents without audio are auxiliary and get no position, and a
    /// document whose audio is already indexed is skipped.
    pub(crate) fn build<'a, I>(documents: I, loader: &Loader) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index = FragmentIndex::default();
        let mut seen = HashSet::new();

        for document in documents {
            if !seen.insert(document) {
                continue;
            }

            let text = loader.read_text(document)?;
            let Some(audio) = first_audio_src(&text).map_err(|e| Error::xml(document, e))? else {
                tracing::debug!("Skipping {}: no audio clips", document);
                continue;
            };

            if let Some(existing) = index.fragments.get(&audio) {
                tracing::warn!(
                    "Skipping {}: audio {} is already played by {}",
                    document,
                    audio,
                    existing
                );
                continue;
            }

            index.fragments.insert(audio, document.to_string());
        }

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Position of an audio path.
    pub fn position_of(&self, audio_path: &str) -> Option<usize> {
        self.fragments.get_index_of(audio_path).map(|idx| idx + 1)
    }

    /// Fragment at a 1-based position.
    pub fn get(&self, position: usize) -> Option<Fragment<'_>> {
        let idx = position.checked_sub(1)?;
        self.fragments
            .get_index(idx)
            .map(|(audio_path, document)| Fragment {
                position,
                audio_path,
                document,
            })
    }

    /// Fragment for an audio path, or [`Error::UnknownFragment`].
    pub fn lookup(&self, audio_path: &str) -> Result<Fragment<'_>> {
        self.fragments
            .get_full(audio_path)
            .map(|(idx, audio_path, document)| Fragment {
                position: idx + 1,
                audio_path,
                document,
            })
            .ok_or_else(|| Error::UnknownFragment(audio_path.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = Fragment<'_>> {
        self.fragments
            .iter()
            .enumerate()
            .map(|(idx, (audio_path, document))| Fragment {
                position: idx + 1,
                audio_path,
                document,
            })
    }

    /// Audio paths in position order.
    pub fn audio_paths(&self) -> Vec<&str> {
        self.fragments.keys().map(String::as_str).collect()
    }
}
