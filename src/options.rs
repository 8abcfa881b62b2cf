//! Settings applied when a book is opened.

use encoding_rs::Encoding;

use crate::util::DEFAULT_ENCODINGS;

/// Default number of parsed SMIL documents kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// How DAISY 2.02 anchor targets are found inside their SMIL document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetLookup {
    /// Exact text search for the identifier anywhere in the document.
    #[default]
    Substring,
    /// The element whose `id` attribute equals the identifier.
    IdAttribute,
}

/// Options for [`Navigator::open_with`](crate::Navigator::open_with).
///
/// ```
/// use daisy_nav::{OpenOptions, TargetLookup};
///
/// let options = OpenOptions::new()
///     .with_cache_capacity(8)
///     .with_target_lookup(TargetLookup::IdAttribute);
/// assert_eq!(options.cache_capacity, 8);
/// ```
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Candidate text encodings, tried in order when a file has no BOM.
    pub encodings: Vec<&'static Encoding>,
    /// Maximum number of parsed SMIL documents to keep. Zero disables caching.
    pub cache_capacity: usize,
    pub target_lookup: TargetLookup,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            encodings: DEFAULT_ENCODINGS.to_vec(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            target_lookup: TargetLookup::default(),
        }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encodings(mut self, encodings: Vec<&'static Encoding>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_target_lookup(mut self, lookup: TargetLookup) -> Self {
        self.target_lookup = lookup;
        self
    }
}
