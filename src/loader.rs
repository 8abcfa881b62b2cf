//! Reads and decodes book files, and loads SMIL documents through the cache.

use std::io;
use std::sync::Arc;

use encoding_rs::Encoding;

use crate::cache::DocumentCache;
use crate::error::{Error, Result};
use crate::io::BookSource;
use crate::smil::SmilDocument;
use crate::util::{decode_text, encoding_names};

/// Document reader shared by index construction and navigation.
pub(crate) struct Loader {
    source: Box<dyn BookSource>,
    encodings: Vec<&'static Encoding>,
    cache: DocumentCache,
}

impl Loader {
    pub fn new(
        source: Box<dyn BookSource>,
        encodings: Vec<&'static Encoding>,
        cache_capacity: usize,
    ) -> Self {
        Self {
            source,
            encodings,
            cache: DocumentCache::new(cache_capacity),
        }
    }

    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.source.list()?)
    }

    /// Read `name` and decode it with the first candidate encoding that fits.
    pub fn read_text(&self, name: &str) -> Result<String> {
        let bytes = self.source.read(name).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::DocumentNotFound(name.to_string()),
            _ => Error::Io(e),
        })?;

        decode_text(&bytes, &self.encodings)
            .map(|text| text.into_owned())
            .ok_or_else(|| Error::Decode {
                document: name.to_string(),
                tried: encoding_names(&self.encodings),
            })
    }

    /// Load a parsed SMIL document, from the cache when possible.
    pub fn smil(&mut self, name: &str) -> Result<Arc<SmilDocument>> {
        if let Some(document) = self.cache.get(name) {
            return Ok(document);
        }

        tracing::debug!("Loading SMIL document {}", name);
        let text = self.read_text(name)?;
        let document = Arc::new(SmilDocument::parse(name, text)?);
        self.cache.insert(Arc::clone(&document));
        Ok(document)
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }
}
