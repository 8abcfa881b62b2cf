//! IO abstractions for reading the files that make up a talking book.

mod source;

pub use source::{BookSource, DirSource, MemorySource};
