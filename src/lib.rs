//! # daisy-nav
//!
//! Phrase, heading and page navigation for DAISY talking books.
//!
//! ## Features
//!
//! - DAISY 2.02 books (`ncc.html` plus SMIL 1.0 documents)
//! - DAISY 3 books (OPF package, NCX and SMIL 2 documents)
//! - Forward and backward steps by phrase, heading or page from any playback
//!   position
//! - Legacy text encodings (UTF-8, Windows-1251, Windows-1252) detected per file
//!
//! ## Quick Start
//!
//! ```no_run
//! use daisy_nav::NavOption;
//!
//! let mut nav = daisy_nav::open("books/fp2003").unwrap();
//! let first = nav.list_audio_fragments()[0].to_string();
//!
//! nav.set_option(NavOption::Heading);
//! if let Some(item) = nav.get_next(&first, 0.0).unwrap() {
//!     println!("{} at {}s: {:?}", item.audio_path, item.start_time, item.label);
//! }
//! ```
//!
//! ## Options
//!
//! [`OpenOptions`] controls decoding, caching and how DAISY 2.02 anchor
//! targets are found:
//!
//! ```no_run
//! use daisy_nav::{Navigator, OpenOptions, TargetLookup};
//!
//! let options = OpenOptions::new()
//!     .with_cache_capacity(8)
//!     .with_target_lookup(TargetLookup::IdAttribute);
//! let nav = Navigator::open_with("books/fp2003", options).unwrap();
//! println!("{} ({})", nav.metadata().title, nav.layout());
//! ```

pub mod anchor;
pub mod book;
pub mod cache;
pub mod error;
pub mod index;
pub mod io;
pub mod layout;
pub(crate) mod loader;
pub mod nav;
pub mod ncc;
pub mod options;
pub mod package;
pub mod smil;
pub(crate) mod util;

use std::path::Path;

pub use anchor::{AnchorLocator, IdAttributeLocator, SubstringLocator};
pub use book::Metadata;
pub use error::{Error, Result};
pub use index::{Fragment, FragmentIndex};
pub use io::{BookSource, DirSource, MemorySource};
pub use layout::Layout;
pub use nav::{Direction, NavItem, NavOption, Navigator};
pub use options::{OpenOptions, TargetLookup};
pub use smil::{Clip, ClipError, parse_clips, parse_clock_value};

/// Open a book directory with default options.
pub fn open(dir: impl AsRef<Path>) -> Result<Navigator> {
    Navigator::open(dir)
}
