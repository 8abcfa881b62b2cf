//! Book layout detection.
//!
//! A book directory is either DAISY 2.02 (an `ncc.html` navigation control
//! center next to the SMIL files) or DAISY 3 (an OPF package plus an NCX
//! navigation file). The older DAISY 2.0 layout is not supported.

use std::fmt;

use crate::error::{Error, Result};

/// The document organization of a book, chosen once when it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Layout {
    /// `ncc.html` master document; anchors resolved by offset in each SMIL file.
    Daisy202,
    /// OPF package + NCX; anchors carry their own clips.
    Daisy3,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Daisy202 => f.write_str("DAISY 2.02"),
            Layout::Daisy3 => f.write_str("DAISY 3"),
        }
    }
}

/// The entry files of a detected layout, named as they appear in the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutFiles {
    Daisy202 { ncc: String },
    Daisy3 { package: String, ncx: String },
}

impl LayoutFiles {
    pub fn layout(&self) -> Layout {
        match self {
            LayoutFiles::Daisy202 { .. } => Layout::Daisy202,
            LayoutFiles::Daisy3 { .. } => Layout::Daisy3,
        }
    }
}

/// Pick the layout from a directory listing.
///
/// The presence of `ncc.html` selects DAISY 2.02 whatever else the directory
/// holds. Otherwise the book must provide both a `.opf` and a `.ncx` file.
pub fn detect<I, S>(names: I) -> Result<LayoutFiles>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names: Vec<S> = names.into_iter().collect();
    let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();

    if let Some(ncc) = names
        .iter()
        .find(|name| name.eq_ignore_ascii_case("ncc.html") || name.eq_ignore_ascii_case("ncc.htm"))
    {
        return Ok(LayoutFiles::Daisy202 {
            ncc: ncc.to_string(),
        });
    }

    let package = first_with_extension(&names, "opf").ok_or_else(|| {
        Error::UnsupportedLayout("no ncc.html and no .opf package file".into())
    })?;
    let ncx = first_with_extension(&names, "ncx").ok_or_else(|| {
        Error::UnsupportedLayout(format!("package {package} has no .ncx navigation file"))
    })?;

    Ok(LayoutFiles::Daisy3 {
        package: package.to_string(),
        ncx: ncx.to_string(),
    })
}

fn first_with_extension<'a>(names: &[&'a str], extension: &str) -> Option<&'a str> {
    names.iter().copied().find(|name| {
        name.rsplit_once('.')
            .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case(extension))
    })
}
