//! # sources: readers that turn an input file or directory into candidate items
//!
//! Each reader is a pure transform. Whole-file formats (YouTube JSON, WordPress XML)
//! are parsed up front so that a malformed file fails before any item is imported.
//! Archive and directory readers are lazy: an entry is opened and read only when the
//! importer asks for it, and a failure on one entry is yielded as an error for that
//! entry alone.

pub mod files;
pub mod readmeio;
pub mod wordpress;
pub mod youtube;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::item::CandidateItem;

/// Stream of items (or per-entry read failures) produced by a reader.
pub type ItemStream = Box<dyn Iterator<Item = Result<CandidateItem, SourceError>>>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse XML: {0}")]
    Xml(String),

    #[error("empty XML file")]
    EmptyXml,

    #[error("failed to open ZIP file {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to read entry {name} in zip: {source}")]
    ZipEntry {
        name: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
}

impl From<quick_xml::Error> for SourceError {
    fn from(e: quick_xml::Error) -> Self {
        SourceError::Xml(e.to_string())
    }
}

impl SourceError {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Supported import source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// JSON array of `{videoId, title, captions}` objects.
    Youtube,
    /// XML export with `post` elements.
    Wordpress,
    /// ZIP of markdown files with frontmatter.
    Readmeio,
    /// Directory tree of arbitrary files.
    Files,
    /// ZIP archive of arbitrary files.
    Zip,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Youtube => "youtube",
            SourceKind::Wordpress => "wordpress",
            SourceKind::Readmeio => "readmeio",
            SourceKind::Files => "files",
            SourceKind::Zip => "zip",
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(SourceKind::Youtube),
            "wordpress" => Ok(SourceKind::Wordpress),
            "readmeio" => Ok(SourceKind::Readmeio),
            "files" => Ok(SourceKind::Files),
            "zip" => Ok(SourceKind::Zip),
            other => Err(format!("unknown import type: {other}")),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open `path` with the reader for `kind`.
///
/// Errors returned here are fatal: the source could not be opened or parsed at all.
pub fn open_source(kind: SourceKind, path: &Path) -> Result<ItemStream, SourceError> {
    tracing::info!(kind = %kind, path = %path.display(), "Opening import source");
    let stream: ItemStream = match kind {
        SourceKind::Youtube => Box::new(youtube::read_youtube(path)?.into_iter().map(Ok)),
        SourceKind::Wordpress => Box::new(wordpress::read_wordpress(path)?.into_iter().map(Ok)),
        SourceKind::Readmeio => Box::new(readmeio::read_readmeio(path)?),
        SourceKind::Files => Box::new(files::read_dir(path)?),
        SourceKind::Zip => Box::new(files::read_zip(path)?),
    };
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind_round_trips_through_str() {
        for kind in [
            SourceKind::Youtube,
            SourceKind::Wordpress,
            SourceKind::Readmeio,
            SourceKind::Files,
            SourceKind::Zip,
        ] {
            assert_eq!(kind.as_str().parse::<SourceKind>(), Ok(kind));
        }
        assert_eq!(
            "rss".parse::<SourceKind>(),
            Err("unknown import type: rss".to_string())
        );
    }
}
