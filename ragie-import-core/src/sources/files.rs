//! Directory-tree and ZIP-archive readers for arbitrary files.
//!
//! Both upload each file as a binary attachment. The external ID is the path relative
//! to the root (directory) or the entry name (archive), always with `/` separators.
//! Zero-byte files are skipped with a warning.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use super::SourceError;
use crate::item::CandidateItem;

/// `.ext` for the final path component, or an empty string.
fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn file_item(source_type: &str, rel_path: &str, data: Vec<u8>) -> CandidateItem {
    let name = base_name(rel_path);
    let size = data.len() as u64;
    CandidateItem::file(rel_path, name, name, data)
        .with_metadata("source_type", source_type)
        .with_metadata("path", rel_path)
        .with_metadata("extension", extension_of(rel_path))
        .with_metadata("size", size)
}

/// Walk `root` recursively, yielding one item per non-empty regular file.
///
/// Entries are visited in file-name order; each file is read only when its item is
/// pulled from the iterator.
pub fn read_dir(
    root: &Path,
) -> Result<impl Iterator<Item = Result<CandidateItem, SourceError>>, SourceError> {
    info!(path = %root.display(), "Walking source directory");
    let meta = std::fs::metadata(root).map_err(|e| SourceError::io(root, e))?;
    if !meta.is_dir() {
        return Err(SourceError::NotADirectory(root.to_path_buf()));
    }

    let root: PathBuf = root.to_path_buf();
    let walker = WalkDir::new(&root).sort_by_file_name().into_iter();
    Ok(walker.filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => return Some(Err(SourceError::Walk(e))),
        };
        if !entry.file_type().is_file() {
            return None;
        }
        let rel_path = relative_path(&root, entry.path());

        let data = match std::fs::read(entry.path()) {
            Ok(data) => data,
            Err(e) => return Some(Err(SourceError::io(entry.path(), e))),
        };
        if data.is_empty() {
            warn!(path = %rel_path, "skipping empty file");
            return None;
        }
        debug!(path = %rel_path, size = data.len(), "Read file");
        Some(Ok(file_item("files", &rel_path, data)))
    }))
}

fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Upper bound on the buffer pre-allocated for one archive entry.
const MAX_SIZE_HINT: u64 = 1 << 20;

/// A file entry read out of a ZIP archive.
#[derive(Debug, Clone, PartialEq)]
pub struct ZipEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// Lazy iterator over the file entries of a ZIP archive.
///
/// Directory entries, and entries rejected by the optional name filter, are passed
/// over without being decompressed.
pub struct ZipEntries {
    archive: ZipArchive<File>,
    next: usize,
    filter: Option<fn(&str) -> bool>,
}

impl ZipEntries {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|e| SourceError::io(path, e))?;
        let archive = ZipArchive::new(file).map_err(|source| SourceError::Zip {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), entries = archive.len(), "Opened ZIP archive");
        Ok(ZipEntries {
            archive,
            next: 0,
            filter: None,
        })
    }

    /// Only yield entries whose name satisfies `filter`.
    pub fn with_filter(mut self, filter: fn(&str) -> bool) -> Self {
        self.filter = Some(filter);
        self
    }

    fn read_entry(&mut self, index: usize) -> Option<Result<ZipEntry, SourceError>> {
        let fallback_name = self
            .archive
            .name_for_index(index)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("#{index}"));

        let mut entry = match self.archive.by_index(index) {
            Ok(entry) => entry,
            Err(source) => {
                return Some(Err(SourceError::ZipEntry {
                    name: fallback_name,
                    source,
                }))
            }
        };
        if entry.is_dir() {
            return None;
        }
        let name = entry.name().to_string();
        if let Some(filter) = self.filter {
            if !filter(&name) {
                return None;
            }
        }

        // Declared sizes come from the archive header; cap the hint.
        let mut data = Vec::with_capacity(entry.size().min(MAX_SIZE_HINT) as usize);
        if let Err(e) = entry.read_to_end(&mut data) {
            return Some(Err(SourceError::ZipEntry {
                name,
                source: e.into(),
            }));
        }
        Some(Ok(ZipEntry { name, data }))
    }
}

impl Iterator for ZipEntries {
    type Item = Result<ZipEntry, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.archive.len() {
            let index = self.next;
            self.next += 1;
            if let Some(result) = self.read_entry(index) {
                return Some(result);
            }
        }
        None
    }
}

/// Yield one item per non-empty file entry of the archive at `path`.
pub fn read_zip(
    path: &Path,
) -> Result<impl Iterator<Item = Result<CandidateItem, SourceError>>, SourceError> {
    let zip_source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let entries = ZipEntries::open(path)?;

    Ok(entries.filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };
        if entry.data.is_empty() {
            warn!(path = %entry.name, "skipping empty file in zip");
            return None;
        }
        debug!(path = %entry.name, size = entry.data.len(), "Read zip entry");
        Some(Ok(
            file_item("zip", &entry.name, entry.data).with_metadata("zip_source", zip_source.as_str())
        ))
    }))
}
