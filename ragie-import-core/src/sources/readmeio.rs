//! readme.io export reader: a ZIP of markdown pages with `---` frontmatter.

use std::path::Path;

use serde_json::Value;

use super::files::ZipEntries;
use super::SourceError;
use crate::contract::Metadata;
use crate::item::{CandidateItem, ItemBody};

/// Split `text` into frontmatter pairs and body.
///
/// The text is cut on `---` into at most three parts. With all three present, the
/// middle part holds `key: value` lines and the last is the body; otherwise the whole
/// text is the body and there are no pairs. Values are trimmed and stripped of
/// surrounding double quotes.
pub fn parse_frontmatter(text: &str) -> (Vec<(String, String)>, &str) {
    let parts: Vec<&str> = text.splitn(3, "---").collect();
    if parts.len() < 3 {
        return (Vec::new(), text);
    }

    let pairs = parts[1]
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| {
            (
                key.trim().to_string(),
                value.trim().trim_matches('"').to_string(),
            )
        })
        .collect();
    (pairs, parts[2])
}

fn page_to_item(file_name: &str, raw: &str) -> CandidateItem {
    let (pairs, body) = parse_frontmatter(raw);

    let mut metadata = Metadata::new();
    metadata.insert("sourceType".into(), Value::from("readmeio"));
    for (key, value) in pairs {
        metadata.insert(key, Value::from(value));
    }

    let slug = metadata
        .get("slug")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if !slug.is_empty() {
        metadata.insert("readmeId".into(), Value::from(slug.as_str()));
    }

    let title = match metadata.get("title").and_then(Value::as_str) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => {
            let base = file_name.rsplit('/').next().unwrap_or(file_name);
            base.strip_suffix(".md").unwrap_or(base).to_string()
        }
    };

    CandidateItem {
        external_id: slug,
        title,
        body: ItemBody::Text(body.to_string()),
        metadata,
    }
}

/// Yield one text item per `.md` entry of the archive at `path`.
///
/// Pages without a `slug` come out with an empty external ID.
pub fn read_readmeio(
    path: &Path,
) -> Result<impl Iterator<Item = Result<CandidateItem, SourceError>>, SourceError> {
    tracing::info!(path = %path.display(), "Loading readme.io ZIP file");
    let entries = ZipEntries::open(path)?.with_filter(|name| name.ends_with(".md"));

    Ok(entries.map(|entry| {
        let entry = entry?;
        let raw = String::from_utf8_lossy(&entry.data);
        Ok(page_to_item(&entry.name, &raw))
    }))
}
