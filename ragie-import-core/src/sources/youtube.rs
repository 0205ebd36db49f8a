//! YouTube caption export reader.
//!
//! Input is a JSON array of objects with `videoId`, `title` and `captions` (an array
//! of caption lines).

use std::path::Path;

use serde_json::{Map, Value};
use tracing::info;

use super::SourceError;
use crate::item::CandidateItem;

pub fn read_youtube(path: &Path) -> Result<Vec<CandidateItem>, SourceError> {
    info!(path = %path.display(), "Loading YouTube JSON file");
    let raw = std::fs::read_to_string(path).map_err(|e| SourceError::io(path, e))?;
    parse_youtube(&raw)
}

pub fn parse_youtube(raw: &str) -> Result<Vec<CandidateItem>, SourceError> {
    let videos: Vec<Map<String, Value>> = serde_json::from_str(raw)?;
    Ok(videos.iter().map(video_to_item).collect())
}

fn video_to_item(video: &Map<String, Value>) -> CandidateItem {
    let video_id = video.get("videoId").and_then(Value::as_str).unwrap_or_default();
    let title = video.get("title").and_then(Value::as_str).unwrap_or_default();

    let mut content = String::new();
    if !title.is_empty() {
        content.push_str(title);
        content.push_str("\n\n");
    }
    let captions = video
        .get("captions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for line in captions.iter().filter_map(Value::as_str).filter(|l| !l.is_empty()) {
        content.push_str(line);
        content.push('\n');
    }

    CandidateItem::text(video_id, title, content)
        .with_metadata("sourceType", "youtube")
        .with_metadata("title", title)
        .with_metadata("videoId", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemBody;

    #[test]
    fn captions_follow_title_with_blank_line() {
        let items = parse_youtube(
            r#"[{"videoId":"abc","title":"T","captions":["line1","line2"]}]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.external_id, "abc");
        assert_eq!(item.title, "T");
        assert_eq!(item.body, ItemBody::Text("T\n\nline1\nline2\n".into()));
        assert_eq!(item.metadata["videoId"], "abc");
        assert_eq!(item.metadata["sourceType"], "youtube");
    }

    #[test]
    fn skips_empty_and_non_string_captions() {
        let items = parse_youtube(
            r#"[{"videoId":"v","captions":["", 3, "kept", null]}]"#,
        )
        .unwrap();
        assert_eq!(items[0].body, ItemBody::Text("kept\n".into()));
        assert_eq!(items[0].display_name(), "v");
    }

    #[test]
    fn missing_video_id_yields_empty_external_id() {
        let items = parse_youtube(r#"[{"title":"Invalid Video","captions":["x"]}]"#).unwrap();
        assert_eq!(items[0].external_id, "");
    }

    #[test]
    fn non_array_input_is_an_error() {
        assert!(matches!(
            parse_youtube(r#"{"videoId":"abc"}"#),
            Err(SourceError::Json(_))
        ));
    }
}
