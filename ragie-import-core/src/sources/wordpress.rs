//! WordPress XML export reader.
//!
//! Every `post` element (at any depth) becomes one item. The post's `url`, `title`,
//! `description` and `content` children are read as text; CDATA sections are kept
//! verbatim.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::info;

use super::SourceError;
use crate::item::CandidateItem;

#[derive(Debug, Default)]
struct PartialPost {
    url: Option<String>,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
}

impl PartialPost {
    fn set(&mut self, field: &str, text: String) {
        // The first occurrence of each field wins.
        let slot = match field {
            "url" => &mut self.url,
            "title" => &mut self.title,
            "description" => &mut self.description,
            "content" => &mut self.content,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(text);
        }
    }

    fn into_item(self) -> CandidateItem {
        let url = self.url.unwrap_or_default();
        let title = self.title.unwrap_or_default();
        let data = [
            title.as_str(),
            self.description.as_deref().unwrap_or_default(),
            self.content.as_deref().unwrap_or_default(),
        ]
        .join("\n\n");

        CandidateItem::text(url.clone(), title.clone(), data)
            .with_metadata("sourceType", "wordpress")
            .with_metadata("url", url)
            .with_metadata("title", title)
    }
}

fn is_post_field(name: &str) -> bool {
    matches!(name, "url" | "title" | "description" | "content")
}

pub fn read_wordpress(path: &Path) -> Result<Vec<CandidateItem>, SourceError> {
    info!(path = %path.display(), "Loading WordPress XML file");
    let raw = std::fs::read_to_string(path).map_err(|e| SourceError::io(path, e))?;
    parse_wordpress(&raw)
}

pub fn parse_wordpress(xml: &str) -> Result<Vec<CandidateItem>, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();
    let mut saw_root = false;

    // Element names from the root to the current element.
    let mut stack: Vec<String> = Vec::new();
    let mut post: Option<(PartialPost, usize)> = None;
    let mut field: Option<String> = None;
    let mut text_buf = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                saw_root = true;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(name.clone());
                match post.as_ref().map(|(_, depth)| *depth) {
                    None if name == "post" => post = Some((PartialPost::default(), stack.len())),
                    Some(depth)
                        if field.is_none() && stack.len() == depth + 1 && is_post_field(&name) =>
                    {
                        field = Some(name);
                        text_buf.clear();
                    }
                    _ => {}
                }
            }
            Event::Empty(ref e) => {
                saw_root = true;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match &mut post {
                    None if name == "post" => items.push(PartialPost::default().into_item()),
                    Some((partial, depth)) if stack.len() == *depth && is_post_field(&name) => {
                        partial.set(&name, String::new());
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) => {
                if field.is_some() {
                    text_buf.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if field.is_some() {
                    text_buf.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                if let Some(depth) = post.as_ref().map(|(_, depth)| *depth) {
                    if stack.len() == depth + 1 {
                        if let (Some(name), Some((partial, _))) = (field.take(), post.as_mut()) {
                            partial.set(&name, std::mem::take(&mut text_buf));
                        }
                    } else if stack.len() == depth {
                        if let Some((finished, _)) = post.take() {
                            items.push(finished.into_item());
                        }
                    }
                }
                stack.pop();
            }
            Event::Eof => {
                if let Some(open) = stack.last() {
                    return Err(SourceError::Xml(format!(
                        "unexpected end of file inside <{open}>"
                    )));
                }
                break;
            }
            _ => {}
        }
    }

    if !saw_root {
        return Err(SourceError::EmptyXml);
    }
    info!(posts = items.len(), "Parsed WordPress export");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemBody;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<export>
  <posts>
    <post>
      <url>https://example.com/first-post</url>
      <title>First Test Post</title>
      <description>A &amp; B</description>
      <content><![CDATA[<p>Hello <b>world</b></p>]]></content>
    </post>
    <post>
      <title>Post Without URL</title>
      <content>body</content>
    </post>
  </posts>
</export>"#;

    #[test]
    fn parses_posts_in_order() {
        let items = parse_wordpress(SAMPLE).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.external_id, "https://example.com/first-post");
        assert_eq!(first.title, "First Test Post");
        assert_eq!(
            first.body,
            ItemBody::Text("First Test Post\n\nA & B\n\n<p>Hello <b>world</b></p>".into())
        );
        assert_eq!(first.metadata["sourceType"], "wordpress");
        assert_eq!(first.metadata["url"], "https://example.com/first-post");

        let second = &items[1];
        assert_eq!(second.external_id, "");
        assert_eq!(second.body, ItemBody::Text("Post Without URL\n\n\n\nbody".into()));
    }

    #[test]
    fn empty_post_has_whitespace_only_body() {
        let items = parse_wordpress("<root><post><url>u</url></post></root>").unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_empty_body());
    }

    #[test]
    fn document_without_root_is_empty_xml() {
        assert!(matches!(
            parse_wordpress("<?xml version=\"1.0\"?>\n"),
            Err(SourceError::EmptyXml)
        ));
        assert!(matches!(parse_wordpress(""), Err(SourceError::EmptyXml)));
    }

    #[test]
    fn mismatched_tags_are_an_error() {
        assert!(matches!(
            parse_wordpress("<root><post></root>"),
            Err(SourceError::Xml(_))
        ));
    }

    #[test]
    fn truncated_document_is_an_error() {
        let err = parse_wordpress(
            "<root><post><url>u</url><title>T</title><content>body</content>",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to parse XML: unexpected end of file inside <post>"
        );
    }
}
