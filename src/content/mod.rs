use serde::Serialize;

use crate::text_utils::minutes_for_words;

pub mod front_matter;
pub mod markdown_renderer;
pub mod post_parser;

/// Sentinel category meaning "no filter". Always first in a category list.
pub const ALL_CATEGORIES: &str = "All";

/// Metadata decoded from the front matter of a post, with defaults applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetadata {
    pub title: String,
    pub date: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub pinned: bool,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: String,
    pub slug: String,
    #[serde(flatten)]
    pub metadata: PostMetadata,
    /// Rendered HTML. Empty when the post has no body yet.
    pub content: String,
    #[serde(skip)]
    pub word_count: usize,
}

impl Post {
    /// Declared reading time, or one estimated from the body.
    pub fn read_time_or_estimate(&self) -> u32 {
        self.metadata
            .read_time
            .unwrap_or_else(|| minutes_for_words(self.word_count))
    }

    pub fn to_card(&self) -> PostCard {
        let metadata = &self.metadata;
        PostCard {
            id: self.id.clone(),
            title: metadata.title.clone(),
            date: metadata.date.clone(),
            description: metadata.description.clone(),
            category: metadata.category.clone(),
            tags: metadata.tags.clone(),
            pinned: metadata.pinned,
            slug: self.slug.clone(),
            read_time: metadata.read_time,
        }
    }
}

/// List view of a post: no body, author or visibility flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCard {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub pinned: bool,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(read_time: Option<u32>, word_count: usize) -> Post {
        Post {
            id: "hello".to_string(),
            slug: "hello".to_string(),
            metadata: PostMetadata {
                title: "Hello".to_string(),
                date: "2025-01-01".to_string(),
                author: Some("me".to_string()),
                published: true,
                read_time,
                ..Default::default()
            },
            content: "<p>hi</p>".to_string(),
            word_count,
        }
    }

    #[test]
    fn test_read_time_prefers_declared_value() {
        assert_eq!(post(Some(7), 400).read_time_or_estimate(), 7);
        assert_eq!(post(None, 400).read_time_or_estimate(), 2);
        assert_eq!(post(None, 401).read_time_or_estimate(), 3);
    }

    #[test]
    fn test_card_drops_body_and_author() {
        let json = serde_json::to_value(post(None, 10).to_card()).unwrap();
        assert_eq!(json["slug"], "hello");
        assert!(json.get("content").is_none());
        assert!(json.get("author").is_none());
        assert!(json.get("published").is_none());
        assert!(json.get("readTime").is_none());
    }

    #[test]
    fn test_post_json_is_flat_camel_case() {
        let json = serde_json::to_value(post(Some(3), 10)).unwrap();
        assert_eq!(json["title"], "Hello");
        assert_eq!(json["readTime"], 3);
        assert_eq!(json["author"], "me");
        assert_eq!(json["content"], "<p>hi</p>");
        assert!(json.get("wordCount").is_none());
        assert!(json.get("word_count").is_none());
    }
}
