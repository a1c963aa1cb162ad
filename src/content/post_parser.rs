use std::io;

use thiserror::Error;

use crate::content::front_matter::{decode_metadata, split_front_matter};
use crate::content::markdown_renderer::MarkdownRenderer;
use crate::content::{Post, PostMetadata};
use crate::text_utils::count_words;

#[derive(Debug, Error)]
pub enum PostError {
    /// The post does not exist or is not published. Both look the same to callers.
    #[error("Blog post {0} not found")]
    NotFound(String),

    #[error("Error reading blog post {slug}: {source}")]
    Io {
        slug: String,
        #[source]
        source: io::Error,
    },

    #[error("Error rendering blog post {slug}: {source}")]
    Render {
        slug: String,
        #[source]
        source: io::Error,
    },
}

impl PostError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PostError::NotFound(_))
    }
}

/// Turns the raw text of a content file into a post. Missing or malformed metadata never
/// fails the parse; only a markdown rendering error does.
pub fn parse_blog_post(raw: &str, slug: &str) -> Result<Post, PostError> {
    let (header, body) = split_front_matter(raw);
    let metadata = match header {
        Some(header) => decode_metadata(header, slug),
        None => PostMetadata::default(),
    };

    let content = MarkdownRenderer::render(body).map_err(|source| PostError::Render {
        slug: slug.to_string(),
        source,
    })?;

    Ok(Post {
        id: slug.to_string(),
        slug: slug.to_string(),
        metadata,
        content,
        word_count: count_words(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::{post_file, POST_DATA_MD};

    #[test]
    fn test_parse_full_post() {
        let post = parse_blog_post(POST_DATA_MD, "getting-started-with-rag").unwrap();
        assert_eq!(post.id, "getting-started-with-rag");
        assert_eq!(post.slug, "getting-started-with-rag");
        assert_eq!(post.metadata.title, "Getting Started with RAG Systems");
        assert!(post.metadata.published);
        assert!(post.content.starts_with("<p>Retrieval Augmented Generation"));
        assert!(post.content.contains("<h2>Why RAG?</h2>"));
        assert!(post.content.contains("<em>verify</em>"));
        assert!(post.content.contains("<div class=\"callout\">Raw HTML is passed through.</div>"));
        assert_eq!(post.read_time_or_estimate(), 12);
    }

    #[test]
    fn test_read_time_estimated_from_body() {
        let raw = post_file("Estimate", "2025-01-01", None, false, true, 400);
        let post = parse_blog_post(&raw, "estimate").unwrap();
        assert_eq!(post.metadata.read_time, None);
        assert_eq!(post.word_count, 400);
        assert_eq!(post.read_time_or_estimate(), 2);
    }

    #[test]
    fn test_no_front_matter_is_unpublished_defaults() {
        let post = parse_blog_post("# Loose note\n\nSome text.\n", "loose").unwrap();
        assert_eq!(post.metadata, PostMetadata::default());
        assert!(post.content.contains("<h1>Loose note</h1>"));
    }

    #[test]
    fn test_empty_body_has_empty_content() {
        let post = parse_blog_post("---\ntitle: Soon\npublished: true\n---\n", "soon").unwrap();
        assert_eq!(post.content, "");
        assert_eq!(post.word_count, 0);
        assert_eq!(post.read_time_or_estimate(), 0);
    }
}
