use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use spdlog::{error, warn};

use crate::content::post_parser::{parse_blog_post, PostError};
use crate::content::Post;

/// A flat directory of `<slug>.<extension>` files, one post each.
#[derive(Debug, Clone)]
pub struct ContentStore {
    pub root_dir: PathBuf,
    pub extension: String,
}

impl ContentStore {
    pub fn new(root_dir: PathBuf, extension: &str) -> Self {
        ContentStore {
            root_dir,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Base names of every content file, in directory listing order.
    /// A missing or unreadable directory yields no slugs.
    pub fn list_all_slugs(&self) -> Vec<String> {
        let entries = match fs::read_dir(self.root_dir.as_path()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Blog directory not found: {}", self.root_dir.display());
                return vec![];
            }
            Err(e) => {
                error!("Error reading blog directory {}: {}", self.root_dir.display(), e);
                return vec![];
            }
        };

        let mut slugs = vec![];
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                slugs.push(stem.to_string());
            }
        }
        slugs
    }

    /// File backing a slug. Slugs that could escape the content directory have no path.
    pub fn path_for(&self, slug: &str) -> Option<PathBuf> {
        if slug.is_empty() || slug.starts_with('.') || slug.contains('/') || slug.contains('\\') {
            return None;
        }
        Some(self.root_dir.join(format!("{}.{}", slug, self.extension)))
    }

    /// Reads and parses a post regardless of its published flag.
    pub fn read_post(&self, slug: &str) -> Result<Post, PostError> {
        let Some(path) = self.path_for(slug) else {
            return Err(PostError::NotFound(slug.to_string()));
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(PostError::NotFound(slug.to_string())),
            Err(source) => return Err(PostError::Io { slug: slug.to_string(), source }),
        };

        parse_blog_post(&raw, slug)
    }

    /// Reads a post for public display: drafts are reported as not found.
    pub fn fetch_published(&self, slug: &str) -> Result<Post, PostError> {
        let post = self.read_post(slug)?;
        if !post.metadata.published {
            return Err(PostError::NotFound(slug.to_string()));
        }
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::test_data::{post_file, DRAFT_POST_MD, POST_DATA_MD};

    fn store_with(files: &[(&str, &str)]) -> (TempDir, ContentStore) {
        let tmp = TempDir::new().unwrap();
        for (name, contents) in files {
            fs::write(tmp.path().join(name), contents).unwrap();
        }
        let store = ContentStore::new(tmp.path().to_path_buf(), "md");
        (tmp, store)
    }

    #[test]
    fn test_list_slugs_filters_extension() {
        let (tmp, store) = store_with(&[
            ("rag.md", POST_DATA_MD),
            ("draft.md", DRAFT_POST_MD),
            ("notes.txt", "ignored"),
            ("image.png", "ignored"),
        ]);
        fs::create_dir(tmp.path().join("folder.md")).unwrap();

        let mut slugs = store.list_all_slugs();
        slugs.sort();
        assert_eq!(slugs, ["draft", "rag"]);
    }

    #[test]
    fn test_missing_directory_lists_nothing() {
        let store = ContentStore::new(PathBuf::from("/definitely/not/here/blog"), ".md");
        assert_eq!(store.extension, "md");
        assert!(store.list_all_slugs().is_empty());
    }

    #[test]
    fn test_read_post() {
        let (_tmp, store) = store_with(&[("rag.md", POST_DATA_MD)]);
        let post = store.read_post("rag").unwrap();
        assert_eq!(post.slug, "rag");
        assert_eq!(post.metadata.title, "Getting Started with RAG Systems");
    }

    #[test]
    fn test_missing_slug_is_not_found() {
        let (_tmp, store) = store_with(&[("rag.md", POST_DATA_MD)]);
        assert!(store.read_post("missing-slug").unwrap_err().is_not_found());
        assert!(store.fetch_published("missing-slug").unwrap_err().is_not_found());
    }

    #[test]
    fn test_draft_is_not_found_when_published_only() {
        let (_tmp, store) = store_with(&[("draft.md", DRAFT_POST_MD)]);
        assert!(store.read_post("draft").is_ok());
        assert!(store.fetch_published("draft").unwrap_err().is_not_found());
    }

    #[test]
    fn test_traversal_slugs_are_rejected() {
        let file = post_file("A", "2025-01-01", None, false, true, 3);
        let (_tmp, store) = store_with(&[("a.md", file.as_str())]);
        assert!(store.read_post("a").is_ok());
        assert!(store.path_for("../outside").is_none());
        assert!(store.path_for("..").is_none());
        assert!(store.path_for("").is_none());
        assert!(store.read_post("../outside").unwrap_err().is_not_found());
    }
}
