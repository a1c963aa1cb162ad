use std::cmp::Reverse;
use std::collections::HashMap;

use rayon::prelude::*;
use spdlog::{debug, warn};

use crate::content::Post;
use crate::post_list::ContentStore;
use crate::text_utils::parse_date_time;

/// Snapshot of the published posts, newest first.
///
/// Built fresh for every request; nothing is cached between builds.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    posts: Vec<Post>,
}

impl Catalog {
    /// Parses every content file of the store. Files are parsed in parallel but the
    /// result keeps the listing order until the date sort. Unreadable files are skipped.
    pub fn build(store: &ContentStore) -> Self {
        let slugs = store.list_all_slugs();
        let parsed: Vec<Option<Post>> = slugs
            .par_iter()
            .map(|slug| match store.read_post(slug) {
                Ok(post) => Some(post),
                Err(e) => {
                    warn!("Skipping blog post {}: {}", slug, e);
                    None
                }
            })
            .collect();

        Self::from_posts(parsed.into_iter().flatten().collect())
    }

    /// Applies the catalog rules to already parsed posts, given in listing order:
    /// a later post with an already seen slug replaces the earlier one, drafts are
    /// dropped and the rest is sorted by date, newest first.
    pub fn from_posts(posts: Vec<Post>) -> Self {
        let mut unique: Vec<Post> = Vec::with_capacity(posts.len());
        let mut index_by_slug: HashMap<String, usize> = HashMap::new();

        for post in posts {
            match index_by_slug.get(&post.slug) {
                Some(&idx) => {
                    warn!("Duplicate blog slug {}. The last listed file wins", post.slug);
                    unique[idx] = post;
                }
                None => {
                    index_by_slug.insert(post.slug.clone(), unique.len());
                    unique.push(post);
                }
            }
        }

        let mut posts: Vec<Post> = unique.into_iter().filter(|post| post.metadata.published).collect();
        // Stable: equal (or unparsable) dates keep listing order. Unparsable dates go last.
        posts.sort_by_key(|post| Reverse(parse_date_time(&post.metadata.date).ok()));

        debug!("Catalog built with {} published posts", posts.len());
        Catalog { posts }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
