use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::catalog::Catalog;
use crate::content::post_parser::PostError;
use crate::content::{Post, PostCard, ALL_CATEGORIES};

/// Filter for [`Catalog::list`]. `None` values do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub category: Option<String>,
    pub limit: Option<usize>,
}

impl ListFilter {
    pub fn category(category: &str) -> Self {
        ListFilter { category: Some(category.to_string()), limit: None }
    }

    pub fn limit(limit: usize) -> Self {
        ListFilter { category: None, limit: Some(limit) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListing {
    pub posts: Vec<PostCard>,
    pub categories: Vec<String>,
    /// Number of posts matching the filter before the limit was applied
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogStats {
    pub total_posts: usize,
    pub category_count: usize,
    pub distinct_tag_count: usize,
    pub average_read_time: f64,
    pub latest_date: Option<String>,
    pub pinned_count: usize,
}

/// True when `category` does not restrict anything.
pub fn is_all_categories(category: Option<&str>) -> bool {
    match category {
        None => true,
        Some(c) => c.is_empty() || c == ALL_CATEGORIES,
    }
}

/// Stable partition: pinned items first, each group keeping its relative order.
pub fn pinned_first<T>(items: Vec<T>, is_pinned: impl Fn(&T) -> bool) -> Vec<T> {
    let (mut pinned, unpinned): (Vec<T>, Vec<T>) = items.into_iter().partition(|item| is_pinned(item));
    pinned.extend(unpinned);
    pinned
}

impl Catalog {
    /// Cards for the posts matching `filter`, in catalog order. With a limit, pinned
    /// posts are moved ahead of the others before truncating.
    pub fn list(&self, filter: &ListFilter) -> PostListing {
        let category = filter.category.as_deref();
        let matching: Vec<PostCard> = self
            .posts()
            .iter()
            .filter(|post| is_all_categories(category) || post.metadata.category.as_deref() == category)
            .map(Post::to_card)
            .collect();

        let total = matching.len();
        let posts = match filter.limit {
            Some(limit) => {
                let mut ordered = pinned_first(matching, |card| card.pinned);
                ordered.truncate(limit);
                ordered
            }
            None => matching,
        };

        PostListing {
            posts,
            categories: self.categories(),
            total,
        }
    }

    /// A published post by slug. Absent and unpublished posts are both not found.
    pub fn get(&self, slug: &str) -> Result<&Post, PostError> {
        self.posts()
            .iter()
            .find(|post| post.slug == slug && post.metadata.published)
            .ok_or_else(|| PostError::NotFound(slug.to_string()))
    }

    /// "All" followed by the distinct categories of published posts, sorted.
    pub fn categories(&self) -> Vec<String> {
        let distinct: BTreeSet<&str> = self
            .posts()
            .iter()
            .filter_map(|post| post.metadata.category.as_deref())
            .collect();

        let mut categories = Vec::with_capacity(distinct.len() + 1);
        categories.push(ALL_CATEGORIES.to_string());
        categories.extend(distinct.into_iter().filter(|c| *c != ALL_CATEGORIES).map(String::from));
        categories
    }

    /// Aggregates over the published catalog.
    ///
    /// `average_read_time` only uses declared read times and counts posts without one as 0.
    /// Posts that rely on the word count estimate therefore pull the average down.
    pub fn stats(&self) -> BlogStats {
        let mut categories = HashSet::new();
        let mut tags = HashSet::new();
        let mut read_time_sum = 0u64;
        let mut pinned_count = 0;

        for post in self.posts() {
            if let Some(category) = post.metadata.category.as_deref() {
                categories.insert(category);
            }
            tags.extend(post.metadata.tags.iter().map(String::as_str));
            read_time_sum += post.metadata.read_time.unwrap_or(0) as u64;
            if post.metadata.pinned {
                pinned_count += 1;
            }
        }

        let total_posts = self.len();
        let average_read_time = if total_posts == 0 {
            0.0
        } else {
            read_time_sum as f64 / total_posts as f64
        };

        BlogStats {
            total_posts,
            category_count: categories.len(),
            distinct_tag_count: tags.len(),
            average_read_time,
            latest_date: self.posts().first().map(|post| post.metadata.date.clone()),
            pinned_count,
        }
    }
}
