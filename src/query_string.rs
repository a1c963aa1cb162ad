use std::collections::HashMap;

use crate::query::ListFilter;
use crate::search::{SearchQuery, SortKey};

/// Decoded request parameters. Invalid encodings decode to an empty set.
#[derive(PartialEq, Debug, Default)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        QueryString {
            items: vs.into_iter().collect(),
        }
    }

    /// Non blank value of `key`, trimmed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items
            .get(key)
            .map(|val| val.trim())
            .filter(|val| !val.is_empty())
    }

    /// 1-based page number. Missing, zero or garbage values mean page 1.
    pub fn get_page(&self) -> u32 {
        match self.get("page").and_then(|val| val.parse::<u32>().ok()) {
            Some(page) if page > 0 => page,
            _ => 1,
        }
    }

    pub fn get_category(&self) -> Option<String> {
        self.get("category").map(String::from)
    }

    /// `limit` capped at `max`. An unparsable limit is ignored.
    pub fn get_limit(&self, max: usize) -> Option<usize> {
        self.get("limit")
            .and_then(|val| val.parse::<usize>().ok())
            .map(|limit| limit.min(max))
    }

    pub fn get_sort(&self) -> SortKey {
        self.get("sort")
            .and_then(|val| val.parse().ok())
            .unwrap_or_default()
    }

    pub fn to_list_filter(&self, max_limit: usize) -> ListFilter {
        ListFilter {
            category: self.get_category(),
            limit: self.get_limit(max_limit),
        }
    }

    pub fn to_search_query(&self) -> SearchQuery {
        SearchQuery {
            text: self.get("q").unwrap_or_default().to_string(),
            category: self.get_category(),
            sort: self.get_sort(),
        }
    }
}
