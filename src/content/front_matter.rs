//! Front matter handling.
//!
//! A post file starts with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Getting Started with RAG Systems
//! date: 2024-09-15
//! tags: [rag, llm]
//! published: true
//! ---
//! Body in markdown...
//! ```
//!
//! Decoding never fails. Keys are coerced one by one and anything missing or of the
//! wrong shape falls back to its default, so a broken header degrades to an empty record.

use serde_yaml::{Mapping, Value};
use spdlog::{debug, warn};

use crate::content::PostMetadata;

const DELIMITER: &str = "---";

/// Splits raw file contents into the metadata block (without fences) and the body.
/// Files without a complete fenced block have no metadata; the whole text is the body.
pub fn split_front_matter(raw: &str) -> (Option<&str>, &str) {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return (None, text);
    };
    if first.trim_end() != DELIMITER {
        return (None, text);
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let header = &text[header_start..offset];
            let body = &text[offset + line.len()..];
            return (Some(header), body);
        }
        offset += line.len();
    }

    (None, text)
}

/// Decodes a metadata block into a fully populated record.
pub fn decode_metadata(header: &str, slug: &str) -> PostMetadata {
    let map = match serde_yaml::from_str::<Value>(header) {
        Ok(Value::Mapping(map)) => map,
        Ok(Value::Null) => {
            debug!("Empty front matter for {}", slug);
            return PostMetadata::default();
        }
        Ok(other) => {
            warn!("Front matter of {} is not a mapping ({:?}). Using defaults", slug, other);
            return PostMetadata::default();
        }
        Err(e) => {
            warn!("Malformed front matter for {}: {}. Using defaults", slug, e);
            return PostMetadata::default();
        }
    };

    from_mapping(&map)
}

fn from_mapping(map: &Mapping) -> PostMetadata {
    PostMetadata {
        title: map.get("title").and_then(as_string).unwrap_or_default(),
        date: map.get("date").and_then(as_string).unwrap_or_default(),
        description: map.get("description").and_then(as_string).unwrap_or_default(),
        category: map.get("category").and_then(as_string).filter(|s| !s.is_empty()),
        tags: map.get("tags").map(as_tags).unwrap_or_default(),
        author: map.get("author").and_then(as_string).filter(|s| !s.is_empty()),
        pinned: map.get("pinned").map(as_bool).unwrap_or(false),
        published: map.get("published").map(as_bool).unwrap_or(false),
        read_time: map.get("readTime").and_then(as_minutes),
    }
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn as_minutes(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Tags may be a YAML sequence or a single comma separated string, `[a, "b"]` style included.
fn as_tags(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .filter_map(as_string)
            .filter(|tag| !tag.is_empty())
            .collect(),
        Value::String(s) => {
            let s = s.trim();
            let s = s.strip_prefix('[').and_then(|s| s.strip_suffix(']')).unwrap_or(s);
            s.split(',')
                .map(|tag| tag.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
                .filter(|tag| !tag.is_empty())
                .collect()
        }
        _ => vec![],
    }
}
