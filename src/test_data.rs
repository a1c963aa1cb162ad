#[cfg(test)]
pub const POST_DATA_MD: &str = r#"---
title: Getting Started with RAG Systems
date: 2024-09-15
description: A comprehensive guide to building RAG systems from scratch
category: Generative AI
tags: [RAG, LLM, Vector Databases]
author: Portfolio Owner
pinned: true
published: true
readTime: 12
---

Retrieval Augmented Generation pairs a retriever with a language model.

## Why RAG?

- Fresh knowledge without retraining
- Citations you can *verify*

<div class="callout">Raw HTML is passed through.</div>
"#;

#[cfg(test)]
pub const DRAFT_POST_MD: &str = r#"---
title: Half-baked thoughts
date: 2025-02-01
description: Not ready yet
category: Secret Drafts
tags: [draft]
pinned: false
published: false
---

Nothing to see.
"#;

/// Builds a post file with the given front matter values and a body of `words` words.
#[cfg(test)]
pub fn post_file(title: &str, date: &str, category: Option<&str>, pinned: bool, published: bool, words: usize) -> String {
    let category = category.map(|c| format!("category: {}\n", c)).unwrap_or_default();
    let body = vec!["lorem"; words].join(" ");
    format!("---\ntitle: {}\ndate: {}\ndescription: About {}\n{}tags: [{}]\npinned: {}\npublished: {}\n---\n{}\n",
            title, date, title, category, title.to_lowercase(), pinned, published, body)
}
