use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::content::Post;
use crate::text_utils::format_display_date;

#[derive(ramhorns::Content)]
struct ViewTag<'a> {
    tag: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    slug: &'a str,
    author: &'a str,
    category: &'a str,
    tags: Vec<ViewTag<'a>>,
    date: String,
    read_time: u32,
    post_title: &'a str,
    description: &'a str,
    post_content: &'a str,
    coming_soon: bool,
}

#[derive(ramhorns::Content)]
struct NotFoundItem<'a> {
    slug: &'a str,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post view template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
        })
    }

    /// `post_content` is already HTML and must be emitted unescaped (`{{{post_content}}}`).
    pub fn render(&self, post: &Post) -> String {
        let metadata = &post.metadata;
        self.template.render(&ViewItem {
            slug: post.slug.as_str(),
            author: metadata.author.as_deref().unwrap_or_default(),
            category: metadata.category.as_deref().unwrap_or_default(),
            tags: metadata.tags.iter().map(|t| ViewTag { tag: t.as_str() }).collect(),
            date: format_display_date(&metadata.date),
            read_time: post.read_time_or_estimate(),
            post_title: metadata.title.as_str(),
            description: metadata.description.as_str(),
            post_content: post.content.as_str(),
            coming_soon: post.content.trim().is_empty(),
        })
    }
}

/// Page for unknown or unpublished slugs.
pub fn render_not_found(tpl_src: Option<&str>, slug: &str) -> String {
    let fallback = || format!("Blog post not found: {}", slug);
    let Some(src) = tpl_src else {
        return fallback();
    };

    match Template::new(src) {
        Ok(template) => template.render(&NotFoundItem { slug }),
        Err(_) => fallback(),
    }
}
