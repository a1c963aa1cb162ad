use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::content::{PostCard, ALL_CATEGORIES};
use crate::text_utils::format_display_date;

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    post_list: Vec<PostItem<'a>>,
    categories: Vec<ViewCategory<'a>>,
    page_list: Vec<ViewPagination>,
    show_pagination: bool,
    is_empty: bool,
}

#[derive(ramhorns::Content)]
struct PostItem<'a> {
    date: String,
    link: String,
    title: &'a str,
    description: &'a str,
    category: &'a str,
    tags: Vec<ViewTag<'a>>,
    read_time: u32,
    pinned: bool,
}

#[derive(ramhorns::Content)]
struct ViewTag<'a> {
    tag: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewCategory<'a> {
    name: &'a str,
    link: String,
    selected: bool,
}

#[derive(ramhorns::Content)]
struct ViewPagination {
    current: bool,
    number: u32,
    link: String,
}

/// Renders one page of post cards with the `postlist.tpl` template.
pub struct ListRenderer<'a> {
    pub template: Template<'a>,
    pub page_count: u32,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str, page_count: u32) -> io::Result<ListRenderer> {
        let template = match Template::new(list_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing list template: {}", e)));
            }
        };

        Ok(ListRenderer {
            template,
            page_count,
        })
    }

    pub fn render(&self, cards: &[PostCard], cur_page: u32, categories: &[String], selected: Option<&str>) -> String {
        let selected = selected.unwrap_or(ALL_CATEGORIES);

        let post_list = cards
            .iter()
            .map(|card| PostItem {
                date: format_display_date(&card.date),
                link: format!("/blog/{}", card.slug),
                title: card.title.as_str(),
                description: card.description.as_str(),
                category: card.category.as_deref().unwrap_or_default(),
                tags: card.tags.iter().map(|t| ViewTag { tag: t.as_str() }).collect(),
                read_time: card.read_time.unwrap_or_default(),
                pinned: card.pinned,
            })
            .collect();

        let categories = categories
            .iter()
            .map(|name| ViewCategory {
                name: name.as_str(),
                link: category_link(name),
                selected: name == selected,
            })
            .collect();

        let page_list = (1..=self.page_count)
            .map(|number| ViewPagination {
                current: number == cur_page,
                number,
                link: page_link(number, selected),
            })
            .collect();

        self.template.render(&ListPage {
            post_list,
            categories,
            page_list,
            show_pagination: self.page_count > 1,
            is_empty: cards.is_empty(),
        })
    }
}

fn category_link(name: &str) -> String {
    if name == ALL_CATEGORIES {
        return "/blog".to_string();
    }
    let query = serde_urlencoded::to_string([("category", name)]).unwrap_or_default();
    format!("/blog?{}", query)
}

/// Page links keep the selected category, url encoded.
fn page_link(number: u32, category: &str) -> String {
    let page = number.to_string();
    let mut params = vec![("page", page.as_str())];
    if category != ALL_CATEGORIES {
        params.push(("category", category));
    }
    let query = serde_urlencoded::to_string(params).unwrap_or_default();
    format!("/blog?{}", query)
}
