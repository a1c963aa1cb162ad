use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use unidecode::unidecode;

use crate::content::PostCard;
use crate::query::{is_all_categories, pinned_first};
use crate::text_utils::parse_date_time;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "date-desc" => Ok(SortKey::DateDesc),
            "date-asc" => Ok(SortKey::DateAsc),
            "title-asc" => Ok(SortKey::TitleAsc),
            "title-desc" => Ok(SortKey::TitleDesc),
            other => Err(format!("Unknown sort key {}", other)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::DateDesc => "date-desc",
            SortKey::DateAsc => "date-asc",
            SortKey::TitleAsc => "title-asc",
            SortKey::TitleDesc => "title-desc",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: String,
    pub category: Option<String>,
    pub sort: SortKey,
}

impl SearchQuery {
    /// Case-insensitive substring match on title, description or any tag.
    /// A blank query matches everything.
    pub fn matches_text(&self, card: &PostCard) -> bool {
        let needle = self.text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        card.title.to_lowercase().contains(&needle)
            || card.description.to_lowercase().contains(&needle)
            || card.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
    }

    pub fn matches_category(&self, card: &PostCard) -> bool {
        let category = self.category.as_deref();
        is_all_categories(category) || card.category.as_deref() == category
    }

    pub fn matches(&self, card: &PostCard) -> bool {
        self.matches_text(card) && self.matches_category(card)
    }
}

/// Keeps the matching cards, sorts them by `query.sort`, then moves pinned cards to the front.
pub fn search(cards: &[PostCard], query: &SearchQuery) -> Vec<PostCard> {
    let mut found: Vec<PostCard> = cards.iter().filter(|card| query.matches(card)).cloned().collect();
    sort_cards(&mut found, query.sort);
    pinned_first(found, |card| card.pinned)
}

pub fn sort_cards(cards: &mut [PostCard], key: SortKey) {
    match key {
        SortKey::DateDesc => cards.sort_by(|a, b| compare_dates(&b.date, &a.date)),
        SortKey::DateAsc => cards.sort_by(|a, b| compare_dates(&a.date, &b.date)),
        SortKey::TitleAsc => cards.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortKey::TitleDesc => cards.sort_by(|a, b| compare_titles(&b.title, &a.title)),
    }
}

/// Unparsable dates are older than any valid one.
fn compare_dates(a: &str, b: &str) -> Ordering {
    parse_date_time(a).ok().cmp(&parse_date_time(b).ok())
}

/// Accents and case only break ties, so "émile" sorts next to "Emile" rather than after "z".
fn compare_titles(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| unidecode(s).to_lowercase();
    folded(a)
        .cmp(&folded(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}
