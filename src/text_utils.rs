use std::ops::Index;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use unidecode::unidecode;

pub const WORDS_PER_MINUTE: usize = 200;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Parses `YYYY-MM-DD`, optionally followed by a ` HH:MM[:SS][.fff]` or `THH:MM[:SS]` time.
/// Anything after the time (zone offsets, `Z`) is ignored.
pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    lazy_static! {
        static ref DATE_REGEX: Regex = Regex::new(
            r"^\s*(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{1,2})(?::(\d{1,2}))?(?:\.\d+)?)?"
        ).unwrap();
    }

    let Some(caps) = DATE_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);
    let opt_u32 = |idx: usize| caps.get(idx).map_or(Ok(0), |m| to_u32(m.as_str()));

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = opt_u32(4)?;
    let mn: u32 = opt_u32(5)?;
    let s: u32 = opt_u32(6)?;

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid calendar date {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time of day {}", buf))?;

    Ok(NaiveDateTime::new(date, time))
}

/// Date as shown on pages, e.g. "January 01, 2025". Unparsable dates are shown verbatim.
pub fn format_display_date(raw: &str) -> String {
    match parse_date_time(raw) {
        Ok(date_time) => date_time.format("%B %d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes needed to read `words` words, rounded up.
pub fn minutes_for_words(words: usize) -> u32 {
    words.div_ceil(WORDS_PER_MINUTE) as u32
}

/// Reading time of raw text. Library API; parsed posts keep a word count and use `minutes_for_words`.
pub fn estimate_reading_time(text: &str) -> u32 {
    minutes_for_words(count_words(text))
}

/// URL-friendly name: ASCII-folded, lowercase, non alphanumeric runs become a single `-`.
pub fn slugify(title: &str) -> String {
    let ascii = unidecode(title).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_time() {
        let fmt = |buf: &str| parse_date_time(buf).unwrap().format("%Y-%m-%d %H:%M:%S").to_string();
        assert_eq!(fmt("2017-09-10 10:42:32.123"), "2017-09-10 10:42:32");
        assert_eq!(fmt("2017-09-10T10:42:32Z"), "2017-09-10 10:42:32");
        assert_eq!(fmt("2017-9-1 7:05"), "2017-09-01 07:05:00");
        assert_eq!(fmt("2025-01-01"), "2025-01-01 00:00:00");
    }

    #[test]
    fn test_parse_invalid_date() {
        assert!(parse_date_time("yesterday").is_err());
        assert!(parse_date_time("2024-02-30").is_err());
        assert!(parse_date_time("").is_err());
    }

    #[test]
    fn test_format_display_date() {
        assert_eq!(format_display_date("2025-01-01"), "January 01, 2025");
        assert_eq!(format_display_date("someday"), "someday");
    }

    #[test]
    fn test_reading_time() {
        let words = vec!["word"; 400].join(" ");
        assert_eq!(estimate_reading_time(&words), 2);
        assert_eq!(estimate_reading_time("one"), 1);
        assert_eq!(estimate_reading_time("   \n "), 0);
        assert_eq!(minutes_for_words(201), 2);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started with RAG Systems"), "getting-started-with-rag-systems");
        assert_eq!(slugify("  Café & Crème -- brûlée! "), "cafe-creme-brulee");
        assert_eq!(slugify("C++ in 2024"), "c-in-2024");
        assert_eq!(slugify("!!!"), "");
    }
}
