//! Letterboxd RSS parsing.
//!
//! The feed is semi-structured: one `<item>` per logged activity, with the film
//! year and star rating folded into the title text (`"Barbie, 2023 - ★★★½"`).
//! Activity kinds (diary entries, lists, ...) share a single stream and carry
//! no type field, so the permalink shape is the only discriminator.

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use watchfeed_models::{MediaType, Platform, StarRating, WatchRecord};
use crate::markup::{strip_tags, unwrap_cdata};

/// Most recent film entries kept from one feed
pub const DEFAULT_FEED_LIMIT: usize = 12;

const FULL_STAR: char = '★';
const HALF_STAR: char = '½';

static ITEM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<item>(.*?)</item>").unwrap());
static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title>(.*?)</title>").unwrap());
static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<link>(.*?)</link>").unwrap());
static PUB_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<pubDate>(.*?)</pubDate>").unwrap());
static DESCRIPTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<description>(.*?)</description>").unwrap());

// "Title, 2023 - ★★★½" or "Title, 2023"
static YEAR_SUFFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*(\d{4})(?:\s+-\s+[★☆½]+)?$").unwrap());
// "Title - ★★★½", with or without a year before it
static STAR_SUFFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+-\s+([★☆½]+)$").unwrap());
static LINK_YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/film/[^/]*?(\d{4})/").unwrap());
static FILM_PATH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/film/[^/]+/").unwrap());

/// Inputs a parse run needs from outside the document.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext {
    /// Captured once per run; supplies the fallback year and fallback date
    pub now: DateTime<Utc>,
    /// Cap on emitted records, applied after filtering. `None` keeps everything.
    pub limit: Option<usize>,
}

impl ParseContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            limit: Some(DEFAULT_FEED_LIMIT),
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

/// Fields pulled out of one `<item>` fragment, entity-decoded and trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub pub_date: Option<String>,
    pub description: Option<String>,
}

/// Title text split into its parts
#[derive(Debug, Clone, PartialEq)]
pub struct TitleParts {
    pub title: String,
    /// `None` when neither the title nor the permalink carries a year
    pub year: Option<i32>,
    pub rating: Option<StarRating>,
}

/// A parsed view over one feed document.
///
/// Parsing is lazy and pure: each call to [`FeedParser::records`] walks the
/// document again from the start.
pub struct FeedParser<'a> {
    xml: &'a str,
    context: ParseContext,
}

impl<'a> FeedParser<'a> {
    pub fn new(xml: &'a str, context: ParseContext) -> Self {
        Self { xml, context }
    }

    /// Film watch records in document order, capped at the context limit.
    pub fn records(&self) -> impl Iterator<Item = WatchRecord> + 'a {
        let context = self.context;
        fragments(self.xml)
            .filter_map(parse_fragment)
            .filter(|entry| {
                let keep = is_film_entry(&entry.link);
                if !keep {
                    debug!(link = %entry.link, "Skipping non-film feed entry");
                }
                keep
            })
            .map(move |entry| build_record(entry, &context))
            .take(context.limit.unwrap_or(usize::MAX))
    }
}

/// Parses a whole document into records
pub fn parse_feed(xml: &str, context: ParseContext) -> Vec<WatchRecord> {
    let records: Vec<WatchRecord> = FeedParser::new(xml, context).records().collect();
    debug!(count = records.len(), "Parsed Letterboxd feed");
    records
}

/// Raw contents of each `<item>` element
pub fn fragments(xml: &str) -> impl Iterator<Item = &str> {
    ITEM_PATTERN
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Extracts the interesting fields of one fragment. Fragments without a
/// title are malformed and yield `None`.
pub fn parse_fragment(fragment: &str) -> Option<FeedEntry> {
    let title = match element_text(&TITLE_PATTERN, fragment) {
        Some(title) if !title.is_empty() => title,
        _ => {
            debug!("Skipping feed item without a title");
            return None;
        }
    };

    Some(FeedEntry {
        title,
        link: element_text(&LINK_PATTERN, fragment).unwrap_or_default(),
        pub_date: element_text(&PUB_DATE_PATTERN, fragment),
        description: DESCRIPTION_PATTERN
            .captures(fragment)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
    })
}

fn element_text(pattern: &Regex, fragment: &str) -> Option<String> {
    let raw = pattern.captures(fragment)?.get(1)?.as_str();
    Some(html_escape::decode_html_entities(unwrap_cdata(raw)).trim().to_string())
}

/// Whether a permalink points at a film detail page.
///
/// This is the only type signal the feed offers: film diary entries link to
/// `/<user>/film/<slug>/`, list activity links to `/<user>/list/<slug>/`.
pub fn is_film_entry(link: &str) -> bool {
    FILM_PATH_PATTERN.is_match(link) && !link.contains("/list/")
}

/// Splits a raw feed title into clean title, year and rating.
///
/// The year comes from a trailing `", <year>"` marker first, then from the
/// permalink slug. A trailing star suffix is always removed.
pub fn decompose_title(raw_title: &str, link: &str) -> TitleParts {
    let trimmed = raw_title.trim();
    let rating = decode_rating(trimmed);

    let (mut title, year) = match YEAR_SUFFIX_PATTERN.captures(trimmed) {
        Some(caps) => {
            let year = caps.get(1).and_then(|m| m.as_str().parse::<i32>().ok());
            let start = caps.get(0).map(|m| m.start()).unwrap_or(trimmed.len());
            (trimmed[..start].to_string(), year)
        }
        None => (trimmed.to_string(), year_from_link(link)),
    };

    if let Some(m) = STAR_SUFFIX_PATTERN.find(&title) {
        title.truncate(m.start());
    }

    TitleParts {
        title: title.trim().to_string(),
        year,
        rating,
    }
}

fn year_from_link(link: &str) -> Option<i32> {
    LINK_YEAR_PATTERN
        .captures(link)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// Rating encoded in the title's trailing star suffix, if any
pub fn decode_rating(raw_title: &str) -> Option<StarRating> {
    STAR_SUFFIX_PATTERN
        .captures(raw_title.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| decode_star_glyphs(m.as_str()))
}

/// One full star per `★`, plus a half star if `½` is present.
/// Empty stars count for nothing; a zero result means "not rated".
pub fn decode_star_glyphs(glyphs: &str) -> Option<StarRating> {
    let full = glyphs.chars().filter(|c| *c == FULL_STAR).count();
    let half = glyphs.contains(HALF_STAR);
    StarRating::from_stars(u8::try_from(full).ok()?, half)
}

/// Review body from an item description. The automatic "Watched on ..." line
/// that plain diary entries carry is not a review.
pub fn review_text(description: &str) -> Option<String> {
    let html = html_escape::decode_html_entities(unwrap_cdata(description));
    let text = strip_tags(&html);
    if text.is_empty() || text.starts_with("Watched on ") {
        None
    } else {
        Some(text)
    }
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| debug!(pub_date = %raw, error = %e, "Unparseable pubDate"))
        .ok()
}

fn build_record(entry: FeedEntry, context: &ParseContext) -> WatchRecord {
    let parts = decompose_title(&entry.title, &entry.link);
    let watched_date = entry
        .pub_date
        .as_deref()
        .and_then(parse_pub_date)
        .unwrap_or(context.now);

    WatchRecord {
        id: format!("letterboxd-{}", uuid::Uuid::new_v4()),
        title: parts.title,
        year: parts.year.unwrap_or_else(|| context.now.year()),
        media_type: MediaType::Film,
        platform: Platform::Letterboxd,
        rating: parts.rating,
        watched_date,
        permalink: entry.link,
        poster_url: None,
        review_text: entry.description.as_deref().and_then(review_text),
    }
}
