use regex::Regex;
use std::sync::LazyLock;
use watchfeed_models::ProfileStats;

// Profile header markup: <span class="value">1,071</span><span class="definition">Films</span>
static STAT_BLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<span class="value">\s*(\d[\d,]*)\s*</span>\s*<span class="definition[^"]*">\s*films?\s*</span>"#)
        .unwrap()
});
// Plain text fallback: "1,071 films", "12 movies"
static COUNT_TEXT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d[\d,]*)\s+(?:films?|movies?)\b").unwrap());

/// Film count shown on a public profile page; 0 when none is found.
pub fn parse_profile_stats(html: &str) -> ProfileStats {
    let count = [&*STAT_BLOCK_PATTERN, &*COUNT_TEXT_PATTERN]
        .iter()
        .find_map(|pattern| pattern.captures(html))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse::<u64>().ok())
        .unwrap_or(0);

    ProfileStats { movie_count: count }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stat_block() {
        let html = r#"<h4 class="profile-statistic statistic"><a href="/u/films/"><span class="value">1,071</span><span class="definition">Films</span></a></h4>"#;
        assert_eq!(parse_profile_stats(html).movie_count, 1071);
    }

    #[test]
    fn test_parse_text_fallback() {
        assert_eq!(parse_profile_stats("<p>Logged 123 movies so far</p>").movie_count, 123);
        assert_eq!(parse_profile_stats("2,504 films watched").movie_count, 2504);
    }

    #[test]
    fn test_no_count_is_zero() {
        assert_eq!(parse_profile_stats("<html>nothing here</html>").movie_count, 0);
        assert_eq!(parse_profile_stats("").movie_count, 0);
    }
}
