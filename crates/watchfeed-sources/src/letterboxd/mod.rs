pub mod client;
pub mod parser;
pub mod profile;

pub use client::LetterboxdClient;
pub use parser::{parse_feed, FeedParser, ParseContext, DEFAULT_FEED_LIMIT};
pub use profile::parse_profile_stats;
