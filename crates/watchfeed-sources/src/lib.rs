pub mod error;
pub mod letterboxd;
pub mod markup;
pub mod tmdb;
pub mod traits;

pub use error::FetchError;
pub use letterboxd::{LetterboxdClient, ParseContext, DEFAULT_FEED_LIMIT};
pub use tmdb::TmdbClient;
pub use traits::{FeedFetcher, NoPosterLookup, PosterLookup};
