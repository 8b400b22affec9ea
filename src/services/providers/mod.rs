/// Metadata provider abstraction
///
/// The sync drivers consume provider data through this trait so the matching
/// and merge logic can run against test doubles. The concrete TMDB client
/// lives in `tmdb`.
use crate::{
    error::AppResult,
    models::{TmdbMovie, TmdbMovieDetails},
};

pub mod tmdb;

/// Trait for external movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch the full record for a known provider id
    ///
    /// `Ok(None)` is the provider's "not found" answer for an id we trusted;
    /// callers treat it as a benign skip. Transport and server failures
    /// surface as errors and abort the batch.
    async fn movie_details(&self, tmdb_id: i64) -> AppResult<Option<TmdbMovieDetails>>;

    /// Search for movies by title, optionally restricted to a release year
    ///
    /// Results come back in the provider's ranking order, best first.
    async fn search_movies(&self, title: &str, year: Option<i32>) -> AppResult<Vec<TmdbMovie>>;

    /// One page of a provider list endpoint (e.g. `now_playing`)
    async fn list_endpoint(&self, endpoint: &str, page: u32) -> AppResult<Vec<TmdbMovie>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
