pub mod postgres;

pub use postgres::{create_pool, PgCatalogStore};

use crate::error::AppResult;
use crate::models::{Movie, MoviePatch, NewMovie};

/// Catalog persistence abstraction
///
/// The sync drivers only talk to the catalog through this trait, so the
/// matching and merge logic can be exercised against test doubles. All
/// lookups are bounded; none of them guarantees the true match is in the
/// returned set.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Total number of catalog rows
    async fn count_all(&self) -> AppResult<i64>;

    /// Number of rows with no poster
    async fn count_missing_posters(&self) -> AppResult<i64>;

    /// Page of rows with no poster, ordered by id
    async fn list_missing_posters(&self, offset: i64, limit: i64) -> AppResult<Vec<Movie>>;

    /// Rows whose title contains `title` (case-insensitive), optionally
    /// restricted to an exact year. Returns at most `limit` rows; may
    /// contain duplicates-by-title.
    async fn find_by_title_and_year(
        &self,
        title: &str,
        year: Option<i32>,
        limit: i64,
    ) -> AppResult<Vec<Movie>>;

    /// Rows carrying the given provider id. Not guaranteed unique.
    async fn find_by_tmdb_id(&self, tmdb_id: i64) -> AppResult<Vec<Movie>>;

    /// Apply a field-level patch to one row
    async fn update_movie(&self, id: i64, patch: &MoviePatch) -> AppResult<()>;

    /// Insert a new row
    async fn insert_movie(&self, movie: &NewMovie) -> AppResult<()>;
}
