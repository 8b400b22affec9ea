use serde::{Deserialize, Serialize};

/// A catalog row. Rows are created by ingest and enriched in place by the
/// sync jobs; nothing here ever deletes one.
///
/// `tmdb_id` is provider-assigned and not guaranteed unique in the table,
/// so it is never used as a lookup key for merging decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    /// Store-assigned identifier; ordered, so the oldest row has the
    /// smallest id
    pub id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub tmdb_id: Option<i64>,
    pub poster_path: Option<String>,
    pub description: Option<String>,
    pub genres: Option<Vec<String>>,
    pub source: Option<String>,
}

impl Movie {
    /// Whether the row carries any genre labels. NULL and an empty array
    /// both count as absent.
    pub fn has_genres(&self) -> bool {
        self.genres.as_ref().is_some_and(|g| !g.is_empty())
    }
}

/// Insert payload for a catalog row built from provider data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMovie {
    pub title: String,
    pub year: Option<i32>,
    pub tmdb_id: Option<i64>,
    pub poster_path: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub source: Option<String>,
}

/// Field-level update for an existing catalog row. Only fields being set
/// are `Some`; an empty patch means no write is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MoviePatch {
    pub year: Option<i32>,
    pub tmdb_id: Option<i64>,
    pub poster_path: Option<String>,
    pub description: Option<String>,
    pub genres: Option<Vec<String>>,
    pub source: Option<String>,
}

impl MoviePatch {
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.tmdb_id.is_none()
            && self.poster_path.is_none()
            && self.description.is_none()
            && self.genres.is_none()
            && self.source.is_none()
    }
}
