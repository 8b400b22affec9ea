use serde::Deserialize;

/// A movie as returned by TMDB list and search endpoints
///
/// Immutable snapshot fetched per call; never persisted directly. Fields the
/// provider sometimes omits are defaulted rather than failing the whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

impl TmdbMovie {
    /// Release year, taken as the 4-digit prefix of `release_date`
    pub fn year(&self) -> Option<i32> {
        parse_year(self.release_date.as_deref())
    }
}

/// Full detail payload from GET /movie/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// Paged envelope returned by TMDB list and search endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbListResponse {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

fn parse_year(release_date: Option<&str>) -> Option<i32> {
    let date = release_date?;
    date.get(..4)?.parse().ok()
}
