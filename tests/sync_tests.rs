//! End-to-end runs of both sync jobs against in-memory collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use marquee_sync::config::Config;
use marquee_sync::db::CatalogStore;
use marquee_sync::error::AppResult;
use marquee_sync::models::{Movie, MoviePatch, NewMovie, TmdbMovie, TmdbMovieDetails};
use marquee_sync::services::backfill::PosterBackfill;
use marquee_sync::services::ingest::RecentIngest;
use marquee_sync::services::providers::MetadataProvider;

/// Catalog store backed by a Vec, mimicking the Postgres implementation's
/// query semantics (case-insensitive substring title filter, id ordering).
#[derive(Default)]
struct InMemoryStore {
    movies: Mutex<Vec<Movie>>,
}

impl InMemoryStore {
    fn with_movies(movies: Vec<Movie>) -> Self {
        Self {
            movies: Mutex::new(movies),
        }
    }

    fn snapshot(&self) -> Vec<Movie> {
        self.movies.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryStore {
    async fn count_all(&self) -> AppResult<i64> {
        Ok(self.movies.lock().unwrap().len() as i64)
    }

    async fn count_missing_posters(&self) -> AppResult<i64> {
        let movies = self.movies.lock().unwrap();
        Ok(movies.iter().filter(|m| m.poster_path.is_none()).count() as i64)
    }

    async fn list_missing_posters(&self, offset: i64, limit: i64) -> AppResult<Vec<Movie>> {
        let mut missing: Vec<Movie> = self
            .movies
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.poster_path.is_none())
            .cloned()
            .collect();
        missing.sort_by_key(|m| m.id);

        Ok(missing
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_by_title_and_year(
        &self,
        title: &str,
        year: Option<i32>,
        limit: i64,
    ) -> AppResult<Vec<Movie>> {
        let needle = title.to_lowercase();
        let mut found: Vec<Movie> = self
            .movies
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .filter(|m| year.is_none() || m.year == year)
            .cloned()
            .collect();
        found.sort_by_key(|m| m.id);
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn find_by_tmdb_id(&self, tmdb_id: i64) -> AppResult<Vec<Movie>> {
        let mut found: Vec<Movie> = self
            .movies
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.tmdb_id == Some(tmdb_id))
            .cloned()
            .collect();
        found.sort_by_key(|m| m.id);
        Ok(found)
    }

    async fn update_movie(&self, id: i64, patch: &MoviePatch) -> AppResult<()> {
        let mut movies = self.movies.lock().unwrap();
        let movie = movies.iter_mut().find(|m| m.id == id).expect("row exists");

        if let Some(year) = patch.year {
            movie.year = Some(year);
        }
        if let Some(tmdb_id) = patch.tmdb_id {
            movie.tmdb_id = Some(tmdb_id);
        }
        if let Some(poster_path) = &patch.poster_path {
            movie.poster_path = Some(poster_path.clone());
        }
        if let Some(description) = &patch.description {
            movie.description = Some(description.clone());
        }
        if let Some(genres) = &patch.genres {
            movie.genres = Some(genres.clone());
        }
        if let Some(source) = &patch.source {
            movie.source = Some(source.clone());
        }

        Ok(())
    }

    async fn insert_movie(&self, new: &NewMovie) -> AppResult<()> {
        let mut movies = self.movies.lock().unwrap();
        let id = movies.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        movies.push(Movie {
            id,
            title: new.title.clone(),
            year: new.year,
            tmdb_id: new.tmdb_id,
            poster_path: new.poster_path.clone(),
            description: new.description.clone(),
            genres: Some(new.genres.clone()),
            source: new.source.clone(),
        });
        Ok(())
    }
}

/// Canned provider responses
#[derive(Default)]
struct FakeProvider {
    details: HashMap<i64, TmdbMovieDetails>,
    search_results: HashMap<String, Vec<TmdbMovie>>,
    pages: HashMap<(String, u32), Vec<TmdbMovie>>,
}

#[async_trait::async_trait]
impl MetadataProvider for FakeProvider {
    async fn movie_details(&self, tmdb_id: i64) -> AppResult<Option<TmdbMovieDetails>> {
        Ok(self.details.get(&tmdb_id).cloned())
    }

    async fn search_movies(&self, title: &str, _year: Option<i32>) -> AppResult<Vec<TmdbMovie>> {
        Ok(self.search_results.get(title).cloned().unwrap_or_default())
    }

    async fn list_endpoint(&self, endpoint: &str, page: u32) -> AppResult<Vec<TmdbMovie>> {
        Ok(self
            .pages
            .get(&(endpoint.to_string(), page))
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

fn test_config() -> Config {
    Config {
        database_url: String::new(),
        tmdb_api_key: "test_key".to_string(),
        tmdb_api_url: "http://test.local".to_string(),
        batch_size: 200,
        sleep_ms: 0,
        tmdb_pages: 1,
        tmdb_endpoints: "now_playing,upcoming".to_string(),
        http_timeout_secs: 60,
        dry_run: false,
    }
}

fn catalog_row(id: i64, title: &str, year: Option<i32>, tmdb_id: Option<i64>) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        year,
        tmdb_id,
        poster_path: None,
        description: None,
        genres: None,
        source: None,
    }
}

fn remote_movie(id: i64, title: &str, release_date: &str, poster: &str) -> TmdbMovie {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": title,
        "release_date": release_date,
        "poster_path": poster,
        "overview": "An overview.",
        "genre_ids": [28, 12],
    }))
    .unwrap()
}

#[tokio::test]
async fn test_backfill_end_to_end() {
    // Row 1 resolves via its stored provider id, row 2 via an exact
    // title/year search match, row 3 has neither.
    let store = Arc::new(InMemoryStore::with_movies(vec![
        catalog_row(1, "The Matrix", Some(1999), Some(603)),
        catalog_row(2, "Heat", Some(1995), None),
        catalog_row(3, "Mystery Reel", None, None),
    ]));

    let mut provider = FakeProvider::default();
    provider.details.insert(
        603,
        TmdbMovieDetails {
            id: 603,
            title: "The Matrix".to_string(),
            release_date: Some("1999-03-31".to_string()),
            poster_path: Some("/matrix.jpg".to_string()),
            overview: None,
        },
    );
    provider.search_results.insert(
        "Heat".to_string(),
        vec![remote_movie(949, "Heat", "1995-12-15", "/heat.jpg")],
    );

    let backfill = PosterBackfill::new(store.clone(), Arc::new(provider), &test_config());
    let summary = backfill.run().await.unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.updated, 2);

    let rows = store.snapshot();
    assert_eq!(rows[0].poster_path.as_deref(), Some("/matrix.jpg"));
    assert_eq!(rows[1].poster_path.as_deref(), Some("/heat.jpg"));
    // The search path learned the provider id for row 2.
    assert_eq!(rows[1].tmdb_id, Some(949));
    // Row 3 was untouched.
    assert_eq!(rows[2].poster_path, None);
    assert_eq!(rows[2].tmdb_id, None);
}

#[tokio::test]
async fn test_backfill_is_idempotent() {
    let store = Arc::new(InMemoryStore::with_movies(vec![catalog_row(
        1,
        "The Matrix",
        Some(1999),
        Some(603),
    )]));

    let mut provider = FakeProvider::default();
    provider.details.insert(
        603,
        TmdbMovieDetails {
            id: 603,
            title: "The Matrix".to_string(),
            release_date: None,
            poster_path: Some("/matrix.jpg".to_string()),
            overview: None,
        },
    );
    let provider = Arc::new(provider);

    let config = test_config();
    let first = PosterBackfill::new(store.clone(), provider.clone(), &config)
        .run()
        .await
        .unwrap();
    assert_eq!(first.updated, 1);

    // Second run finds nothing left to backfill.
    let second = PosterBackfill::new(store.clone(), provider, &config)
        .run()
        .await
        .unwrap();
    assert_eq!(second.processed, 0);
    assert_eq!(second.updated, 0);
}

#[tokio::test]
async fn test_ingest_end_to_end() {
    // Catalog knows "Known Film" (sparse row) and has a curated row whose
    // fields must survive the run untouched.
    let curated = Movie {
        id: 2,
        title: "Curated Film".to_string(),
        year: Some(2024),
        tmdb_id: Some(500),
        poster_path: Some("/curated.jpg".to_string()),
        description: Some("Hand-written synopsis.".to_string()),
        genres: Some(vec!["Documentary".to_string()]),
        source: Some("manual".to_string()),
    };
    let store = Arc::new(InMemoryStore::with_movies(vec![
        catalog_row(1, "Known Film", Some(2026), None),
        curated.clone(),
    ]));

    let mut provider = FakeProvider::default();
    provider.pages.insert(
        ("now_playing".to_string(), 1),
        vec![
            remote_movie(42, "Known Film", "2026-07-01", "/known.jpg"),
            remote_movie(43, "Brand New Film", "2026-07-15", "/new.jpg"),
        ],
    );
    provider.pages.insert(
        ("upcoming".to_string(), 1),
        vec![
            // Duplicate of id 42 across endpoints: discarded before writes.
            remote_movie(42, "Known Film", "2026-07-01", "/known.jpg"),
            remote_movie(500, "Curated Film", "2024-05-05", "/provider.jpg"),
        ],
    );

    let ingest = RecentIngest::new(store.clone(), Arc::new(provider), &test_config());
    let summary = ingest.run().await.unwrap();

    assert_eq!(summary.loaded, 3);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.updated, 1);
    // The curated row matched but had nothing to enrich.
    assert_eq!(summary.skipped, 1);

    let rows = store.snapshot();

    // Sparse row was enriched, not replaced.
    let known = rows.iter().find(|m| m.id == 1).unwrap();
    assert_eq!(known.poster_path.as_deref(), Some("/known.jpg"));
    assert_eq!(known.tmdb_id, Some(42));
    assert_eq!(
        known.genres,
        Some(vec!["Action".to_string(), "Adventure".to_string()])
    );
    assert_eq!(known.source.as_deref(), Some("tmdb"));
    assert_eq!(known.year, Some(2026));

    // Curated row is byte-for-byte what it was.
    assert_eq!(rows.iter().find(|m| m.id == 2).unwrap(), &curated);

    // The unknown record became a new row, addressable by provider id.
    let inserted = store.find_by_tmdb_id(43).await.unwrap();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].title, "Brand New Film");
    assert_eq!(inserted[0].year, Some(2026));
    assert_eq!(inserted[0].source.as_deref(), Some("tmdb"));
}

#[tokio::test]
async fn test_ingest_dry_run_leaves_catalog_untouched() {
    let store = Arc::new(InMemoryStore::with_movies(vec![catalog_row(
        1,
        "Known Film",
        Some(2026),
        None,
    )]));
    let before = store.snapshot();

    let mut provider = FakeProvider::default();
    provider.pages.insert(
        ("now_playing".to_string(), 1),
        vec![
            remote_movie(42, "Known Film", "2026-07-01", "/known.jpg"),
            remote_movie(43, "Brand New Film", "2026-07-15", "/new.jpg"),
        ],
    );

    let mut config = test_config();
    config.tmdb_endpoints = "now_playing".to_string();
    config.dry_run = true;

    let summary = RecentIngest::new(store.clone(), Arc::new(provider), &config)
        .run()
        .await
        .unwrap();

    // Same decisions and counters as a live run, no writes.
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.inserted, 1);
    assert_eq!(store.snapshot(), before);
}
