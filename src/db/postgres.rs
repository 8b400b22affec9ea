use sqlx::{postgres::PgPoolOptions, PgPool, QueryBuilder};

use crate::db::CatalogStore;
use crate::error::AppResult;
use crate::models::{Movie, MoviePatch, NewMovie};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

const MOVIE_COLUMNS: &str = "id, title, year, tmdb_id, poster_path, description, genres, source";

/// Postgres-backed catalog store
///
/// Expects a `movies` table with the columns selected below; `id` is
/// store-assigned (`bigserial`), `genres` is `text[]`.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn count_all(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_missing_posters(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM movies WHERE poster_path IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_missing_posters(&self, offset: i64, limit: i64) -> AppResult<Vec<Movie>> {
        let query = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies \
             WHERE poster_path IS NULL ORDER BY id ASC LIMIT $1 OFFSET $2"
        );
        let movies = sqlx::query_as::<_, Movie>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(movies)
    }

    async fn find_by_title_and_year(
        &self,
        title: &str,
        year: Option<i32>,
        limit: i64,
    ) -> AppResult<Vec<Movie>> {
        let pattern = format!("%{}%", escape_like(title));

        let movies = match year {
            Some(year) => {
                let query = format!(
                    "SELECT {MOVIE_COLUMNS} FROM movies \
                     WHERE title ILIKE $1 AND year = $2 ORDER BY id ASC LIMIT $3"
                );
                sqlx::query_as::<_, Movie>(&query)
                    .bind(&pattern)
                    .bind(year)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!(
                    "SELECT {MOVIE_COLUMNS} FROM movies \
                     WHERE title ILIKE $1 ORDER BY id ASC LIMIT $2"
                );
                sqlx::query_as::<_, Movie>(&query)
                    .bind(&pattern)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(movies)
    }

    async fn find_by_tmdb_id(&self, tmdb_id: i64) -> AppResult<Vec<Movie>> {
        let query = format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE tmdb_id = $1 ORDER BY id ASC"
        );
        let movies = sqlx::query_as::<_, Movie>(&query)
            .bind(tmdb_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(movies)
    }

    async fn update_movie(&self, id: i64, patch: &MoviePatch) -> AppResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new("UPDATE movies SET ");
        let mut fields = builder.separated(", ");

        if let Some(year) = patch.year {
            fields.push("year = ").push_bind_unseparated(year);
        }
        if let Some(tmdb_id) = patch.tmdb_id {
            fields.push("tmdb_id = ").push_bind_unseparated(tmdb_id);
        }
        if let Some(poster_path) = &patch.poster_path {
            fields.push("poster_path = ").push_bind_unseparated(poster_path);
        }
        if let Some(description) = &patch.description {
            fields.push("description = ").push_bind_unseparated(description);
        }
        if let Some(genres) = &patch.genres {
            fields.push("genres = ").push_bind_unseparated(genres);
        }
        if let Some(source) = &patch.source {
            fields.push("source = ").push_bind_unseparated(source);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.build().execute(&self.pool).await?;

        Ok(())
    }

    async fn insert_movie(&self, movie: &NewMovie) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO movies (title, year, tmdb_id, poster_path, description, genres, source) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&movie.title)
        .bind(movie.year)
        .bind(movie.tmdb_id)
        .bind(&movie.poster_path)
        .bind(&movie.description)
        .bind(&movie.genres)
        .bind(&movie.source)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Escape LIKE/ILIKE metacharacters so a title containing `%`, `_`, or `\`
/// only matches itself inside the substring pattern.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
