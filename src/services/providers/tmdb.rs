/// TMDB API provider
///
/// Thin JSON client over the TMDB v3 endpoints the sync jobs need: detail
/// lookup by id, title search, and the curated list endpoints
/// (now_playing, upcoming, popular). Retry/backoff is not handled here;
/// any non-404 failure is surfaced to the caller.
use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{TmdbListResponse, TmdbMovie, TmdbMovieDetails},
    services::providers::MetadataProvider,
};

const LANGUAGE: &str = "en-US";
const REGION: &str = "US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            api_key: config.tmdb_api_key.clone(),
            api_url: config.tmdb_api_url.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn movie_details(&self, tmdb_id: i64) -> AppResult<Option<TmdbMovieDetails>> {
        let url = format!("{}/movie/{}", self.api_url, tmdb_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        // A stored id the provider no longer knows is a per-row skip, not
        // a batch failure.
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(tmdb_id, "TMDB has no record for stored id");
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let details: TmdbMovieDetails = response.json().await?;
        Ok(Some(details))
    }

    async fn search_movies(&self, title: &str, year: Option<i32>) -> AppResult<Vec<TmdbMovie>> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/search/movie", self.api_url);
        let mut query = vec![("query", title.to_string())];
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }

        let page: TmdbListResponse = self.get_json(&url, &query).await?;

        tracing::debug!(
            query = %title,
            results = page.results.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(page.results)
    }

    async fn list_endpoint(&self, endpoint: &str, page: u32) -> AppResult<Vec<TmdbMovie>> {
        let url = format!("{}/movie/{}", self.api_url, endpoint);
        let query = vec![
            ("language", LANGUAGE.to_string()),
            ("page", page.to_string()),
            ("include_adult", "false".to_string()),
            ("region", REGION.to_string()),
        ];

        let response: TmdbListResponse = self.get_json(&url, &query).await?;

        tracing::debug!(
            endpoint = %endpoint,
            page,
            results = response.results.len(),
            provider = "tmdb",
            "List page fetched"
        );

        Ok(response.results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
