/// Recent-releases ingest job
///
/// Loads pages from the configured TMDB list endpoints, deduplicates them by
/// provider id, then walks the finalized list: records matching an existing
/// catalog row are merged enrichment-only, everything else is inserted.
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::{
    config::Config,
    db::CatalogStore,
    error::AppResult,
    models::{Movie, TmdbMovie},
    services::{matching, merge, providers::MetadataProvider},
};

const PROGRESS_INTERVAL: usize = 25;

/// Upper bound on catalog candidates fetched per incoming record
const CANDIDATE_LIMIT: i64 = 20;

pub struct RecentIngest {
    store: Arc<dyn CatalogStore>,
    provider: Arc<dyn MetadataProvider>,
    endpoints: Vec<String>,
    pages: u32,
    sleep: Duration,
    dry_run: bool,
}

/// Counters reported after an ingest run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    /// Distinct provider records loaded across all endpoints and pages
    pub loaded: usize,
    /// New catalog rows created
    pub inserted: u64,
    /// Existing rows enriched
    pub updated: u64,
    /// Records skipped: no usable title, or matched with nothing to enrich
    pub skipped: u64,
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} | Inserted {} | Updated {} | Skipped {}",
            self.loaded, self.inserted, self.updated, self.skipped
        )
    }
}

impl RecentIngest {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        provider: Arc<dyn MetadataProvider>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            provider,
            endpoints: config.endpoints(),
            pages: config.tmdb_pages,
            sleep: Duration::from_millis(config.sleep_ms),
            dry_run: config.dry_run,
        }
    }

    pub async fn run(&self) -> AppResult<IngestSummary> {
        let started = Utc::now();
        let movies = self.load_recent().await?;

        let mut summary = IngestSummary {
            loaded: movies.len(),
            ..Default::default()
        };

        tracing::info!(
            loaded = movies.len(),
            endpoints = %self.endpoints.join(","),
            dry_run = self.dry_run,
            "Loaded recent TMDB movies"
        );

        for (index, incoming) in movies.iter().enumerate() {
            let title = incoming.title.trim();
            if title.is_empty() {
                tracing::debug!(tmdb_id = incoming.id, "Record has no usable title, skipping");
                summary.skipped += 1;
                continue;
            }

            let payload = merge::build_insert(incoming);

            match self.resolve_existing(title, incoming.year()).await? {
                Some(existing) => {
                    let patch = merge::plan_update(&existing, &payload);
                    if patch.is_empty() {
                        summary.skipped += 1;
                    } else {
                        if !self.dry_run {
                            self.store.update_movie(existing.id, &patch).await?;
                        }
                        summary.updated += 1;
                    }
                }
                None => {
                    if !self.dry_run {
                        self.store.insert_movie(&payload).await?;
                    }
                    summary.inserted += 1;
                }
            }

            if (index + 1) % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    processed = index + 1,
                    loaded = summary.loaded,
                    inserted = summary.inserted,
                    updated = summary.updated,
                    skipped = summary.skipped,
                    "Ingest progress"
                );
            }

            if !self.sleep.is_zero() {
                tokio::time::sleep(self.sleep).await;
            }
        }

        tracing::info!(
            inserted = summary.inserted,
            updated = summary.updated,
            skipped = summary.skipped,
            elapsed_secs = (Utc::now() - started).num_seconds(),
            "Recent-releases ingest finished"
        );

        Ok(summary)
    }

    /// Pull every configured endpoint/page and keep the first occurrence of
    /// each provider id, in load order. The list is finalized here, before
    /// any matching or writing begins.
    async fn load_recent(&self) -> AppResult<Vec<TmdbMovie>> {
        let mut seen = HashSet::new();
        let mut movies = Vec::new();

        for endpoint in &self.endpoints {
            for page in 1..=self.pages {
                let results = self.provider.list_endpoint(endpoint, page).await?;
                for movie in results {
                    if seen.insert(movie.id) {
                        movies.push(movie);
                    }
                }

                if !self.sleep.is_zero() {
                    tokio::time::sleep(self.sleep).await;
                }
            }
        }

        Ok(movies)
    }

    async fn resolve_existing(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> AppResult<Option<Movie>> {
        let candidates = self
            .store
            .find_by_title_and_year(title, year, CANDIDATE_LIMIT)
            .await?;
        Ok(matching::choose_existing(candidates, title, year))
    }
}
