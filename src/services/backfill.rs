/// Poster backfill job
///
/// Pages through catalog rows missing a poster and resolves each against
/// TMDB. Rows that already carry a provider id are looked up directly (the
/// id is trusted); rows without one go through a conservative search match
/// and are only touched when the top result agrees on normalized title and
/// year. Rows with neither resolve to nothing and are left alone.
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::{
    config::Config,
    db::CatalogStore,
    error::AppResult,
    models::{Movie, MoviePatch},
    services::{matching, providers::MetadataProvider},
};

const PROGRESS_INTERVAL: u64 = 25;

pub struct PosterBackfill {
    store: Arc<dyn CatalogStore>,
    provider: Arc<dyn MetadataProvider>,
    batch_size: i64,
    sleep: Duration,
    dry_run: bool,
}

/// Counters reported after a backfill run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BackfillSummary {
    /// Catalog rows in total
    pub total: i64,
    /// Rows missing a poster when the run started
    pub missing: i64,
    /// Rows examined
    pub processed: u64,
    /// Rows a poster was written for (or would have been, in dry-run)
    pub updated: u64,
}

impl fmt::Display for BackfillSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {}/{} missing | Updated {} | Total movies {}",
            self.processed, self.missing, self.updated, self.total
        )
    }
}

impl PosterBackfill {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        provider: Arc<dyn MetadataProvider>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            provider,
            batch_size: config.batch_size,
            sleep: Duration::from_millis(config.sleep_ms),
            dry_run: config.dry_run,
        }
    }

    pub async fn run(&self) -> AppResult<BackfillSummary> {
        let started = Utc::now();
        let mut summary = BackfillSummary {
            total: self.store.count_all().await?,
            missing: self.store.count_missing_posters().await?,
            ..Default::default()
        };

        tracing::info!(
            total = summary.total,
            missing = summary.missing,
            dry_run = self.dry_run,
            "Starting poster backfill"
        );

        let mut offset = 0;
        loop {
            let batch = self
                .store
                .list_missing_posters(offset, self.batch_size)
                .await?;
            if batch.is_empty() {
                break;
            }

            for movie in &batch {
                summary.processed += 1;

                if let Some(patch) = self.resolve_poster(movie).await? {
                    self.apply(movie.id, &patch).await?;
                    summary.updated += 1;
                }

                if summary.processed % PROGRESS_INTERVAL == 0 {
                    tracing::info!(
                        processed = summary.processed,
                        missing = summary.missing,
                        updated = summary.updated,
                        "Backfill progress"
                    );
                }

                if !self.sleep.is_zero() {
                    tokio::time::sleep(self.sleep).await;
                }
            }

            offset += self.batch_size;
        }

        tracing::info!(
            processed = summary.processed,
            updated = summary.updated,
            elapsed_secs = (Utc::now() - started).num_seconds(),
            "Poster backfill finished"
        );

        Ok(summary)
    }

    /// Decide what, if anything, to write for one row
    async fn resolve_poster(&self, movie: &Movie) -> AppResult<Option<MoviePatch>> {
        if let Some(tmdb_id) = movie.tmdb_id {
            // Verified path: the stored id is trusted, no comparison needed.
            // A 404 from the provider leaves the row unmatched this cycle.
            let Some(details) = self.provider.movie_details(tmdb_id).await? else {
                return Ok(None);
            };

            return Ok(details.poster_path.map(|poster_path| MoviePatch {
                poster_path: Some(poster_path),
                ..Default::default()
            }));
        }

        let title = movie.title.trim();
        if title.is_empty() {
            tracing::debug!(id = movie.id, "Row has no usable title, skipping");
            return Ok(None);
        }

        // Search path: only the provider's top-ranked result is considered,
        // and only when it survives the conservative match test.
        let results = self.provider.search_movies(title, movie.year).await?;
        let Some(top) = results.into_iter().next() else {
            return Ok(None);
        };

        if !matching::is_acceptable(title, movie.year, &top.title, top.year()) {
            return Ok(None);
        }

        // The id was learned through search, so enrich the row with it too.
        Ok(top.poster_path.map(|poster_path| MoviePatch {
            poster_path: Some(poster_path),
            tmdb_id: Some(top.id),
            ..Default::default()
        }))
    }

    async fn apply(&self, id: i64, patch: &MoviePatch) -> AppResult<()> {
        if self.dry_run {
            tracing::info!(id, ?patch, "Dry run, skipping update");
            return Ok(());
        }

        self.store.update_movie(id, patch).await
    }
}
