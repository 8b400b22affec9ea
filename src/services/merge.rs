/// Enrichment-only merge planning
///
/// Updates computed here only fill fields the catalog row is missing; a
/// populated field is never replaced, so manually curated data survives
/// repeated syncs against lower-confidence provider records.
use std::collections::BTreeSet;

use crate::models::{Movie, MoviePatch, NewMovie, TmdbMovie};

/// Provenance tag stamped onto rows this system created or enriched
pub const SOURCE_TAG: &str = "tmdb";

/// Convert TMDB genre ids to catalog genre labels
fn map_genre(genre_id: i64) -> Option<&'static str> {
    match genre_id {
        28 => Some("Action"),
        12 => Some("Adventure"),
        35 => Some("Comedy"),
        99 => Some("Documentary"),
        14 => Some("Fantasy"),
        27 => Some("Horror"),
        10749 => Some("Romance"),
        878 => Some("Sci-Fi"),
        53 | 80 | 9648 => Some("Mystery & thriller"),
        _ => None,
    }
}

/// Map provider genre ids to catalog labels. Unmapped ids are dropped,
/// duplicate labels collapse, and the result is in sorted label order so the
/// stored representation is stable across repeated syncs.
pub fn map_genres(genre_ids: &[i64]) -> Vec<String> {
    genre_ids
        .iter()
        .filter_map(|&id| map_genre(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Build the insert payload for a provider record
pub fn build_insert(incoming: &TmdbMovie) -> NewMovie {
    NewMovie {
        title: incoming.title.trim().to_string(),
        year: incoming.year(),
        tmdb_id: Some(incoming.id),
        poster_path: incoming.poster_path.clone(),
        description: non_empty(incoming.overview.as_deref()),
        genres: map_genres(&incoming.genre_ids),
        source: Some(SOURCE_TAG.to_string()),
    }
}

/// Compute the minimal update needed to enrich an existing row from an
/// incoming payload. A field is included iff the row's value is absent
/// (empty genre sets count as absent) and the incoming value is non-empty.
/// The source tag is stamped whenever the row has none, even when nothing
/// else is enrichable. An empty patch means no write is required.
pub fn plan_update(existing: &Movie, incoming: &NewMovie) -> MoviePatch {
    let mut patch = MoviePatch::default();

    if existing.description.as_deref().is_none_or(str::is_empty) {
        patch.description = non_empty(incoming.description.as_deref());
    }

    if existing.poster_path.as_deref().is_none_or(str::is_empty) {
        patch.poster_path = non_empty(incoming.poster_path.as_deref());
    }

    if existing.year.is_none() {
        patch.year = incoming.year;
    }

    if !existing.has_genres() && !incoming.genres.is_empty() {
        patch.genres = Some(incoming.genres.clone());
    }

    if existing.tmdb_id.is_none() {
        patch.tmdb_id = incoming.tmdb_id;
    }

    if existing.source.as_deref().is_none_or(str::is_empty) {
        patch.source = Some(SOURCE_TAG.to_string());
    }

    patch
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}
