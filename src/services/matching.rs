/// Conservative title matching
///
/// The catalog has no unique key shared with the provider, so correspondence
/// is decided by best-effort comparison: titles must agree after
/// normalization, and years must agree when both sides supply one. Anything
/// looser risks stamping provider data onto the wrong row.
use crate::models::Movie;

/// Canonical form of a title used for comparison: lowercased with every
/// character outside `[a-z0-9]` stripped. Empty input yields an empty
/// string, which callers must treat as unmatchable.
pub fn normalize_title(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Whether a candidate title/year pair is an acceptable match for the target.
///
/// A candidate missing a year is not rejected on year grounds; absence of
/// year data is not disqualifying.
pub fn is_acceptable(
    target_title: &str,
    target_year: Option<i32>,
    candidate_title: &str,
    candidate_year: Option<i32>,
) -> bool {
    let normalized = normalize_title(target_title);
    if normalized.is_empty() || normalized != normalize_title(candidate_title) {
        return false;
    }

    match (target_year, candidate_year) {
        (Some(target), Some(candidate)) => target == candidate,
        _ => true,
    }
}

/// Select the catalog row corresponding to the target title/year, if any.
///
/// Exactly one acceptable candidate: selected. None: no match. Multiple:
/// the row with the smallest id wins, so repeated runs always land on the
/// oldest row instead of duplicating writes across lookalikes.
pub fn choose_existing(
    candidates: Vec<Movie>,
    target_title: &str,
    target_year: Option<i32>,
) -> Option<Movie> {
    candidates
        .into_iter()
        .filter(|candidate| {
            is_acceptable(target_title, target_year, &candidate.title, candidate.year)
        })
        .min_by_key(|candidate| candidate.id)
}
