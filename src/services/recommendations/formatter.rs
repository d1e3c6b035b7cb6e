use std::collections::HashMap;

use crate::{
    models::{Movie, ScoredMovie},
    services::recommendations::scoring::{compare_ranked, RankedCandidate},
};

/// Joins the selected candidates back to their movie records.
///
/// Candidates without a record are skipped rather than returned half-filled.
/// Output is ordered by score, highest first.
pub fn format_results(
    mut selected: Vec<RankedCandidate>,
    movies: &HashMap<String, Movie>,
) -> Vec<ScoredMovie> {
    selected.sort_by(compare_ranked);

    selected
        .into_iter()
        .filter_map(|candidate| {
            let Some(movie) = movies.get(&candidate.slug) else {
                tracing::warn!(movie = %candidate.slug, "Selected movie lost its metadata, skipping");
                return None;
            };
            Some(ScoredMovie {
                movie: movie.clone(),
                score: candidate.score,
                genres: candidate.genres,
            })
        })
        .collect()
}
