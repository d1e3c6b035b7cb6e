use std::collections::{BTreeSet, HashMap};

use crate::services::recommendations::scoring::RankedCandidate;

/// Caps how many results may share a genre.
///
/// Walks the ranked list once. A candidate is admitted while every one of its
/// genres is below `max_per_genre`; otherwise it is held back as overflow. The
/// result is the admitted list followed by the overflow, truncated to `limit`,
/// so overflow only fills slots the capped list could not.
pub fn diversify(
    ranked: Vec<RankedCandidate>,
    max_per_genre: usize,
    limit: usize,
) -> Vec<RankedCandidate> {
    let mut genre_counts: HashMap<String, usize> = HashMap::new();
    let mut admitted = Vec::new();
    let mut overflow = Vec::new();

    for candidate in ranked {
        let distinct: BTreeSet<&String> = candidate.genres.iter().collect();
        let under_cap = distinct
            .iter()
            .all(|genre| genre_counts.get(*genre).copied().unwrap_or(0) < max_per_genre);

        if under_cap && admitted.len() < limit {
            for genre in distinct {
                *genre_counts.entry(genre.clone()).or_insert(0) += 1;
            }
            admitted.push(candidate);
        } else if overflow.len() < limit {
            overflow.push(candidate);
        }
    }

    if admitted.len() < limit && !overflow.is_empty() {
        tracing::debug!(
            admitted = admitted.len(),
            limit,
            "Genre cap left open slots, filling from overflow"
        );
    }

    admitted.extend(overflow);
    admitted.truncate(limit);
    admitted
}
