use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    config::RecommendationSettings,
    db::InteractionStore,
    error::AppResult,
    models::Movie,
    services::recommendations::scoring::review_count_of,
};

/// What the seed movies say about the user's taste
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputProfile {
    /// Union of all seed genres
    pub genres: BTreeSet<String>,
    /// Mean release year of seeds that have one
    pub average_year: Option<f64>,
    /// Minimum review count a candidate needs
    pub review_threshold: f64,
    /// Seeds that resolved to a movie record
    pub valid_inputs: usize,
}

/// A candidate that passed the content filters
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFeatures {
    pub slug: String,
    pub release_year: Option<i32>,
    pub genres: Vec<String>,
    /// Collaborative score after popularity normalization
    pub score: f64,
}

/// Content features for one recommendation run
#[derive(Debug, Clone, Default)]
pub struct ContentFeatures {
    pub profile: InputProfile,
    pub candidates: Vec<CandidateFeatures>,
    /// Metadata for every seed and candidate the store knew about
    pub movies: HashMap<String, Movie>,
}

/// Fetches metadata and genres, builds the seed profile, and drops candidates
/// that are untagged, unknown, or below the review threshold.
pub async fn aggregate_features(
    store: &dyn InteractionStore,
    input_slugs: &[String],
    scores: &BTreeMap<String, f64>,
    settings: &RecommendationSettings,
) -> AppResult<ContentFeatures> {
    let slugs: Vec<String> = input_slugs
        .iter()
        .chain(scores.keys())
        .cloned()
        .collect();

    let (movies, genres) = tokio::try_join!(store.get_movies(&slugs), store.get_genres(&slugs))?;

    let profile = build_input_profile(input_slugs, &movies, &genres, settings);

    tracing::info!(
        valid_inputs = profile.valid_inputs,
        input_genres = profile.genres.len(),
        review_threshold = profile.review_threshold,
        "Built input profile"
    );

    let mut candidates = Vec::new();
    let mut dropped = 0usize;

    for (slug, score) in scores {
        let Some(movie) = movies.get(slug) else {
            tracing::debug!(movie = %slug, "Candidate has no metadata, dropping");
            dropped += 1;
            continue;
        };

        let tags = genres.get(slug).cloned().unwrap_or_default();
        if tags.is_empty() {
            tracing::debug!(movie = %slug, "Candidate has no genres, dropping");
            dropped += 1;
            continue;
        }

        if !meets_review_threshold(movie, profile.review_threshold) {
            dropped += 1;
            continue;
        }

        candidates.push(CandidateFeatures {
            slug: slug.clone(),
            release_year: movie.release_year,
            genres: tags,
            score: *score,
        });
    }

    tracing::info!(
        kept = candidates.len(),
        dropped,
        "Applied content filters"
    );

    Ok(ContentFeatures {
        profile,
        candidates,
        movies,
    })
}

/// Summarizes the seeds; seeds without a movie record are logged and ignored
pub fn build_input_profile(
    input_slugs: &[String],
    movies: &HashMap<String, Movie>,
    genres: &HashMap<String, Vec<String>>,
    settings: &RecommendationSettings,
) -> InputProfile {
    let mut profile = InputProfile::default();
    let mut review_counts = Vec::new();
    let mut years = Vec::new();

    for slug in input_slugs {
        let Some(movie) = movies.get(slug) else {
            tracing::warn!(movie = %slug, "Input movie not found, ignoring");
            continue;
        };

        profile.valid_inputs += 1;
        review_counts.push(review_count_of(movie));
        if let Some(year) = movie.release_year {
            years.push(f64::from(year));
        }
        if let Some(tags) = genres.get(slug) {
            profile.genres.extend(tags.iter().cloned());
        }
    }

    if !years.is_empty() {
        profile.average_year = Some(years.iter().sum::<f64>() / years.len() as f64);
    }

    profile.review_threshold =
        review_baseline(&review_counts, settings.median_min_inputs) / settings.review_threshold_divider;

    profile
}

/// Median of the seed review counts for large seed sets, mean otherwise, 0 when empty
pub fn review_baseline(review_counts: &[u64], median_min_inputs: usize) -> f64 {
    if review_counts.is_empty() {
        return 0.0;
    }

    if review_counts.len() >= median_min_inputs {
        let mut sorted = review_counts.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
        } else {
            sorted[mid] as f64
        }
    } else {
        review_counts.iter().map(|&c| c as f64).sum::<f64>() / review_counts.len() as f64
    }
}

/// Inclusive: a count equal to the threshold is kept
pub fn meets_review_threshold(movie: &Movie, threshold: f64) -> bool {
    review_count_of(movie) as f64 >= threshold
}
