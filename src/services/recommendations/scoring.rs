//! Deterministic multiplicative adjustments applied to collaborative scores.
//!
//! Missing values are resolved by the helpers at the top of this module rather
//! than inline, so no adjustment can divide by zero or propagate NaN.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    config::RecommendationSettings, models::Movie,
    services::recommendations::features::CandidateFeatures,
};

/// Review count, missing or negative counts read as 0
pub fn review_count_of(movie: &Movie) -> u64 {
    movie.review_count.unwrap_or(0).max(0) as u64
}

/// Corpus-wide like count, missing or non-positive counts read as 1
pub fn total_likes_of(total_likes: &HashMap<String, i64>, slug: &str) -> f64 {
    match total_likes.get(slug) {
        Some(&count) if count > 0 => count as f64,
        _ => 1.0,
    }
}

/// Mean like count across the corpus, 0 for an empty corpus
pub fn average_likes(total_likes: &HashMap<String, i64>) -> f64 {
    if total_likes.is_empty() {
        return 0.0;
    }
    let sum: i64 = total_likes.values().map(|&count| count.max(0)).sum();
    sum as f64 / total_likes.len() as f64
}

/// Rescales each raw score by its own ratio to the movie's overall like count:
/// `score × (score / total_likes)`.
pub fn normalize_by_popularity(scores: &mut BTreeMap<String, f64>, total_likes: &HashMap<String, i64>) {
    for (slug, score) in scores.iter_mut() {
        let likes = total_likes_of(total_likes, slug);
        *score *= *score / likes;
    }
}

/// Distinct candidate genres that also appear among the seed genres
pub fn shared_genre_count(candidate_genres: &[String], input_genres: &BTreeSet<String>) -> usize {
    candidate_genres
        .iter()
        .filter(|genre| input_genres.contains(*genre))
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn genre_multiplier(shared_genres: usize, settings: &RecommendationSettings) -> f64 {
    1.0 + shared_genres as f64 * settings.shared_genre_multiplier
}

/// Triangular bonus for candidates released close to the average seed year
pub fn decade_multiplier(
    candidate_year: Option<i32>,
    average_input_year: Option<f64>,
    settings: &RecommendationSettings,
) -> f64 {
    let (Some(year), Some(average)) = (candidate_year, average_input_year) else {
        return 1.0;
    };

    let window = settings.decade_window_years;
    let diff = (f64::from(year) - average).abs();
    if diff > window {
        return 1.0;
    }
    1.0 + settings.decade_multiplier * (1.0 - diff / window)
}

/// `1 + decay^age`; unreleased films count as age 0
pub fn recency_multiplier(
    candidate_year: Option<i32>,
    current_year: i32,
    settings: &RecommendationSettings,
) -> f64 {
    let Some(year) = candidate_year else {
        return 1.0;
    };
    let age = (current_year - year).max(0);
    1.0 + settings.recency_decay_factor.powi(age)
}

/// Pulls low-volume scores toward the corpus average:
/// `(score × likes + average × weight) / (likes + weight)`.
pub fn bayesian_smooth(score: f64, total_likes: f64, average_likes: f64, weight: f64) -> f64 {
    let denominator = total_likes + weight;
    if denominator <= 0.0 {
        return score;
    }
    (score * total_likes + average_likes * weight) / denominator
}

/// Inputs shared by every candidate in one scoring pass
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub input_genres: &'a BTreeSet<String>,
    pub average_input_year: Option<f64>,
    pub current_year: i32,
    pub total_likes: &'a HashMap<String, i64>,
    pub average_likes: f64,
}

/// A candidate with its final score, ready for diversification
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub slug: String,
    pub score: f64,
    pub genres: Vec<String>,
}

/// Applies the genre gate and every adjustment, then ranks by score.
///
/// Candidates sharing no genre with the seeds, or whose score is not finite,
/// are dropped. Ties are broken by slug so the order is fully deterministic.
pub fn score_candidates(
    candidates: Vec<CandidateFeatures>,
    ctx: &ScoringContext<'_>,
    settings: &RecommendationSettings,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .filter_map(|candidate| score_candidate(candidate, ctx, settings))
        .collect();

    ranked.sort_by(compare_ranked);
    ranked
}

fn score_candidate(
    candidate: CandidateFeatures,
    ctx: &ScoringContext<'_>,
    settings: &RecommendationSettings,
) -> Option<RankedCandidate> {
    let shared = shared_genre_count(&candidate.genres, ctx.input_genres);
    if shared == 0 {
        tracing::debug!(movie = %candidate.slug, "No genre overlap with inputs, dropping");
        return None;
    }

    let mut score = candidate.score;
    score *= genre_multiplier(shared, settings);
    score *= decade_multiplier(candidate.release_year, ctx.average_input_year, settings);
    score *= recency_multiplier(candidate.release_year, ctx.current_year, settings);

    let likes = total_likes_of(ctx.total_likes, &candidate.slug);
    let score = bayesian_smooth(score, likes, ctx.average_likes, settings.bayesian_weight);

    if !score.is_finite() {
        tracing::warn!(movie = %candidate.slug, "Non-finite score, dropping");
        return None;
    }

    Some(RankedCandidate {
        slug: candidate.slug,
        score,
        genres: candidate.genres,
    })
}

/// Score descending, then slug ascending
pub fn compare_ranked(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.slug.cmp(&b.slug))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn genre_set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn candidate(slug: &str, score: f64, year: Option<i32>, tags: &[&str]) -> CandidateFeatures {
        CandidateFeatures {
            slug: slug.to_string(),
            release_year: year,
            genres: genres(tags),
            score,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_helpers() {
        let counts = HashMap::from([("a".to_string(), 4), ("b".to_string(), 0)]);
        assert_eq!(total_likes_of(&counts, "a"), 4.0);
        assert_eq!(total_likes_of(&counts, "b"), 1.0);
        assert_eq!(total_likes_of(&counts, "missing"), 1.0);
        assert_eq!(average_likes(&counts), 2.0);
        assert_eq!(average_likes(&HashMap::new()), 0.0);

        let mut movie = Movie::new("m", "M");
        assert_eq!(review_count_of(&movie), 0);
        movie.review_count = Some(-3);
        assert_eq!(review_count_of(&movie), 0);
        movie.review_count = Some(12);
        assert_eq!(review_count_of(&movie), 12);
    }

    #[test]
    fn test_popularity_normalization_favors_niche_matches() {
        let counts = HashMap::from([("niche".to_string(), 10), ("blockbuster".to_string(), 1000)]);
        let mut scores = BTreeMap::from([
            ("niche".to_string(), 100.0),
            ("blockbuster".to_string(), 100.0),
            ("unliked".to_string(), 50.0),
        ]);

        normalize_by_popularity(&mut scores, &counts);

        assert_eq!(scores["niche"], 1000.0);
        assert_eq!(scores["blockbuster"], 10.0);
        assert_eq!(scores["unliked"], 2500.0);
    }

    #[test]
    fn test_shared_genre_count_is_distinct() {
        let inputs = genre_set(&["drama", "crime"]);
        assert_eq!(shared_genre_count(&genres(&["drama", "drama", "crime"]), &inputs), 2);
        assert_eq!(shared_genre_count(&genres(&["comedy"]), &inputs), 0);
    }

    #[test]
    fn test_decade_multiplier_is_triangular() {
        let settings = RecommendationSettings::default();
        assert!(close(decade_multiplier(Some(2000), Some(2000.0), &settings), 3.0));
        assert!(close(decade_multiplier(Some(2005), Some(2000.0), &settings), 2.0));
        assert!(close(decade_multiplier(Some(1990), Some(2000.0), &settings), 1.0));
        assert!(close(decade_multiplier(Some(1985), Some(2000.0), &settings), 1.0));
        assert!(close(decade_multiplier(None, Some(2000.0), &settings), 1.0));
        assert!(close(decade_multiplier(Some(2000), None, &settings), 1.0));
    }

    #[test]
    fn test_recency_multiplier() {
        let settings = RecommendationSettings::default();
        assert!(close(recency_multiplier(Some(2026), 2026, &settings), 2.0));
        assert!(close(recency_multiplier(Some(2027), 2026, &settings), 2.0));
        assert!(close(recency_multiplier(Some(2024), 2026, &settings), 1.0 + 0.95 * 0.95));
        assert!(recency_multiplier(Some(1926), 2026, &settings) < 1.01);
        assert!(close(recency_multiplier(None, 2026, &settings), 1.0));
    }

    #[test]
    fn test_bayesian_smoothing_pulls_toward_average() {
        // one like, raw score far above the average of 10
        let smoothed = bayesian_smooth(1000.0, 1.0, 10.0, 50.0);
        assert!(close(smoothed, 1500.0 / 51.0));
        assert!(smoothed < 30.0);

        // heavily liked movies keep most of their own score
        let popular = bayesian_smooth(1000.0, 5000.0, 10.0, 50.0);
        assert!(popular > 990.0);

        assert_eq!(bayesian_smooth(7.0, 0.0, 10.0, 0.0), 7.0);
    }

    #[test]
    fn test_score_candidates_applies_every_adjustment() {
        let settings = RecommendationSettings::default();
        let input_genres = genre_set(&["crime"]);
        let total_likes = HashMap::from([("heat".to_string(), 4)]);
        let ctx = ScoringContext {
            input_genres: &input_genres,
            average_input_year: Some(2020.0),
            current_year: 2026,
            total_likes: &total_likes,
            average_likes: 4.0,
        };

        let ranked = score_candidates(
            vec![candidate("heat", 100.0, Some(2020), &["crime", "drama"])],
            &ctx,
            &settings,
        );

        let adjusted = 100.0 * 6.0 * 3.0 * (1.0 + 0.95f64.powi(6));
        let expected = (adjusted * 4.0 + 4.0 * 50.0) / 54.0;
        assert_eq!(ranked.len(), 1);
        assert!(close(ranked[0].score, expected));
    }

    #[test]
    fn test_score_candidates_gates_on_genre_and_orders() {
        let settings = RecommendationSettings::default();
        let input_genres = genre_set(&["crime", "drama"]);
        let total_likes = HashMap::new();
        let ctx = ScoringContext {
            input_genres: &input_genres,
            average_input_year: None,
            current_year: 2026,
            total_likes: &total_likes,
            average_likes: 0.0,
        };

        let ranked = score_candidates(
            vec![
                candidate("b-tie", 10.0, None, &["drama"]),
                candidate("comedy", 1_000.0, None, &["comedy"]),
                candidate("a-tie", 10.0, None, &["crime"]),
                candidate("top", 10.0, None, &["crime", "drama"]),
            ],
            &ctx,
            &settings,
        );

        let order: Vec<&str> = ranked.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(order, vec!["top", "a-tie", "b-tie"]);
    }
}
