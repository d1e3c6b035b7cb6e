//! Movie recommendations from a small seed set of liked movies.
//!
//! The pipeline runs in fixed stages for every request:
//! 1. [`collector`] gathers users who interacted with the seeds and scores
//!    everything else they liked or favorited.
//! 2. [`scoring::normalize_by_popularity`] rescales by each movie's like count.
//! 3. [`features`] fetches metadata and genres and drops unvetted candidates.
//! 4. [`scoring`] applies the genre, era, recency and smoothing adjustments.
//! 5. [`diversity`] caps genre concentration.
//! 6. [`formatter`] joins the survivors back to full movie records.
//!
//! All intermediate state lives inside one call, so concurrent requests never
//! share anything but the store.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, Utc};

use crate::{
    config::RecommendationSettings,
    db::InteractionStore,
    error::{AppError, AppResult},
    models::ScoredMovie,
};

pub mod collector;
pub mod diversity;
pub mod features;
pub mod formatter;
pub mod scoring;

use scoring::ScoringContext;

/// Generates ranked, genre-diversified recommendations
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<dyn InteractionStore>,
    settings: RecommendationSettings,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn InteractionStore>, settings: RecommendationSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &RecommendationSettings {
        &self.settings
    }

    /// Recommends movies for the given seed slugs.
    ///
    /// Blank and repeated slugs are ignored; an empty seed list yields an empty
    /// result. Store failures abort the run with
    /// [`AppError::RecommendationFailed`].
    pub async fn generate_recommendations(
        &self,
        input_slugs: &[String],
    ) -> AppResult<Vec<ScoredMovie>> {
        self.generate_recommendations_at(input_slugs, Utc::now().year())
            .await
    }

    /// Same as [`Self::generate_recommendations`] with an explicit current year
    /// for the recency adjustment.
    #[tracing::instrument(skip_all, fields(store = self.store.name(), seeds = input_slugs.len()))]
    pub async fn generate_recommendations_at(
        &self,
        input_slugs: &[String],
        current_year: i32,
    ) -> AppResult<Vec<ScoredMovie>> {
        let start = Instant::now();

        let inputs = normalize_input_slugs(input_slugs);
        if inputs.is_empty() {
            tracing::debug!("No usable input slugs, returning no recommendations");
            return Ok(Vec::new());
        }

        let store = self.store.as_ref();
        let settings = &self.settings;

        let mut signal = collector::collect_signal(store, &inputs, settings)
            .await
            .map_err(AppError::recommendation_failed)?;

        if signal.raw_scores.is_empty() {
            tracing::info!(
                users = signal.user_interactions.len(),
                "No collaborative candidates found"
            );
            return Ok(Vec::new());
        }

        let total_likes = store
            .get_total_like_counts()
            .await
            .map_err(AppError::recommendation_failed)?;
        scoring::normalize_by_popularity(&mut signal.raw_scores, &total_likes);

        let features = features::aggregate_features(store, &inputs, &signal.raw_scores, settings)
            .await
            .map_err(AppError::recommendation_failed)?;

        let ctx = ScoringContext {
            input_genres: &features.profile.genres,
            average_input_year: features.profile.average_year,
            current_year,
            total_likes: &total_likes,
            average_likes: scoring::average_likes(&total_likes),
        };
        let ranked = scoring::score_candidates(features.candidates, &ctx, settings);
        let ranked_count = ranked.len();

        let selected = diversity::diversify(
            ranked,
            settings.max_per_genre,
            settings.num_of_recommendations,
        );
        let recommendations = formatter::format_results(selected, &features.movies);

        tracing::info!(
            raw_candidates = signal.raw_scores.len(),
            ranked = ranked_count,
            returned = recommendations.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Recommendations generated"
        );

        Ok(recommendations)
    }
}

/// Trims slugs, drops blanks, and removes repeats keeping the first occurrence
pub fn normalize_input_slugs(input_slugs: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    input_slugs
        .iter()
        .map(|slug| slug.trim())
        .filter(|slug| !slug.is_empty())
        .filter(|slug| seen.insert(*slug))
        .map(str::to_string)
        .collect()
}
