use std::collections::{BTreeMap, HashSet};

use futures::future::join_all;

use crate::{
    config::RecommendationSettings,
    db::InteractionStore,
    error::{AppError, AppResult},
    models::{InteractionKey, InteractionKind},
};

/// Collaborative evidence gathered from users who share the seed movies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollaborativeSignal {
    /// Distinct seed movies each user liked or favorited
    pub user_interactions: BTreeMap<String, u32>,
    /// Accumulated points per candidate movie
    pub raw_scores: BTreeMap<String, f64>,
}

/// Builds the raw candidate pool from users who interacted with the seeds.
///
/// Each `(user, seed)` pair counts once towards the user's interaction count,
/// whether it came from a like, a favorite, or both. Every other movie those
/// users favorited or liked then gains `multiplier × interaction count`.
///
/// Individual lookup failures are logged and skipped. If every lookup of a
/// stage fails the store is treated as unavailable and the error is returned.
pub async fn collect_signal(
    store: &dyn InteractionStore,
    input_slugs: &[String],
    settings: &RecommendationSettings,
) -> AppResult<CollaborativeSignal> {
    let user_interactions = count_user_interactions(store, input_slugs).await?;

    tracing::info!(
        seeds = input_slugs.len(),
        users = user_interactions.len(),
        "Collected interacting users"
    );

    let raw_scores = score_other_interactions(store, input_slugs, &user_interactions, settings)
        .await?;

    tracing::info!(candidates = raw_scores.len(), "Accumulated raw candidate scores");

    Ok(CollaborativeSignal {
        user_interactions,
        raw_scores,
    })
}

async fn count_user_interactions(
    store: &dyn InteractionStore,
    input_slugs: &[String],
) -> AppResult<BTreeMap<String, u32>> {
    let lookups = input_slugs.iter().map(|slug| async move {
        let result = tokio::try_join!(
            store.find_users_who_favorited(slug),
            store.find_users_who_liked(slug)
        );
        (slug, result)
    });

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut errors = Vec::new();

    for (slug, result) in join_all(lookups).await {
        match result {
            Ok((favorited, liked)) => {
                for username in favorited.into_iter().chain(liked) {
                    if seen.insert((username.clone(), slug.clone())) {
                        *counts.entry(username).or_insert(0) += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(movie = %slug, error = %e, "Seed interaction lookup failed, skipping");
                errors.push(e);
            }
        }
    }

    fail_if_all_failed(input_slugs.len(), errors, "seed interaction")?;
    Ok(counts)
}

async fn score_other_interactions(
    store: &dyn InteractionStore,
    input_slugs: &[String],
    user_interactions: &BTreeMap<String, u32>,
    settings: &RecommendationSettings,
) -> AppResult<BTreeMap<String, f64>> {
    let users: Vec<(&String, u32)> = user_interactions
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(username, count)| (username, *count))
        .collect();

    let seeds: HashSet<&str> = input_slugs.iter().map(String::as_str).collect();
    let mut processed: HashSet<InteractionKey> = HashSet::new();
    let mut scores: BTreeMap<String, f64> = BTreeMap::new();
    let mut errors = Vec::new();

    for batch in users.chunks(settings.user_batch_size.max(1)) {
        let lookups = batch.iter().map(|&(username, count)| async move {
            let result = tokio::try_join!(
                store.get_other_favorites(username, input_slugs),
                store.get_other_likes(username, input_slugs)
            );
            (username, count, result)
        });

        for (username, count, result) in join_all(lookups).await {
            let (favorites, likes) = match result {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(user = %username, error = %e, "User interaction lookup failed, skipping");
                    errors.push(e);
                    continue;
                }
            };

            let events = favorites
                .into_iter()
                .map(|slug| (slug, InteractionKind::Favorite))
                .chain(likes.into_iter().map(|slug| (slug, InteractionKind::Like)));

            for (slug, kind) in events {
                if seeds.contains(slug.as_str()) {
                    continue;
                }
                if !processed.insert(InteractionKey::new(username, &slug, kind)) {
                    continue;
                }
                *scores.entry(slug).or_insert(0.0) += points_for(kind, count, settings);
            }
        }
    }

    fail_if_all_failed(users.len(), errors, "user interaction")?;
    Ok(scores)
}

/// Points one interaction event contributes to its movie
pub fn points_for(kind: InteractionKind, interaction_count: u32, settings: &RecommendationSettings) -> f64 {
    let multiplier = match kind {
        InteractionKind::Favorite => settings.favorite_multiplier,
        InteractionKind::Like => settings.like_multiplier,
    };
    multiplier * f64::from(interaction_count)
}

fn fail_if_all_failed(attempted: usize, mut errors: Vec<AppError>, stage: &str) -> AppResult<()> {
    if attempted == 0 || errors.len() < attempted {
        if !errors.is_empty() {
            tracing::warn!(
                stage,
                attempted,
                failed = errors.len(),
                "Partial lookup failure"
            );
        }
        return Ok(());
    }

    tracing::error!(stage, attempted, "Every lookup failed");
    Err(errors.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MockInteractionStore;
    use crate::db::MemoryInteractionStore;
    use crate::models::Movie;

    fn seeds(slugs: &[&str]) -> Vec<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    fn names(users: &[&str]) -> Vec<String> {
        users.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_favorite_outweighs_like() {
        let settings = RecommendationSettings::default();
        assert!(
            points_for(InteractionKind::Favorite, 1, &settings)
                > points_for(InteractionKind::Like, 1, &settings)
        );
        assert_eq!(points_for(InteractionKind::Favorite, 2, &settings), 100.0);
        assert_eq!(points_for(InteractionKind::Like, 3, &settings), 30.0);
    }

    #[tokio::test]
    async fn test_like_and_favorite_of_same_seed_count_once() {
        let store = MemoryInteractionStore::new()
            .with_movie(Movie::new("seed", "Seed"), ["drama"])
            .with_movie(Movie::new("other", "Other"), ["drama"])
            .with_like("ana", "seed")
            .with_favorite("ana", "seed")
            .with_like("ana", "other");

        let signal = collect_signal(&store, &seeds(&["seed"]), &RecommendationSettings::default())
            .await
            .unwrap();

        assert_eq!(signal.user_interactions.get("ana"), Some(&1));
        assert_eq!(signal.raw_scores.get("other"), Some(&10.0));
    }

    #[tokio::test]
    async fn test_interaction_count_scales_contribution() {
        let store = MemoryInteractionStore::new()
            .with_favorite("ana", "seed-1")
            .with_like("ana", "seed-2")
            .with_favorite("ana", "candidate")
            .with_like("bo", "seed-1")
            .with_like("bo", "candidate");

        let signal = collect_signal(
            &store,
            &seeds(&["seed-1", "seed-2"]),
            &RecommendationSettings::default(),
        )
        .await
        .unwrap();

        assert_eq!(signal.user_interactions.get("ana"), Some(&2));
        assert_eq!(signal.user_interactions.get("bo"), Some(&1));
        // ana: favorite × 2 seeds = 100, bo: like × 1 seed = 10
        assert_eq!(signal.raw_scores.get("candidate"), Some(&110.0));
        assert!(!signal.raw_scores.contains_key("seed-1"));
        assert!(!signal.raw_scores.contains_key("seed-2"));
    }

    #[tokio::test]
    async fn test_duplicate_rows_are_counted_once() {
        let mut store = MockInteractionStore::new();
        store
            .expect_find_users_who_favorited()
            .returning(|_| Ok(names(&["ana", "ana"])));
        store
            .expect_find_users_who_liked()
            .returning(|_| Ok(names(&["ana"])));
        store
            .expect_get_other_favorites()
            .returning(|_, _| Ok(names(&["dup", "dup", "seed"])));
        store
            .expect_get_other_likes()
            .returning(|_, _| Ok(names(&["dup"])));

        let signal = collect_signal(&store, &seeds(&["seed"]), &RecommendationSettings::default())
            .await
            .unwrap();

        assert_eq!(signal.user_interactions.get("ana"), Some(&1));
        // one favorite event and one like event, each counted once
        assert_eq!(signal.raw_scores.get("dup"), Some(&60.0));
        // the store ignored the exclusion list, the collector still drops seeds
        assert!(!signal.raw_scores.contains_key("seed"));
    }

    #[tokio::test]
    async fn test_user_without_other_interactions_contributes_nothing() {
        let store = MemoryInteractionStore::new().with_like("ana", "seed");

        let signal = collect_signal(&store, &seeds(&["seed"]), &RecommendationSettings::default())
            .await
            .unwrap();

        assert_eq!(signal.user_interactions.len(), 1);
        assert!(signal.raw_scores.is_empty());
    }

    #[tokio::test]
    async fn test_single_user_failure_is_skipped() {
        let mut store = MockInteractionStore::new();
        store
            .expect_find_users_who_favorited()
            .returning(|_| Ok(names(&["ana", "bo"])));
        store
            .expect_find_users_who_liked()
            .returning(|_| Ok(vec![]));
        store.expect_get_other_favorites().returning(|user, _| {
            if user == "bo" {
                Err(AppError::Store("timeout".into()))
            } else {
                Ok(names(&["kept"]))
            }
        });
        store
            .expect_get_other_likes()
            .returning(|_, _| Ok(vec![]));

        let signal = collect_signal(&store, &seeds(&["seed"]), &RecommendationSettings::default())
            .await
            .unwrap();

        assert_eq!(signal.raw_scores.get("kept"), Some(&50.0));
        assert_eq!(signal.raw_scores.len(), 1);
    }

    #[tokio::test]
    async fn test_total_outage_is_an_error() {
        let mut store = MockInteractionStore::new();
        store
            .expect_find_users_who_favorited()
            .returning(|_| Err(AppError::Store("connection refused".into())));
        store
            .expect_find_users_who_liked()
            .returning(|_| Err(AppError::Store("connection refused".into())));

        let result =
            collect_signal(&store, &seeds(&["a", "b"]), &RecommendationSettings::default()).await;

        tokio_test::assert_err!(result);
    }

    #[tokio::test]
    async fn test_batches_cover_every_user() {
        let mut store = MemoryInteractionStore::new();
        for i in 0..7 {
            let user = format!("user-{i}");
            store = store.with_like(&user, "seed").with_like(&user, "candidate");
        }
        let settings = RecommendationSettings {
            user_batch_size: 3,
            ..Default::default()
        };

        let signal = collect_signal(&store, &seeds(&["seed"]), &settings)
            .await
            .unwrap();

        assert_eq!(signal.user_interactions.len(), 7);
        assert_eq!(signal.raw_scores.get("candidate"), Some(&70.0));
    }
}
