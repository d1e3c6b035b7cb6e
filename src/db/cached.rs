use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    cached,
    db::{store::InteractionStore, Cache, CacheKey},
    error::AppResult,
    models::Movie,
};

/// Short-TTL Redis cache in front of another interaction store
///
/// Only the lookups that repeat across requests are cached: the per-movie
/// favorited-by and liked-by sets of popular seed movies, and the corpus-wide
/// like counts. Per-user and bulk metadata lookups go straight to the inner store.
#[derive(Clone)]
pub struct CachedInteractionStore {
    inner: Arc<dyn InteractionStore>,
    cache: Cache,
    ttl: u64,
}

impl CachedInteractionStore {
    pub fn new(inner: Arc<dyn InteractionStore>, cache: Cache, ttl: u64) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait::async_trait]
impl InteractionStore for CachedInteractionStore {
    async fn find_users_who_favorited(&self, movie_slug: &str) -> AppResult<Vec<String>> {
        cached!(
            self.cache,
            CacheKey::FavoritedBy(movie_slug.to_string()),
            self.ttl,
            self.inner.find_users_who_favorited(movie_slug)
        )
    }

    async fn find_users_who_liked(&self, movie_slug: &str) -> AppResult<Vec<String>> {
        cached!(
            self.cache,
            CacheKey::LikedBy(movie_slug.to_string()),
            self.ttl,
            self.inner.find_users_who_liked(movie_slug)
        )
    }

    async fn get_other_favorites(
        &self,
        username: &str,
        exclude_slugs: &[String],
    ) -> AppResult<Vec<String>> {
        self.inner.get_other_favorites(username, exclude_slugs).await
    }

    async fn get_other_likes(
        &self,
        username: &str,
        exclude_slugs: &[String],
    ) -> AppResult<Vec<String>> {
        self.inner.get_other_likes(username, exclude_slugs).await
    }

    async fn get_total_like_counts(&self) -> AppResult<HashMap<String, i64>> {
        cached!(
            self.cache,
            CacheKey::TotalLikeCounts,
            self.ttl,
            self.inner.get_total_like_counts()
        )
    }

    async fn get_movies(&self, slugs: &[String]) -> AppResult<HashMap<String, Movie>> {
        self.inner.get_movies(slugs).await
    }

    async fn get_genres(&self, slugs: &[String]) -> AppResult<HashMap<String, Vec<String>>> {
        self.inner.get_genres(slugs).await
    }

    fn name(&self) -> &'static str {
        "cached"
    }
}
