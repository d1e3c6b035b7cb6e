//! Read-only access to the interaction corpus
//!
//! The recommendation pipeline only ever reads three relations: movie metadata,
//! movie genre tags, and per-user like/favorite events. Any backend that can answer
//! these keyed and bulk lookups can drive the engine.

use std::collections::HashMap;

use crate::{error::AppResult, models::Movie};

/// Trait for interaction stores
///
/// Implementations must be safe for concurrent reads; the engine issues many
/// lookups in parallel against one shared instance.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InteractionStore: Send + Sync {
    /// Usernames that favorited the movie
    async fn find_users_who_favorited(&self, movie_slug: &str) -> AppResult<Vec<String>>;

    /// Usernames that liked the movie
    async fn find_users_who_liked(&self, movie_slug: &str) -> AppResult<Vec<String>>;

    /// Every movie the user favorited, minus `exclude_slugs`
    async fn get_other_favorites(
        &self,
        username: &str,
        exclude_slugs: &[String],
    ) -> AppResult<Vec<String>>;

    /// Every movie the user liked, minus `exclude_slugs`
    async fn get_other_likes(
        &self,
        username: &str,
        exclude_slugs: &[String],
    ) -> AppResult<Vec<String>>;

    /// Corpus-wide like count per movie
    async fn get_total_like_counts(&self) -> AppResult<HashMap<String, i64>>;

    /// Metadata for the requested movies; unknown slugs are absent from the map
    async fn get_movies(&self, slugs: &[String]) -> AppResult<HashMap<String, Movie>>;

    /// Ordered genre tags for the requested movies; untagged movies may be absent
    async fn get_genres(&self, slugs: &[String]) -> AppResult<HashMap<String, Vec<String>>>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}
