use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{db::store::InteractionStore, error::AppResult, models::Movie};

/// In-process snapshot of the interaction corpus
///
/// Holds the same three relations as the relational store. Lookups return
/// sorted results so repeated runs over one snapshot are byte-for-byte identical.
#[derive(Debug, Clone, Default)]
pub struct MemoryInteractionStore {
    movies: BTreeMap<String, Movie>,
    genres: BTreeMap<String, Vec<String>>,
    likes: BTreeSet<(String, String)>,
    favorites: BTreeSet<(String, String)>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a movie together with its genre tags
    pub fn with_movie<G: Into<String>>(
        mut self,
        movie: Movie,
        genres: impl IntoIterator<Item = G>,
    ) -> Self {
        let genres: Vec<String> = genres.into_iter().map(Into::into).collect();
        if genres.is_empty() {
            self.genres.remove(&movie.slug);
        } else {
            self.genres.insert(movie.slug.clone(), genres);
        }
        self.movies.insert(movie.slug.clone(), movie);
        self
    }

    pub fn with_like(mut self, username: &str, movie_slug: &str) -> Self {
        self.likes
            .insert((username.to_string(), movie_slug.to_string()));
        self
    }

    pub fn with_favorite(mut self, username: &str, movie_slug: &str) -> Self {
        self.favorites
            .insert((username.to_string(), movie_slug.to_string()));
        self
    }

    fn users_of(events: &BTreeSet<(String, String)>, movie_slug: &str) -> Vec<String> {
        events
            .iter()
            .filter(|(_, slug)| slug == movie_slug)
            .map(|(user, _)| user.clone())
            .collect()
    }

    fn movies_of(
        events: &BTreeSet<(String, String)>,
        username: &str,
        exclude_slugs: &[String],
    ) -> Vec<String> {
        events
            .iter()
            .filter(|(user, slug)| user == username && !exclude_slugs.contains(slug))
            .map(|(_, slug)| slug.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl InteractionStore for MemoryInteractionStore {
    async fn find_users_who_favorited(&self, movie_slug: &str) -> AppResult<Vec<String>> {
        Ok(Self::users_of(&self.favorites, movie_slug))
    }

    async fn find_users_who_liked(&self, movie_slug: &str) -> AppResult<Vec<String>> {
        Ok(Self::users_of(&self.likes, movie_slug))
    }

    async fn get_other_favorites(
        &self,
        username: &str,
        exclude_slugs: &[String],
    ) -> AppResult<Vec<String>> {
        Ok(Self::movies_of(&self.favorites, username, exclude_slugs))
    }

    async fn get_other_likes(
        &self,
        username: &str,
        exclude_slugs: &[String],
    ) -> AppResult<Vec<String>> {
        Ok(Self::movies_of(&self.likes, username, exclude_slugs))
    }

    async fn get_total_like_counts(&self) -> AppResult<HashMap<String, i64>> {
        let mut counts = HashMap::new();
        for (_, slug) in &self.likes {
            *counts.entry(slug.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn get_movies(&self, slugs: &[String]) -> AppResult<HashMap<String, Movie>> {
        Ok(slugs
            .iter()
            .filter_map(|slug| self.movies.get(slug).map(|m| (slug.clone(), m.clone())))
            .collect())
    }

    async fn get_genres(&self, slugs: &[String]) -> AppResult<HashMap<String, Vec<String>>> {
        Ok(slugs
            .iter()
            .filter_map(|slug| self.genres.get(slug).map(|g| (slug.clone(), g.clone())))
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
