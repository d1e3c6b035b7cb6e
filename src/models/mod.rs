use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A movie record as stored in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Movie {
    pub slug: String,
    pub title: String,
    pub release_year: Option<i32>,
    /// Runtime in minutes
    pub runtime: Option<i32>,
    pub review_count: Option<i64>,
    pub average_rating: Option<f64>,
}

impl Movie {
    /// Creates a movie with only the required fields set
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            release_year: None,
            runtime: None,
            review_count: None,
            average_rating: None,
        }
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    pub fn with_review_count(mut self, count: i64) -> Self {
        self.review_count = Some(count);
        self
    }
}

/// Kind of interaction a user recorded for a movie
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    Favorite,
}

impl Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionKind::Like => write!(f, "like"),
            InteractionKind::Favorite => write!(f, "favorite"),
        }
    }
}

/// Identity of a single interaction event, used to count each event once
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InteractionKey {
    pub username: String,
    pub movie_slug: String,
    pub kind: InteractionKind,
}

impl InteractionKey {
    pub fn new(username: &str, movie_slug: &str, kind: InteractionKind) -> Self {
        Self {
            username: username.to_string(),
            movie_slug: movie_slug.to_string(),
            kind,
        }
    }
}

/// A recommended movie with its final score and genre tags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredMovie {
    #[serde(flatten)]
    pub movie: Movie,
    pub score: f64,
    pub genres: Vec<String>,
}

impl ScoredMovie {
    pub fn slug(&self) -> &str {
        &self.movie.slug
    }
}

/// Request body for the recommendations endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub movie_slugs: Vec<String>,
}

/// Response body for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<ScoredMovie>,
}
