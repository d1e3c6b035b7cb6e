use std::collections::HashMap;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{db::store::InteractionStore, error::AppResult, models::Movie};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the bundled schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Interaction store backed by the PostgreSQL catalog tables
#[derive(Clone)]
pub struct PgInteractionStore {
    pool: PgPool,
}

impl PgInteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InteractionStore for PgInteractionStore {
    async fn find_users_who_favorited(&self, movie_slug: &str) -> AppResult<Vec<String>> {
        let users = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT username
            FROM movie_favorites
            WHERE movie_slug = $1
            "#,
        )
        .bind(movie_slug)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_users_who_liked(&self, movie_slug: &str) -> AppResult<Vec<String>> {
        let users = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT username
            FROM movie_likes
            WHERE movie_slug = $1
            "#,
        )
        .bind(movie_slug)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn get_other_favorites(
        &self,
        username: &str,
        exclude_slugs: &[String],
    ) -> AppResult<Vec<String>> {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT movie_slug
            FROM movie_favorites
            WHERE username = $1 AND NOT (movie_slug = ANY($2))
            "#,
        )
        .bind(username)
        .bind(exclude_slugs)
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs)
    }

    async fn get_other_likes(
        &self,
        username: &str,
        exclude_slugs: &[String],
    ) -> AppResult<Vec<String>> {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT movie_slug
            FROM movie_likes
            WHERE username = $1 AND NOT (movie_slug = ANY($2))
            "#,
        )
        .bind(username)
        .bind(exclude_slugs)
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs)
    }

    async fn get_total_like_counts(&self) -> AppResult<HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT movie_slug, COUNT(DISTINCT username)
            FROM movie_likes
            GROUP BY movie_slug
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn get_movies(&self, slugs: &[String]) -> AppResult<HashMap<String, Movie>> {
        if slugs.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, Movie>(
            r#"
            SELECT slug, title, release_year, runtime, review_count, average_rating
            FROM movies
            WHERE slug = ANY($1)
            "#,
        )
        .bind(slugs)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|movie| (movie.slug.clone(), movie))
            .collect())
    }

    async fn get_genres(&self, slugs: &[String]) -> AppResult<HashMap<String, Vec<String>>> {
        if slugs.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT movie_slug, genre
            FROM movie_genres
            WHERE movie_slug = ANY($1)
            ORDER BY movie_slug, position
            "#,
        )
        .bind(slugs)
        .fetch_all(&self.pool)
        .await?;

        let mut genres: HashMap<String, Vec<String>> = HashMap::new();
        for (slug, genre) in rows {
            genres.entry(slug).or_default().push(genre);
        }

        Ok(genres)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
