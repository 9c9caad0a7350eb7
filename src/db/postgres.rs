use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use crate::{
    error::AppResult,
    models::{Movie, MovieId, Rating, User, UserId},
    services::{MovieCatalog, UserDirectory},
};

/// Creates a PostgreSQL connection pool and applies pending migrations
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

const MOVIE_SELECT: &str = r#"
    SELECT m.id,
           m.title,
           m.release_year,
           ARRAY(SELECT g.genre FROM movie_genre g WHERE g.movie_id = m.id ORDER BY g.genre) AS genres,
           ARRAY(SELECT c.person FROM movie_cast c WHERE c.movie_id = m.id ORDER BY c.person) AS "cast"
    FROM movie m
"#;

#[derive(Debug, FromRow)]
struct MovieRow {
    id: i64,
    title: String,
    release_year: Option<i32>,
    genres: Vec<String>,
    cast: Vec<String>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            genres: row.genres,
            cast: row.cast,
            release_year: row.release_year,
        }
    }
}

/// Catalog and user directory backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MovieCatalog for PgStore {
    async fn find_movie(&self, id: MovieId) -> AppResult<Option<Movie>> {
        let query = format!("{} WHERE m.id = $1", MOVIE_SELECT);
        let row = sqlx::query_as::<_, MovieRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Movie::from))
    }

    async fn all_movies(&self) -> AppResult<Vec<Movie>> {
        let query = format!("{} ORDER BY m.id", MOVIE_SELECT);
        let rows = sqlx::query_as::<_, MovieRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    login: String,
}

#[derive(Debug, FromRow)]
struct RatingRow {
    user_id: i64,
    movie_id: i64,
    score: f64,
}

#[async_trait::async_trait]
impl UserDirectory for PgStore {
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, login FROM app_user WHERE login = $1")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| User {
            id: r.id,
            login: r.login,
        }))
    }

    async fn ratings_for(&self, user_id: UserId) -> AppResult<Vec<Rating>> {
        let rows = sqlx::query_as::<_, RatingRow>(
            "SELECT user_id, movie_id, score FROM user_rating WHERE user_id = $1 ORDER BY movie_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Rating {
                user_id: r.user_id,
                movie_id: r.movie_id,
                score: r.score,
            })
            .collect())
    }
}
