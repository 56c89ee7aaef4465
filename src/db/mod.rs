use crate::error::AppResult;
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};
use std::time::Duration;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub async fn init_pool(database_url: &str, max_connections: u32) -> AppResult<Pool<Postgres>> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .idle_timeout(Some(Duration::from_secs(300)))
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await?;

    Ok(pool)
}

pub async fn init_pool_default(database_url: &str) -> AppResult<Pool<Postgres>> {
    init_pool(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Creates the `users` and `consultas` tables and the unique email index.
pub async fn migrate(pool: &Pool<Postgres>) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
