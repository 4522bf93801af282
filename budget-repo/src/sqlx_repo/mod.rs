mod candidate_repo;
mod recurring_transaction_repo;
mod tag_repo;
mod transaction_repo;
mod user_repo;

use crate::Repos;
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

pub struct SQLxRepo {
    pool: Pool<Postgres>,
}

impl SQLxRepo {
    pub fn new(pool: Pool<Postgres>) -> SQLxRepo {
        SQLxRepo { pool }
    }
}

pub async fn create_repos(database_url: String, max_pool_size: u32) -> Result<Repos, anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_pool_size)
        .connect(&database_url)
        .await
        .context("Unable to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Unable to run database migrations")?;

    Ok(Repos::from_store(Arc::new(SQLxRepo::new(pool))))
}
