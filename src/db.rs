use crate::config::DatabaseConfig;
use rocket::fairing::AdHoc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Builds the pool without opening a connection. The first request that needs
/// the database pays for the connect, and an unreachable server shows up as a
/// 500 on that request instead of a failed launch.
pub fn init_pool(db_config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = db_config.connect_options()?;

    Ok(PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .acquire_timeout(Duration::from_secs(db_config.acquire_timeout))
        .idle_timeout(Duration::from_secs(30))
        .max_lifetime(Duration::from_secs(1800))
        .connect_lazy_with(options))
}

pub fn stage_db(db_config: DatabaseConfig) -> AdHoc {
    AdHoc::try_on_ignite("Postgres (sqlx)", |rocket| async move {
        match init_pool(&db_config) {
            Ok(pool) => {
                tracing::info!(
                    max_connections = db_config.max_connections,
                    acquire_timeout_secs = db_config.acquire_timeout,
                    "Database pool configured"
                );
                Ok(rocket.manage(pool))
            }
            Err(e) => {
                tracing::error!("Invalid database configuration: {}", e);
                Err(rocket)
            }
        }
    })
}

pub fn close_db() -> AdHoc {
    AdHoc::on_shutdown("Postgres (sqlx) shutdown", |rocket| {
        Box::pin(async move {
            if let Some(pool) = rocket.state::<PgPool>() {
                pool.close().await;
                tracing::info!("Database pool closed");
            }
        })
    })
}
