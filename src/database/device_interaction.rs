use crate::database::postgres_repository::{PostgresRepository, is_unique_violation};
use crate::error::app_error::AppError;
use crate::models::submission::DeviceInteraction;
use chrono::{DateTime, Utc};
use sqlx::Connection;

#[async_trait::async_trait]
pub trait InteractionRepository: Send {
    async fn count_interactions(&mut self, timestamp: &DateTime<Utc>, device_id: i64) -> Result<i64, AppError>;
    /// Commits a single row on its own.
    async fn insert_interaction(&mut self, interaction: &DeviceInteraction) -> Result<(), AppError>;
    /// Commits all rows or none of them.
    async fn insert_interactions_atomic(&mut self, interactions: &[DeviceInteraction]) -> Result<(), AppError>;
}

const INSERT_INTERACTION: &str = r#"
    INSERT INTO device_interactions (timestamp, latitude, longitude, device_id, device_name)
    VALUES ($1, $2, $3, $4, $5)
"#;

fn insert_error(interaction: &DeviceInteraction, err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::AnomalyDetected
    } else {
        AppError::insert(interaction.device_id, err)
    }
}

#[async_trait::async_trait]
impl InteractionRepository for PostgresRepository {
    async fn count_interactions(&mut self, timestamp: &DateTime<Utc>, device_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM device_interactions
            WHERE timestamp = $1 AND device_id = $2
            "#,
        )
        .bind(timestamp)
        .bind(device_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }

    async fn insert_interaction(&mut self, interaction: &DeviceInteraction) -> Result<(), AppError> {
        sqlx::query(INSERT_INTERACTION)
            .bind(interaction.timestamp)
            .bind(interaction.latitude)
            .bind(interaction.longitude)
            .bind(interaction.device_id)
            .bind(&interaction.device_name)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| insert_error(interaction, e))?;

        Ok(())
    }

    async fn insert_interactions_atomic(&mut self, interactions: &[DeviceInteraction]) -> Result<(), AppError> {
        let mut tx = self.conn.begin().await.map_err(AppError::connection)?;

        for interaction in interactions {
            sqlx::query(INSERT_INTERACTION)
                .bind(interaction.timestamp)
                .bind(interaction.latitude)
                .bind(interaction.longitude)
                .bind(interaction.device_id)
                .bind(&interaction.device_name)
                .execute(&mut *tx)
                .await
                .map_err(|e| insert_error(interaction, e))?;
        }

        // Dropping `tx` on the error path above rolls the whole submission back.
        tx.commit().await.map_err(|e| match interactions.last() {
            Some(last) => insert_error(last, e),
            None => AppError::db("Failed to commit submission", e),
        })?;

        Ok(())
    }
}
