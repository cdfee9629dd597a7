use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;

#[async_trait::async_trait]
pub trait UserRepository: Send {
    async fn list_users(&mut self) -> Result<Vec<User>, AppError>;
}

#[async_trait::async_trait]
impl UserRepository for PostgresRepository {
    async fn list_users(&mut self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id::BIGINT AS id, name::TEXT AS name, email::TEXT AS email
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(users)
    }
}
