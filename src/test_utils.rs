use crate::database::device_interaction::InteractionRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::submission::{Device, DeviceInteraction, Location, Submission};
use crate::models::user::User;
use chrono::{DateTime, TimeZone, Utc};

pub fn sample_submission() -> Submission {
    Submission {
        timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).single(),
        location: Location {
            latitude: Some(10.0),
            longitude: Some(20.0),
        },
        devices: vec![Device {
            id: 1,
            name: "Device1".to_string(),
        }],
    }
}

pub fn submission_at(timestamp: DateTime<Utc>, device_ids: &[i64]) -> Submission {
    Submission {
        timestamp: Some(timestamp),
        devices: device_ids
            .iter()
            .map(|id| Device {
                id: *id,
                name: format!("Device{id}"),
            })
            .collect(),
        ..sample_submission()
    }
}

pub fn sample_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "A".to_string(),
            email: "a@x".to_string(),
        },
        User {
            id: 2,
            name: "B".to_string(),
            email: "b@x".to_string(),
        },
    ]
}

/// In-memory stand-in for `device_interactions` and `users` that behaves like
/// a table with a unique `(timestamp, device_id)` index.
#[derive(Default)]
pub struct MockRepository {
    pub rows: Vec<DeviceInteraction>,
    pub users: Vec<User>,
    /// Device ids passed to `count_interactions`, in call order.
    pub count_calls: Vec<i64>,
    pub fail_count_for: Option<i64>,
    pub fail_insert_for: Option<i64>,
    pub fail_list_users: bool,
}

impl MockRepository {
    fn stage(&self, rows: &mut Vec<DeviceInteraction>, interaction: &DeviceInteraction) -> Result<(), AppError> {
        if self.fail_insert_for == Some(interaction.device_id) {
            return Err(AppError::insert(interaction.device_id, sqlx::Error::Protocol("insert rejected".to_string())));
        }

        if rows
            .iter()
            .any(|row| row.timestamp == interaction.timestamp && row.device_id == interaction.device_id)
        {
            return Err(AppError::AnomalyDetected);
        }

        rows.push(interaction.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl InteractionRepository for MockRepository {
    async fn count_interactions(&mut self, timestamp: &DateTime<Utc>, device_id: i64) -> Result<i64, AppError> {
        self.count_calls.push(device_id);

        if self.fail_count_for == Some(device_id) {
            return Err(AppError::db("count failed", sqlx::Error::PoolTimedOut));
        }

        let count = self
            .rows
            .iter()
            .filter(|row| &row.timestamp == timestamp && row.device_id == device_id)
            .count();
        Ok(count as i64)
    }

    async fn insert_interaction(&mut self, interaction: &DeviceInteraction) -> Result<(), AppError> {
        let mut rows = std::mem::take(&mut self.rows);
        let result = self.stage(&mut rows, interaction);
        self.rows = rows;
        result
    }

    async fn insert_interactions_atomic(&mut self, interactions: &[DeviceInteraction]) -> Result<(), AppError> {
        let mut staged = self.rows.clone();
        for interaction in interactions {
            self.stage(&mut staged, interaction)?;
        }
        self.rows = staged;
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserRepository for MockRepository {
    async fn list_users(&mut self) -> Result<Vec<User>, AppError> {
        if self.fail_list_users {
            return Err(AppError::db("list failed", sqlx::Error::PoolClosed));
        }
        Ok(self.users.clone())
    }
}
