use crate::config::IngestConfig;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::submission::Submission;
use crate::service::submission::{WriteMode, record_submission, validate_submission};
use rocket::{State, post, routes};
use sqlx::PgPool;
use tracing::info;

pub const SUBMIT_PATH: &str = "/submit-iot-data";
pub const SUCCESS_MESSAGE: &str = "Data submission successful";

#[post("/submit-iot-data", data = "<payload>")]
pub async fn submit_iot_data(
    pool: &State<PgPool>,
    ingest: &State<IngestConfig>,
    payload: Result<JsonBody<Submission>, serde_json::Error>,
) -> Result<&'static str, AppError> {
    let submission = payload.map_err(|_| AppError::MalformedPayload)?.into_inner();
    validate_submission(&submission)?;

    let mut repo = PostgresRepository::connect(pool).await?;
    record_submission(&submission, &mut repo, WriteMode::from(ingest.inner())).await?;

    info!(
        timestamp = ?submission.timestamp,
        latitude = ?submission.location.latitude,
        longitude = ?submission.location.longitude,
        devices = ?submission.devices,
        "Received data"
    );

    Ok(SUCCESS_MESSAGE)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![submit_iot_data]
}
