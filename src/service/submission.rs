use crate::config::IngestConfig;
use crate::database::device_interaction::InteractionRepository;
use crate::error::app_error::{AppError, SubmissionError};
use crate::models::submission::Submission;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// All device rows of a submission commit together or not at all.
    Atomic,
    /// Each device row commits on its own; earlier rows survive a later failure.
    PerRow,
}

impl From<&IngestConfig> for WriteMode {
    fn from(config: &IngestConfig) -> Self {
        if config.transactional_writes { WriteMode::Atomic } else { WriteMode::PerRow }
    }
}

/// Checks, in order: timestamp, coordinates, device list.
///
/// A coordinate of exactly `0.0` counts as missing, so a reading taken on the
/// equator or the prime meridian is rejected.
pub fn validate_submission(submission: &Submission) -> Result<(), SubmissionError> {
    if submission.recorded_at().is_none() {
        return Err(SubmissionError::MissingTimestamp);
    }

    let latitude = submission.location.latitude.unwrap_or(0.0);
    let longitude = submission.location.longitude.unwrap_or(0.0);
    if latitude == 0.0 || longitude == 0.0 {
        return Err(SubmissionError::MissingLocation);
    }

    if submission.devices.is_empty() {
        return Err(SubmissionError::NoDevices);
    }

    Ok(())
}

/// Duplicates are the only anomaly detected today.
pub async fn has_anomalies<R>(submission: &Submission, repo: &mut R) -> bool
where
    R: InteractionRepository + ?Sized,
{
    has_duplicate_timestamp(submission, repo).await
}

/// True as soon as one device already has a row at the submission's timestamp.
/// A failed lookup also counts, so the submission is never written blind.
pub async fn has_duplicate_timestamp<R>(submission: &Submission, repo: &mut R) -> bool
where
    R: InteractionRepository + ?Sized,
{
    let Some(timestamp) = submission.recorded_at() else {
        return true;
    };

    for device in &submission.devices {
        match repo.count_interactions(&timestamp, device.id).await {
            Ok(0) => continue,
            Ok(count) => {
                debug!(device_id = device.id, %timestamp, count, "duplicate timestamp for device");
                return true;
            }
            Err(e) => {
                warn!(device_id = device.id, %timestamp, error = ?e, "duplicate check failed, treating submission as anomalous");
                return true;
            }
        }
    }

    false
}

pub async fn insert_device_interactions<R>(submission: &Submission, repo: &mut R, mode: WriteMode) -> Result<(), AppError>
where
    R: InteractionRepository + ?Sized,
{
    let interactions = submission.interactions();

    match mode {
        WriteMode::Atomic => repo.insert_interactions_atomic(&interactions).await,
        WriteMode::PerRow => {
            for interaction in &interactions {
                repo.insert_interaction(interaction).await?;
            }
            Ok(())
        }
    }
}

/// Duplicate check followed by the write. Expects a submission that already
/// passed [`validate_submission`].
pub async fn record_submission<R>(submission: &Submission, repo: &mut R, mode: WriteMode) -> Result<(), AppError>
where
    R: InteractionRepository + ?Sized,
{
    if has_anomalies(submission, repo).await {
        return Err(AppError::AnomalyDetected);
    }

    insert_device_interactions(submission, repo, mode).await
}
