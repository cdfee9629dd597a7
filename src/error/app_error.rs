use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{Request, Response};
use std::io::Cursor;
use thiserror::Error;
use tracing::{error, warn};

/// Shape problems found in a decoded submission. The messages are returned to
/// the client verbatim.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Timestamp is required")]
    MissingTimestamp,
    #[error("Latitude and Longitude are required")]
    MissingLocation,
    #[error("At least one device is required")]
    NoDevices,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error parsing request body")]
    MalformedPayload,
    #[error("{0}")]
    InvalidSubmission(#[from] SubmissionError),
    #[error("An anomaly was detected within the submission")]
    AnomalyDetected,
    #[error("Invalid or missing 'format' parameter")]
    InvalidExportFormat,
    #[error("Error connecting to the database")]
    Connection {
        #[source]
        source: sqlx::Error,
    },
    #[error("Error querying the database")]
    Db {
        message: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("Error scanning row")]
    RowDecode {
        #[source]
        source: sqlx::Error,
    },
    #[error("Error inserting data into the database")]
    Insert {
        device_id: i64,
        #[source]
        source: sqlx::Error,
    },
    #[error("Error exporting users to CSV")]
    CsvExport {
        #[source]
        source: csv::Error,
    },
    #[error("Error creating JSON response")]
    JsonEncode {
        #[source]
        source: serde_json::Error,
    },
}

impl AppError {
    pub fn db(message: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Db {
            message: message.into(),
            source,
        }
    }

    pub fn connection(source: sqlx::Error) -> Self {
        Self::Connection { source }
    }

    pub fn insert(device_id: i64, source: sqlx::Error) -> Self {
        Self::Insert { device_id, source }
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::MalformedPayload => Status::BadRequest,
            AppError::InvalidSubmission(_) => Status::BadRequest,
            AppError::AnomalyDetected => Status::BadRequest,
            AppError::InvalidExportFormat => Status::BadRequest,
            AppError::Connection { .. } => Status::InternalServerError,
            AppError::Db { .. } => Status::InternalServerError,
            AppError::RowDecode { .. } => Status::InternalServerError,
            AppError::Insert { .. } => Status::InternalServerError,
            AppError::CsvExport { .. } => Status::InternalServerError,
            AppError::JsonEncode { .. } => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        let method = req.method();
        let uri = req.uri();

        let request_id = req
            .local_cache(|| None::<crate::middleware::RequestId>)
            .as_ref()
            .map(|r| r.0.as_str())
            .unwrap_or("unknown");

        let status = Status::from(&self);

        // Client mistakes are routine; only infrastructure failures are errors.
        if status.class().is_server_error() {
            error!(
                error = ?self,
                request_id = %request_id,
                method = %method,
                uri = %uri,
                "request failed"
            );
        } else {
            warn!(
                reason = %self,
                request_id = %request_id,
                method = %method,
                uri = %uri,
                "request rejected"
            );
        }

        let body = self.to_string();

        Response::build()
            .status(status)
            .header(ContentType::Plain)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

// Acquire failures are mapped to `Connection` where the connection is taken,
// so anything arriving here happened while a query was running.
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => AppError::RowDecode { source: e },
            _ => AppError::db("Database error", e),
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::CsvExport { source: e }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::JsonEncode { source: e }
    }
}
