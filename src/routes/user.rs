use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::user::ExportFormat;
use crate::service::user_export::{CSV_FILENAME, UserExport, export_users};
use rocket::http::ContentType;
use rocket::response::{self, Responder};
use rocket::{Request, Response, State, get, routes};
use sqlx::PgPool;
use std::io::Cursor;

pub const USERS_PATH: &str = "/users";

fn parse_format(format: Option<&str>) -> Result<ExportFormat, AppError> {
    format.and_then(|value| value.parse().ok()).ok_or(AppError::InvalidExportFormat)
}

/// Export the `users` table. `format` must be `json` or `csv`.
#[get("/users?<format>")]
pub async fn get_users(pool: &State<PgPool>, format: Option<&str>) -> Result<UserExport, AppError> {
    let format = parse_format(format)?;

    let mut repo = PostgresRepository::connect(pool).await?;
    export_users(&mut repo, format).await
}

impl<'r> Responder<'r, 'static> for UserExport {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        match self {
            UserExport::Json(body) => Response::build().header(ContentType::JSON).sized_body(body.len(), Cursor::new(body)).ok(),
            UserExport::Csv(body) => Response::build()
                .header(ContentType::CSV)
                .raw_header("Content-Disposition", format!("attachment; filename={}", CSV_FILENAME))
                .sized_body(body.len(), Cursor::new(body))
                .ok(),
        }
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![get_users]
}
