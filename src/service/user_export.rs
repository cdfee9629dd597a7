use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::user::{ExportFormat, User};

pub const CSV_FILENAME: &str = "users.csv";
const CSV_HEADER: [&str; 3] = ["ID", "Name", "Email"];

/// A rendered export, ready to be written to the response.
#[derive(Debug, PartialEq, Eq)]
pub enum UserExport {
    Json(Vec<u8>),
    Csv(Vec<u8>),
}

pub async fn export_users<R>(repo: &mut R, format: ExportFormat) -> Result<UserExport, AppError>
where
    R: UserRepository + ?Sized,
{
    let users = repo.list_users().await?;
    tracing::debug!(count = users.len(), ?format, "exporting users");

    match format {
        ExportFormat::Json => render_json(&users).map(UserExport::Json),
        ExportFormat::Csv => render_csv(&users).map(UserExport::Csv),
    }
}

pub fn render_json(users: &[User]) -> Result<Vec<u8>, AppError> {
    Ok(serde_json::to_vec(users)?)
}

/// Header row followed by one record per user, built in a buffer owned by the
/// caller so concurrent exports never share state.
pub fn render_csv(users: &[User]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for user in users {
        writer.write_record([user.id.to_string().as_str(), user.name.as_str(), user.email.as_str()])?;
    }

    writer.into_inner().map_err(|e| AppError::CsvExport { source: e.into_error().into() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockRepository, sample_users};

    #[test]
    fn json_matches_expected_shape() {
        let body = render_json(&sample_users()).expect("json");
        assert_eq!(
            String::from_utf8(body).unwrap(),
            r#"[{"id":1,"name":"A","email":"a@x"},{"id":2,"name":"B","email":"b@x"}]"#
        );
    }

    #[test]
    fn json_of_empty_table_is_empty_array() {
        assert_eq!(render_json(&[]).expect("json"), b"[]".to_vec());
    }

    #[test]
    fn csv_has_header_and_one_row_per_user() {
        let body = render_csv(&sample_users()).expect("csv");
        assert_eq!(String::from_utf8(body).unwrap(), "ID,Name,Email\n1,A,a@x\n2,B,b@x\n");
    }

    #[test]
    fn csv_of_empty_table_is_header_only() {
        let body = render_csv(&[]).expect("csv");
        assert_eq!(String::from_utf8(body).unwrap(), "ID,Name,Email\n");
    }

    #[test]
    fn csv_quotes_fields_with_separators() {
        let users = vec![User {
            id: 3,
            name: "Doe, \"JD\"".to_string(),
            email: "jd@x".to_string(),
        }];
        let body = render_csv(&users).expect("csv");
        assert_eq!(String::from_utf8(body).unwrap(), "ID,Name,Email\n3,\"Doe, \"\"JD\"\"\",jd@x\n");
    }

    #[tokio::test]
    async fn export_reads_through_repository() {
        let mut repo = MockRepository {
            users: sample_users(),
            ..MockRepository::default()
        };

        let export = export_users(&mut repo, ExportFormat::Csv).await.expect("export");
        assert_eq!(export, UserExport::Csv(b"ID,Name,Email\n1,A,a@x\n2,B,b@x\n".to_vec()));
    }

    #[tokio::test]
    async fn export_surfaces_query_failure() {
        let mut repo = MockRepository {
            fail_list_users: true,
            ..MockRepository::default()
        };

        let result = export_users(&mut repo, ExportFormat::Json).await;
        assert!(matches!(result, Err(AppError::Db { .. })));
    }
}
