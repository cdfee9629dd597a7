pub mod submission;
pub mod user_export;
