pub mod hello;
pub mod submission;
pub mod user;
