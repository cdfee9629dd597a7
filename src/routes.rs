pub mod error;
pub mod hello;
pub mod method;
pub mod submission;
pub mod user;
