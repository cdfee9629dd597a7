use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{Request, catch};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Error {
    pub message: String,
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<Error> {
    Json(Error {
        message: "Not found".to_string(),
    })
}

#[catch(500)]
pub fn internal_error(req: &Request) -> Json<Error> {
    tracing::error!(method = %req.method(), uri = %req.uri(), "unhandled internal error");
    Json(Error {
        message: "Internal server error".to_string(),
    })
}
