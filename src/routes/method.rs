use rocket::http::{Method, Status};
use rocket::route::{Handler, Outcome, Route};
use rocket::{Data, Request};

pub const METHOD_NOT_SUPPORTED_MSG: &str = "Method not supported";

const METHODS: [Method; 9] = [
    Method::Get,
    Method::Put,
    Method::Post,
    Method::Delete,
    Method::Options,
    Method::Head,
    Method::Trace,
    Method::Connect,
    Method::Patch,
];

/// Answers 405 with a plain-text body for a method the path does not serve.
#[derive(Clone, Copy)]
pub struct MethodNotSupported;

#[rocket::async_trait]
impl Handler for MethodNotSupported {
    async fn handle<'r>(&self, req: &'r Request<'_>, _data: Data<'r>) -> Outcome<'r> {
        tracing::debug!(method = %req.method(), uri = %req.uri(), "method not supported");
        Outcome::from(req, (Status::MethodNotAllowed, METHOD_NOT_SUPPORTED_MSG))
    }
}

/// 405 routes for every method other than `allowed` on `path`.
pub fn method_not_supported(path: &str, allowed: Method) -> Vec<Route> {
    METHODS
        .into_iter()
        .filter(|method| *method != allowed)
        .map(|method| Route::new(method, path, MethodNotSupported))
        .collect()
}
