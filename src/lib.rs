mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::db::{close_db, stage_db};
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use crate::routes::method::method_not_supported;
use rocket::http::Method;
use rocket::{Build, Rocket, catchers};
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence over the configured level, e.g.
    //   RUST_LOG=iot_intake=debug,sqlx=warn
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // A subscriber may already be installed when several instances are built
    // in one process (tests); keep the first one.
    let _ = if json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
}

fn rocket_figment(server: &config::ServerConfig) -> rocket::figment::Figment {
    rocket::Config::figment()
        .merge(("address", server.address.clone()))
        .merge(("port", server.port))
}

fn mount_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", app_routes::submission::routes())
        .mount("/", app_routes::user::routes())
        .mount("/", app_routes::hello::routes())
        .mount("/", method_not_supported(app_routes::submission::SUBMIT_PATH, Method::Post))
        .mount("/", method_not_supported(app_routes::user::USERS_PATH, Method::Get))
        .mount("/", method_not_supported(app_routes::hello::HELLO_PATH, Method::Get))
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);

    let rocket = rocket::custom(rocket_figment(&config.server))
        .attach(RequestLogger)
        .attach(stage_db(config.database.clone()))
        .attach(close_db())
        .manage(config.ingest.clone());

    mount_routes(rocket).register("/", catchers![app_routes::error::not_found, app_routes::error::internal_error])
}
