use crate::models::hello::{HelloResponse, Item};
use rocket::serde::json::Json;
use rocket::{get, routes};
use std::collections::BTreeMap;
use tracing::debug;

pub const HELLO_PATH: &str = "/hello";

fn sample_items() -> Vec<Item> {
    let data = BTreeMap::from([("key1", "value1"), ("key2", "value2"), ("key3", "value3")]);

    data.into_iter()
        .map(|(key, value)| Item {
            key: key.to_string(),
            value: value.to_string(),
        })
        .collect()
}

#[get("/hello")]
pub fn hello() -> Json<HelloResponse> {
    let items = sample_items();
    for (index, item) in items.iter().enumerate() {
        debug!(index, key = %item.key, value = %item.value, "hello item");
    }

    Json(HelloResponse {
        message: "Hello, World!",
        items,
    })
}

pub fn routes() -> Vec<rocket::Route> {
    routes![hello]
}
