use rocket::serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub key: String,
    pub value: String,
}

#[derive(Serialize, Debug)]
pub struct HelloResponse {
    pub message: &'static str,
    pub items: Vec<Item>,
}
