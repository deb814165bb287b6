use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use bson::serde_helpers::uuid_1_as_binary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One account. Local accounts carry `username` + `password_hash`; federated
/// accounts carry `google_id`. The owned list and the secret are both
/// optional and created lazily.
///
/// Unset optional fields are skipped during serialization so that absence
/// checks (`$exists: false`) in the store keep working.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", with = "uuid_1_as_binary")]
    pub id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<TodoList>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn local(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: Some(username.into()),
            password_hash: Some(password_hash.into()),
            google_id: None,
            list: None,
            secret: None,
            created_at: Utc::now(),
        }
    }
}

/// The per-user todo list, embedded in the user document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoList {
    pub name: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(with = "uuid_1_as_binary")]
    pub id: Uuid,
    pub task: String,
}

impl Item {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: task.into(),
        }
    }
}

/// Seed list shown the first time a user opens `/list`. Item ids are fresh
/// per seeding; only the task texts are fixed.
pub fn default_list() -> TodoList {
    TodoList {
        name: "Your List".to_string(),
        items: vec![
            Item::new("Welcome to your todolist!"),
            Item::new("Hit + to add a new item."),
            Item::new("Hit this to complete an item."),
        ],
    }
}
