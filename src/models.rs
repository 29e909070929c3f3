use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub status: String,
}

/// Directory lookup hit. `online` is computed server-side from last_seen.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchedUser {
    pub id: i64,
    pub username: String,
    pub avatar_url: String,
    pub status: String,
    pub online: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub id: i64,
    pub sender_id: i64,
    pub message_text: String,
    pub created_at: String,
    pub username: String,
    pub avatar_url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}
