use std::env;

use anyhow::{Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, SearchedUser, Session};

const DEFAULT_AUTH_URL: &str =
    "https://functions.poehali.dev/4180a42c-eacb-4992-b4dd-c3cfc8892b95";
const DEFAULT_USERS_URL: &str =
    "https://functions.poehali.dev/7b31f0ce-9f44-4dd2-a611-52e0f8a1c27d";
const DEFAULT_CHATS_URL: &str =
    "https://functions.poehali.dev/1d050145-4cf7-4100-9ec8-b27a320f4307";

#[derive(Serialize)]
struct AuthRequest<'a> {
    action: &'a str,
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    other_user_id: Option<i64>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct UsersResponse {
    users: Vec<SearchedUser>,
}

#[derive(Deserialize)]
struct ChatCreated {
    chat_id: i64,
}

#[derive(Deserialize)]
struct MessagesResponse {
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct SendAck {
    message_id: i64,
    created_at: String,
}

/// Thin client over the three remote endpoints. All persistence and identity
/// live server-side; this only shapes requests and decodes responses.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    auth_url: String,
    users_url: String,
    chats_url: String,
}

impl ApiClient {
    pub fn from_env() -> Self {
        Self {
            client: Client::new(),
            auth_url: env::var("AUTH_URL").unwrap_or(DEFAULT_AUTH_URL.to_string()),
            users_url: env::var("USERS_URL").unwrap_or(DEFAULT_USERS_URL.to_string()),
            chats_url: env::var("CHATS_URL").unwrap_or(DEFAULT_CHATS_URL.to_string()),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let request = AuthRequest {
            action: "login",
            email,
            password,
            username: None,
        };

        let response = self
            .client
            .post(&self.auth_url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response, "Check your email and password").await);
        }

        Ok(response.json().await?)
    }

    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<Session> {
        let request = AuthRequest {
            action: "register",
            email,
            password,
            username: Some(username),
        };

        let response = self
            .client
            .post(&self.auth_url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response, "Check the details you entered").await);
        }

        Ok(response.json().await?)
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<SearchedUser>> {
        let response = self
            .client
            .get(&self.users_url)
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response, "Search failed").await);
        }

        let users: UsersResponse = response.json().await?;
        Ok(users.users)
    }

    pub async fn create_or_get_chat(&self, user_id: i64, other_user_id: i64) -> Result<i64> {
        let request = ChatRequest {
            action: "create_or_get",
            chat_id: None,
            message_text: None,
            other_user_id: Some(other_user_id),
        };

        let response = self
            .client
            .post(&self.chats_url)
            .header("X-User-Id", user_id.to_string())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response, "Could not open the chat").await);
        }

        let created: ChatCreated = response.json().await?;
        Ok(created.chat_id)
    }

    pub async fn get_messages(&self, user_id: i64, chat_id: i64) -> Result<Vec<ChatMessage>> {
        let request = ChatRequest {
            action: "get_messages",
            chat_id: Some(chat_id),
            message_text: None,
            other_user_id: None,
        };

        let response = self
            .client
            .post(&self.chats_url)
            .header("X-User-Id", user_id.to_string())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response, "Could not load messages").await);
        }

        let messages: MessagesResponse = response.json().await?;
        Ok(messages.messages)
    }

    pub async fn send_message(&self, user_id: i64, chat_id: i64, text: &str) -> Result<()> {
        let request = ChatRequest {
            action: "send_message",
            chat_id: Some(chat_id),
            message_text: Some(text),
            other_user_id: None,
        };

        let response = self
            .client
            .post(&self.chats_url)
            .header("X-User-Id", user_id.to_string())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response, "Could not send the message").await);
        }

        let ack: SendAck = response.json().await?;
        log::debug!("message {} stored at {}", ack.message_id, ack.created_at);
        Ok(())
    }
}

/// Turns a non-2xx response into an error carrying the server's `error`
/// message when the body parses, the caller's fallback otherwise.
async fn rejection(response: reqwest::Response, fallback: &str) -> anyhow::Error {
    let status = response.status();
    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
        .map(|body| body.error)
        .unwrap_or_else(|| fallback.to_string());
    log::warn!("request rejected with status {}: {}", status, message);
    anyhow!(message)
}
