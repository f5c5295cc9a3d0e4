//! API Client

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Who a bubble belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
    Error,
}

impl Author {
    pub fn as_str(self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Assistant => "assistant",
            Author::Error => "error",
        }
    }
}

/// Chat message for display
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Position in the transcript, used as the list key
    pub id: usize,
    pub author: Author,
    pub content: String,
    pub at: DateTime<Local>,
}

impl ChatMessage {
    pub fn new(id: usize, author: Author, content: impl Into<String>) -> Self {
        Self {
            id,
            author,
            content: content.into(),
            at: Local::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
}

#[derive(Debug, Deserialize)]
struct WelcomeReply {
    message: String,
}

/// Absolute URL for an API path on the serving origin
fn api_url(path: &str) -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into());
    format!("{}{}", origin, path)
}

/// Fetch the greeting shown before the first message
pub async fn fetch_welcome() -> Result<String, String> {
    let reply: WelcomeReply = reqwest::get(api_url("/api/welcome"))
        .await
        .map_err(|e| e.to_string())?
        .json()
        .await
        .map_err(|e| e.to_string())?;
    Ok(reply.message)
}

/// Send a chat message to the backend
pub async fn send_chat(message: &str) -> Result<String, String> {
    let client = reqwest::Client::new();

    let response = client
        .post(api_url("/api/chat"))
        .json(&serde_json::json!({ "message": message }))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        let data: ChatReply = response.json().await.map_err(|e| e.to_string())?;
        Ok(data.message)
    } else {
        match response.json::<ErrorReply>().await {
            Ok(data) => Err(data.error),
            Err(_) => Err("Request failed".into()),
        }
    }
}
