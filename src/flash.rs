use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::constants::SESSION_MESSAGES;
use crate::error::AppError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Error,
}

impl Level {
    pub fn css_class(self) -> &'static str {
        match self {
            Level::Success => "bg-green-100 text-green-800",
            Level::Info => "bg-blue-100 text-blue-800",
            Level::Error => "bg-red-100 text-red-800",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

/// Queues a message for the next rendered page.
pub async fn push(session: &Session, level: Level, text: impl Into<String>) -> Result<(), AppError> {
    let mut messages: Vec<Message> = session.get(SESSION_MESSAGES).await?.unwrap_or_default();
    messages.push(Message {
        level,
        text: text.into(),
    });
    session.insert(SESSION_MESSAGES, messages).await?;
    Ok(())
}

pub async fn success(session: &Session, text: impl Into<String>) -> Result<(), AppError> {
    push(session, Level::Success, text).await
}

/// Drains every queued message.
pub async fn take(session: &Session) -> Result<Vec<Message>, AppError> {
    Ok(session
        .remove::<Vec<Message>>(SESSION_MESSAGES)
        .await?
        .unwrap_or_default())
}
