//! Telegram Bot API client.
//!
//! Long polling through `getUpdates`, plain and inline-keyboard messages
//! through `sendMessage`.

use super::transport::{ChatTransport, EventKind, InboundEvent};
use crate::config::TelegramConfig;
use crate::models::{ChatId, MemberId};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// An incoming update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

impl Update {
    /// Convert into an inbound event. Updates without a sender or payload
    /// yield `None`.
    pub fn to_event(&self) -> Option<InboundEvent> {
        if let Some(ref message) = self.message {
            let from = message.from.as_ref()?;
            let text = message.text.as_ref()?;
            return Some(InboundEvent {
                sender: MemberId(from.id),
                sender_name: from.first_name.clone(),
                chat: ChatId(message.chat.id),
                kind: EventKind::Text(text.clone()),
            });
        }

        let query = self.callback_query.as_ref()?;
        let data = query.data.as_ref()?;
        let chat = query
            .message
            .as_ref()
            .map(|m| ChatId(m.chat.id))
            .unwrap_or(ChatId(query.from.id));
        Some(InboundEvent {
            sender: MemberId(query.from.id),
            sender_name: query.from.first_name.clone(),
            chat,
            kind: EventKind::Choice(data.clone()),
        })
    }
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton {
    text: String,
    callback_data: String,
}

impl InlineKeyboardMarkup {
    /// One button per row; the callback carries the option label.
    fn from_choices(choices: &[String]) -> Self {
        Self {
            inline_keyboard: choices
                .iter()
                .map(|choice| {
                    vec![InlineKeyboardButton {
                        text: choice.clone(),
                        callback_data: choice.clone(),
                    }]
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQueryRequest<'a> {
    callback_query_id: &'a str,
}

/// Bot API client.
pub struct TelegramClient {
    http_client: reqwest::Client,
    base_url: String,
    poll_timeout: u64,
}

impl TelegramClient {
    /// Create a client for the bot identified by `token`.
    pub fn new(config: &TelegramConfig, token: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: format!("{}/bot{}", config.api_url.trim_end_matches('/'), token),
            poll_timeout: config.poll_timeout_seconds,
        })
    }

    /// Call a Bot API method and unwrap its result.
    async fn call<P, R>(&self, method: &str, payload: &P) -> Result<R>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);

        // Errors carry the request URL, which embeds the token.
        let response = self
            .http_client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("{} timed out", method)
                } else if e.is_connect() {
                    anyhow::anyhow!("Cannot connect to the Telegram Bot API")
                } else {
                    anyhow::anyhow!("{} failed: {}", method, e.without_url())
                }
            })?;

        let status = response.status();
        let body: ApiResponse<R> = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse {} response: {}", method, e.without_url()))?;

        if !body.ok {
            return Err(anyhow::anyhow!(
                "Telegram API error {} on {}: {}",
                status,
                method,
                body.description.unwrap_or_default()
            ));
        }

        body.result
            .ok_or_else(|| anyhow::anyhow!("{} returned no result", method))
    }

    /// Identity of the bot, used to verify the token at startup.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout,
            allowed_updates: vec!["message", "callback_query"],
        };
        let updates: Vec<Update> = self.call("getUpdates", &request).await?;
        if !updates.is_empty() {
            debug!("Received {} updates", updates.len());
        }
        Ok(updates)
    }

    /// Stop the loading indicator on a pressed button.
    pub async fn answer_callback_query(&self, id: &str) -> Result<()> {
        let request = AnswerCallbackQueryRequest {
            callback_query_id: id,
        };
        let _: bool = self.call("answerCallbackQuery", &request).await?;
        Ok(())
    }

    async fn send_message(&self, request: &SendMessageRequest<'_>) -> Result<()> {
        let _: serde_json::Value = self.call("sendMessage", request).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<()> {
        self.send_message(&SendMessageRequest {
            chat_id: chat.0,
            text,
            reply_markup: None,
        })
        .await
    }

    async fn send_text_with_choices(&self, chat: ChatId, text: &str, choices: &[String]) -> Result<()> {
        self.send_message(&SendMessageRequest {
            chat_id: chat.0,
            text,
            reply_markup: Some(InlineKeyboardMarkup::from_choices(choices)),
        })
        .await
    }
}
