//! Chat transport boundary.
//!
//! Inbound chat updates arrive as [`InboundEvent`]s; the survey logic
//! answers with [`Outbound`] messages that a [`ChatTransport`] delivers.

use crate::models::{ChatId, MemberId};
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Payload of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A plain text message.
    Text(String),
    /// A pressed inline button carrying the option label.
    Choice(String),
}

/// A message or button press from a chat participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub sender: MemberId,
    pub sender_name: String,
    pub chat: ChatId,
    pub kind: EventKind,
}

impl InboundEvent {
    /// A text message sent in the sender's private chat.
    pub fn text(sender: MemberId, sender_name: &str, text: &str) -> Self {
        Self {
            sender,
            sender_name: sender_name.to_string(),
            chat: sender.into(),
            kind: EventKind::Text(text.to_string()),
        }
    }

    /// A button press in the sender's private chat.
    pub fn choice(sender: MemberId, sender_name: &str, option: &str) -> Self {
        Self {
            sender,
            sender_name: sender_name.to_string(),
            chat: sender.into(),
            kind: EventKind::Choice(option.to_string()),
        }
    }
}

/// A message to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub chat: ChatId,
    pub text: String,
    /// Option labels offered as buttons; empty for plain text.
    pub choices: Vec<String>,
}

impl Outbound {
    pub fn text(chat: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            chat: chat.into(),
            text: text.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_choices(chat: impl Into<ChatId>, text: impl Into<String>, choices: &[String]) -> Self {
        Self {
            chat: chat.into(),
            text: text.into(),
            choices: choices.to_vec(),
        }
    }
}

/// Outbound side of a chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<()>;

    async fn send_text_with_choices(&self, chat: ChatId, text: &str, choices: &[String]) -> Result<()>;
}

/// Send one message through the transport.
pub async fn deliver(transport: &dyn ChatTransport, message: &Outbound) -> Result<()> {
    if message.choices.is_empty() {
        transport.send_text(message.chat, &message.text).await
    } else {
        transport
            .send_text_with_choices(message.chat, &message.text, &message.choices)
            .await
    }
}

/// Deliver all messages, logging failures. Returns the number of failures.
///
/// Messages to the same chat keep their order; different chats are served
/// concurrently. Failures never stop the remaining deliveries.
pub async fn deliver_all(transport: &dyn ChatTransport, messages: Vec<Outbound>) -> usize {
    let mut order: HashMap<ChatId, usize> = HashMap::new();
    let mut groups: Vec<Vec<Outbound>> = Vec::new();
    for message in messages {
        let slot = *order.entry(message.chat).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(message);
    }

    let results = join_all(groups.into_iter().map(|group| async move {
        let mut failed = 0;
        for message in &group {
            match deliver(transport, message).await {
                Ok(()) => debug!("Delivered message to chat {}", message.chat),
                Err(e) => {
                    warn!("Delivery to chat {} failed: {:#}", message.chat, e);
                    failed += 1;
                }
            }
        }
        failed
    }))
    .await;

    results.into_iter().sum()
}

#[cfg(test)]
pub mod testing {
    //! In-memory transport used by tests.

    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every delivered message; chats in `unreachable` fail.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: Mutex<Vec<Outbound>>,
        pub unreachable: HashSet<ChatId>,
    }

    impl RecordingTransport {
        pub fn sent(&self) -> Vec<Outbound> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn send_text(&self, chat: ChatId, text: &str) -> Result<()> {
            self.send_text_with_choices(chat, text, &[]).await
        }

        async fn send_text_with_choices(&self, chat: ChatId, text: &str, choices: &[String]) -> Result<()> {
            if self.unreachable.contains(&chat) {
                anyhow::bail!("chat {} unreachable", chat);
            }
            self.sent
                .lock()
                .unwrap()
                .push(Outbound::with_choices(chat, text, choices));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingTransport;
    use super::*;

    #[tokio::test]
    async fn test_deliver_all_keeps_per_chat_order() {
        let transport = RecordingTransport::default();
        let messages = vec![
            Outbound::text(ChatId(1), "first"),
            Outbound::text(ChatId(2), "other"),
            Outbound::with_choices(ChatId(1), "second", &["A".to_string(), "B".to_string()]),
        ];

        let failed = deliver_all(&transport, messages).await;
        assert_eq!(failed, 0);

        let to_first: Vec<_> = transport
            .sent()
            .into_iter()
            .filter(|m| m.chat == ChatId(1))
            .collect();
        assert_eq!(to_first[0].text, "first");
        assert_eq!(to_first[1].text, "second");
        assert_eq!(to_first[1].choices, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_delivery_failures_are_counted_not_fatal() {
        let transport = RecordingTransport {
            unreachable: [ChatId(2)].into_iter().collect(),
            ..Default::default()
        };
        let messages = vec![
            Outbound::text(ChatId(2), "lost"),
            Outbound::text(ChatId(3), "kept"),
        ];

        assert_eq!(deliver_all(&transport, messages).await, 1);
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(transport.sent()[0].chat, ChatId(3));
    }

    #[test]
    fn test_deliver_picks_keyboard_only_with_choices() {
        let transport = RecordingTransport::default();
        tokio_test::block_on(deliver(&transport, &Outbound::text(ChatId(9), "plain"))).unwrap();
        assert!(transport.sent()[0].choices.is_empty());

        let failing = RecordingTransport {
            unreachable: [ChatId(9)].into_iter().collect(),
            ..Default::default()
        };
        assert!(tokio_test::block_on(deliver(&failing, &Outbound::text(ChatId(9), "x"))).is_err());
    }

    #[test]
    fn test_event_constructors_use_private_chat() {
        let event = InboundEvent::choice(MemberId(5), "Eve", "Red");
        assert_eq!(event.chat, ChatId(5));
        assert_eq!(event.kind, EventKind::Choice("Red".to_string()));
    }
}
