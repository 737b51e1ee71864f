//! Long-polling loop.

use super::handler::SurveyBot;
use super::telegram::TelegramClient;
use super::transport::{deliver_all, ChatTransport, InboundEvent};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Survey bot shared between concurrent event handlers.
pub type SharedBot = Arc<Mutex<SurveyBot>>;

/// Handle one event and deliver its replies.
///
/// State changes happen under the lock; delivery happens after it is
/// released, so a slow chat never blocks other events. Returns the number
/// of failed deliveries.
pub async fn process_event(
    bot: &Mutex<SurveyBot>,
    transport: &dyn ChatTransport,
    event: InboundEvent,
) -> usize {
    let replies = {
        let mut bot = bot.lock().await;
        bot.handle(&event)
    };
    debug!("Event from {} produced {} replies", event.sender, replies.len());
    deliver_all(transport, replies).await
}

/// Poll for updates until Ctrl-C.
pub async fn run(bot: SharedBot, client: TelegramClient, retry_delay: Duration) -> Result<()> {
    let mut offset: Option<i64> = None;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Polling for updates");

    loop {
        let updates = tokio::select! {
            result = &mut shutdown => {
                result?;
                info!("Shutdown requested");
                return Ok(());
            }
            updates = client.get_updates(offset) => updates,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                warn!("Polling failed: {:#}. Retrying in {}s", e, retry_delay.as_secs());
                tokio::time::sleep(retry_delay).await;
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);

            if let Some(ref query) = update.callback_query {
                if let Err(e) = client.answer_callback_query(&query.id).await {
                    debug!("Failed to acknowledge button press: {:#}", e);
                }
            }

            match update.to_event() {
                Some(event) => {
                    process_event(&bot, &client, event).await;
                }
                None => debug!("Skipping update {}", update.update_id),
            }
        }
    }
}
