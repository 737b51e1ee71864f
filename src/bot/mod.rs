//! Chat-facing side of the survey bot.
//!
//! Inbound updates are parsed into events, routed through [`SurveyBot`]
//! and answered through a [`transport::ChatTransport`].

pub mod command;
pub mod handler;
pub mod poller;
pub mod replies;
pub mod telegram;
pub mod transport;

pub use handler::SurveyBot;
pub use poller::SharedBot;
pub use telegram::TelegramClient;
