// sahayak library - health questions with red flag screening

pub mod cli;
mod core;
mod error;
mod output;
mod server;

pub use crate::core::{
    Chat, ChatTurn, CheckIn, Classification, Completion, DEFAULT_ALERT_TIMEOUT, DEFAULT_BASE_URL, DEFAULT_CONTACT_NAME,
    DEFAULT_MODEL, EmergencyAlert, FALLBACK_REPLY, FailurePolicy, History, LogNotifier,
    MemoryHistory, Notifier, OpenRouter, OpenRouterConfig, Patient, RECENT_CHECK_INS, RedFlags,
    Rejected, Session, Track, UserContext, WebhookNotifier, system_prompt,
};
pub use error::Error;
pub use output::{Output, clean_response};
pub use server::Server;
