// core logic - ai, red flag screening, and the chat flow that ties them up

mod ai;
mod chat;
mod history;
mod notify;
mod redflag;
mod session;

pub use ai::{Completion, DEFAULT_BASE_URL, DEFAULT_MODEL, OpenRouter, OpenRouterConfig, system_prompt};
pub use chat::{Chat, FALLBACK_REPLY, FailurePolicy, Rejected};
pub use history::{ChatTurn, History, MemoryHistory};
pub use notify::{DEFAULT_ALERT_TIMEOUT, DEFAULT_CONTACT_NAME, EmergencyAlert, LogNotifier, Notifier, WebhookNotifier};
pub use redflag::{Classification, RedFlags};
pub use session::{CheckIn, Patient, RECENT_CHECK_INS, Session, Track, UserContext};
