// one chat round trip - ask the model, screen for red flags, store, alert

use crate::core::ai::Completion;
use crate::core::history::{ChatTurn, History};
use crate::core::notify::{DEFAULT_CONTACT_NAME, EmergencyAlert, Notifier};
use crate::core::redflag::{Classification, RedFlags};
use crate::core::session::Session;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

pub const FALLBACK_REPLY: &str = "I apologize, but I'm currently unable to respond. Please consult with your healthcare provider if you have medical concerns.";

/// Why a send was turned away before anything happened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("message is empty")]
    EmptyMessage,

    #[error("no active session")]
    NoSession,

    #[error("a message for {0} is already being answered")]
    Busy(String),
}

/// What to flag when the completion service could not answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// never flag a turn without a real reply
    #[default]
    AssumeSafe,
    /// still screen the user's own message
    ScanMessage,
}

pub struct Chat {
    completion: Arc<dyn Completion>,
    history: Arc<dyn History>,
    notifier: Arc<dyn Notifier>,
    red_flags: RedFlags,
    on_failure: FailurePolicy,
    in_flight: Mutex<HashSet<String>>,
}

// holds a user's slot in `in_flight` until the turn is done
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    user_id: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.user_id);
    }
}

impl Chat {
    pub fn new(
        completion: Arc<dyn Completion>,
        history: Arc<dyn History>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            completion,
            history,
            notifier,
            red_flags: RedFlags::default(),
            on_failure: FailurePolicy::default(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_red_flags(mut self, red_flags: RedFlags) -> Self {
        self.red_flags = red_flags;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn red_flags(&self) -> &RedFlags {
        &self.red_flags
    }

    pub fn history(&self) -> &Arc<dyn History> {
        &self.history
    }

    pub async fn handle_turn(
        &self,
        session: Option<&Session>,
        message: &str,
    ) -> Result<ChatTurn, Rejected> {
        let message = message.trim();
        if message.is_empty() {
            tracing::debug!("ignoring empty message");
            return Err(Rejected::EmptyMessage);
        }

        let Some(session) = session else {
            tracing::debug!("ignoring message without a session");
            return Err(Rejected::NoSession);
        };

        let _slot = self.claim(session.user_id())?;

        let (response, verdict) = match self.completion.complete(message, &session.context()).await
        {
            Ok(reply) => {
                let verdict = self.red_flags.classify(message, &reply);
                (reply, verdict)
            }
            Err(e) => {
                tracing::warn!(user = %session.user_id(), error = %e, "completion failed, using fallback reply");
                let verdict = match self.on_failure {
                    FailurePolicy::AssumeSafe => Classification::default(),
                    FailurePolicy::ScanMessage => self.red_flags.classify_message(message),
                };
                (FALLBACK_REPLY.to_string(), verdict)
            }
        };

        let turn = ChatTurn {
            id: Uuid::new_v4().to_string(),
            user_id: session.user_id().to_string(),
            message: message.to_string(),
            response,
            timestamp: Utc::now(),
            is_red_flag: verdict.is_emergency,
        };

        // the caller still gets the turn if the store is down
        if let Err(e) = self.history.append(turn.clone()).await {
            tracing::error!(turn = %turn.id, error = %e, "failed to store chat turn");
        }

        if verdict.is_emergency {
            tracing::warn!(
                user = %session.user_id(),
                turn = %turn.id,
                matches = ?verdict.matches,
                "red flag detected"
            );
            self.alert(session, verdict.matches).await;
        }

        Ok(turn)
    }

    fn claim(&self, user_id: &str) -> Result<InFlight<'_>, Rejected> {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(user_id.to_string()) {
            tracing::debug!(user = %user_id, "send rejected, previous turn still running");
            return Err(Rejected::Busy(user_id.to_string()));
        }

        Ok(InFlight {
            set: &self.in_flight,
            user_id: user_id.to_string(),
        })
    }

    async fn alert(&self, session: &Session, symptoms: Vec<String>) {
        let patient = &session.patient;
        let Some(to) = patient.emergency_contact.as_deref().filter(|c| !c.trim().is_empty())
        else {
            tracing::info!(user = %patient.id, "no emergency contact configured, skipping alert");
            return;
        };

        let alert = EmergencyAlert {
            to: to.to_string(),
            contact_name: patient
                .emergency_contact_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONTACT_NAME.to_string()),
            patient: patient.name.clone(),
            symptoms,
        };

        match self.notifier.send(&alert).await {
            Ok(()) => tracing::info!(user = %patient.id, to = %alert.to, "emergency alert sent"),
            Err(e) => tracing::error!(user = %patient.id, error = %e, "emergency alert failed"),
        }
    }
}
