// emergency alerts - tell someone when a chat looks like an emergency

use crate::Error;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_CONTACT_NAME: &str = "Emergency Contact";

/// How long a gateway gets before an alert counts as failed.
pub const DEFAULT_ALERT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmergencyAlert {
    /// phone number or email
    pub to: String,
    pub contact_name: String,
    pub patient: String,
    pub symptoms: Vec<String>,
}

impl EmergencyAlert {
    pub fn summary(&self) -> String {
        let symptoms = if self.symptoms.is_empty() {
            "urgent symptoms".to_string()
        } else {
            self.symptoms.join(", ")
        };

        format!(
            "Emergency alert for {} ({}) about {}'s symptoms: {}",
            self.contact_name, self.to, self.patient, symptoms
        )
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &EmergencyAlert) -> Result<(), Error>;
}

/// Records alerts in the log. Used when no delivery channel is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, alert: &EmergencyAlert) -> Result<(), Error> {
        tracing::warn!(
            to = %alert.to,
            contact = %alert.contact_name,
            patient = %alert.patient,
            symptoms = ?alert.symptoms,
            "{}",
            alert.summary()
        );
        Ok(())
    }
}

/// Posts alerts as JSON to an SMS/email gateway.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    // the chat turn waits on this send
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, alert: &EmergencyAlert) -> Result<(), Error> {
        let response = self.client.post(&self.url).json(alert).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Notify(format!("gateway returned {status}")));
        }

        Ok(())
    }
}
