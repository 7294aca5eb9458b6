// red flag screening - spots messages that might be a medical emergency
// cheap substring matching, errs on the side of flagging

use crate::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Keyword lists that drive [`RedFlags::classify`].
///
/// Entries are stored in display case and compared lower-cased. The lists
/// can be loaded from a JSON file so they can be edited without a rebuild;
/// any list missing from the file falls back to the built-in one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedFlags {
    /// symptom phrases looked for in the user's message
    pub keywords: Vec<String>,
    /// terms that flag the turn when found in the message or the reply
    pub urgency_terms: Vec<String>,
    /// phrases that flag the turn when the model itself urges care
    pub advisory_phrases: Vec<String>,
}

/// Verdict for one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Classification {
    pub is_emergency: bool,
    /// matched keywords in configured order
    pub matches: Vec<String>,
}

const KEYWORDS: [&str; 21] = [
    "chest pain",
    "difficulty breathing",
    "severe headache",
    "sudden weakness",
    "unconscious",
    "seizure",
    "severe bleeding",
    "high fever",
    "suicidal",
    "can't breathe",
    "heart attack",
    "stroke",
    "overdose",
    "severe pain",
    "allergic reaction",
    "swelling face",
    "difficulty swallowing",
    "confusion",
    "vomiting blood",
    "severe abdominal pain",
    "loss of consciousness",
];

const URGENCY_TERMS: [&str; 3] = ["emergency", "urgent", "severe"];

const ADVISORY_PHRASES: [&str; 1] = ["seek immediate"];

impl Default for RedFlags {
    fn default() -> Self {
        Self {
            keywords: KEYWORDS.iter().map(|s| s.to_string()).collect(),
            urgency_terms: URGENCY_TERMS.iter().map(|s| s.to_string()).collect(),
            advisory_phrases: ADVISORY_PHRASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RedFlags {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn classify(&self, user_message: &str, model_reply: &str) -> Classification {
        let message = user_message.to_lowercase();
        let reply = model_reply.to_lowercase();

        let mut matches: Vec<String> = Vec::new();
        for keyword in &self.keywords {
            if contains(&message, keyword) && !matches.contains(keyword) {
                matches.push(keyword.clone());
            }
        }

        let urgent_message = self.urgency_terms.iter().any(|t| contains(&message, t));
        let urgent_reply = self
            .urgency_terms
            .iter()
            .chain(&self.advisory_phrases)
            .any(|t| contains(&reply, t));

        Classification {
            is_emergency: !matches.is_empty() || urgent_message || urgent_reply,
            matches,
        }
    }

    /// Scan of the user's message alone, for when there is no reply to look at.
    pub fn classify_message(&self, user_message: &str) -> Classification {
        self.classify(user_message, "")
    }
}

// `haystack` is already lower-cased. blank entries never match, otherwise
// an empty line in a config file would flag everything
fn contains(haystack: &str, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    !needle.trim().is_empty() && haystack.contains(&needle)
}
