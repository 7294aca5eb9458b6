// who is asking - patient profile plus the bits of health data we pass along

use crate::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How many check-ins go into a request's context.
pub const RECENT_CHECK_INS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    /// phone number or email for alerts
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub condition: String,
    #[serde(default = "active")]
    pub active: bool,
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The active user and their recorded health data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub patient: Patient,
    #[serde(default)]
    pub tracks: Vec<Track>,
    /// oldest first
    #[serde(default)]
    pub check_ins: Vec<CheckIn>,
}

/// Snapshot sent alongside a question so the model can ground its answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub current_tracks: Vec<String>,
    pub recent_check_ins: Vec<CheckIn>,
    pub age: Option<u32>,
}

impl Session {
    pub fn new(patient: Patient) -> Self {
        Self {
            patient,
            tracks: Vec::new(),
            check_ins: Vec::new(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn user_id(&self) -> &str {
        &self.patient.id
    }

    pub fn record_check_in(&mut self, check_in: CheckIn) {
        self.check_ins.push(check_in);
    }

    pub fn context(&self) -> UserContext {
        let skip = self.check_ins.len().saturating_sub(RECENT_CHECK_INS);

        UserContext {
            current_tracks: self
                .tracks
                .iter()
                .filter(|t| t.active)
                .map(|t| t.condition.clone())
                .collect(),
            recent_check_ins: self.check_ins[skip..].to_vec(),
            age: self.patient.age,
        }
    }
}
