// conversation history - append-only list of chat turns

use crate::Error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// One question and its answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
    pub is_red_flag: bool,
}

#[async_trait]
pub trait History: Send + Sync {
    async fn append(&self, turn: ChatTurn) -> Result<(), Error>;

    /// Turns for one user, oldest first.
    async fn for_user(&self, user_id: &str) -> Result<Vec<ChatTurn>, Error>;
}

#[derive(Default)]
pub struct MemoryHistory {
    turns: RwLock<Vec<ChatTurn>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.turns.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.turns.read().await.is_empty()
    }
}

#[async_trait]
impl History for MemoryHistory {
    async fn append(&self, turn: ChatTurn) -> Result<(), Error> {
        self.turns.write().await.push(turn);
        Ok(())
    }

    async fn for_user(&self, user_id: &str) -> Result<Vec<ChatTurn>, Error> {
        Ok(self
            .turns
            .read()
            .await
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }
}
