//! Messaging Entities
//!
//! Conversations hold the participant set and per-user unread counters;
//! messages carry content and read receipts. Receipts are idempotent: a
//! user appears at most once per message.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::TsidGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationType {
    Direct,
    Group,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// User ids, deduplicated
    pub participants: Vec<String>,

    #[serde(rename = "type")]
    pub conversation_type: ConversationType,

    /// Id of the most recent message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,

    /// Unread message count per participant
    #[serde(default)]
    pub unread_count: HashMap<String, u32>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create from a participant set. Two participants make a direct
    /// conversation; more make a group.
    pub fn new(mut participants: Vec<String>) -> Self {
        participants.sort();
        participants.dedup();

        let conversation_type = if participants.len() == 2 {
            ConversationType::Direct
        } else {
            ConversationType::Group
        };

        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            participants,
            conversation_type,
            last_message: None,
            unread_count: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// Zero the user's unread counter
    pub fn clear_unread(&mut self, user_id: &str) {
        self.unread_count.insert(user_id.to_string(), 0);
    }

    /// Participants other than the given user
    pub fn others(&self, user_id: &str) -> Vec<&str> {
        self.participants
            .iter()
            .filter(|p| p.as_str() != user_id)
            .map(String::as_str)
            .collect()
    }
}

/// Read receipt embedded in a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub user: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub read_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub conversation: String,
    pub sender: String,
    pub content: String,

    #[serde(default)]
    pub attachments: Vec<String>,

    #[serde(default)]
    pub read_by: Vec<ReadReceipt>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        conversation: impl Into<String>,
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: TsidGenerator::generate(),
            conversation: conversation.into(),
            sender: sender.into(),
            content: content.into(),
            attachments: vec![],
            read_by: vec![],
            created_at: Utc::now(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<String>) -> Self {
        self.attachments = attachments;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_participants_make_direct() {
        let c = Conversation::new(vec!["0USERA0000001".to_string(), "0USERB0000001".to_string()]);
        assert_eq!(c.conversation_type, ConversationType::Direct);
        assert_eq!(c.participants.len(), 2);
    }

    #[test]
    fn test_three_participants_make_group() {
        let c = Conversation::new(vec![
            "0USERA0000001".to_string(),
            "0USERB0000001".to_string(),
            "0USERC0000001".to_string(),
        ]);
        assert_eq!(c.conversation_type, ConversationType::Group);
    }

    #[test]
    fn test_participants_are_deduplicated_and_sorted() {
        let c = Conversation::new(vec![
            "0USERB0000001".to_string(),
            "0USERA0000001".to_string(),
            "0USERB0000001".to_string(),
        ]);
        assert_eq!(c.participants, vec!["0USERA0000001", "0USERB0000001"]);
        assert_eq!(c.conversation_type, ConversationType::Direct);
    }

    #[test]
    fn test_clear_unread_only_touches_the_reader() {
        let mut c =
            Conversation::new(vec!["0USERA0000001".to_string(), "0USERB0000001".to_string()]);
        c.unread_count.insert("0USERA0000001".to_string(), 3);
        c.unread_count.insert("0USERB0000001".to_string(), 5);

        c.clear_unread("0USERA0000001");

        assert_eq!(c.unread_count.get("0USERA0000001"), Some(&0));
        assert_eq!(c.unread_count.get("0USERB0000001"), Some(&5));
    }

    #[test]
    fn test_membership() {
        let c = Conversation::new(vec!["0USERA0000001".to_string(), "0USERB0000001".to_string()]);
        assert!(c.is_participant("0USERA0000001"));
        assert!(!c.is_participant("0USERZ0000001"));
        assert_eq!(c.others("0USERA0000001"), vec!["0USERB0000001"]);
    }
}
