//! Messaging Repositories

use bson::doc;
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};

use crate::messaging::entity::{Conversation, Message};
use crate::shared::error::Result;

pub struct ConversationRepository {
    collection: Collection<Conversation>,
}

impl ConversationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("conversations"),
        }
    }

    pub async fn insert(&self, conversation: &Conversation) -> Result<()> {
        self.collection.insert_one(conversation).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// Existing direct conversation with exactly this 2-party set,
    /// regardless of stored order
    pub async fn find_direct(&self, participants: &[String; 2]) -> Result<Option<Conversation>> {
        Ok(self
            .collection
            .find_one(doc! {
                "type": "direct",
                "participants": {
                    "$all": [&participants[0], &participants[1]],
                    "$size": 2,
                },
            })
            .await?)
    }

    /// A user's conversations, most recent activity first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let options = FindOptions::builder().sort(doc! { "updatedAt": -1 }).build();
        let cursor = self
            .collection
            .find(doc! { "participants": user_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Record a new message: update the last-message pointer and bump
    /// every other participant's unread counter.
    pub async fn record_message(
        &self,
        conversation_id: &str,
        message_id: &str,
        sender_id: &str,
        other_participants: &[&str],
    ) -> Result<()> {
        let mut inc = bson::Document::new();
        for participant in other_participants {
            if *participant != sender_id {
                inc.insert(format!("unreadCount.{}", participant), 1);
            }
        }

        let mut update = doc! {
            "$set": {
                "lastMessage": message_id,
                "updatedAt": bson::DateTime::now(),
            }
        };
        if !inc.is_empty() {
            update.insert("$inc", inc);
        }

        self.collection
            .update_one(doc! { "_id": conversation_id }, update)
            .await?;
        Ok(())
    }

    /// Reset the caller's unread counter after reading the conversation
    pub async fn reset_unread(&self, conversation_id: &str, user_id: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": conversation_id },
                doc! { "$set": { format!("unreadCount.{}", user_id): 0 } },
            )
            .await?;
        Ok(())
    }
}

pub struct MessageRepository {
    collection: Collection<Message>,
}

impl MessageRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("messages"),
        }
    }

    pub async fn insert(&self, message: &Message) -> Result<()> {
        self.collection.insert_one(message).await?;
        Ok(())
    }

    /// Conversation history, oldest first
    pub async fn list_for_conversation(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": 1 }).build();
        let cursor = self
            .collection
            .find(doc! { "conversation": conversation_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Append a read receipt to every message the user has not read yet,
    /// the user's own messages included. The `readBy.user` filter keeps
    /// receipts idempotent.
    pub async fn mark_read(&self, conversation_id: &str, user_id: &str) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! {
                    "conversation": conversation_id,
                    "readBy.user": { "$ne": user_id },
                },
                doc! {
                    "$push": {
                        "readBy": { "user": user_id, "readAt": bson::DateTime::now() }
                    }
                },
            )
            .await?;
        Ok(result.modified_count)
    }
}
