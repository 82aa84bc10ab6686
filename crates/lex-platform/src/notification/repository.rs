//! Notification Repository

use bson::doc;
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};

use crate::notification::entity::Notification;
use crate::shared::error::Result;

pub struct NotificationRepository {
    collection: Collection<Notification>,
}

impl NotificationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("notifications"),
        }
    }

    pub async fn insert(&self, notification: &Notification) -> Result<()> {
        self.collection.insert_one(notification).await?;
        Ok(())
    }

    /// Fan-out to multiple recipients in one write
    pub async fn insert_many(&self, notifications: &[Notification]) -> Result<()> {
        if notifications.is_empty() {
            return Ok(());
        }
        self.collection.insert_many(notifications).await?;
        Ok(())
    }

    /// A user's inbox, newest first, optionally filtered by read state
    pub async fn list_for_user(
        &self,
        user_id: &str,
        read: Option<bool>,
    ) -> Result<Vec<Notification>> {
        let mut filter = doc! { "user": user_id };
        if let Some(read) = read {
            filter.insert("read", read);
        }

        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Flip one notification to read. Owner-scoped; returns false when the
    /// notification does not exist or belongs to someone else.
    pub async fn mark_read(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "user": user_id },
                doc! { "$set": { "read": true } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Idempotent bulk flip of everything unread
    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "user": user_id, "read": false },
                doc! { "$set": { "read": true } },
            )
            .await?;
        Ok(result.modified_count)
    }

    pub async fn count_unread(&self, user_id: &str) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(doc! { "user": user_id, "read": false })
            .await?)
    }
}
