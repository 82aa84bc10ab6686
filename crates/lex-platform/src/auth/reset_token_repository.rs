//! Password Reset Token Repository

use bson::doc;
use mongodb::{Collection, Database};

use crate::auth::reset_token::PasswordResetToken;
use crate::shared::error::Result;

pub struct ResetTokenRepository {
    collection: Collection<PasswordResetToken>,
}

impl ResetTokenRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("password_reset_tokens"),
        }
    }

    pub async fn insert(&self, token: &PasswordResetToken) -> Result<()> {
        self.collection.insert_one(token).await?;
        Ok(())
    }

    pub async fn find_by_hash(&self, token_hash: &str) -> Result<Option<PasswordResetToken>> {
        Ok(self
            .collection
            .find_one(doc! { "tokenHash": token_hash })
            .await?)
    }

    /// Consume the token. The `used: false` filter makes this atomic; a
    /// second caller with the same token matches nothing.
    pub async fn mark_used(&self, token_hash: &str) -> Result<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "tokenHash": token_hash, "used": false },
                doc! { "$set": { "used": true } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }
}
