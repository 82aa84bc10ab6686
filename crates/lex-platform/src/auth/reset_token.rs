//! Password Reset Token Entity
//!
//! Single-use tokens for the forgot-password flow. Only the SHA-256 hash
//! is stored; the raw token is handed to the caller once.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::TsidGenerator;

/// Reset tokens expire after 10 minutes
const RESET_TOKEN_EXPIRY_MINUTES: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetToken {
    /// TSID as primary key
    #[serde(rename = "_id")]
    pub id: String,

    /// SHA-256 hash of the raw token (unique)
    pub token_hash: String,

    /// User this token belongs to
    pub user: String,

    /// Consumed flag; a used token never validates again
    #[serde(default)]
    pub used: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    /// TTL index target; the document is reaped at this time
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn new(token_hash: impl Into<String>, user: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            token_hash: token_hash.into(),
            user: user.into(),
            used: false,
            created_at: now,
            expires_at: now + Duration::minutes(RESET_TOKEN_EXPIRY_MINUTES),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.used && Utc::now() < self.expires_at
    }

    pub fn mark_used(&mut self) {
        self.used = true;
    }

    /// Generate a cryptographically random raw token
    pub fn generate_raw_token() -> String {
        use base64::Engine;
        use rand::Rng;

        let mut bytes = [0u8; 32];
        rand::thread_rng().fill(&mut bytes);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Hash a raw token for storage and lookup
    pub fn hash_token(raw_token: &str) -> String {
        use base64::Engine;
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(raw_token.as_bytes());
        let hash = hasher.finalize();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash)
    }

    /// Generate a (raw token, storable entity) pair
    pub fn generate_pair(user: impl Into<String>) -> (String, Self) {
        let raw = Self::generate_raw_token();
        let entity = Self::new(Self::hash_token(&raw), user);
        (raw, entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_pair() {
        let (raw, token) = PasswordResetToken::generate_pair("0USER00000001");

        assert!(!raw.is_empty());
        assert_eq!(token.user, "0USER00000001");
        assert_eq!(token.token_hash, PasswordResetToken::hash_token(&raw));
        assert!(token.is_valid());
    }

    #[test]
    fn test_used_token_is_invalid() {
        let (_, mut token) = PasswordResetToken::generate_pair("0USER00000001");
        token.mark_used();
        assert!(!token.is_valid());
    }

    #[test]
    fn test_hash_is_deterministic() {
        let raw = PasswordResetToken::generate_raw_token();
        assert_eq!(
            PasswordResetToken::hash_token(&raw),
            PasswordResetToken::hash_token(&raw)
        );

        let other = PasswordResetToken::generate_raw_token();
        assert_ne!(
            PasswordResetToken::hash_token(&raw),
            PasswordResetToken::hash_token(&other)
        );
    }
}
