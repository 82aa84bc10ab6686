//! Notification Entity
//!
//! Per-user inbox entries created as side effects of domain actions.
//! An entry may reference the entity that caused it; the `onModel` tag
//! names the collection so the API can resolve the reference.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::TsidGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    Appointment,
    Message,
    CaseRequest,
    Verification,
    Internship,
    System,
}

/// Collection tag for the related entity reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelatedModel {
    Appointment,
    Internship,
    Conversation,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Recipient user id
    pub user: String,

    pub title: String,
    pub message: String,

    #[serde(rename = "type")]
    pub notification_type: NotificationType,

    #[serde(default)]
    pub read: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_model: Option<RelatedModel>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
    ) -> Self {
        Self {
            id: TsidGenerator::generate(),
            user: user.into(),
            title: title.into(),
            message: message.into(),
            notification_type,
            read: false,
            related_id: None,
            on_model: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_related(mut self, related_id: impl Into<String>, model: RelatedModel) -> Self {
        self.related_id = Some(related_id.into());
        self.on_model = Some(model);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification() {
        let n = Notification::new(
            "0USER00000001",
            "New Case Request",
            "You have a new case request",
            NotificationType::CaseRequest,
        );

        assert!(!n.read);
        assert!(n.related_id.is_none());
        assert!(n.on_model.is_none());
    }

    #[test]
    fn test_type_serialization() {
        let json = serde_json::to_string(&NotificationType::CaseRequest).unwrap();
        assert_eq!(json, "\"case-request\"");
        let json = serde_json::to_string(&NotificationType::System).unwrap();
        assert_eq!(json, "\"system\"");
    }

    #[test]
    fn test_related_reference() {
        let n = Notification::new("u", "t", "m", NotificationType::Appointment)
            .with_related("0APPT00000001", RelatedModel::Appointment);

        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["relatedId"], "0APPT00000001");
        // The tag is capitalized like a collection model name
        assert_eq!(json["onModel"], "Appointment");
    }
}
