//! Internship Entity
//!
//! Positions posted by advocates with applications embedded in the
//! document. Lifecycle: draft on creation, published by admin approval,
//! closed by admin rejection or once filled.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::{PlatformError, Result};
use crate::TsidGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InternshipStatus {
    Draft,
    Published,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InternshipType {
    FullTime,
    PartTime,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

/// One intern's application, embedded in the internship document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub intern: String,
    pub status: ApplicationStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Internship {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Owning advocate
    pub advocate: String,

    pub title: String,
    pub description: String,

    #[serde(default)]
    pub requirements: Vec<String>,

    /// Duration in months
    pub duration: u32,

    pub stipend: f64,
    pub location: String,

    #[serde(rename = "type")]
    pub internship_type: InternshipType,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_date: DateTime<Utc>,

    pub status: InternshipStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub application_deadline: DateTime<Utc>,

    pub number_of_openings: u32,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub applications: Vec<Application>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Internship {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        advocate: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        duration: u32,
        stipend: f64,
        location: impl Into<String>,
        internship_type: InternshipType,
        start_date: DateTime<Utc>,
        application_deadline: DateTime<Utc>,
        number_of_openings: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            advocate: advocate.into(),
            title: title.into(),
            description: description.into(),
            requirements: vec![],
            duration,
            stipend,
            location: location.into(),
            internship_type,
            start_date,
            status: InternshipStatus::Draft,
            application_deadline,
            number_of_openings,
            skills: vec![],
            applications: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn publish(&mut self) {
        self.status = InternshipStatus::Published;
        self.updated_at = Utc::now();
    }

    pub fn close(&mut self) {
        self.status = InternshipStatus::Closed;
        self.updated_at = Utc::now();
    }

    /// Admin review decision. Approval publishes, rejection closes.
    /// Drafts and already-published postings can both be reviewed, so an
    /// admin can take down a live posting. Closed is terminal.
    pub fn review(&mut self, approve: bool) -> Result<()> {
        if self.status == InternshipStatus::Closed {
            return Err(PlatformError::validation("Internship has been closed"));
        }
        if approve {
            self.publish();
        } else {
            self.close();
        }
        Ok(())
    }

    pub fn is_owned_by(&self, advocate_id: &str) -> bool {
        self.advocate == advocate_id
    }

    pub fn has_applicant(&self, intern_id: &str) -> bool {
        self.applications.iter().any(|a| a.intern == intern_id)
    }

    /// Record an application. Fails past the deadline or on a repeat
    /// application from the same intern.
    pub fn apply(&mut self, intern_id: impl Into<String>) -> Result<()> {
        let intern_id = intern_id.into();

        if Utc::now() > self.application_deadline {
            return Err(PlatformError::DeadlineExpired);
        }
        if self.has_applicant(&intern_id) {
            return Err(PlatformError::DuplicateApplication);
        }

        self.applications.push(Application {
            intern: intern_id,
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
        });
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn internship() -> Internship {
        Internship::new(
            "0ADV000000001",
            "Litigation Intern",
            "Assist with trial preparation",
            6,
            15000.0,
            "Delhi",
            InternshipType::FullTime,
            Utc::now() + Duration::days(30),
            Utc::now() + Duration::days(14),
            2,
        )
    }

    #[test]
    fn test_new_internship_is_draft() {
        let i = internship();
        assert_eq!(i.status, InternshipStatus::Draft);
        assert!(i.applications.is_empty());
    }

    #[test]
    fn test_lifecycle() {
        let mut i = internship();

        i.publish();
        assert_eq!(i.status, InternshipStatus::Published);

        i.close();
        assert_eq!(i.status, InternshipStatus::Closed);
    }

    #[test]
    fn test_review_transitions() {
        let mut i = internship();
        i.review(true).unwrap();
        assert_eq!(i.status, InternshipStatus::Published);

        // Re-approving a published posting is allowed and keeps it live
        i.review(true).unwrap();
        assert_eq!(i.status, InternshipStatus::Published);

        // Rejection takes down a published posting
        i.review(false).unwrap();
        assert_eq!(i.status, InternshipStatus::Closed);

        // Closed is terminal
        assert!(i.review(true).is_err());
        assert!(i.review(false).is_err());
    }

    #[test]
    fn test_apply() {
        let mut i = internship();

        i.apply("0INTERN000001").unwrap();
        assert_eq!(i.applications.len(), 1);
        assert_eq!(i.applications[0].status, ApplicationStatus::Pending);
        assert!(i.has_applicant("0INTERN000001"));
    }

    #[test]
    fn test_repeat_application_is_rejected() {
        let mut i = internship();
        i.apply("0INTERN000001").unwrap();

        assert!(matches!(
            i.apply("0INTERN000001"),
            Err(PlatformError::DuplicateApplication)
        ));
        assert_eq!(i.applications.len(), 1);
    }

    #[test]
    fn test_apply_past_deadline() {
        let mut i = internship();
        i.application_deadline = Utc::now() - Duration::hours(1);

        assert!(matches!(
            i.apply("0INTERN000001"),
            Err(PlatformError::DeadlineExpired)
        ));
    }

    #[test]
    fn test_type_serialization() {
        let json = serde_json::to_string(&InternshipType::PartTime).unwrap();
        assert_eq!(json, "\"part-time\"");
    }
}
