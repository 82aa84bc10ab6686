//! Appointment Entity
//!
//! Consultations booked by clients against an advocate's weekly
//! availability. Dates are stored as ISO `YYYY-MM-DD` strings so the
//! (advocate, date, startTime) unique index compares exact calendar days.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::{PlatformError, Result};
use crate::TsidGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentType {
    Consultation,
    FollowUp,
    DocumentReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub client: String,
    pub advocate: String,

    /// ISO calendar day, e.g. "2026-03-14"
    pub date: String,

    pub start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    pub status: AppointmentStatus,

    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,

    pub fee: f64,
    pub payment_status: PaymentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub documents: Vec<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(
        client: impl Into<String>,
        advocate: impl Into<String>,
        date: impl Into<String>,
        start_time: impl Into<String>,
        appointment_type: AppointmentType,
        fee: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            client: client.into(),
            advocate: advocate.into(),
            date: date.into(),
            start_time: start_time.into(),
            end_time: None,
            status: AppointmentStatus::Pending,
            appointment_type,
            fee,
            payment_status: PaymentStatus::Pending,
            notes: None,
            documents: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_end_time(mut self, end_time: impl Into<String>) -> Self {
        self.end_time = Some(end_time.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Booked directly into an open slot, so already confirmed
    pub fn confirmed(mut self) -> Self {
        self.status = AppointmentStatus::Confirmed;
        self
    }

    pub fn confirm(&mut self) {
        self.status = AppointmentStatus::Confirmed;
        self.updated_at = Utc::now();
    }

    pub fn cancel(&mut self) {
        self.status = AppointmentStatus::Cancelled;
        self.updated_at = Utc::now();
    }

    pub fn complete(&mut self) {
        self.status = AppointmentStatus::Completed;
        self.updated_at = Utc::now();
    }

    pub fn is_pending(&self) -> bool {
        self.status == AppointmentStatus::Pending
    }
}

/// Weekday name for an ISO `YYYY-MM-DD` date, matching availability entries
pub fn weekday_name(date: &str) -> Result<&'static str> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| PlatformError::validation("Date must be in YYYY-MM-DD format"))?;

    Ok(match parsed.weekday() {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_appointment_is_pending() {
        let appt = Appointment::new(
            "0CLIENT000001",
            "0ADVOCATE0001",
            "2026-03-14",
            "10:00",
            AppointmentType::Consultation,
            1500.0,
        );

        assert!(appt.is_pending());
        assert_eq!(appt.payment_status, PaymentStatus::Pending);
        assert!(appt.end_time.is_none());
    }

    #[test]
    fn test_status_transitions() {
        let mut appt = Appointment::new(
            "c",
            "a",
            "2026-03-14",
            "10:00",
            AppointmentType::Consultation,
            500.0,
        );

        appt.confirm();
        assert_eq!(appt.status, AppointmentStatus::Confirmed);

        appt.complete();
        assert_eq!(appt.status, AppointmentStatus::Completed);

        appt.cancel();
        assert_eq!(appt.status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn test_weekday_name() {
        // 2026-03-14 is a Saturday
        assert_eq!(weekday_name("2026-03-14").unwrap(), "Saturday");
        assert_eq!(weekday_name("2026-03-16").unwrap(), "Monday");
        assert!(weekday_name("14-03-2026").is_err());
        assert!(weekday_name("not-a-date").is_err());
    }

    #[test]
    fn test_type_serialization() {
        let json = serde_json::to_string(&AppointmentType::DocumentReview).unwrap();
        assert_eq!(json, "\"document-review\"");
        let json = serde_json::to_string(&AppointmentType::FollowUp).unwrap();
        assert_eq!(json, "\"follow-up\"");
    }

    #[test]
    fn test_document_field_names() {
        let appt = Appointment::new(
            "c",
            "a",
            "2026-03-14",
            "10:00",
            AppointmentType::Consultation,
            500.0,
        )
        .confirmed();

        let json = serde_json::to_value(&appt).unwrap();
        assert_eq!(json["type"], "consultation");
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["startTime"], "10:00");
        assert_eq!(json["paymentStatus"], "pending");
    }
}
