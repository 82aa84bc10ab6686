//! User Entity
//!
//! Single collection for every account role. The base record carries
//! identity and verification state; the role-specific payload is an
//! internally tagged sum type flattened into the document, so `role`
//! doubles as the discriminator field.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::{PlatformError, Result};
use crate::TsidGenerator;

pub const DEFAULT_AVATAR: &str = "default.jpg";

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Advocate,
    Intern,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Advocate => "advocate",
            Self::Intern => "intern",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "advocate" => Ok(Self::Advocate),
            "intern" => Ok(Self::Intern),
            "admin" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

/// Admin review state for an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Geographic location for advocate listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// [longitude, latitude]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coordinates: Vec<f64>,
}

/// One bookable slot within a weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub is_booked: bool,
}

/// Weekly availability entry: weekday name plus its slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub day: String,
    #[serde(default)]
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseLoad {
    #[serde(default)]
    pub ongoing: u32,
    #[serde(default)]
    pub completed: u32,
}

/// Advocate-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvocateProfile {
    pub specialization: String,
    /// Years of practice
    pub experience: u32,
    pub bar_council_number: String,
    pub consultation_fee: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub availability: Vec<DayAvailability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings: Option<f64>,
    #[serde(default)]
    pub rating_count: u32,
    #[serde(default)]
    pub documents: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub cases: CaseLoad,
}

impl AdvocateProfile {
    pub fn new(
        specialization: impl Into<String>,
        experience: u32,
        bar_council_number: impl Into<String>,
        consultation_fee: f64,
    ) -> Self {
        Self {
            specialization: specialization.into(),
            experience,
            bar_council_number: bar_council_number.into(),
            consultation_fee,
            location: None,
            availability: vec![],
            ratings: None,
            rating_count: 0,
            documents: vec![],
            languages: vec![],
            education: vec![],
            cases: CaseLoad::default(),
        }
    }

    /// Find an un-booked slot for the given weekday and start time
    pub fn find_open_slot(&self, day: &str, start_time: &str) -> Option<&TimeSlot> {
        self.availability
            .iter()
            .find(|d| d.day.eq_ignore_ascii_case(day))
            .and_then(|d| {
                d.slots
                    .iter()
                    .find(|s| s.start_time == start_time && !s.is_booked)
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternEducation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
}

/// Intern-specific payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternProfile {
    #[serde(default)]
    pub education: InternEducation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    /// Internship ids the intern has applied to
    #[serde(default)]
    pub applications: Vec<String>,
}

/// Role payload, discriminated by the `role` document field.
/// Role is fixed at registration and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Client,
    Admin,
    Advocate(AdvocateProfile),
    Intern(InternProfile),
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            Self::Client => Role::Client,
            Self::Admin => Role::Admin,
            Self::Advocate(_) => Role::Advocate,
            Self::Intern(_) => Role::Intern,
        }
    }
}

/// User entity, one document per account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    /// Email address (unique)
    pub email: String,

    pub password_hash: String,

    pub phone_number: String,

    #[serde(default = "default_avatar")]
    pub avatar: String,

    /// Set by registration defaults or admin review
    #[serde(default)]
    pub verified: bool,

    pub verification_status: VerificationStatus,

    #[serde(flatten)]
    pub profile: RoleProfile,

    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional"
    )]
    pub last_login_at: Option<DateTime<Utc>>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}

impl User {
    /// Create a new account. Advocates start unverified and pending admin
    /// review; every other role is active immediately.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        phone_number: impl Into<String>,
        profile: RoleProfile,
    ) -> Self {
        let now = Utc::now();
        let (verified, verification_status) = match profile.role() {
            Role::Advocate => (false, VerificationStatus::Pending),
            _ => (true, VerificationStatus::Approved),
        };

        Self {
            id: TsidGenerator::generate(),
            name: name.into(),
            email: email.into().to_lowercase(),
            password_hash: password_hash.into(),
            phone_number: phone_number.into(),
            avatar: default_avatar(),
            verified,
            verification_status,
            profile,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn is_verified_advocate(&self) -> bool {
        matches!(self.profile, RoleProfile::Advocate(_)) && self.verified
    }

    pub fn advocate_profile(&self) -> Option<&AdvocateProfile> {
        match &self.profile {
            RoleProfile::Advocate(p) => Some(p),
            _ => None,
        }
    }

    pub fn intern_profile(&self) -> Option<&InternProfile> {
        match &self.profile {
            RoleProfile::Intern(p) => Some(p),
            _ => None,
        }
    }

    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    pub fn set_password_hash(&mut self, hash: impl Into<String>) {
        self.password_hash = hash.into();
        self.updated_at = Utc::now();
    }

    /// Admin verification decision
    pub fn set_verification(&mut self, status: VerificationStatus) {
        self.verified = status == VerificationStatus::Approved;
        self.verification_status = status;
        self.updated_at = Utc::now();
    }

    /// Serialize for API responses with the password hash removed
    pub fn to_public(&self) -> Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("passwordHash");
        } else {
            return Err(PlatformError::internal("User did not serialize to an object"));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advocate() -> User {
        User::new(
            "Asha Rao",
            "ASHA@Example.com",
            "hash",
            "9999999999",
            RoleProfile::Advocate(AdvocateProfile::new("Criminal Law", 8, "BCN-1234", 1500.0)),
        )
    }

    #[test]
    fn test_registration_defaults_by_role() {
        let adv = advocate();
        assert!(!adv.verified);
        assert_eq!(adv.verification_status, VerificationStatus::Pending);
        assert_eq!(adv.role(), Role::Advocate);
        // Emails are normalized at creation
        assert_eq!(adv.email, "asha@example.com");

        let client = User::new("C", "c@example.com", "h", "1", RoleProfile::Client);
        assert!(client.verified);
        assert_eq!(client.verification_status, VerificationStatus::Approved);
        assert_eq!(client.avatar, DEFAULT_AVATAR);
    }

    #[test]
    fn test_verification_transitions() {
        let mut adv = advocate();

        adv.set_verification(VerificationStatus::Approved);
        assert!(adv.verified);
        assert!(adv.is_verified_advocate());

        adv.set_verification(VerificationStatus::Rejected);
        assert!(!adv.verified);
        assert!(!adv.is_verified_advocate());
    }

    #[test]
    fn test_find_open_slot() {
        let mut profile = AdvocateProfile::new("Tax", 3, "BCN-9", 800.0);
        profile.availability = vec![DayAvailability {
            day: "Monday".to_string(),
            slots: vec![
                TimeSlot {
                    start_time: "10:00".to_string(),
                    end_time: "11:00".to_string(),
                    is_booked: true,
                },
                TimeSlot {
                    start_time: "11:00".to_string(),
                    end_time: "12:00".to_string(),
                    is_booked: false,
                },
            ],
        }];

        assert!(profile.find_open_slot("monday", "11:00").is_some());
        // Booked slots are not offered
        assert!(profile.find_open_slot("Monday", "10:00").is_none());
        assert!(profile.find_open_slot("Tuesday", "11:00").is_none());
    }

    #[test]
    fn test_role_tag_serialization() {
        let adv = advocate();
        let json = serde_json::to_value(&adv).unwrap();
        assert_eq!(json["role"], "advocate");
        assert_eq!(json["specialization"], "Criminal Law");
        assert_eq!(json["barCouncilNumber"], "BCN-1234");

        let client = User::new("C", "c@example.com", "h", "1", RoleProfile::Client);
        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(json["role"], "client");
        assert!(json.get("specialization").is_none());
    }

    #[test]
    fn test_to_public_strips_password_hash() {
        let adv = advocate();
        let public = adv.to_public().unwrap();
        assert!(public.get("passwordHash").is_none());
        assert_eq!(public["email"], "asha@example.com");
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("advocate".parse::<Role>(), Ok(Role::Advocate));
        assert!("superuser".parse::<Role>().is_err());
    }
}
