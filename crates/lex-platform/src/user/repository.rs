//! User Repository

use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::options::{FindOptions, UpdateOptions};
use mongodb::{Collection, Database};
use serde::Deserialize;

use crate::shared::api_common::{escape_regex, PaginationParams};
use crate::shared::error::Result;
use crate::user::entity::{User, VerificationStatus};

/// Filters for the public advocate listing
#[derive(Debug, Default)]
pub struct AdvocateFilter {
    pub city: Option<String>,
    pub specialization: Option<String>,
    pub min_fee: Option<f64>,
    pub max_fee: Option<f64>,
    /// Free-text match over name and specialization
    pub query: Option<String>,
}

impl AdvocateFilter {
    /// Build the MongoDB filter. Only approved advocates are listed publicly.
    fn to_document(&self) -> Document {
        let mut filter = doc! {
            "role": "advocate",
            "verificationStatus": "approved",
        };

        if let Some(city) = &self.city {
            filter.insert(
                "location.city",
                doc! { "$regex": escape_regex(city), "$options": "i" },
            );
        }
        if let Some(spec) = &self.specialization {
            filter.insert(
                "specialization",
                doc! { "$regex": escape_regex(spec), "$options": "i" },
            );
        }

        let mut fee = Document::new();
        if let Some(min) = self.min_fee {
            fee.insert("$gte", min);
        }
        if let Some(max) = self.max_fee {
            fee.insert("$lte", max);
        }
        if !fee.is_empty() {
            filter.insert("consultationFee", fee);
        }

        if let Some(q) = &self.query {
            let pattern = escape_regex(q);
            filter.insert(
                "$or",
                vec![
                    doc! { "name": { "$regex": &pattern, "$options": "i" } },
                    doc! { "specialization": { "$regex": &pattern, "$options": "i" } },
                ],
            );
        }

        filter
    }
}

/// Per-role account count from the dashboard aggregation
#[derive(Debug, Deserialize)]
pub struct RoleCount {
    #[serde(rename = "_id")]
    pub role: String,
    pub count: i64,
}

/// Registrations grouped by calendar month
#[derive(Debug, Deserialize)]
pub struct MonthlyCount {
    #[serde(rename = "_id")]
    pub month: YearMonth,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: i32,
}

pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }

    pub async fn insert(&self, user: &User) -> Result<()> {
        self.collection.insert_one(user).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! { "email": email.to_lowercase() })
            .await?)
    }

    pub async fn update(&self, user: &User) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &user.id }, user)
            .await?;
        Ok(())
    }

    /// Public advocate listing with filters, sort, and pagination
    pub async fn list_advocates(
        &self,
        filter: &AdvocateFilter,
        sort: Document,
        pagination: &PaginationParams,
    ) -> Result<(Vec<User>, u64)> {
        let filter_doc = filter.to_document();
        let total = self.collection.count_documents(filter_doc.clone()).await?;

        let options = FindOptions::builder()
            .sort(sort)
            .skip(pagination.skip())
            .limit(pagination.limit() as i64)
            .build();

        let cursor = self.collection.find(filter_doc).with_options(options).await?;
        Ok((cursor.try_collect().await?, total))
    }

    /// Advocates awaiting admin review, oldest first
    pub async fn find_pending_advocates(&self) -> Result<Vec<User>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": 1 }).build();
        let cursor = self
            .collection
            .find(doc! { "role": "advocate", "verificationStatus": "pending" })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Admin listing of every account
    pub async fn list_all(&self, pagination: &PaginationParams) -> Result<(Vec<User>, u64)> {
        let total = self.collection.count_documents(doc! {}).await?;
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(pagination.skip())
            .limit(pagination.limit() as i64)
            .build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok((cursor.try_collect().await?, total))
    }

    pub async fn set_verification(&self, id: &str, status: VerificationStatus) -> Result<bool> {
        let (verified, status_str) = match status {
            VerificationStatus::Approved => (true, "approved"),
            VerificationStatus::Rejected => (false, "rejected"),
            VerificationStatus::Pending => (false, "pending"),
        };

        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "role": "advocate" },
                doc! {
                    "$set": {
                        "verified": verified,
                        "verificationStatus": status_str,
                        "updatedAt": bson::DateTime::now(),
                    }
                },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Flip a slot's booked flag after an appointment insert. Advisory only;
    /// the unique appointment index is the real double-booking guard.
    pub async fn mark_slot_booked(
        &self,
        advocate_id: &str,
        day: &str,
        start_time: &str,
        booked: bool,
    ) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": advocate_id },
                doc! { "$set": { "availability.$[d].slots.$[s].isBooked": booked } },
            )
            .with_options(
                UpdateOptions::builder()
                    .array_filters(vec![
                        doc! { "d.day": day },
                        doc! { "s.startTime": start_time },
                    ])
                    .build(),
            )
            .await?;
        Ok(())
    }

    /// Record an internship application on the intern's profile
    pub async fn add_intern_application(&self, intern_id: &str, internship_id: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": intern_id, "role": "intern" },
                doc! {
                    "$addToSet": { "applications": internship_id },
                    "$set": { "updatedAt": bson::DateTime::now() },
                },
            )
            .await?;
        Ok(())
    }

    pub async fn count_by_role(&self) -> Result<Vec<RoleCount>> {
        let pipeline = vec![doc! { "$group": { "_id": "$role", "count": { "$sum": 1 } } }];
        let mut cursor = self.collection.aggregate(pipeline).await?;

        let mut counts = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            counts.push(bson::from_document(doc)?);
        }
        Ok(counts)
    }

    pub async fn count_pending_verifications(&self) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(doc! { "role": "advocate", "verificationStatus": "pending" })
            .await?)
    }

    /// Registrations per calendar month, oldest first
    pub async fn monthly_registrations(&self) -> Result<Vec<MonthlyCount>> {
        let pipeline = vec![
            doc! {
                "$group": {
                    "_id": {
                        "year": { "$year": "$createdAt" },
                        "month": { "$month": "$createdAt" },
                    },
                    "count": { "$sum": 1 },
                }
            },
            doc! { "$sort": { "_id.year": 1, "_id.month": 1 } },
        ];
        let mut cursor = self.collection.aggregate(pipeline).await?;

        let mut counts = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            counts.push(bson::from_document(doc)?);
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advocate_filter_document() {
        let filter = AdvocateFilter {
            city: Some("Mumbai".to_string()),
            specialization: None,
            min_fee: Some(500.0),
            max_fee: Some(2000.0),
            query: None,
        };
        let doc = filter.to_document();

        assert_eq!(doc.get_str("role").ok(), Some("advocate"));
        assert_eq!(doc.get_str("verificationStatus").ok(), Some("approved"));
        let fee = doc.get_document("consultationFee").unwrap();
        assert_eq!(fee.get_f64("$gte").ok(), Some(500.0));
        assert_eq!(fee.get_f64("$lte").ok(), Some(2000.0));
    }

    #[test]
    fn test_advocate_filter_query_is_escaped() {
        let filter = AdvocateFilter {
            query: Some("a.b".to_string()),
            ..Default::default()
        };
        let doc = filter.to_document();
        let or = doc.get_array("$or").unwrap();
        let name_clause = or[0].as_document().unwrap();
        let regex = name_clause.get_document("name").unwrap();
        assert_eq!(regex.get_str("$regex").ok(), Some("a\\.b"));
    }

    #[test]
    fn test_advocate_filter_empty() {
        let doc = AdvocateFilter::default().to_document();
        assert!(doc.get("consultationFee").is_none());
        assert!(doc.get("$or").is_none());
    }
}
