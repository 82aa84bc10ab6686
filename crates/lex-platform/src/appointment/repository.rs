//! Appointment Repository

use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};
use serde::Deserialize;

use crate::appointment::entity::{Appointment, AppointmentStatus};
use crate::shared::error::Result;

/// Aggregated money total
#[derive(Debug, Deserialize)]
struct SumResult {
    total: f64,
}

/// Appointments and revenue per calendar month
#[derive(Debug, Deserialize)]
pub struct MonthlyVolume {
    #[serde(rename = "_id")]
    pub month: MonthKey,
    pub count: i64,
    pub revenue: f64,
}

#[derive(Debug, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: i32,
}

/// Top-advocate leaderboard entry
#[derive(Debug, Deserialize)]
pub struct AdvocateVolume {
    #[serde(rename = "_id")]
    pub advocate: String,
    pub count: i64,
}

pub struct AppointmentRepository {
    collection: Collection<Appointment>,
}

impl AppointmentRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("appointments"),
        }
    }

    pub async fn insert(&self, appointment: &Appointment) -> Result<()> {
        self.collection.insert_one(appointment).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Appointment>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn update(&self, appointment: &Appointment) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &appointment.id }, appointment)
            .await?;
        Ok(())
    }

    fn scoped_filter(
        party_field: &str,
        party_id: &str,
        status: Option<AppointmentStatus>,
        date: Option<&str>,
    ) -> Document {
        let mut filter = doc! { party_field: party_id };
        if let Some(status) = status {
            filter.insert("status", status_str(status));
        }
        if let Some(date) = date {
            filter.insert("date", date);
        }
        filter
    }

    /// A client's appointments, newest date first
    pub async fn list_for_client(
        &self,
        client_id: &str,
        status: Option<AppointmentStatus>,
        date: Option<&str>,
    ) -> Result<Vec<Appointment>> {
        let filter = Self::scoped_filter("client", client_id, status, date);
        let options = FindOptions::builder()
            .sort(doc! { "date": -1, "startTime": -1 })
            .build();
        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// An advocate's appointments, newest date first
    pub async fn list_for_advocate(
        &self,
        advocate_id: &str,
        status: Option<AppointmentStatus>,
        date: Option<&str>,
    ) -> Result<Vec<Appointment>> {
        let filter = Self::scoped_filter("advocate", advocate_id, status, date);
        let options = FindOptions::builder()
            .sort(doc! { "date": -1, "startTime": -1 })
            .build();
        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Incoming case requests: an advocate's pending appointments
    pub async fn pending_for_advocate(&self, advocate_id: &str) -> Result<Vec<Appointment>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self
            .collection
            .find(doc! { "advocate": advocate_id, "status": "pending" })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_for(&self, party_field: &str, party_id: &str) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(doc! { party_field: party_id })
            .await?)
    }

    pub async fn count_with_status(
        &self,
        party_field: &str,
        party_id: &str,
        status: AppointmentStatus,
    ) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(doc! { party_field: party_id, "status": status_str(status) })
            .await?)
    }

    /// Confirmed appointments on or after the given day
    pub async fn count_upcoming(&self, party_field: &str, party_id: &str, from_date: &str) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(doc! {
                party_field: party_id,
                "status": "confirmed",
                "date": { "$gte": from_date },
            })
            .await?)
    }

    /// Appointments for the party since the given day (ISO string compare)
    pub async fn count_since(&self, party_field: &str, party_id: &str, from_date: &str) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(doc! { party_field: party_id, "date": { "$gte": from_date } })
            .await?)
    }

    /// Sum of fees with completed payment, scoped to one party
    pub async fn completed_fee_total(&self, party_field: &str, party_id: &str) -> Result<f64> {
        let pipeline = vec![
            doc! { "$match": { party_field: party_id, "paymentStatus": "completed" } },
            doc! { "$group": { "_id": null, "total": { "$sum": "$fee" } } },
        ];
        self.sum_pipeline(pipeline).await
    }

    pub async fn count_all(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    /// Platform-wide completed-payment revenue
    pub async fn total_revenue(&self) -> Result<f64> {
        let pipeline = vec![
            doc! { "$match": { "paymentStatus": "completed" } },
            doc! { "$group": { "_id": null, "total": { "$sum": "$fee" } } },
        ];
        self.sum_pipeline(pipeline).await
    }

    /// Appointment count and revenue per calendar month, oldest first
    pub async fn monthly_volume(&self) -> Result<Vec<MonthlyVolume>> {
        let pipeline = vec![
            doc! {
                "$group": {
                    "_id": {
                        "year": { "$year": "$createdAt" },
                        "month": { "$month": "$createdAt" },
                    },
                    "count": { "$sum": 1 },
                    "revenue": {
                        "$sum": {
                            "$cond": [
                                { "$eq": ["$paymentStatus", "completed"] },
                                "$fee",
                                0,
                            ]
                        }
                    },
                }
            },
            doc! { "$sort": { "_id.year": 1, "_id.month": 1 } },
        ];
        let mut cursor = self.collection.aggregate(pipeline).await?;

        let mut months = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            months.push(bson::from_document(doc)?);
        }
        Ok(months)
    }

    /// Top advocates by appointment volume
    pub async fn top_advocates(&self, limit: i64) -> Result<Vec<AdvocateVolume>> {
        let pipeline = vec![
            doc! { "$group": { "_id": "$advocate", "count": { "$sum": 1 } } },
            doc! { "$sort": { "count": -1 } },
            doc! { "$limit": limit },
        ];
        let mut cursor = self.collection.aggregate(pipeline).await?;

        let mut advocates = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            advocates.push(bson::from_document(doc)?);
        }
        Ok(advocates)
    }

    async fn sum_pipeline(&self, pipeline: Vec<Document>) -> Result<f64> {
        let mut cursor = self.collection.aggregate(pipeline).await?;
        match cursor.try_next().await? {
            Some(doc) => {
                let result: SumResult = bson::from_document(doc)?;
                Ok(result.total)
            }
            None => Ok(0.0),
        }
    }
}

fn status_str(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Pending => "pending",
        AppointmentStatus::Confirmed => "confirmed",
        AppointmentStatus::Cancelled => "cancelled",
        AppointmentStatus::Completed => "completed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_filter() {
        let filter = AppointmentRepository::scoped_filter(
            "client",
            "0CLIENT000001",
            Some(AppointmentStatus::Confirmed),
            Some("2026-03-14"),
        );
        assert_eq!(filter.get_str("client").ok(), Some("0CLIENT000001"));
        assert_eq!(filter.get_str("status").ok(), Some("confirmed"));
        assert_eq!(filter.get_str("date").ok(), Some("2026-03-14"));

        let filter = AppointmentRepository::scoped_filter("advocate", "0ADV000000001", None, None);
        assert!(filter.get("status").is_none());
        assert!(filter.get("date").is_none());
    }
}
