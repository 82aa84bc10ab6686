//! Internship Repository

use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};

use crate::internship::entity::Internship;
use crate::shared::api_common::{escape_regex, PaginationParams};
use crate::shared::error::Result;

/// Filters for the public internship listing
#[derive(Debug, Default)]
pub struct InternshipFilter {
    pub location: Option<String>,
    pub internship_type: Option<String>,
    pub min_stipend: Option<f64>,
    pub max_stipend: Option<f64>,
    /// Free-text match over title and description
    pub query: Option<String>,
}

impl InternshipFilter {
    /// Build the MongoDB filter. Only published internships are public.
    fn to_document(&self) -> Document {
        let mut filter = doc! { "status": "published" };

        if let Some(location) = &self.location {
            filter.insert(
                "location",
                doc! { "$regex": escape_regex(location), "$options": "i" },
            );
        }
        if let Some(kind) = &self.internship_type {
            filter.insert("type", kind.as_str());
        }

        let mut stipend = Document::new();
        if let Some(min) = self.min_stipend {
            stipend.insert("$gte", min);
        }
        if let Some(max) = self.max_stipend {
            stipend.insert("$lte", max);
        }
        if !stipend.is_empty() {
            filter.insert("stipend", stipend);
        }

        if let Some(q) = &self.query {
            let pattern = escape_regex(q);
            filter.insert(
                "$or",
                vec![
                    doc! { "title": { "$regex": &pattern, "$options": "i" } },
                    doc! { "description": { "$regex": &pattern, "$options": "i" } },
                ],
            );
        }

        filter
    }
}

pub struct InternshipRepository {
    collection: Collection<Internship>,
}

impl InternshipRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("internships"),
        }
    }

    pub async fn insert(&self, internship: &Internship) -> Result<()> {
        self.collection.insert_one(internship).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Internship>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn update(&self, internship: &Internship) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &internship.id }, internship)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    /// Public listing of published internships
    pub async fn list_published(
        &self,
        filter: &InternshipFilter,
        sort: Document,
        pagination: &PaginationParams,
    ) -> Result<(Vec<Internship>, u64)> {
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

    /// An advocate's own posts, any status
    pub async fn list_for_advocate(&self, advocate_id: &str) -> Result<Vec<Internship>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self
            .collection
            .find(doc! { "advocate": advocate_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Internships an intern has applied to
    pub async fn list_applied_by(&self, intern_id: &str) -> Result<Vec<Internship>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self
            .collection
            .find(doc! { "applications.intern": intern_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Admin listing, any status
    pub async fn list_all(&self, pagination: &PaginationParams) -> Result<(Vec<Internship>, u64)> {
        let total = self.collection.count_documents(doc! {}).await?;
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(pagination.skip())
            .limit(pagination.limit() as i64)
            .build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok((cursor.try_collect().await?, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_document() {
        let filter = InternshipFilter {
            location: Some("Delhi".to_string()),
            internship_type: Some("remote".to_string()),
            min_stipend: Some(10000.0),
            max_stipend: None,
            query: None,
        };
        let doc = filter.to_document();

        assert_eq!(doc.get_str("status").ok(), Some("published"));
        assert_eq!(doc.get_str("type").ok(), Some("remote"));
        let stipend = doc.get_document("stipend").unwrap();
        assert_eq!(stipend.get_f64("$gte").ok(), Some(10000.0));
        assert!(stipend.get("$lte").is_none());
    }

    #[test]
    fn test_filter_query_spans_title_and_description() {
        let filter = InternshipFilter {
            query: Some("litigation".to_string()),
            ..Default::default()
        };
        let doc = filter.to_document();
        assert_eq!(doc.get_array("$or").unwrap().len(), 2);
    }
}
