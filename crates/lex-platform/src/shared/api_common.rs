//! Common API types and utilities
//!
//! Success envelope, list pagination, and sort-string parsing shared by
//! every resource API.

use bson::{doc, Document};
use serde::{Deserialize, Serialize};

/// Query-string numbers arrive as strings once any field in the struct is
/// flattened, so numeric parameters accept both forms.
pub mod string_or_number {
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize_u32_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNum {
            Num(u32),
            Str(String),
        }

        match Option::<StringOrNum>::deserialize(deserializer)? {
            Some(StringOrNum::Num(n)) => Ok(Some(n)),
            Some(StringOrNum::Str(s)) => s.parse().map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }

    pub fn deserialize_f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNum {
            Num(f64),
            Str(String),
        }

        match Option::<StringOrNum>::deserialize(deserializer)? {
            Some(StringOrNum::Num(n)) => Ok(Some(n)),
            Some(StringOrNum::Str(s)) => s.parse().map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Success envelope: `{success: true, data, count?, pagination?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
            pagination: None,
        }
    }

    pub fn list(data: T, count: u64) -> Self {
        Self {
            success: true,
            data,
            count: Some(count),
            pagination: None,
        }
    }

    pub fn paginated(data: T, count: u64, params: &PaginationParams, total: u64) -> Self {
        Self {
            success: true,
            data,
            count: Some(count),
            pagination: Some(Pagination::compute(params, total)),
        }
    }
}

/// Acknowledgement envelope with an optional message
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// Pagination query parameters, 1-based page numbering
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "string_or_number::deserialize_u32_opt")]
    page: Option<u32>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_u32_opt")]
    limit: Option<u32>,
}

impl PaginationParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(10).max(1)
    }

    pub fn skip(&self) -> u64 {
        (self.page() as u64 - 1) * (self.limit() as u64)
    }
}

/// Next/previous page descriptors computed from the total match count
#[derive(Debug, Serialize, PartialEq)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PageRef {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn compute(params: &PaginationParams, total: u64) -> Self {
        let page = params.page();
        let limit = params.limit();
        let end = params.skip() + limit as u64;

        Self {
            next: (end < total).then_some(PageRef {
                page: page + 1,
                limit,
            }),
            prev: (page > 1).then_some(PageRef {
                page: page - 1,
                limit,
            }),
        }
    }
}

/// Parse a comma-separated sort list into a MongoDB sort document.
///
/// A leading `-` means descending, e.g. `-ratings,consultationFee`.
/// Falls back to the provided default when the parameter is absent or empty.
pub fn parse_sort(sort: Option<&str>, default: &str) -> Document {
    let spec = match sort {
        Some(s) if !s.trim().is_empty() => s,
        _ => default,
    };

    let mut doc = Document::new();
    for field in spec.split(',').map(str::trim).filter(|f| !f.is_empty()) {
        match field.strip_prefix('-') {
            Some(name) if !name.is_empty() => {
                doc.insert(name, -1);
            }
            // A bare `-` names no field; drop it
            Some(_) => {}
            None => {
                doc.insert(field, 1);
            }
        }
    }

    if doc.is_empty() {
        doc.insert("createdAt", -1);
    }
    doc
}

/// Escape user input destined for a `$regex` filter
pub fn escape_regex(input: &str) -> String {
    regex::escape(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.skip(), 0);
    }

    #[test]
    fn test_pagination_skip() {
        let params = PaginationParams::new(3, 25);
        assert_eq!(params.skip(), 50);
    }

    #[test]
    fn test_pagination_descriptors() {
        // Page 2 of 35 results at limit 10: both neighbors exist
        let p = Pagination::compute(&PaginationParams::new(2, 10), 35);
        assert_eq!(p.next, Some(PageRef { page: 3, limit: 10 }));
        assert_eq!(p.prev, Some(PageRef { page: 1, limit: 10 }));

        // First page: no prev
        let p = Pagination::compute(&PaginationParams::new(1, 10), 35);
        assert!(p.prev.is_none());
        assert!(p.next.is_some());

        // Last page: no next
        let p = Pagination::compute(&PaginationParams::new(4, 10), 35);
        assert!(p.next.is_none());

        // Single page of results
        let p = Pagination::compute(&PaginationParams::new(1, 10), 7);
        assert!(p.next.is_none());
        assert!(p.prev.is_none());
    }

    #[test]
    fn test_parse_sort() {
        let doc = parse_sort(Some("-ratings,consultationFee"), "-createdAt");
        assert_eq!(doc.get_i32("ratings").ok(), Some(-1));
        assert_eq!(doc.get_i32("consultationFee").ok(), Some(1));

        let doc = parse_sort(None, "-createdAt");
        assert_eq!(doc.get_i32("createdAt").ok(), Some(-1));

        let doc = parse_sort(Some("  "), "stipend");
        assert_eq!(doc.get_i32("stipend").ok(), Some(1));
    }

    #[test]
    fn test_parse_sort_ignores_bare_dash() {
        let doc = parse_sort(Some("-"), "-createdAt");
        assert_eq!(doc.get_i32("createdAt").ok(), Some(-1));
        assert_eq!(doc.len(), 1);

        // A bare dash among real fields is dropped, not stored as a key
        let doc = parse_sort(Some("-,stipend"), "-createdAt");
        assert_eq!(doc.get_i32("stipend").ok(), Some(1));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_string_or_number_f64() {
        #[derive(Debug, Deserialize)]
        struct Query {
            #[serde(default, deserialize_with = "string_or_number::deserialize_f64_opt")]
            fee: Option<f64>,
        }

        let q: Query = serde_json::from_str(r#"{"fee": "500.5"}"#).unwrap();
        assert_eq!(q.fee, Some(500.5));

        let q: Query = serde_json::from_str(r#"{"fee": 500.5}"#).unwrap();
        assert_eq!(q.fee, Some(500.5));

        let q: Query = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(q.fee, None);

        assert!(serde_json::from_str::<Query>(r#"{"fee": "abc"}"#).is_err());
    }

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
    }

    #[test]
    fn test_envelope_shape() {
        let resp = ApiResponse::list(vec![1, 2, 3], 3);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 3);
        assert!(json.get("pagination").is_none());
    }
}
