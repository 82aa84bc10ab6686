//! Shared Module
//!
//! Cross-cutting concerns and shared utilities.

pub mod api_common;
pub mod authorization;
pub mod error;
pub mod health_api;
pub mod indexes;
pub mod logging;
pub mod middleware;
pub mod tsid;

// Re-export commonly used items
pub use api_common::{ApiResponse, PaginationParams, SuccessResponse};
pub use authorization::{checks, AuthContext};
pub use error::{PlatformError, Result};
pub use health_api::health_router;
pub use middleware::{AppState, AuthLayer, Authenticated};
pub use tsid::TsidGenerator;
