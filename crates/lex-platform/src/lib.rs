//! LexLink Platform
//!
//! Core platform for a legal services marketplace:
//! - Role-based accounts (clients, advocates, interns, admins)
//! - Advocate discovery, case requests, and slot booking
//! - Internship postings with applications and admin moderation
//! - Direct messaging with unread tracking and read receipts
//! - Per-user notifications referencing their originating entity
//! - Admin verification queue, dashboards, and analytics
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints (where the aggregate has a surface)

// Core aggregates
pub mod user;
pub mod appointment;
pub mod internship;
pub mod messaging;
pub mod notification;

// Role-scoped API surfaces
pub mod admin;
pub mod advocate;
pub mod client;
pub mod search;

// Authentication
pub mod auth;

// Shared infrastructure
pub mod shared;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};
pub use shared::tsid::TsidGenerator;

// Re-export main entity types for convenience
pub use appointment::entity::{Appointment, AppointmentStatus, AppointmentType, PaymentStatus};
pub use internship::entity::{Application, ApplicationStatus, Internship, InternshipStatus, InternshipType};
pub use messaging::entity::{Conversation, ConversationType, Message, ReadReceipt};
pub use notification::entity::{Notification, NotificationType, RelatedModel};
pub use user::entity::{
    AdvocateProfile, DayAvailability, InternProfile, Location, Role, RoleProfile, TimeSlot, User,
    VerificationStatus,
};

// Re-export repositories
pub use appointment::repository::AppointmentRepository;
pub use auth::reset_token_repository::ResetTokenRepository;
pub use internship::repository::{InternshipFilter, InternshipRepository};
pub use messaging::repository::{ConversationRepository, MessageRepository};
pub use notification::repository::NotificationRepository;
pub use user::repository::{AdvocateFilter, UserRepository};

// Re-export services
pub use auth::auth_service::{AuthService, Claims};
pub use auth::password_service::{Argon2Config, PasswordService};
pub use shared::authorization::{checks, AuthContext};

/// API state and router exports from each aggregate
pub mod api {
    pub use crate::shared::api_common::{ApiResponse, PaginationParams, SuccessResponse};
    pub use crate::shared::middleware::{AppState, AuthLayer, Authenticated};

    pub use crate::admin::api::{admin_router, AdminState};
    pub use crate::advocate::api::{advocates_router, AdvocatesState};
    pub use crate::auth::api::{auth_router, AuthApiState};
    pub use crate::client::api::{clients_router, ClientsState};
    pub use crate::internship::api::{internships_router, InternshipsState};
    pub use crate::messaging::api::{messaging_router, MessagingState};
    pub use crate::notification::api::{notifications_router, NotificationsState};
    pub use crate::search::api::{search_router, SearchState};

    pub use crate::shared::health_api::{health_router, HealthState};
}
