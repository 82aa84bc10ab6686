//! Authentication
//!
//! Password hashing, JWT issuance, reset tokens, and the auth endpoints.

pub mod api;
pub mod auth_service;
pub mod password_service;
pub mod reset_token;
pub mod reset_token_repository;

pub use api::{auth_router, AuthApiState};
pub use auth_service::{AuthService, Claims};
pub use password_service::PasswordService;
pub use reset_token::PasswordResetToken;
pub use reset_token_repository::ResetTokenRepository;
