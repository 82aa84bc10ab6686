//! Auth API Endpoints
//!
//! - POST /auth/register - Create an account (client, advocate, or intern)
//! - POST /auth/login - Password-based login
//! - POST /auth/logout - Stateless acknowledgement
//! - GET /auth/me - Current user record
//! - PUT /auth/profile - Update own contact details
//! - POST /auth/forgot-password - Issue a single-use reset token
//! - PUT /auth/reset-password/:token - Consume a reset token

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::OnceLock;
use tracing::info;

use crate::auth::auth_service::AuthService;
use crate::auth::password_service::PasswordService;
use crate::auth::reset_token::PasswordResetToken;
use crate::auth::reset_token_repository::ResetTokenRepository;
use crate::shared::api_common::{ApiResponse, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::user::entity::{
    AdvocateProfile, InternEducation, InternProfile, Location, RoleProfile, User,
};
use crate::user::repository::UserRepository;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"))
}

/// Registration request. Role-specific fields are required for that role
/// and ignored otherwise.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub role: String,

    // Advocate fields
    pub specialization: Option<String>,
    pub experience: Option<u32>,
    pub bar_council_number: Option<String>,
    pub consultation_fee: Option<f64>,
    pub location: Option<Location>,

    // Intern fields
    pub education: Option<InternEducation>,
    pub resume: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

impl RegisterRequest {
    fn build_profile(&self) -> Result<RoleProfile, PlatformError> {
        match self.role.as_str() {
            "client" => Ok(RoleProfile::Client),
            "advocate" => {
                let specialization = self
                    .specialization
                    .clone()
                    .ok_or_else(|| PlatformError::validation("Please add a specialization"))?;
                let bar_council_number = self
                    .bar_council_number
                    .clone()
                    .ok_or_else(|| PlatformError::validation("Please add a bar council number"))?;
                let experience = self
                    .experience
                    .ok_or_else(|| PlatformError::validation("Please add years of experience"))?;
                let consultation_fee = self
                    .consultation_fee
                    .ok_or_else(|| PlatformError::validation("Please add a consultation fee"))?;

                let mut profile = AdvocateProfile::new(
                    specialization,
                    experience,
                    bar_council_number,
                    consultation_fee,
                );
                profile.location = self.location.clone();
                Ok(RoleProfile::Advocate(profile))
            }
            "intern" => Ok(RoleProfile::Intern(InternProfile {
                education: self.education.clone().unwrap_or_default(),
                resume: self.resume.clone(),
                skills: self.skills.clone(),
                interests: self.interests.clone(),
                applications: vec![],
            })),
            other => Err(PlatformError::validation(format!(
                "Invalid role: {}",
                other
            ))),
        }
    }

    fn validate(&self) -> Result<(), PlatformError> {
        if self.name.trim().is_empty() {
            return Err(PlatformError::validation("Please add a name"));
        }
        if !email_regex().is_match(&self.email) {
            return Err(PlatformError::validation("Please add a valid email"));
        }
        if self.phone_number.trim().is_empty() {
            return Err(PlatformError::validation("Please add a phone number"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token response for register/login/reset
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
    pub user: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// Auth service state
#[derive(Clone)]
pub struct AuthApiState {
    pub user_repo: Arc<UserRepository>,
    pub reset_token_repo: Arc<ResetTokenRepository>,
    pub auth_service: Arc<AuthService>,
    pub password_service: Arc<PasswordService>,
}

impl AuthApiState {
    fn token_response(&self, user: &User) -> Result<TokenResponse, PlatformError> {
        let token = self.auth_service.issue_token(user)?;
        Ok(TokenResponse {
            success: true,
            token,
            user: user.to_public()?,
        })
    }
}

pub async fn register(
    State(state): State<AuthApiState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), PlatformError> {
    req.validate()?;
    let profile = req.build_profile()?;

    let password_hash = state.password_service.hash_password(&req.password)?;

    if state.user_repo.find_by_email(&req.email).await?.is_some() {
        return Err(PlatformError::duplicate("User", "email"));
    }

    let user = User::new(&req.name, &req.email, password_hash, &req.phone_number, profile);

    // The unique email index is the authoritative guard; a racing insert
    // surfaces as a Duplicate error here
    state.user_repo.insert(&user).await.map_err(|e| match e {
        PlatformError::Duplicate { .. } => PlatformError::duplicate("User", "email"),
        other => other,
    })?;

    info!(user_id = %user.id, role = %user.role().as_str(), "User registered");

    Ok((StatusCode::CREATED, Json(state.token_response(&user)?)))
}

pub async fn login(
    State(state): State<AuthApiState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, PlatformError> {
    let mut user = state
        .user_repo
        .find_by_email(&req.email)
        .await?
        .ok_or(PlatformError::InvalidCredentials)?;

    let valid = state
        .password_service
        .verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(PlatformError::InvalidCredentials);
    }

    user.record_login();
    state.user_repo.update(&user).await?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(state.token_response(&user)?))
}

pub async fn logout() -> Json<SuccessResponse> {
    // Tokens are stateless; the client discards its copy
    Json(SuccessResponse::with_message("Logged out"))
}

pub async fn me(
    State(state): State<AuthApiState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<serde_json::Value>>, PlatformError> {
    let user = state
        .user_repo
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", &auth.user_id))?;

    Ok(Json(ApiResponse::new(user.to_public()?)))
}

pub async fn update_profile(
    State(state): State<AuthApiState>,
    auth: Authenticated,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, PlatformError> {
    let mut user = state
        .user_repo
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", &auth.user_id))?;

    if let Some(name) = req.name {
        user.name = name;
    }
    if let Some(email) = req.email {
        if !email_regex().is_match(&email) {
            return Err(PlatformError::validation("Please add a valid email"));
        }
        user.email = email.to_lowercase();
    }
    if let Some(phone) = req.phone_number {
        user.phone_number = phone;
    }
    user.updated_at = chrono::Utc::now();

    state.user_repo.update(&user).await.map_err(|e| match e {
        PlatformError::Duplicate { .. } => PlatformError::duplicate("User", "email"),
        other => other,
    })?;

    Ok(Json(ApiResponse::new(user.to_public()?)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenResponse {
    pub success: bool,
    /// Raw token, returned once. A deployment wires this into a mail send.
    pub reset_token: String,
}

pub async fn forgot_password(
    State(state): State<AuthApiState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ResetTokenResponse>, PlatformError> {
    let user = state
        .user_repo
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", &req.email))?;

    let (raw_token, entity) = PasswordResetToken::generate_pair(&user.id);
    state.reset_token_repo.insert(&entity).await?;

    info!(user_id = %user.id, "Password reset token issued");

    Ok(Json(ResetTokenResponse {
        success: true,
        reset_token: raw_token,
    }))
}

pub async fn reset_password(
    State(state): State<AuthApiState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<TokenResponse>, PlatformError> {
    let token_hash = PasswordResetToken::hash_token(&token);

    let stored = state
        .reset_token_repo
        .find_by_hash(&token_hash)
        .await?
        .filter(|t| t.is_valid())
        .ok_or_else(|| PlatformError::InvalidToken {
            message: "Invalid or expired reset token".to_string(),
        })?;

    let password_hash = state.password_service.hash_password(&req.password)?;

    // Consume before applying; a raced second reset with the same token
    // stops here
    let consumed = state.reset_token_repo.mark_used(&token_hash).await?;
    if !consumed {
        return Err(PlatformError::InvalidToken {
            message: "Invalid or expired reset token".to_string(),
        });
    }

    let mut user = state
        .user_repo
        .find_by_id(&stored.user)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", &stored.user))?;

    user.set_password_hash(password_hash);
    state.user_repo.update(&user).await?;

    info!(user_id = %user.id, "Password reset completed");

    Ok(Json(state.token_response(&user)?))
}

/// Create the auth router
pub fn auth_router(state: AuthApiState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/:token", put(reset_password))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request(role: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password: "secret123".to_string(),
            phone_number: "9999999999".to_string(),
            role: role.to_string(),
            specialization: None,
            experience: None,
            bar_council_number: None,
            consultation_fee: None,
            location: None,
            education: None,
            resume: None,
            skills: vec![],
            interests: vec![],
        }
    }

    #[test]
    fn test_register_validation() {
        let mut req = base_request("client");
        assert!(req.validate().is_ok());

        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());

        let mut req = base_request("client");
        req.name = "  ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_advocate_requires_role_fields() {
        let req = base_request("advocate");
        assert!(req.build_profile().is_err());

        let mut req = base_request("advocate");
        req.specialization = Some("Family Law".to_string());
        req.experience = Some(5);
        req.bar_council_number = Some("BCN-42".to_string());
        req.consultation_fee = Some(1200.0);

        match req.build_profile().unwrap() {
            RoleProfile::Advocate(p) => {
                assert_eq!(p.specialization, "Family Law");
                assert_eq!(p.consultation_fee, 1200.0);
            }
            other => panic!("Expected advocate profile, got {:?}", other),
        }
    }

    #[test]
    fn test_admin_cannot_self_register() {
        let req = base_request("admin");
        assert!(matches!(
            req.build_profile(),
            Err(PlatformError::Validation { .. })
        ));
    }

    #[test]
    fn test_intern_profile_defaults() {
        let mut req = base_request("intern");
        req.skills = vec!["research".to_string()];

        match req.build_profile().unwrap() {
            RoleProfile::Intern(p) => {
                assert_eq!(p.skills, vec!["research"]);
                assert!(p.applications.is_empty());
            }
            other => panic!("Expected intern profile, got {:?}", other),
        }
    }
}
