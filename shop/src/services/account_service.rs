// src/services/account_service.rs

//! Signup, login, profile and account administration.

use crate::config::AdminSeed;
use crate::dto::{
  ChangePasswordRequest, LoginRequest, LoginResponse, SaveUserResponse, SignupRequest, UserDetailsResponse,
};
use crate::errors::{AppError, Result};
use crate::models::{NewUser, ProfilePatch, User};
use crate::pipelines::contexts::{SigninCtxData, SignupCtxData};
use crate::services::auth_service;
use crate::state::AppState;
use crate::store::Repositories;
use ecart_flow::ContextData;
use tracing::{info, instrument, warn};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Loads `user_id` and refuses blocked accounts.
pub async fn require_active_user(repos: &Repositories, user_id: i64) -> Result<User> {
  let user = repos
    .users
    .find_by_id(user_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
  if !user.active {
    warn!(user_id, "Blocked account attempted a customer operation.");
    return Err(AppError::AccountBlocked { user_id });
  }
  Ok(user)
}

fn validate_mail(mail: &str) -> Result<()> {
  let mail = mail.trim();
  if mail.is_empty() || !mail.contains('@') {
    return Err(AppError::Validation("A valid mail address is required.".to_string()));
  }
  Ok(())
}

fn validate_username(username: &str) -> Result<()> {
  if username.trim().is_empty() {
    return Err(AppError::Validation("Username is required.".to_string()));
  }
  Ok(())
}

fn validate_password(password: &str) -> Result<()> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(AppError::Validation(format!(
      "Password must be at least {} characters long.",
      MIN_PASSWORD_LEN
    )));
  }
  Ok(())
}

fn validate_positive(field: &str, value: i64) -> Result<()> {
  if value <= 0 {
    return Err(AppError::Validation(format!("{} must be a positive number.", field)));
  }
  Ok(())
}

/// Checks a signup request and returns it with text fields trimmed.
pub fn validate_signup(request: &SignupRequest) -> Result<SignupRequest> {
  validate_username(&request.username)?;
  validate_mail(&request.mail)?;
  if request.address.trim().is_empty() {
    return Err(AppError::Validation("Address is required.".to_string()));
  }
  validate_positive("Pincode", request.pincode)?;
  validate_positive("Phone number", request.phone_number)?;
  validate_password(&request.password)?;

  Ok(SignupRequest {
    username: request.username.trim().to_string(),
    password: request.password.clone(),
    address: request.address.trim().to_string(),
    pincode: request.pincode,
    phone_number: request.phone_number,
    mail: request.mail.trim().to_string(),
  })
}

fn validate_patch(patch: &ProfilePatch) -> Result<ProfilePatch> {
  if patch.is_empty() {
    return Err(AppError::Validation("Nothing to update.".to_string()));
  }
  if let Some(username) = &patch.username {
    validate_username(username)?;
  }
  if let Some(mail) = &patch.mail {
    validate_mail(mail)?;
  }
  if let Some(address) = &patch.address {
    if address.trim().is_empty() {
      return Err(AppError::Validation("Address cannot be blank.".to_string()));
    }
  }
  if let Some(pincode) = patch.pincode {
    validate_positive("Pincode", pincode)?;
  }
  if let Some(phone_number) = patch.phone_number {
    validate_positive("Phone number", phone_number)?;
  }

  Ok(ProfilePatch {
    username: patch.username.as_deref().map(|s| s.trim().to_string()),
    address: patch.address.as_deref().map(|s| s.trim().to_string()),
    pincode: patch.pincode,
    phone_number: patch.phone_number,
    mail: patch.mail.as_deref().map(|s| s.trim().to_string()),
  })
}

#[instrument(name = "account_service::signup", skip(state, request), fields(username = %request.username))]
pub async fn signup(state: &AppState, request: SignupRequest) -> Result<SaveUserResponse> {
  let ctx_data = ContextData::new(SignupCtxData::new(state.clone(), request));
  state.flows.run(ctx_data.clone()).await?;

  let user_id = ctx_data
    .read()
    .created_user_id
    .ok_or_else(|| AppError::Internal("Signup finished without creating a user".to_string()))?;
  Ok(SaveUserResponse { user_id })
}

#[instrument(name = "account_service::login", skip(state, request), fields(username = %request.username))]
pub async fn login(state: &AppState, request: LoginRequest) -> Result<LoginResponse> {
  let ctx_data = ContextData::new(SigninCtxData::new(state.clone(), request));
  state.flows.run(ctx_data.clone()).await?;

  let (user, issued) = {
    let mut guard = ctx_data.write();
    (guard.user.take(), guard.token.take())
  };
  match (user, issued) {
    (Some(user), Some(issued)) => Ok(LoginResponse {
      token: issued.token,
      expires_at: issued.expires_at,
      user_id: user.id,
      is_admin: user.is_admin,
    }),
    _ => Err(AppError::Internal("Login finished without issuing a token".to_string())),
  }
}

pub async fn get_profile(state: &AppState, user_id: i64) -> Result<UserDetailsResponse> {
  let user = require_active_user(&state.repos, user_id).await?;
  Ok(UserDetailsResponse::from(&user))
}

#[instrument(name = "account_service::update_profile", skip(state, patch))]
pub async fn update_profile(state: &AppState, user_id: i64, patch: &ProfilePatch) -> Result<UserDetailsResponse> {
  require_active_user(&state.repos, user_id).await?;
  let patch = validate_patch(patch)?;

  if let Some(username) = &patch.username {
    if let Some(other) = state.repos.users.find_by_username(username).await? {
      if other.id != user_id {
        return Err(AppError::Conflict(format!("Username '{}' is already taken", username)));
      }
    }
  }

  let user = state.repos.users.update_profile(user_id, &patch).await?;
  info!(user_id, "Profile updated.");
  Ok(UserDetailsResponse::from(&user))
}

#[instrument(name = "account_service::change_password", skip(state, request))]
pub async fn change_password(state: &AppState, user_id: i64, request: &ChangePasswordRequest) -> Result<()> {
  let user = require_active_user(&state.repos, user_id).await?;

  if request.new_password != request.confirm_password {
    return Err(AppError::Validation(
      "New password and confirmation do not match.".to_string(),
    ));
  }
  validate_password(&request.new_password)?;
  if !auth_service::verify_password(&user.password, &request.current_password)? {
    warn!(user_id, "Password change rejected: wrong current password.");
    return Err(AppError::Auth("Current password is incorrect.".to_string()));
  }

  let password_hash = auth_service::hash_password(&request.new_password)?;
  state.repos.users.update_password(user_id, &password_hash).await?;
  info!(user_id, "Password changed.");
  Ok(())
}

#[instrument(name = "account_service::set_active", skip(state))]
pub async fn set_user_active(state: &AppState, user_id: i64, active: bool) -> Result<()> {
  state.repos.users.set_active(user_id, active).await?;
  info!(user_id, active, "Account status changed.");
  Ok(())
}

pub async fn block_user(state: &AppState, user_id: i64) -> Result<()> {
  set_user_active(state, user_id, false).await
}

pub async fn unblock_user(state: &AppState, user_id: i64) -> Result<()> {
  set_user_active(state, user_id, true).await
}

pub async fn list_active_users(state: &AppState) -> Result<Vec<UserDetailsResponse>> {
  let users = state.repos.users.list_customers(true).await?;
  Ok(users.iter().map(UserDetailsResponse::from).collect())
}

pub async fn list_blocked_users(state: &AppState) -> Result<Vec<UserDetailsResponse>> {
  let users = state.repos.users.list_customers(false).await?;
  Ok(users.iter().map(UserDetailsResponse::from).collect())
}

/// Creates the configured admin account unless the username already exists.
/// Returns whether an account was created.
#[instrument(name = "account_service::ensure_admin", skip(repos, seed), fields(username = %seed.username))]
pub async fn ensure_admin(repos: &Repositories, seed: &AdminSeed) -> Result<bool> {
  let username = seed.username.trim();
  validate_username(username)?;
  validate_password(&seed.password)?;

  if let Some(existing) = repos.users.find_by_username(username).await? {
    if !existing.is_admin {
      warn!("Configured admin username belongs to a customer account; leaving it unchanged.");
    }
    return Ok(false);
  }

  let password_hash = auth_service::hash_password(&seed.password)?;
  let admin = repos
    .users
    .create(NewUser {
      username: username.to_string(),
      password_hash,
      address: String::new(),
      pincode: 0,
      phone_number: 0,
      mail: seed.mail.trim().to_string(),
      is_admin: true,
    })
    .await?;
  info!(user_id = admin.id, "Admin account created.");
  Ok(true)
}
