// src/pipelines/signin_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::SigninCtxData;
use crate::services::{auth_service, token_service};
use ecart_flow::{ContextData, FlowRegistry, StepControl, Workflow};
use tracing::{event, info, warn, Level};

pub fn register_signin_pipeline(flows: &FlowRegistry<AppError>) {
  let mut signin = Workflow::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false, None),
    ("fetch_user", false, None),
    ("verify_password", false, None),
    ("issue_token", false, None),
  ]);

  signin.on("validate_signin_input", validate_signin_input);
  signin.on("fetch_user", fetch_user);
  signin.on("verify_password", verify_password);
  signin.on("issue_token", issue_token);

  flows.register(signin);
}

async fn validate_signin_input(ctx_data: ContextData<SigninCtxData>) -> AppResult<StepControl> {
  let mut guard = ctx_data.write();
  let trimmed = guard.username.trim().to_string();
  guard.username = trimmed;
  if guard.username.is_empty() || guard.password.is_empty() {
    return Err(AppError::Validation("Username and password are required.".to_string()));
  }
  Ok(StepControl::Continue)
}

async fn fetch_user(ctx_data: ContextData<SigninCtxData>) -> AppResult<StepControl> {
  let (username, repos) = {
    let guard = ctx_data.read();
    (guard.username.clone(), guard.app_state.repos.clone())
  };

  let user = repos.users.find_by_username(&username).await?.ok_or_else(|| {
    warn!(%username, "Login attempted for an unknown username.");
    AppError::NotFound(format!("User '{}' not found", username))
  })?;
  event!(Level::DEBUG, user_id = user.id, "User found for login.");
  ctx_data.write().user = Some(user);
  Ok(StepControl::Continue)
}

async fn verify_password(ctx_data: ContextData<SigninCtxData>) -> AppResult<StepControl> {
  let guard = ctx_data.read();
  let user = guard
    .user
    .as_ref()
    .ok_or_else(|| AppError::Internal("User not loaded before password check".to_string()))?;

  if !auth_service::verify_password(&user.password, &guard.password)? {
    warn!(user_id = user.id, "Login rejected: wrong password.");
    return Err(AppError::Auth("Invalid username or password.".to_string()));
  }
  Ok(StepControl::Continue)
}

async fn issue_token(ctx_data: ContextData<SigninCtxData>) -> AppResult<StepControl> {
  let issued = {
    let guard = ctx_data.read();
    let user = guard
      .user
      .as_ref()
      .ok_or_else(|| AppError::Internal("User not loaded before token issue".to_string()))?;
    token_service::issue_token(&guard.app_state.config, user)?
  };

  info!(expires_at = %issued.expires_at, "Login succeeded.");
  ctx_data.write().token = Some(issued);
  Ok(StepControl::Continue)
}
