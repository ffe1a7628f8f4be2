// src/pipelines/signup_pipeline.rs

use crate::errors::{AppError, Result as AppResult};
use crate::models::NewUser;
use crate::pipelines::contexts::SignupCtxData;
use crate::services::{account_service, auth_service};
use ecart_flow::{ContextData, FlowRegistry, StepControl, Workflow};
use tracing::{event, info, warn, Level};

pub fn register_signup_pipeline(flows: &FlowRegistry<AppError>) {
  let mut signup = Workflow::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false, None),
    ("check_existing_user", false, None),
    ("create_user", false, None),
  ]);

  signup.on("validate_signup_input", validate_signup_input);
  signup.on("check_existing_user", check_existing_user);
  signup.on("create_user", create_user);

  flows.register(signup);
}

async fn validate_signup_input(ctx_data: ContextData<SignupCtxData>) -> AppResult<StepControl> {
  let request = ctx_data.read().request.clone();
  event!(Level::DEBUG, username = %request.username, "Validating signup input.");

  let normalized = account_service::validate_signup(&request).map_err(|err| {
    warn!(error = %err, "Signup input rejected.");
    err
  })?;
  ctx_data.write().request = normalized;
  Ok(StepControl::Continue)
}

async fn check_existing_user(ctx_data: ContextData<SignupCtxData>) -> AppResult<StepControl> {
  let (username, repos) = {
    let guard = ctx_data.read();
    (guard.request.username.clone(), guard.app_state.repos.clone())
  };

  match repos.users.find_by_username(&username).await? {
    Some(_) => {
      warn!(%username, "Signup attempted with a taken username.");
      Err(AppError::Conflict(format!("Username '{}' is already taken", username)))
    }
    None => {
      event!(Level::DEBUG, %username, "Username is available.");
      Ok(StepControl::Continue)
    }
  }
}

async fn create_user(ctx_data: ContextData<SignupCtxData>) -> AppResult<StepControl> {
  let (request, repos) = {
    let guard = ctx_data.read();
    (guard.request.clone(), guard.app_state.repos.clone())
  };

  let password_hash = auth_service::hash_password(&request.password)?;
  let user = repos
    .users
    .create(NewUser {
      username: request.username,
      password_hash,
      address: request.address,
      pincode: request.pincode,
      phone_number: request.phone_number,
      mail: request.mail,
      is_admin: false,
    })
    .await?;

  ctx_data.write().created_user_id = Some(user.id);
  info!(user_id = user.id, username = %user.username, "User created.");
  Ok(StepControl::Continue)
}
