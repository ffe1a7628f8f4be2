// tests/account_tests.rs
mod common;

use common::*;
use ecart::config::AdminSeed;
use ecart::dto::{ChangePasswordRequest, LoginRequest};
use ecart::errors::AppError;
use ecart::models::ProfilePatch;
use ecart::services::{account_service, token_service};
use serial_test::serial;

fn login_request(username: &str, password: &str) -> LoginRequest {
  LoginRequest {
    username: username.to_string(),
    password: password.to_string(),
  }
}

#[tokio::test]
#[serial]
async fn test_signup_then_login_issues_verifiable_token() {
  let state = memory_state();
  let user_id = create_customer(&state, "alice").await;

  let login = account_service::login(&state, login_request(" alice ", TEST_PASSWORD)).await.unwrap();
  assert_eq!(login.user_id, user_id);
  assert!(!login.is_admin);

  let claims = token_service::decode_token(TEST_SECRET, &login.token).unwrap();
  assert_eq!(claims.user_id, user_id);
  assert_eq!(claims.username, "alice");
  assert_eq!(claims.exp, login.expires_at.timestamp());
}

#[tokio::test]
#[serial]
async fn test_signup_rejects_duplicates_and_invalid_input() {
  let state = memory_state();
  create_customer(&state, "bob").await;

  let duplicate = account_service::signup(&state, signup_request("bob")).await.unwrap_err();
  assert!(matches!(duplicate, AppError::Conflict(_)));

  let mut bad = signup_request("carol");
  bad.mail = "no-at-sign".to_string();
  assert!(matches!(
    account_service::signup(&state, bad).await,
    Err(AppError::Validation(_))
  ));
  assert!(account_service::list_active_users(&state).await.unwrap().len() == 1);
}

#[tokio::test]
#[serial]
async fn test_login_failures() {
  let state = memory_state();
  create_customer(&state, "dave").await;

  let wrong = account_service::login(&state, login_request("dave", "not-the-password")).await;
  assert!(matches!(wrong, Err(AppError::Auth(_))));
  let unknown = account_service::login(&state, login_request("nobody", TEST_PASSWORD)).await;
  assert!(matches!(unknown, Err(AppError::NotFound(_))));
  let blank = account_service::login(&state, login_request("  ", "")).await;
  assert!(matches!(blank, Err(AppError::Validation(_))));
}

#[tokio::test]
#[serial]
async fn test_change_password_flow() {
  let state = memory_state();
  let user_id = create_customer(&state, "erin").await;

  let mismatch = ChangePasswordRequest {
    current_password: TEST_PASSWORD.to_string(),
    new_password: "brand-new-pass".to_string(),
    confirm_password: "different-pass".to_string(),
  };
  assert!(matches!(
    account_service::change_password(&state, user_id, &mismatch).await,
    Err(AppError::Validation(_))
  ));

  let wrong_current = ChangePasswordRequest {
    current_password: "guess-guess".to_string(),
    new_password: "brand-new-pass".to_string(),
    confirm_password: "brand-new-pass".to_string(),
  };
  assert!(matches!(
    account_service::change_password(&state, user_id, &wrong_current).await,
    Err(AppError::Auth(_))
  ));

  let valid = ChangePasswordRequest {
    current_password: TEST_PASSWORD.to_string(),
    new_password: "brand-new-pass".to_string(),
    confirm_password: "brand-new-pass".to_string(),
  };
  account_service::change_password(&state, user_id, &valid).await.unwrap();

  assert!(account_service::login(&state, login_request("erin", "brand-new-pass")).await.is_ok());
  assert!(matches!(
    account_service::login(&state, login_request("erin", TEST_PASSWORD)).await,
    Err(AppError::Auth(_))
  ));
}

#[tokio::test]
#[serial]
async fn test_profile_update_checks_username_uniqueness() {
  let state = memory_state();
  create_customer(&state, "frank").await;
  let user_id = create_customer(&state, "gina").await;

  let taken = ProfilePatch {
    username: Some("frank".to_string()),
    ..Default::default()
  };
  assert!(matches!(
    account_service::update_profile(&state, user_id, &taken).await,
    Err(AppError::Conflict(_))
  ));
  assert!(matches!(
    account_service::update_profile(&state, user_id, &ProfilePatch::default()).await,
    Err(AppError::Validation(_))
  ));

  let patch = ProfilePatch {
    address: Some("99 Harbour Lane".to_string()),
    pincode: Some(400001),
    ..Default::default()
  };
  let updated = account_service::update_profile(&state, user_id, &patch).await.unwrap();
  assert_eq!(updated.address, "99 Harbour Lane");
  assert_eq!(updated.pincode, 400001);
  assert_eq!(updated.username, "gina");

  let profile = account_service::get_profile(&state, user_id).await.unwrap();
  assert_eq!(profile.address, "99 Harbour Lane");
}

#[tokio::test]
#[serial]
async fn test_block_and_unblock_move_users_between_lists() {
  let state = memory_state();
  let kept = create_customer(&state, "henry").await;
  let blocked = create_customer(&state, "iris").await;

  account_service::block_user(&state, blocked).await.unwrap();
  let active = account_service::list_active_users(&state).await.unwrap();
  let inactive = account_service::list_blocked_users(&state).await.unwrap();
  assert_eq!(active.iter().map(|u| u.user_id).collect::<Vec<_>>(), vec![kept]);
  assert_eq!(inactive.iter().map(|u| u.user_id).collect::<Vec<_>>(), vec![blocked]);

  assert!(matches!(
    account_service::get_profile(&state, blocked).await,
    Err(AppError::AccountBlocked { .. })
  ));
  // Blocked accounts can still sign in; every customer operation refuses them.
  assert!(account_service::login(&state, login_request("iris", TEST_PASSWORD)).await.is_ok());

  account_service::unblock_user(&state, blocked).await.unwrap();
  assert!(account_service::list_blocked_users(&state).await.unwrap().is_empty());
  assert!(matches!(
    account_service::block_user(&state, 9_999).await,
    Err(AppError::NotFound(_))
  ));
}

#[tokio::test]
#[serial]
async fn test_admin_seed_is_idempotent_and_hidden_from_customer_lists() {
  let state = memory_state();
  let seed = AdminSeed {
    username: "root".to_string(),
    password: "root-password-1".to_string(),
    mail: "root@example.com".to_string(),
  };

  assert!(account_service::ensure_admin(&state.repos, &seed).await.unwrap());
  assert!(!account_service::ensure_admin(&state.repos, &seed).await.unwrap());

  let login = account_service::login(&state, login_request("root", "root-password-1")).await.unwrap();
  assert!(login.is_admin);
  assert!(account_service::list_active_users(&state).await.unwrap().is_empty());
}
