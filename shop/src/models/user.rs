// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: i64,
  pub username: String,
  #[serde(skip_serializing)]
  pub password: String,
  pub address: String,
  pub pincode: i64,
  pub phone_number: i64,
  pub mail: String,
  pub active: bool,
  pub is_admin: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A user about to be inserted. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username: String,
  pub password_hash: String,
  pub address: String,
  pub pincode: i64,
  pub phone_number: i64,
  pub mail: String,
  pub is_admin: bool,
}

/// Partial profile update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
  pub username: Option<String>,
  pub address: Option<String>,
  pub pincode: Option<i64>,
  pub phone_number: Option<i64>,
  pub mail: Option<String>,
}

impl ProfilePatch {
  pub fn is_empty(&self) -> bool {
    self.username.is_none()
      && self.address.is_none()
      && self.pincode.is_none()
      && self.phone_number.is_none()
      && self.mail.is_none()
  }

  pub fn apply(&self, user: &mut User) {
    if let Some(username) = &self.username {
      user.username = username.clone();
    }
    if let Some(address) = &self.address {
      user.address = address.clone();
    }
    if let Some(pincode) = self.pincode {
      user.pincode = pincode;
    }
    if let Some(phone_number) = self.phone_number {
      user.phone_number = phone_number;
    }
    if let Some(mail) = &self.mail {
      user.mail = mail.clone();
    }
  }
}
