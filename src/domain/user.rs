use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::embedding::Embeddings;
use crate::domain::validation::{check_email, check_length};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Candidate,
    Employer,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Candidate => "candidate",
            UserType::Employer => "employer",
        }
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "candidate" => Ok(UserType::Candidate),
            "employer" => Ok(UserType::Employer),
            other => Err(format!("unknown user type: {other}")),
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub user_type: UserType,
    pub skills: Vec<String>,
    pub embeddings: Option<Embeddings>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A user ready to be inserted: password already hashed, skills normalized.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub skills: Vec<String>,
    pub embeddings: Option<Embeddings>,
}

/// Changes applied to an existing user. `None` leaves the column untouched.
#[derive(Clone, Debug, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub skills: Option<Vec<String>>,
    pub embeddings: Option<Option<Embeddings>>,
}

/// Signup payload.
#[derive(Clone, Debug, Deserialize)]
pub struct NewUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub user_type: UserType,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

impl NewUserRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_length("first name", &self.first_name, 3, 10)?;
        check_length("last name", &self.last_name, 3, 10)?;
        check_length("username", &self.username, 3, 10)?;
        check_email(&self.email)?;
        check_length("password", &self.password, 8, 16)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UserUpdateRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

impl UserUpdateRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(first_name) = &self.first_name {
            check_length("first name", first_name, 3, 10)?;
        }
        if let Some(last_name) = &self.last_name {
            check_length("last name", last_name, 3, 10)?;
        }
        if let Some(username) = &self.username {
            check_length("username", username, 3, 10)?;
        }
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(password) = &self.password {
            check_length("password", password, 8, 16)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_email(&self.email)?;
        check_length("password", &self.password, 8, 16)
    }
}
