use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::user::User;
use crate::models::config::AuthConfig;
use crate::processing::{ServiceError, ServiceResult};

/// Token issuing and password hashing settings.
#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub password_cost: u32,
}

impl From<&AuthConfig> for AuthSettings {
    fn from(config: &AuthConfig) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            token_ttl_days: config.token_ttl_days,
            password_cost: config.password_cost,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Run a bcrypt call on the blocking pool; hashing is CPU bound.
async fn run_bcrypt<T, F>(job: F) -> ServiceResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ServiceError::Unexpected(e.to_string()))?
        .map_err(|e| ServiceError::Unexpected(e.to_string()))
}

pub async fn hash_password(password: &str, cost: u32) -> ServiceResult<String> {
    let password = password.to_string();
    run_bcrypt(move || bcrypt::hash(password, cost)).await
}

pub async fn verify_password(password: &str, hash: &str) -> ServiceResult<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    run_bcrypt(move || bcrypt::verify(password, &hash)).await
}

pub fn issue_token(user: &User, settings: &AuthSettings) -> ServiceResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::days(settings.token_ttl_days)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| ServiceError::Unexpected(e.to_string()))
}

pub fn decode_token(token: &str, settings: &AuthSettings) -> ServiceResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| ServiceError::Auth(e.to_string()))
}
