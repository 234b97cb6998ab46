use serde::Serialize;

use crate::domain::user::{
    LoginRequest, NewUser, NewUserRequest, User, UserChanges, UserUpdateRequest,
};
use crate::domain::validation::normalize_terms;
use crate::processing::auth::{hash_password, issue_token, verify_password};
use crate::processing::embedding::embed_terms;
use crate::processing::{AppContext, ServiceError, ServiceResult};
use crate::repository::{UserReader, UserWriter};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

fn existing_user<R: UserReader>(user_id: i32, repo: &R) -> ServiceResult<User> {
    repo.get_user(user_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("No user with id {user_id} found")))
}

/// Register a user. Skills are lowercased and embedded when present.
pub async fn create_user<R>(
    request: NewUserRequest,
    repo: &R,
    ctx: &AppContext,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter,
{
    request.validate().map_err(ServiceError::Validation)?;

    if repo.find_user_by_email(&request.email)?.is_some() {
        return Err(ServiceError::Validation(
            "User with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&request.password, ctx.auth.password_cost).await?;
    let skills = normalize_terms(request.skills.as_deref().unwrap_or_default());
    let embeddings = embed_terms(ctx.embedder.as_ref(), &skills).await?;

    let user = repo.create_user(&NewUser {
        first_name: request.first_name,
        last_name: request.last_name,
        username: request.username,
        email: request.email,
        password_hash,
        user_type: request.user_type,
        skills,
        embeddings,
    })?;

    log::info!("Created user {} with {} skills", user.id, user.skills.len());
    Ok(user)
}

pub async fn login<R>(
    request: LoginRequest,
    repo: &R,
    ctx: &AppContext,
) -> ServiceResult<LoginResponse>
where
    R: UserReader,
{
    request.validate().map_err(ServiceError::Validation)?;

    let user = repo.find_user_by_email(&request.email)?.ok_or_else(|| {
        ServiceError::Validation("No user with such email exists".to_string())
    })?;

    if !verify_password(&request.password, &user.password_hash).await? {
        log::warn!("Rejected login for user {}", user.id);
        return Err(ServiceError::Auth("Invalid credentials".to_string()));
    }

    let token = issue_token(&user, &ctx.auth)?;
    Ok(LoginResponse { token })
}

pub fn list_users<R: UserReader>(repo: &R) -> ServiceResult<Vec<User>> {
    Ok(repo.list_users()?)
}

pub fn find_user_by_email<R: UserReader>(email: &str, repo: &R) -> ServiceResult<User> {
    repo.find_user_by_email(email)?
        .ok_or_else(|| ServiceError::NotFound(format!("No user with email {email} found")))
}

/// Apply a partial update. Embeddings are recomputed only when the payload
/// carries skills.
pub async fn update_user<R>(
    user_id: i32,
    request: UserUpdateRequest,
    repo: &R,
    ctx: &AppContext,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter,
{
    request.validate().map_err(ServiceError::Validation)?;
    let existing = existing_user(user_id, repo)?;

    if let Some(email) = request.email.as_deref()
        && email != existing.email
        && repo.find_user_by_email(email)?.is_some()
    {
        return Err(ServiceError::Validation(
            "User with this email already exists".to_string(),
        ));
    }

    let password_hash = match request.password.as_deref() {
        Some(password) => Some(hash_password(password, ctx.auth.password_cost).await?),
        None => None,
    };

    let mut changes = UserChanges {
        first_name: request.first_name,
        last_name: request.last_name,
        username: request.username,
        email: request.email,
        password_hash,
        ..Default::default()
    };

    if let Some(skills) = request.skills {
        let skills = normalize_terms(&skills);
        changes.embeddings = Some(embed_terms(ctx.embedder.as_ref(), &skills).await?);
        changes.skills = Some(skills);
    }

    let user = repo.update_user(user_id, &changes)?;
    log::info!("Updated user {user_id}");
    Ok(user)
}

pub fn delete_user<R>(user_id: i32, repo: &R) -> ServiceResult<User>
where
    R: UserReader + UserWriter,
{
    existing_user(user_id, repo)?;
    let user = repo.delete_user(user_id)?;
    log::info!("Deleted user {user_id}");
    Ok(user)
}
