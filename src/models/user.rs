//! Diesel row types for the `users` table.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser, UserChanges};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: String,
    pub skills: String,
    pub embeddings: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: String,
    pub skills: String,
    pub embeddings: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChangeset {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub skills: Option<String>,
    pub embeddings: Option<Option<String>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<User> for DomainUser {
    type Error = String;

    fn try_from(row: User) -> Result<Self, Self::Error> {
        let skills = serde_json::from_str(&row.skills)
            .map_err(|e| format!("invalid skills for user {}: {e}", row.id))?;
        let embeddings = row
            .embeddings
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| format!("invalid embeddings for user {}: {e}", row.id))?;

        Ok(DomainUser {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            user_type: row.user_type.parse()?,
            skills,
            embeddings,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<&DomainNewUser> for NewUser {
    type Error = serde_json::Error;

    fn try_from(user: &DomainNewUser) -> Result<Self, Self::Error> {
        let now = chrono::Utc::now().naive_utc();
        Ok(NewUser {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            user_type: user.user_type.as_str().to_string(),
            skills: serde_json::to_string(&user.skills)?,
            embeddings: user
                .embeddings
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            created_at: now,
            updated_at: now,
        })
    }
}

impl TryFrom<&UserChanges> for UserChangeset {
    type Error = serde_json::Error;

    fn try_from(changes: &UserChanges) -> Result<Self, Self::Error> {
        Ok(UserChangeset {
            first_name: changes.first_name.clone(),
            last_name: changes.last_name.clone(),
            username: changes.username.clone(),
            email: changes.email.clone(),
            password_hash: changes.password_hash.clone(),
            skills: changes
                .skills
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            embeddings: match &changes.embeddings {
                Some(Some(embeddings)) => Some(Some(serde_json::to_string(embeddings)?)),
                Some(None) => Some(None),
                None => None,
            },
            updated_at: chrono::Utc::now().naive_utc(),
        })
    }
}
