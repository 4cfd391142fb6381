use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{NewUser, UserRepository};
use crate::error::{Result, StorageError};
use crate::models::{Role, User};

const USER_COLUMNS: &str = r#"
    user_id, username, email, password_hash, age, is_mentor, is_admin, created_at
"#;

pub struct PgUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PgUserRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository<'_> {
    async fn create(&self, user: &NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, age, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.age)
        .bind(user.created_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_unique_violation() {
                StorageError::ConstraintViolation("username or email already taken".to_string())
            } else {
                err
            }
        })?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(user)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<User> {
        let (is_mentor, is_admin) = role.as_flags();

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET is_mentor = $2,
                is_admin = $3
            WHERE user_id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_mentor)
        .bind(is_admin)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(user)
    }
}
