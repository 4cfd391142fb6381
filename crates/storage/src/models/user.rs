use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub is_mentor: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_flags(self.is_mentor, self.is_admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Artist,
    Mentor,
    Admin,
}

impl Role {
    pub fn from_flags(is_mentor: bool, is_admin: bool) -> Self {
        if is_admin {
            Self::Admin
        } else if is_mentor {
            Self::Mentor
        } else {
            Self::Artist
        }
    }

    /// `(is_mentor, is_admin)` column values for this role.
    pub fn as_flags(&self) -> (bool, bool) {
        match self {
            Self::Artist => (false, false),
            Self::Mentor => (true, false),
            Self::Admin => (false, true),
        }
    }

    pub fn can_rate(&self) -> bool {
        matches!(self, Self::Mentor | Self::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Mentor => "mentor",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "artist" => Ok(Self::Artist),
            "mentor" => Ok(Self::Mentor),
            "admin" => Ok(Self::Admin),
            other => Err(format!(
                "unknown role '{}', expected artist, mentor or admin",
                other
            )),
        }
    }
}
