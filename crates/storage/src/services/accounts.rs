use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use validator::Validate;

use crate::dto::user::{LoginRequest, RegisterRequest};
use crate::error::{ServiceError, ServiceResult, StorageError};
use crate::models::{Role, Session, User};
use crate::repository::{NewUser, SessionRepository, UserRepository};

const TOKEN_BYTES: usize = 32;

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn generate_session_token() -> String {
    random_hex(TOKEN_BYTES)
}

/// Argon2id with a random salt, encoded as a PHC string so the parameters
/// and salt travel with the hash.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::PasswordHash(e.to_string()))
}

/// A stored hash that can't be parsed never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is not a PHC string");
            false
        }
    }
}

pub async fn register(
    users: &dyn UserRepository,
    request: &RegisterRequest,
    now: DateTime<Utc>,
) -> ServiceResult<User> {
    request.validate()?;

    let new_user = NewUser {
        username: request.username.trim().to_string(),
        email: request.email.trim().to_lowercase(),
        password_hash: hash_password(&request.password)?,
        age: request.age,
        created_at: now,
    };

    let user = users.create(&new_user).await?;
    tracing::info!(user_id = %user.user_id, username = %user.username, "Registered user");

    Ok(user)
}

/// Check credentials and open a session valid for `ttl`.
pub async fn login(
    users: &dyn UserRepository,
    sessions: &dyn SessionRepository,
    request: &LoginRequest,
    ttl: Duration,
    now: DateTime<Utc>,
) -> ServiceResult<(User, Session)> {
    request.validate()?;

    let user = match users.find_by_username(request.username.trim()).await {
        Ok(user) => user,
        Err(StorageError::NotFound) => return Err(ServiceError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&request.password, &user.password_hash) {
        tracing::warn!(username = %user.username, "Failed login attempt");
        return Err(ServiceError::InvalidCredentials);
    }

    let session = Session {
        token: generate_session_token(),
        user_id: user.user_id,
        created_at: now,
        expires_at: now + ttl,
    };
    sessions.create(&session).await?;

    tracing::debug!(user_id = %user.user_id, "Session opened");

    Ok((user, session))
}

pub async fn logout(sessions: &dyn SessionRepository, token: &str) -> ServiceResult<()> {
    match sessions.delete(token).await {
        Ok(()) | Err(StorageError::NotFound) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Resolve a bearer token to its user.
pub async fn current_user(
    users: &dyn UserRepository,
    sessions: &dyn SessionRepository,
    token: &str,
    now: DateTime<Utc>,
) -> ServiceResult<User> {
    let session = match sessions.find_active(token, now).await {
        Ok(session) => session,
        Err(StorageError::NotFound) => return Err(ServiceError::Unauthenticated),
        Err(e) => return Err(e.into()),
    };

    match users.find_by_id(session.user_id).await {
        Ok(user) => Ok(user),
        Err(StorageError::NotFound) => Err(ServiceError::Unauthenticated),
        Err(e) => Err(e.into()),
    }
}

pub fn require_role(user: &User, allowed: &[Role]) -> ServiceResult<()> {
    let role = user.role();
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(ServiceError::Permission(format!(
            "role '{}' may not perform this action",
            role.as_str()
        )))
    }
}

pub async fn grant_role(
    users: &dyn UserRepository,
    username: &str,
    role: Role,
) -> ServiceResult<User> {
    let user = users.find_by_username(username).await?;
    let updated = users.set_role(user.user_id, role).await?;

    tracing::info!(
        username = %updated.username,
        role = role.as_str(),
        "Role granted"
    );

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemorySessionRepository, InMemoryUserRepository};

    fn register_request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: format!("{}@example.org", username),
            password: "correct horse battery".to_string(),
            age: 19,
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_hash_is_salted_argon2id() {
        let a = hash_password("secret").unwrap();
        let b = hash_password("secret").unwrap();
        assert!(a.starts_with("$argon2id$"));
        assert_ne!(a, b);
        assert!(verify_password("secret", &a));
        assert!(verify_password("secret", &b));
        assert!(!verify_password("Secret", &a));
    }

    #[test]
    fn test_unparseable_stored_hash_never_matches() {
        let sha256_hex = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b";
        assert!(!verify_password("secret", sha256_hex));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn test_tokens_are_random_hex() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let users = InMemoryUserRepository::new();
        let sessions = InMemorySessionRepository::new();
        let now = Utc::now();

        let user = register(&users, &register_request("mc_jumper"), now)
            .await
            .unwrap();
        assert_eq!(user.role(), Role::Artist);
        assert_ne!(user.password_hash, "correct horse battery");

        let (logged_in, session) = login(
            &users,
            &sessions,
            &login_request("mc_jumper", "correct horse battery"),
            Duration::hours(24),
            now,
        )
        .await
        .unwrap();
        assert_eq!(logged_in.user_id, user.user_id);
        assert_eq!(session.expires_at, now + Duration::hours(24));

        let current = current_user(&users, &sessions, &session.token, now)
            .await
            .unwrap();
        assert_eq!(current.user_id, user.user_id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let users = InMemoryUserRepository::new();
        let sessions = InMemorySessionRepository::new();
        let now = Utc::now();
        register(&users, &register_request("mc_jumper"), now)
            .await
            .unwrap();

        let wrong_password = login(
            &users,
            &sessions,
            &login_request("mc_jumper", "wrong password"),
            Duration::hours(1),
            now,
        )
        .await
        .unwrap_err();
        let unknown_user = login(
            &users,
            &sessions,
            &login_request("nobody", "wrong password"),
            Duration::hours(1),
            now,
        )
        .await
        .unwrap_err();

        assert!(matches!(wrong_password, ServiceError::InvalidCredentials));
        assert!(matches!(unknown_user, ServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let users = InMemoryUserRepository::new();
        let now = Utc::now();
        register(&users, &register_request("mc_jumper"), now)
            .await
            .unwrap();

        let err = register(&users, &register_request("mc_jumper"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_invalid_registration_is_rejected() {
        let users = InMemoryUserRepository::new();
        let mut request = register_request("mc_jumper");
        request.password = "short".to_string();

        let err = register(&users, &request, Utc::now()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_expired_or_logged_out_session_is_unauthenticated() {
        let users = InMemoryUserRepository::new();
        let sessions = InMemorySessionRepository::new();
        let now = Utc::now();
        register(&users, &register_request("mc_jumper"), now)
            .await
            .unwrap();
        let (_, session) = login(
            &users,
            &sessions,
            &login_request("mc_jumper", "correct horse battery"),
            Duration::hours(1),
            now,
        )
        .await
        .unwrap();

        let later = now + Duration::hours(2);
        let err = current_user(&users, &sessions, &session.token, later)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated));

        logout(&sessions, &session.token).await.unwrap();
        let err = current_user(&users, &sessions, &session.token, now)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated));

        // Logging out twice is harmless.
        logout(&sessions, &session.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_grant_role_and_require_role() {
        let users = InMemoryUserRepository::new();
        let user = register(&users, &register_request("mentor_m"), Utc::now())
            .await
            .unwrap();

        assert!(matches!(
            require_role(&user, &[Role::Mentor, Role::Admin]),
            Err(ServiceError::Permission(_))
        ));

        let promoted = grant_role(&users, "mentor_m", Role::Mentor).await.unwrap();
        assert!(require_role(&promoted, &[Role::Mentor, Role::Admin]).is_ok());
    }
}
