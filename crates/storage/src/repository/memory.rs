//! In-memory repositories used by the test suites.
//!
//! Each instance owns its data; nothing is shared between instances.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    NewSubmission, NewUser, RatingUpdate, SessionRepository, SubmissionQuery,
    SubmissionRepository, UserRepository,
};
use crate::dto::leaderboard::SubmissionOrder;
use crate::error::{Result, StorageError};
use crate::models::{Role, Session, Submission, User, rubric::normalize_genre};

#[derive(Debug, Default)]
pub struct InMemorySubmissionRepository {
    submissions: RwLock<Vec<Submission>>,
}

impl InMemorySubmissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(submission: &Submission, filter: &SubmissionQuery) -> bool {
        let month_matches = filter
            .month
            .as_ref()
            .is_none_or(|month| &submission.month == month);
        let genre_matches = filter.genre.as_ref().is_none_or(|genre| {
            submission
                .genre
                .as_deref()
                .is_some_and(|g| normalize_genre(g) == *genre)
        });
        month_matches && genre_matches
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn create(&self, submission: &NewSubmission) -> Result<Submission> {
        let created = Submission {
            submission_id: Uuid::new_v4(),
            user_id: submission.user_id,
            title: submission.title.clone(),
            track_url: submission.track_url.clone(),
            genre: submission.genre.clone(),
            artist_age: submission.artist_age,
            month: submission.month.clone(),
            bonus: submission.bonus,
            raw_scores: None,
            final_score: 0.0,
            feedback: None,
            rated_by: None,
            rated_at: None,
            created_at: submission.created_at,
        };

        self.submissions.write().await.push(created.clone());

        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Submission> {
        self.submissions
            .read()
            .await
            .iter()
            .find(|s| s.submission_id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn update_rating(&self, id: Uuid, rating: &RatingUpdate) -> Result<Submission> {
        let mut submissions = self.submissions.write().await;
        let submission = submissions
            .iter_mut()
            .find(|s| s.submission_id == id)
            .ok_or(StorageError::NotFound)?;

        submission.raw_scores = Some(rating.raw_scores);
        submission.final_score = rating.final_score;
        submission.feedback = rating.feedback.clone();
        submission.rated_by = Some(rating.rated_by);
        submission.rated_at = Some(rating.rated_at);

        Ok(submission.clone())
    }

    async fn list_all(&self, filter: &SubmissionQuery) -> Result<Vec<Submission>> {
        let mut matching: Vec<Submission> = self
            .submissions
            .read()
            .await
            .iter()
            .filter(|s| Self::matches(s, filter))
            .cloned()
            .collect();

        match filter.order {
            SubmissionOrder::Score => matching.sort_by(|a, b| {
                b.final_score
                    .total_cmp(&a.final_score)
                    .then(a.created_at.cmp(&b.created_at))
            }),
            SubmissionOrder::Newest => matching.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SubmissionOrder::Oldest => matching.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }

        let offset = usize::try_from(filter.offset).unwrap_or(0);
        let limit = usize::try_from(filter.limit).unwrap_or(usize::MAX);

        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &SubmissionQuery) -> Result<i64> {
        let count = self
            .submissions
            .read()
            .await
            .iter()
            .filter(|s| Self::matches(s, filter))
            .count();

        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User> {
        let mut users = self.users.write().await;

        let taken = users.values().any(|u| {
            u.username.eq_ignore_ascii_case(&user.username)
                || u.email.eq_ignore_ascii_case(&user.email)
        });
        if taken {
            return Err(StorageError::ConstraintViolation(
                "username or email already taken".to_string(),
            ));
        }

        let created = User {
            user_id: Uuid::new_v4(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            age: user.age,
            is_mentor: false,
            is_admin: false,
            created_at: user.created_at,
        };
        users.insert(created.user_id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_by_username(&self, username: &str) -> Result<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<User> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StorageError::NotFound)?;

        let (is_mentor, is_admin) = role.as_flags();
        user.is_mentor = is_mentor;
        user.is_admin = is_admin;

        Ok(user.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: &Session) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find_active(&self, token: &str, now: DateTime<Utc>) -> Result<Session> {
        self.sessions
            .read()
            .await
            .get(token)
            .filter(|s| !s.is_expired(now))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn delete(&self, token: &str) -> Result<()> {
        self.sessions
            .write()
            .await
            .remove(token)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::RawScores;

    fn new_submission(title: &str, month: &str, created_at: DateTime<Utc>) -> NewSubmission {
        NewSubmission {
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            track_url: format!("https://media.example/{}.mp3", title),
            genre: Some("deutschrap".to_string()),
            artist_age: 22,
            month: month.to_string(),
            bonus: 10,
            created_at,
        }
    }

    fn rating(final_score: f64) -> RatingUpdate {
        RatingUpdate {
            raw_scores: RawScores {
                historical_reference: 5,
                creativity: 5,
                technical_quality: 5,
                community_feedback: 5,
            },
            final_score,
            feedback: None,
            rated_by: Uuid::new_v4(),
            rated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_orders_by_score_then_age() {
        let repo = InMemorySubmissionRepository::new();
        let t0 = Utc::now();

        let a = repo.create(&new_submission("a", "2026-10", t0)).await.unwrap();
        let b = repo
            .create(&new_submission("b", "2026-10", t0 + Duration::seconds(1)))
            .await
            .unwrap();
        let c = repo
            .create(&new_submission("c", "2026-10", t0 + Duration::seconds(2)))
            .await
            .unwrap();

        repo.update_rating(a.submission_id, &rating(50.0)).await.unwrap();
        repo.update_rating(b.submission_id, &rating(80.0)).await.unwrap();
        repo.update_rating(c.submission_id, &rating(50.0)).await.unwrap();

        let query = SubmissionQuery {
            limit: 10,
            ..SubmissionQuery::default()
        };
        let titles: Vec<String> = repo
            .list_all(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();

        assert_eq!(titles, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_month_filter_and_paging() {
        let repo = InMemorySubmissionRepository::new();
        let t0 = Utc::now();
        for i in 0..5 {
            repo.create(&new_submission(
                &format!("t{}", i),
                "2026-10",
                t0 + Duration::seconds(i),
            ))
            .await
            .unwrap();
        }
        repo.create(&new_submission("old", "2026-09", t0)).await.unwrap();

        let query = SubmissionQuery {
            order: SubmissionOrder::Oldest,
            month: Some("2026-10".to_string()),
            offset: 2,
            limit: 2,
            ..SubmissionQuery::default()
        };

        let page = repo.list_all(&query).await.unwrap();
        let titles: Vec<&str> = page.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["t2", "t3"]);
        assert_eq!(repo.count(&query).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_update_unknown_submission_is_not_found() {
        let repo = InMemorySubmissionRepository::new();
        let err = repo
            .update_rating(Uuid::new_v4(), &rating(1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_constraint_violation() {
        let repo = InMemoryUserRepository::new();
        let user = NewUser {
            username: "mc_jumper".to_string(),
            email: "mc@example.org".to_string(),
            password_hash: "h".to_string(),
            age: 20,
            created_at: Utc::now(),
        };
        repo.create(&user).await.unwrap();

        let mut duplicate = user.clone();
        duplicate.email = "other@example.org".to_string();
        duplicate.username = "MC_Jumper".to_string();
        let err = repo.create(&duplicate).await.unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_expired_sessions_are_not_active() {
        let repo = InMemorySessionRepository::new();
        let now = Utc::now();
        let session = Session {
            token: "abc".to_string(),
            user_id: Uuid::new_v4(),
            created_at: now - Duration::hours(2),
            expires_at: now - Duration::hours(1),
        };
        repo.create(&session).await.unwrap();

        assert!(repo.find_active("abc", now).await.is_err());
        assert_eq!(repo.delete_expired(now).await.unwrap(), 1);
    }
}
