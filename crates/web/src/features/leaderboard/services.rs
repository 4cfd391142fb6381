use std::collections::HashMap;

use sqlx::PgPool;
use storage::{
    dto::leaderboard::{LeaderboardEntry, LeaderboardFilter, SubmissionOrder, TrackListFilter},
    error::Result,
    models::{Submission, User, rubric::normalize_genre},
    repository::{
        PgSubmissionRepository, PgUserRepository, SubmissionQuery, SubmissionRepository,
        UserRepository,
    },
};
use uuid::Uuid;

/// All submissions in the requested order, with the total for paging.
pub async fn list_tracks(pool: &PgPool, filter: &TrackListFilter) -> Result<(Vec<Submission>, i64)> {
    let pagination = filter.pagination();
    let query = SubmissionQuery {
        order: filter.order,
        month: filter.month.clone(),
        genre: filter.genre.as_deref().map(normalize_genre),
        offset: pagination.offset(),
        limit: pagination.limit(),
    };

    let repo = PgSubmissionRepository::new(pool);
    let submissions = repo.list_all(&query).await?;
    let total = repo.count(&query).await?;

    Ok((submissions, total))
}

/// Submissions of one month ranked by final score.
pub async fn leaderboard(
    pool: &PgPool,
    filter: &LeaderboardFilter,
    month: String,
) -> Result<(Vec<LeaderboardEntry>, i64)> {
    let pagination = filter.pagination();
    let query = SubmissionQuery {
        order: SubmissionOrder::Score,
        month: Some(month),
        genre: filter.genre.as_deref().map(normalize_genre),
        offset: pagination.offset(),
        limit: pagination.limit(),
    };

    let submissions_repo = PgSubmissionRepository::new(pool);
    let submissions = submissions_repo.list_all(&query).await?;
    let total = submissions_repo.count(&query).await?;

    let mut artist_ids: Vec<Uuid> = submissions.iter().map(|s| s.user_id).collect();
    artist_ids.sort_unstable();
    artist_ids.dedup();
    let artists = PgUserRepository::new(pool).find_many(&artist_ids).await?;

    Ok((rank_entries(submissions, &artists, query.offset), total))
}

/// Number a page of score-ordered submissions, continuing from `offset`.
pub fn rank_entries(
    submissions: Vec<Submission>,
    artists: &[User],
    offset: i64,
) -> Vec<LeaderboardEntry> {
    let names: HashMap<Uuid, &str> = artists
        .iter()
        .map(|u| (u.user_id, u.username.as_str()))
        .collect();

    submissions
        .into_iter()
        .zip(offset + 1..)
        .map(|(submission, rank)| {
            let artist = names
                .get(&submission.user_id)
                .map(|name| name.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            LeaderboardEntry::new(rank, artist, submission)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn artist(name: &str) -> User {
        User {
            user_id: Uuid::new_v4(),
            username: name.to_string(),
            email: format!("{}@example.org", name),
            password_hash: String::new(),
            age: 20,
            is_mentor: false,
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    fn submission(artist: &User, final_score: f64) -> Submission {
        Submission {
            submission_id: Uuid::new_v4(),
            user_id: artist.user_id,
            title: format!("{} track", artist.username),
            track_url: "https://media.example/track.mp3".to_string(),
            genre: Some("deutschrap".to_string()),
            artist_age: artist.age,
            month: "2026-10".to_string(),
            bonus: 10,
            raw_scores: None,
            final_score,
            feedback: None,
            rated_by: None,
            rated_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_ranks_continue_across_pages() {
        let a = artist("apache");
        let b = artist("shirin");
        let entries = rank_entries(
            vec![submission(&a, 89.0), submission(&b, 70.5)],
            &[a.clone(), b.clone()],
            20,
        );

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].rank, 21);
        assert_eq!(entries[0].artist, "apache");
        assert_eq!(entries[1].rank, 22);
        assert_eq!(entries[1].artist, "shirin");
    }

    #[test]
    fn test_missing_artist_is_labelled() {
        let a = artist("apache");
        let entries = rank_entries(vec![submission(&a, 10.0)], &[], 0);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].artist, "unknown");
        assert!(!entries[0].rated);
    }
}
