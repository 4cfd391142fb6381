use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{NewSubmission, RatingUpdate, SubmissionQuery, SubmissionRepository};
use crate::dto::leaderboard::SubmissionOrder;
use crate::error::{Result, StorageError};
use crate::models::{Submission, SubmissionRow};

const SUBMISSION_COLUMNS: &str = r#"
    submission_id, user_id, title, track_url, genre, artist_age, month, bonus,
    historical_reference, creativity, technical_quality, community_feedback,
    final_score, feedback, rated_by, rated_at, created_at
"#;

pub struct PgSubmissionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PgSubmissionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &SubmissionQuery) {
    if let Some(ref month) = filter.month {
        query.push(" AND month = ");
        query.push_bind(month.clone());
    }

    if let Some(ref genre) = filter.genre {
        query.push(" AND LOWER(genre) = ");
        query.push_bind(genre.clone());
    }
}

fn order_clause(order: SubmissionOrder) -> &'static str {
    match order {
        SubmissionOrder::Score => " ORDER BY final_score DESC, created_at ASC",
        SubmissionOrder::Newest => " ORDER BY created_at DESC",
        SubmissionOrder::Oldest => " ORDER BY created_at ASC",
    }
}

#[async_trait]
impl SubmissionRepository for PgSubmissionRepository<'_> {
    async fn create(&self, submission: &NewSubmission) -> Result<Submission> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            INSERT INTO submissions (user_id, title, track_url, genre, artist_age, month, bonus, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(submission.user_id)
        .bind(&submission.title)
        .bind(&submission.track_url)
        .bind(&submission.genre)
        .bind(submission.artist_age)
        .bind(&submission.month)
        .bind(submission.bonus)
        .bind(submission.created_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_foreign_key_violation() {
                StorageError::ConstraintViolation("submitting user does not exist".to_string())
            } else {
                err
            }
        })?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Submission> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE submission_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(row.into())
    }

    async fn update_rating(&self, id: Uuid, rating: &RatingUpdate) -> Result<Submission> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            r#"
            UPDATE submissions
            SET historical_reference = $2,
                creativity = $3,
                technical_quality = $4,
                community_feedback = $5,
                final_score = $6,
                feedback = $7,
                rated_by = $8,
                rated_at = $9
            WHERE submission_id = $1
            RETURNING {SUBMISSION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(rating.raw_scores.historical_reference)
        .bind(rating.raw_scores.creativity)
        .bind(rating.raw_scores.technical_quality)
        .bind(rating.raw_scores.community_feedback)
        .bind(rating.final_score)
        .bind(&rating.feedback)
        .bind(rating.rated_by)
        .bind(rating.rated_at)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_write_conflict() {
                StorageError::Conflict(format!("submission {} was modified concurrently", id))
            } else {
                err
            }
        })?
        .ok_or(StorageError::NotFound)?;

        Ok(row.into())
    }

    async fn list_all(&self, filter: &SubmissionQuery) -> Result<Vec<Submission>> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE 1=1"
        ));

        push_filters(&mut query, filter);

        query.push(order_clause(filter.order));
        query.push(" LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.offset);

        let rows: Vec<SubmissionRow> = query.build_query_as().fetch_all(self.pool).await?;

        Ok(rows.into_iter().map(Submission::from).collect())
    }

    async fn count(&self, filter: &SubmissionQuery) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM submissions WHERE 1=1");

        push_filters(&mut query, filter);

        let count = query
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
