use crate::dto::rating::{CriterionContribution, ScoreBreakdown};
use crate::models::{Criterion, CriterionWeights, RawScores};

/// Factor mapping `raw score * weight` onto the leaderboard range.
pub const SCORE_SCALE: f64 = 10.0;

/// Flat bonus for artists younger than [`YOUTH_AGE_LIMIT`].
pub const BONUS_AMOUNT: i32 = 10;

pub const YOUTH_AGE_LIMIT: i32 = 25;

/// Youth bonus, fixed once when a submission is created.
pub fn youth_bonus(artist_age: i32) -> i32 {
    if artist_age < YOUTH_AGE_LIMIT {
        BONUS_AMOUNT
    } else {
        0
    }
}

/// Final score = Σ raw[c] · weight[c] · SCALE + bonus
///
/// Terms are added in [`Criterion::ALL`] order. Scores are not range-checked
/// here; callers validate them first.
pub fn compute_final_score(scores: &RawScores, weights: &CriterionWeights, bonus: i32) -> f64 {
    let weighted: f64 = Criterion::ALL
        .iter()
        .map(|c| weighted_points(scores.get(*c), weights.weight(*c)))
        .fold(0.0, |acc, points| acc + points);

    weighted + f64::from(bonus)
}

/// Same computation as [`compute_final_score`], keeping each term.
pub fn score_breakdown(
    scores: &RawScores,
    weights: &CriterionWeights,
    bonus: i32,
) -> ScoreBreakdown {
    let contributions: Vec<CriterionContribution> = Criterion::ALL
        .iter()
        .map(|c| {
            let raw_score = scores.get(*c);
            let weight = weights.weight(*c);
            CriterionContribution {
                criterion: *c,
                raw_score,
                weight,
                points: weighted_points(raw_score, weight),
            }
        })
        .collect();

    ScoreBreakdown {
        contributions,
        bonus,
        total: compute_final_score(scores, weights, bonus),
    }
}

fn weighted_points(raw_score: i32, weight: f64) -> f64 {
    f64::from(raw_score) * weight * SCORE_SCALE
}
