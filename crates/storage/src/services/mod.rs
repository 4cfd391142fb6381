pub mod accounts;
pub mod rating;
pub mod score_computation;

pub use score_computation::{BONUS_AMOUNT, SCORE_SCALE, YOUTH_AGE_LIMIT, compute_final_score};
