pub mod common;
pub mod leaderboard;
pub mod rating;
pub mod rubric;
pub mod submission;
pub mod user;
