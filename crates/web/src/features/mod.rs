pub mod accounts;
pub mod leaderboard;
pub mod ratings;
pub mod rubric;
pub mod submissions;
