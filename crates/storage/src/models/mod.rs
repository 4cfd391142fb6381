pub mod rubric;
pub mod session;
pub mod submission;
pub mod user;

pub use rubric::{CriterionWeights, RubricError, RubricStore};
pub use session::Session;
pub use submission::{Criterion, RawScores, Submission, SubmissionRow};
pub use user::{Role, User};
