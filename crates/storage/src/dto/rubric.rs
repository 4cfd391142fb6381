use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Criterion, CriterionWeights};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CriterionWeight {
    pub criterion: Criterion,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenreWeightsResponse {
    pub genre: String,
    /// False when the requested genre is unknown and the default was used.
    pub matched: bool,
    pub weights: Vec<CriterionWeight>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RubricResponse {
    pub default_genre: String,
    pub genres: Vec<GenreWeightsResponse>,
}

impl GenreWeightsResponse {
    pub fn new(genre: impl Into<String>, matched: bool, weights: &CriterionWeights) -> Self {
        Self {
            genre: genre.into(),
            matched,
            weights: Criterion::ALL
                .iter()
                .map(|c| CriterionWeight {
                    criterion: *c,
                    weight: weights.weight(*c),
                })
                .collect(),
        }
    }
}
