use storage::{
    dto::rubric::{GenreWeightsResponse, RubricResponse},
    models::{RubricStore, rubric::normalize_genre},
};

pub fn rubric_overview(rubric: &RubricStore) -> RubricResponse {
    RubricResponse {
        default_genre: rubric.default_genre().to_string(),
        genres: rubric
            .genres()
            .map(|(genre, weights)| GenreWeightsResponse::new(genre, true, weights))
            .collect(),
    }
}

/// Weights applied to `genre`. Unknown genres report the default genre's
/// weights with `matched = false`.
pub fn genre_weights(rubric: &RubricStore, genre: &str) -> GenreWeightsResponse {
    let key = normalize_genre(genre);
    let weights = rubric.weights_for(Some(key.as_str()));

    if rubric.has_genre(&key) {
        GenreWeightsResponse::new(key, true, weights)
    } else {
        GenreWeightsResponse::new(rubric.default_genre(), false, weights)
    }
}
