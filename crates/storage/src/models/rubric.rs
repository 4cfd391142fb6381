use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::submission::Criterion;

/// Rubric shipped with the crate, used when no rubric file is configured.
const BUNDLED_RUBRIC: &str = include_str!("../../config/rubric.toml");

/// Tolerance for the "weights sum to 1.0" check.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum RubricError {
    #[error("Cannot read rubric file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rubric TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Default genre '{0}' has no rubric entry")]
    MissingDefaultGenre(String),

    #[error("Genre '{0}' is defined more than once")]
    DuplicateGenre(String),

    #[error("Genre '{genre}' has invalid weight {weight} for {criterion}, expected a finite number >= 0")]
    InvalidWeight {
        genre: String,
        criterion: &'static str,
        weight: f64,
    },
}

/// Weight assigned to each criterion for one genre.
///
/// A criterion missing from the table weighs 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CriterionWeights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_reference: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creativity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_quality: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_feedback: Option<f64>,
}

impl CriterionWeights {
    pub fn new(weights: impl IntoIterator<Item = (Criterion, f64)>) -> Self {
        let mut table = Self::default();
        for (criterion, weight) in weights {
            *table.slot(criterion) = Some(weight);
        }
        table
    }

    pub fn weight(&self, criterion: Criterion) -> f64 {
        let weight = match criterion {
            Criterion::HistoricalReference => self.historical_reference,
            Criterion::Creativity => self.creativity,
            Criterion::TechnicalQuality => self.technical_quality,
            Criterion::CommunityFeedback => self.community_feedback,
        };
        weight.unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        Criterion::ALL.iter().map(|c| self.weight(*c)).sum()
    }

    /// Configured weights in summation order.
    pub fn iter(&self) -> impl Iterator<Item = (Criterion, f64)> + '_ {
        Criterion::ALL.into_iter().filter_map(move |c| {
            let weight = match c {
                Criterion::HistoricalReference => self.historical_reference,
                Criterion::Creativity => self.creativity,
                Criterion::TechnicalQuality => self.technical_quality,
                Criterion::CommunityFeedback => self.community_feedback,
            };
            weight.map(|w| (c, w))
        })
    }

    fn slot(&mut self, criterion: Criterion) -> &mut Option<f64> {
        match criterion {
            Criterion::HistoricalReference => &mut self.historical_reference,
            Criterion::Creativity => &mut self.creativity,
            Criterion::TechnicalQuality => &mut self.technical_quality,
            Criterion::CommunityFeedback => &mut self.community_feedback,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RubricFile {
    default_genre: String,
    #[serde(default)]
    genres: BTreeMap<String, CriterionWeights>,
}

/// Per-genre weights table, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RubricStore {
    default_genre: String,
    genres: BTreeMap<String, CriterionWeights>,
}

impl RubricStore {
    /// Parse a rubric document.
    ///
    /// Genre keys are normalized (trimmed, lowercased). Fails when the default
    /// genre has no entry or a weight is negative or not finite; a genre whose weights do not
    /// sum to 1.0 is only logged.
    pub fn from_toml_str(source: &str) -> Result<Self, RubricError> {
        let file: RubricFile = toml::from_str(source)?;

        let mut genres = BTreeMap::new();
        for (key, weights) in file.genres {
            let key = normalize_genre(&key);

            for (criterion, weight) in weights.iter() {
                if weight < 0.0 || !weight.is_finite() {
                    return Err(RubricError::InvalidWeight {
                        genre: key,
                        criterion: criterion.as_str(),
                        weight,
                    });
                }
            }

            let total = weights.total();
            if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                tracing::warn!(
                    genre = %key,
                    total,
                    "Rubric weights do not sum to 1.0"
                );
            }

            if genres.insert(key.clone(), weights).is_some() {
                return Err(RubricError::DuplicateGenre(key));
            }
        }

        let default_genre = normalize_genre(&file.default_genre);
        if !genres.contains_key(&default_genre) {
            return Err(RubricError::MissingDefaultGenre(default_genre));
        }

        Ok(Self {
            default_genre,
            genres,
        })
    }

    pub fn load(path: &Path) -> Result<Self, RubricError> {
        let source = std::fs::read_to_string(path).map_err(|source| RubricError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn bundled() -> Result<Self, RubricError> {
        Self::from_toml_str(BUNDLED_RUBRIC)
    }

    /// Load from `path` when given, otherwise use the bundled rubric.
    pub fn load_or_bundled(path: Option<&Path>) -> Result<Self, RubricError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::bundled(),
        }
    }

    /// Weights for a genre, falling back to the default genre for unknown or
    /// missing keys. Never fails.
    pub fn weights_for(&self, genre: Option<&str>) -> &CriterionWeights {
        genre
            .map(normalize_genre)
            .and_then(|key| self.genres.get(&key))
            .unwrap_or_else(|| self.default_weights())
    }

    pub fn default_genre(&self) -> &str {
        &self.default_genre
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.contains_key(&normalize_genre(genre))
    }

    pub fn genres(&self) -> impl Iterator<Item = (&str, &CriterionWeights)> {
        self.genres.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn default_weights(&self) -> &CriterionWeights {
        // Presence of the default genre is checked when the store is built.
        &self.genres[&self.default_genre]
    }
}

pub fn normalize_genre(genre: &str) -> String {
    genre.trim().to_lowercase()
}
