mod config;
mod policy;
mod rules;

pub use config::{
    AlternativeProgram, FitThresholds, KeywordRule, ProfileError, RatingScale, ScoringConfig,
    TraitDefinition, MAX_TRAIT_WEIGHT,
};
pub use policy::{AlternativeSuggestion, FitClassification};

use super::domain::{FreeTextAnswer, ResponseSet};
use policy::{classify, suggest_alternative};
use serde::{Deserialize, Serialize};

/// Validates `config` and scores `responses` against it.
pub fn evaluate(
    responses: &ResponseSet,
    config: &ScoringConfig,
) -> Result<EvaluationResult, ScoringError> {
    config.validate()?;
    run(responses, &[], config)
}

/// Stateless evaluator bound to a validated scoring profile.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    config: ScoringConfig,
}

impl EvaluationEngine {
    pub fn new(config: ScoringConfig) -> Result<Self, ProfileError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn evaluate(&self, responses: &ResponseSet) -> Result<EvaluationResult, ScoringError> {
        run(responses, &[], &self.config)
    }

    /// Scores the ratings and attaches keyword observations from the free-text answers.
    pub fn evaluate_with_answers(
        &self,
        responses: &ResponseSet,
        answers: &[FreeTextAnswer],
    ) -> Result<EvaluationResult, ScoringError> {
        run(responses, answers, &self.config)
    }
}

fn run(
    responses: &ResponseSet,
    answers: &[FreeTextAnswer],
    config: &ScoringConfig,
) -> Result<EvaluationResult, ScoringError> {
    rules::validate_responses(responses, config)?;

    let breakdown = rules::score_responses(responses, config);
    let classification = classify(breakdown.percentage, &config.thresholds);
    let (strengths, weaknesses) = rules::partition_traits(responses, config);
    let suggestion = suggest_alternative(responses, config, classification);
    let signals = rules::detect_signals(answers, &config.keyword_rules);

    Ok(EvaluationResult {
        program: config.program.clone(),
        percentage: breakdown.percentage,
        classification,
        strengths,
        weaknesses,
        suggestion,
        trait_scores: breakdown.components,
        signals,
    })
}

/// Per-trait contribution, also used as bar-chart data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitScore {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub rating: i64,
    pub max_rating: i64,
    pub weight: f64,
    /// `rating / max_rating` as a percentage, rounded to two decimals.
    pub percent: f64,
}

/// Advisory observation raised by a keyword rule. Never affects the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSignal {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub keyword: String,
    pub note: String,
}

/// Immutable outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub program: String,
    pub percentage: f64,
    pub classification: FitClassification,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<AlternativeSuggestion>,
    pub trait_scores: Vec<TraitScore>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<TextSignal>,
}

impl EvaluationResult {
    pub fn suggested_program(&self) -> Option<&str> {
        self.suggestion
            .as_ref()
            .map(|suggestion| suggestion.program.as_str())
    }
}

/// Input rejected by the scoring engine.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("no responses provided")]
    NoResponses,
    #[error("trait names must not be blank")]
    EmptyTraitName,
    #[error("trait '{0}' was rated more than once")]
    DuplicateTrait(String),
    #[error("rating for '{trait_name}' must be a whole number, found {value}")]
    NonNumericRating { trait_name: String, value: String },
    #[error("rating {rating} for '{trait_name}' is outside the scale {min}..={max}")]
    RatingOutOfRange {
        trait_name: String,
        rating: i64,
        min: i64,
        max: i64,
    },
    #[error("trait '{0}' is not part of this scoring profile")]
    UnknownTrait(String),
    #[error("no rating provided for trait '{0}'")]
    MissingTrait(String),
    #[error("invalid scoring profile: {0}")]
    InvalidProfile(#[from] ProfileError),
}

impl ScoringError {
    /// True when the caller supplied bad input, as opposed to a broken profile.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, ScoringError::InvalidProfile(_))
    }
}
