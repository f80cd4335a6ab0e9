//! Student program-fit assessment: rating intake, scoring, narrative, and reporting.
//!
//! The evaluation engine is a pure function of a [`ResponseSet`] and a
//! [`ScoringConfig`]. Everything around it (narrative generation, report rendering, HTTP)
//! consumes its result without feeding back into the score.

pub mod domain;
pub(crate) mod evaluation;
pub mod narrative;
pub mod report;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{FreeTextAnswer, ResponseSet, StudentSubmission};
pub use evaluation::{
    evaluate, AlternativeProgram, AlternativeSuggestion, EvaluationEngine, EvaluationResult,
    FitClassification, FitThresholds, KeywordRule, ProfileError, RatingScale, ScoringConfig,
    ScoringError, TextSignal, TraitDefinition, TraitScore, MAX_TRAIT_WEIGHT,
};
pub use narrative::{
    narrator_from_config, ChatCompletionNarrator, DisabledNarrator, NarrativeError,
    NarrativeGenerator, NarrativeRequest,
};
pub use report::{AssessmentReport, ChartBar, NarrativeStatus, ReportError};
pub use router::{assessment_router, AssessmentRequest};
pub use service::{AssessmentService, AssessmentServiceError};
