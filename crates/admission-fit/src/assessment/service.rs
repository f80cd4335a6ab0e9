use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{ResponseSet, StudentSubmission};
use super::evaluation::{EvaluationEngine, ScoringConfig, ScoringError};
use super::narrative::{NarrativeError, NarrativeGenerator, NarrativeRequest};
use super::report::{AssessmentReport, NarrativeStatus};

/// Service composing the scoring engine, narrative generator, and report assembly.
pub struct AssessmentService<N: ?Sized> {
    engine: Arc<EvaluationEngine>,
    narrator: Arc<N>,
}

impl<N> AssessmentService<N>
where
    N: NarrativeGenerator + ?Sized + 'static,
{
    pub fn new(engine: EvaluationEngine, narrator: Arc<N>) -> Self {
        Self {
            engine: Arc::new(engine),
            narrator,
        }
    }

    pub fn profile(&self) -> &ScoringConfig {
        self.engine.config()
    }

    /// Score a submission and, when requested, attach a narrative evaluation.
    ///
    /// Invalid ratings fail the whole call. A narrative failure does not: the report is
    /// still returned with the scores and an `Unavailable` notice.
    pub async fn assess(
        &self,
        submission: &StudentSubmission,
        include_narrative: bool,
    ) -> Result<AssessmentReport, AssessmentServiceError> {
        let responses = ResponseSet::from_json(&submission.ratings)?;
        let result = self
            .engine
            .evaluate_with_answers(&responses, &submission.answers)?;

        info!(
            program = %result.program,
            percentage = result.percentage,
            classification = result.classification.label(),
            "assessment scored"
        );

        let narrative = if include_narrative {
            let request = NarrativeRequest {
                student_name: &submission.student_name,
                answers: &submission.answers,
                result: &result,
            };
            match self.narrator.generate(&request).await {
                Ok(text) => NarrativeStatus::Generated { text },
                Err(err) => {
                    if !matches!(err, NarrativeError::Disabled) {
                        warn!(error = %err, "narrative generation failed");
                    }
                    NarrativeStatus::Unavailable {
                        reason: err.to_string(),
                    }
                }
            }
        } else {
            NarrativeStatus::Skipped
        };

        Ok(AssessmentReport::new(
            submission.student_name.clone(),
            result,
            narrative,
            Utc::now(),
        ))
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl AssessmentServiceError {
    pub fn is_invalid_input(&self) -> bool {
        match self {
            AssessmentServiceError::Scoring(err) => err.is_invalid_input(),
        }
    }
}
