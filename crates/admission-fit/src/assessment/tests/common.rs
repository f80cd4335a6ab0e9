use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::assessment::domain::{FreeTextAnswer, ResponseSet, StudentSubmission};
use crate::assessment::evaluation::{AlternativeProgram, EvaluationEngine, ScoringConfig};
use crate::assessment::narrative::{NarrativeError, NarrativeGenerator, NarrativeRequest};
use crate::assessment::service::AssessmentService;

pub(super) fn open_config() -> ScoringConfig {
    ScoringConfig::open("B.Com (CA)")
}

pub(super) fn open_engine() -> EvaluationEngine {
    EvaluationEngine::new(open_config()).expect("open profile is valid")
}

pub(super) fn bcom_engine() -> EvaluationEngine {
    EvaluationEngine::new(ScoringConfig::bcom_ca()).expect("built-in profile is valid")
}

pub(super) fn responses(ratings: &[(&str, i64)]) -> ResponseSet {
    ResponseSet::new(ratings.iter().map(|(name, rating)| (*name, *rating)))
        .expect("valid response set")
}

pub(super) fn uniform(rating: i64) -> ResponseSet {
    responses(&[
        ("A", rating),
        ("B", rating),
        ("C", rating),
        ("D", rating),
        ("E", rating),
    ])
}

pub(super) fn fallback_alternative() -> AlternativeProgram {
    AlternativeProgram {
        program: "B.Com (General)".to_string(),
        rationale: "General commerce track".to_string(),
    }
}

pub(super) fn bcom_ratings(tech_comfort: i64) -> BTreeMap<String, Value> {
    [
        ("Commerce Interest", 8),
        ("Academic Interest", 7),
        ("Problem Solving", 6),
        ("Tech Comfort", tech_comfort),
        ("Career Clarity", 6),
        ("Communication", 7),
    ]
    .into_iter()
    .map(|(name, rating)| (name.to_string(), Value::from(rating)))
    .collect()
}

pub(super) fn submission(ratings: BTreeMap<String, Value>) -> StudentSubmission {
    StudentSubmission {
        student_name: "Asha Menon".to_string(),
        ratings,
        answers: vec![
            FreeTextAnswer::new(
                "Why have you chosen to apply for the B.Com (CA) program?",
                "I liked accounts in school and want to work with Tally and Excel.",
            ),
            FreeTextAnswer::new(
                "What career are you interested in?",
                "I want to become an auditor.",
            ),
        ],
    }
}

/// Narrator double returning a canned reply and counting calls.
pub(super) struct StubNarrator {
    reply: Result<String, (u16, String)>,
    calls: AtomicUsize,
}

impl StubNarrator {
    pub(super) fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn failing(status: u16, message: &str) -> Self {
        Self {
            reply: Err((status, message.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NarrativeGenerator for StubNarrator {
    async fn generate(&self, request: &NarrativeRequest<'_>) -> Result<String, NarrativeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(format!("{} {}", request.student_name, text)),
            Err((status, message)) => Err(NarrativeError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

pub(super) fn build_service(
    narrator: StubNarrator,
) -> (Arc<AssessmentService<StubNarrator>>, Arc<StubNarrator>) {
    let narrator = Arc::new(narrator);
    let service = Arc::new(AssessmentService::new(bcom_engine(), narrator.clone()));
    (service, narrator)
}

pub(super) async fn read_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_str(&read_body(response).await).expect("json body")
}
