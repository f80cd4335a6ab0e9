use admission_fit::assessment::{
    narrator_from_config, AssessmentService, EvaluationEngine, NarrativeGenerator, ProfileError,
    ScoringConfig,
};
use admission_fit::config::NarrativeConfig;
use admission_fit::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type SharedAssessmentService = Arc<AssessmentService<dyn NarrativeGenerator>>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Profile from a JSON file when a path is given, otherwise the built-in B.Com (CA) profile.
pub(crate) fn load_profile(path: Option<&Path>) -> Result<ScoringConfig, ProfileError> {
    match path {
        Some(path) => {
            let config = ScoringConfig::from_path(path)?;
            info!(path = %path.display(), program = %config.program, "scoring profile loaded");
            Ok(config)
        }
        None => Ok(ScoringConfig::bcom_ca()),
    }
}

pub(crate) fn build_service(
    profile: ScoringConfig,
    narrative: &NarrativeConfig,
) -> Result<SharedAssessmentService, AppError> {
    let engine = EvaluationEngine::new(profile)?;
    let narrator = narrator_from_config(narrative)?;
    Ok(Arc::new(AssessmentService::new(engine, narrator)))
}
