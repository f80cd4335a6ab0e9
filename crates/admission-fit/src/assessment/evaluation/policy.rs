use super::super::domain::ResponseSet;
use super::config::{FitThresholds, ScoringConfig};
use serde::{Deserialize, Serialize};

/// Categorical recommendation derived from the fit percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitClassification {
    StrongFit,
    ModerateFit,
    NotAFit,
}

impl FitClassification {
    pub fn label(&self) -> &'static str {
        match self {
            FitClassification::StrongFit => "strong fit",
            FitClassification::ModerateFit => "moderate fit",
            FitClassification::NotAFit => "not a fit",
        }
    }

    pub fn summary(&self, program: &str) -> String {
        match self {
            FitClassification::StrongFit => format!("strong fit for {program}"),
            FitClassification::ModerateFit => {
                format!("moderate fit for {program}; review weaker areas before admission")
            }
            FitClassification::NotAFit => format!("not a fit for {program}"),
        }
    }
}

/// Alternative program proposed for a student who is not a strong fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeSuggestion {
    pub program: String,
    pub rationale: String,
    /// Trait that selected the entry; `None` when the profile fallback was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<String>,
}

/// Half-open ladder: `[strong, 100]` strong, `[moderate, strong)` moderate, rest not a fit.
pub(crate) fn classify(percentage: f64, thresholds: &FitThresholds) -> FitClassification {
    if percentage >= thresholds.strong {
        FitClassification::StrongFit
    } else if percentage >= thresholds.moderate {
        FitClassification::ModerateFit
    } else {
        FitClassification::NotAFit
    }
}

/// Walks traits from the lowest rating upward (ties by name) and returns the first
/// alternative keyed by one of them, falling back to the profile-wide alternative.
pub(crate) fn suggest_alternative(
    responses: &ResponseSet,
    config: &ScoringConfig,
    classification: FitClassification,
) -> Option<AlternativeSuggestion> {
    if classification == FitClassification::StrongFit {
        return None;
    }

    let mut ranked: Vec<(&str, i64)> = responses.iter().collect();
    ranked.sort_by(|(left_name, left), (right_name, right)| {
        left.cmp(right).then_with(|| left_name.cmp(right_name))
    });

    let keyed = ranked.into_iter().find_map(|(trait_name, _)| {
        config
            .alternatives
            .get(trait_name)
            .map(|alternative| AlternativeSuggestion {
                program: alternative.program.clone(),
                rationale: alternative.rationale.clone(),
                triggered_by: Some(trait_name.to_string()),
            })
    });

    keyed.or_else(|| {
        config
            .fallback_alternative
            .as_ref()
            .map(|alternative| AlternativeSuggestion {
                program: alternative.program.clone(),
                rationale: alternative.rationale.clone(),
                triggered_by: None,
            })
    })
}
