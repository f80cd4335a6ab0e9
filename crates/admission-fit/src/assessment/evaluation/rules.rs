use super::super::domain::{FreeTextAnswer, ResponseSet};
use super::config::{KeywordRule, ScoringConfig};
use super::{ScoringError, TextSignal, TraitScore};

pub(crate) struct ScoreBreakdown {
    pub components: Vec<TraitScore>,
    pub percentage: f64,
}

/// Rejects responses the profile cannot score. Runs before any arithmetic.
pub(crate) fn validate_responses(
    responses: &ResponseSet,
    config: &ScoringConfig,
) -> Result<(), ScoringError> {
    if responses.is_empty() {
        return Err(ScoringError::NoResponses);
    }

    for (trait_name, rating) in responses.iter() {
        if config.is_closed_vocabulary() && config.definition(trait_name).is_none() {
            return Err(ScoringError::UnknownTrait(trait_name.to_string()));
        }
        if !config.scale.contains(rating) {
            return Err(ScoringError::RatingOutOfRange {
                trait_name: trait_name.to_string(),
                rating,
                min: config.scale.min,
                max: config.scale.max,
            });
        }
    }

    if let Some(missing) = config
        .traits
        .iter()
        .find(|definition| responses.get(&definition.name).is_none())
    {
        return Err(ScoringError::MissingTrait(missing.name.clone()));
    }

    Ok(())
}

pub(crate) fn score_responses(responses: &ResponseSet, config: &ScoringConfig) -> ScoreBreakdown {
    let max_rating = config.scale.max;
    let mut components = Vec::with_capacity(responses.len());
    let mut total = 0.0_f64;
    let mut max_total = 0.0_f64;

    for (trait_name, rating) in responses.iter() {
        let weight = config.weight_of(trait_name);
        total += weight * rating as f64;
        max_total += weight * max_rating as f64;

        components.push(TraitScore {
            trait_name: trait_name.to_string(),
            rating,
            max_rating,
            weight,
            percent: round_to_hundredths(100.0 * rating as f64 / max_rating as f64),
        });
    }

    let percentage = if max_total > 0.0 {
        round_to_hundredths(100.0 * total / max_total).clamp(0.0, 100.0)
    } else {
        0.0
    };

    ScoreBreakdown {
        components,
        percentage,
    }
}

/// Splits traits into strengths and weaknesses. The profile guarantees
/// `weakness_cutoff < strength_cutoff`, so the two lists never overlap.
pub(crate) fn partition_traits(
    responses: &ResponseSet,
    config: &ScoringConfig,
) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    for (trait_name, rating) in responses.iter() {
        if rating >= config.strength_cutoff {
            strengths.push(trait_name.to_string());
        } else if rating <= config.weakness_cutoff {
            weaknesses.push(trait_name.to_string());
        }
    }

    (strengths, weaknesses)
}

pub(crate) fn detect_signals(answers: &[FreeTextAnswer], rules: &[KeywordRule]) -> Vec<TextSignal> {
    let lowered: Vec<String> = answers
        .iter()
        .map(|answer| answer.answer.to_lowercase())
        .collect();

    let mut signals = Vec::new();
    for rule in rules {
        let matched = rule.keywords.iter().find(|keyword| {
            let keyword = keyword.trim().to_lowercase();
            !keyword.is_empty() && lowered.iter().any(|answer| answer.contains(&keyword))
        });

        if let Some(keyword) = matched {
            signals.push(TextSignal {
                trait_name: rule.trait_name.clone(),
                keyword: keyword.trim().to_string(),
                note: rule.note.clone(),
            });
        }
    }

    signals
}

pub(crate) fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
