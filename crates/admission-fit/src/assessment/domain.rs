use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::evaluation::ScoringError;

/// Form payload collected from a student: slider ratings plus free-text answers.
///
/// Ratings stay as raw JSON values until [`ResponseSet::from_json`] validates them so a
/// non-numeric slider value is reported instead of silently coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSubmission {
    pub student_name: String,
    #[serde(default)]
    pub ratings: BTreeMap<String, Value>,
    #[serde(default)]
    pub answers: Vec<FreeTextAnswer>,
}

/// One open question and the student's answer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTextAnswer {
    pub question: String,
    pub answer: String,
}

impl FreeTextAnswer {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Validated mapping from trait name to integer rating.
///
/// Trait names are trimmed and must be unique after trimming. Range checks need the
/// scoring profile and happen during evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResponseSet {
    ratings: BTreeMap<String, i64>,
}

impl ResponseSet {
    pub fn new<I, K>(ratings: I) -> Result<Self, ScoringError>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        let mut collected = BTreeMap::new();
        for (name, rating) in ratings {
            let name = normalize_trait_name(name.into())?;
            if collected.insert(name.clone(), rating).is_some() {
                return Err(ScoringError::DuplicateTrait(name));
            }
        }
        Ok(Self {
            ratings: collected,
        })
    }

    pub fn from_json(raw: &BTreeMap<String, Value>) -> Result<Self, ScoringError> {
        let mut parsed = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            let rating = whole_number(value).ok_or_else(|| ScoringError::NonNumericRating {
                trait_name: name.trim().to_string(),
                value: value.to_string(),
            })?;
            parsed.push((name.clone(), rating));
        }
        Self::new(parsed)
    }

    pub fn get(&self, trait_name: &str) -> Option<i64> {
        self.ratings.get(trait_name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.ratings
            .iter()
            .map(|(name, rating)| (name.as_str(), *rating))
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

/// Integral JSON numbers, including `7.0`. Magnitudes beyond `i64` saturate so the scale
/// check reports them as out of range.
fn whole_number(value: &Value) -> Option<i64> {
    if let Some(rating) = value.as_i64() {
        return Some(rating);
    }
    if value.as_u64().is_some() {
        return Some(i64::MAX);
    }
    value
        .as_f64()
        .filter(|rating| rating.is_finite() && rating.fract() == 0.0)
        .map(|rating| rating as i64)
}

fn normalize_trait_name(name: String) -> Result<String, ScoringError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ScoringError::EmptyTraitName);
    }
    if trimmed.len() == name.len() {
        Ok(name)
    } else {
        Ok(trimmed.to_string())
    }
}
