use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Inclusive rating range accepted for every trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: i64,
    pub max: i64,
}

impl RatingScale {
    pub fn contains(&self, rating: i64) -> bool {
        (self.min..=self.max).contains(&rating)
    }
}

/// Percentage boundaries for the fit classification ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitThresholds {
    pub strong: f64,
    pub moderate: f64,
}

/// A rated dimension declared by the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDefinition {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Upper bound on a trait weight. Keeps weighted sums finite for any rating scale.
pub const MAX_TRAIT_WEIGHT: f64 = 1_000.0;

fn default_weight() -> f64 {
    1.0
}

/// Program offered instead when the student is not a strong fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternativeProgram {
    pub program: String,
    pub rationale: String,
}

/// Free-text rule: any keyword found in an answer produces an observation for `trait_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub keywords: Vec<String>,
    pub note: String,
}

/// Data-driven scoring profile for one program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub program: String,
    pub scale: RatingScale,
    pub thresholds: FitThresholds,
    pub strength_cutoff: i64,
    pub weakness_cutoff: i64,
    /// Closed trait vocabulary. Empty means any trait name is accepted with weight 1.
    #[serde(default)]
    pub traits: Vec<TraitDefinition>,
    /// Alternative program keyed by the trait whose weakness triggers it.
    #[serde(default)]
    pub alternatives: BTreeMap<String, AlternativeProgram>,
    #[serde(default)]
    pub fallback_alternative: Option<AlternativeProgram>,
    #[serde(default)]
    pub keyword_rules: Vec<KeywordRule>,
}

impl ScoringConfig {
    /// Open-vocabulary profile on a 0-10 scale with the recommended defaults
    /// (strong 70, moderate 50, strength cutoff 7, weakness cutoff 4).
    pub fn open(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            scale: RatingScale { min: 0, max: 10 },
            thresholds: FitThresholds {
                strong: 70.0,
                moderate: 50.0,
            },
            strength_cutoff: 7,
            weakness_cutoff: 4,
            traits: Vec::new(),
            alternatives: BTreeMap::new(),
            fallback_alternative: None,
            keyword_rules: Vec::new(),
        }
    }

    /// Built-in profile for the B.Com (Computer Applications) intake form.
    pub fn bcom_ca() -> Self {
        let traits = [
            (
                "Commerce Interest",
                "Why have you chosen to apply for the B.Com (CA) program?",
            ),
            (
                "Academic Interest",
                "Which subjects did you enjoy most in higher secondary, and why?",
            ),
            (
                "Problem Solving",
                "Describe a time you struggled with a concept and how you overcame it.",
            ),
            (
                "Tech Comfort",
                "How comfortable are you using computers and technology in academics?",
            ),
            (
                "Career Clarity",
                "What career or job role are you interested in after the program?",
            ),
            ("Communication", "How confident are you presenting your ideas?"),
        ]
        .into_iter()
        .map(|(name, prompt)| TraitDefinition {
            name: name.to_string(),
            weight: 1.0,
            prompt: Some(prompt.to_string()),
        })
        .collect();

        let alternatives = [
            (
                "Tech Comfort",
                "B.Com (General)",
                "Keeps the commerce core without the computer applications coursework.",
            ),
            (
                "Commerce Interest",
                "BA",
                "Interests lean away from commerce; a humanities track keeps options open.",
            ),
            (
                "Problem Solving",
                "BBA",
                "Case-based management study suits applied learners better than technical problem sets.",
            ),
            (
                "Communication",
                "B.Sc (Computer Science)",
                "Builds on technical interest with less client-facing coursework.",
            ),
        ]
        .into_iter()
        .map(|(trait_name, program, rationale)| {
            (
                trait_name.to_string(),
                AlternativeProgram {
                    program: program.to_string(),
                    rationale: rationale.to_string(),
                },
            )
        })
        .collect();

        let keyword_rules = vec![
            KeywordRule {
                trait_name: "Tech Comfort".to_string(),
                keywords: ["programming", "coding", "computer", "software", "excel", "tally"]
                    .map(String::from)
                    .to_vec(),
                note: "mentions hands-on computer use".to_string(),
            },
            KeywordRule {
                trait_name: "Commerce Interest".to_string(),
                keywords: ["accounting", "accounts", "commerce", "business", "finance"]
                    .map(String::from)
                    .to_vec(),
                note: "shows interest in commerce subjects".to_string(),
            },
            KeywordRule {
                trait_name: "Career Clarity".to_string(),
                keywords: ["accountant", "analyst", "auditor", "banking", "entrepreneur"]
                    .map(String::from)
                    .to_vec(),
                note: "names a concrete career goal".to_string(),
            },
        ];

        Self {
            program: "B.Com (CA)".to_string(),
            traits,
            alternatives,
            fallback_alternative: Some(AlternativeProgram {
                program: "BBA".to_string(),
                rationale: "A broad management foundation while career goals take shape."
                    .to_string(),
            }),
            keyword_rules,
            ..Self::open("B.Com (CA)")
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ProfileError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn is_closed_vocabulary(&self) -> bool {
        !self.traits.is_empty()
    }

    pub fn definition(&self, trait_name: &str) -> Option<&TraitDefinition> {
        self.traits
            .iter()
            .find(|definition| definition.name == trait_name)
    }

    pub fn weight_of(&self, trait_name: &str) -> f64 {
        self.definition(trait_name)
            .map(|definition| definition.weight)
            .unwrap_or_else(default_weight)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.program.trim().is_empty() {
            return Err(ProfileError::EmptyProgram);
        }

        let RatingScale { min, max } = self.scale;
        if min < 0 || min >= max {
            return Err(ProfileError::InvalidScale { min, max });
        }

        let FitThresholds { strong, moderate } = self.thresholds;
        let in_bounds = |value: f64| value.is_finite() && (0.0..=100.0).contains(&value);
        if !in_bounds(strong) || !in_bounds(moderate) || moderate > strong {
            return Err(ProfileError::InvalidThresholds { strong, moderate });
        }

        if self.weakness_cutoff >= self.strength_cutoff
            || !self.scale.contains(self.weakness_cutoff)
            || !self.scale.contains(self.strength_cutoff)
        {
            return Err(ProfileError::InvalidCutoffs {
                strength: self.strength_cutoff,
                weakness: self.weakness_cutoff,
            });
        }

        let mut seen = BTreeSet::new();
        for definition in &self.traits {
            let name = definition.name.trim();
            if name.is_empty() || name.len() != definition.name.len() {
                return Err(ProfileError::InvalidTraitName(definition.name.clone()));
            }
            if !seen.insert(name) {
                return Err(ProfileError::DuplicateTrait(definition.name.clone()));
            }
            if !definition.weight.is_finite()
                || definition.weight <= 0.0
                || definition.weight > MAX_TRAIT_WEIGHT
            {
                return Err(ProfileError::InvalidWeight {
                    trait_name: definition.name.clone(),
                    weight: definition.weight,
                });
            }
        }

        if self.is_closed_vocabulary() {
            let referenced = self
                .alternatives
                .keys()
                .chain(self.keyword_rules.iter().map(|rule| &rule.trait_name));
            for trait_name in referenced {
                if !seen.contains(trait_name.as_str()) {
                    return Err(ProfileError::UndeclaredTrait(trait_name.clone()));
                }
            }
        }

        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::bcom_ca()
    }
}

/// Reasons a scoring profile cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("unable to read scoring profile {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("scoring profile is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scoring profile must name a program")]
    EmptyProgram,
    #[error("rating scale must satisfy 0 <= min < max (found {min}..={max})")]
    InvalidScale { min: i64, max: i64 },
    #[error("thresholds must satisfy 0 <= moderate <= strong <= 100 (strong {strong}, moderate {moderate})")]
    InvalidThresholds { strong: f64, moderate: f64 },
    #[error("cutoffs must lie on the scale with weakness below strength (strength {strength}, weakness {weakness})")]
    InvalidCutoffs { strength: i64, weakness: i64 },
    #[error("trait name {0:?} must be non-blank without surrounding whitespace")]
    InvalidTraitName(String),
    #[error("trait '{0}' is declared more than once")]
    DuplicateTrait(String),
    #[error("trait '{trait_name}' has invalid weight {weight}; weights must lie in (0, 1000]")]
    InvalidWeight { trait_name: String, weight: f64 },
    #[error("trait '{0}' is referenced but not declared in the profile")]
    UndeclaredTrait(String),
}
