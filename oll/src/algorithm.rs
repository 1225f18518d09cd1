use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Learning algorithms that a classifier can be created with.
///
/// The names are the ones models have been persisted under and must not change.
///
/// `Perceptron` - Classical mistake-driven perceptron. Updates only when the margin is not positive.
///
/// `PerceptronAggressive`, `PerceptronAggressive1`, `PerceptronAggressive2` - Passive-aggressive
///             variants that update while the margin is below 1 and scale each correction
///             by how badly the example was scored.
///
/// `NaiveBayes` - Counter based naive bayes. Keeps per-feature positive/negative counts.
///
#[derive(Hash, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(try_from = "String")]
pub enum Algorithm {
    #[display(fmt = "perceptron")]
    #[serde(rename = "perceptron")]
    Perceptron,

    #[display(fmt = "perceptron_aggressive")]
    #[serde(rename = "perceptron_aggressive")]
    PerceptronAggressive,

    #[display(fmt = "perceptron_aggressive1")]
    #[serde(rename = "perceptron_aggressive1")]
    PerceptronAggressive1,

    #[display(fmt = "perceptron_aggressive2")]
    #[serde(rename = "perceptron_aggressive2")]
    PerceptronAggressive2,

    #[display(fmt = "naivebayse")]
    #[serde(rename = "naivebayse")]
    NaiveBayes,
}

const REGISTRY: [(&str, Algorithm); 5] = [
    ("perceptron", Algorithm::Perceptron),
    ("perceptron_aggressive", Algorithm::PerceptronAggressive),
    ("perceptron_aggressive1", Algorithm::PerceptronAggressive1),
    ("perceptron_aggressive2", Algorithm::PerceptronAggressive2),
    ("naivebayse", Algorithm::NaiveBayes),
];

impl Default for Algorithm {
    fn default() -> Self {
        Self::Perceptron
    }
}

impl Algorithm {
    /// Every registered algorithm, in registration order
    pub fn all() -> impl Iterator<Item = Algorithm> {
        REGISTRY.iter().map(|(_, algorithm)| *algorithm)
    }

    /// Whether the algorithm belongs to the perceptron family
    pub fn is_perceptron(&self) -> bool {
        !matches!(self, Algorithm::NaiveBayes)
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized = name.trim().to_ascii_lowercase();
        REGISTRY
            .iter()
            .find(|(registered, _)| *registered == normalized)
            .map(|(_, algorithm)| *algorithm)
            .ok_or_else(|| Error::UnsupportedAlgorithm(name.to_string()))
    }
}

impl TryFrom<String> for Algorithm {
    type Error = Error;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}
