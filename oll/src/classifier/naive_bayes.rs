use crate::algorithm::Algorithm;
use crate::classifier::Classifier;
use crate::data::{FeatureKey, FeatureVector, Label};
use crate::error::Error;
use crate::store::{ModelScalar, StoreKey, WeightCache, WeightStore};

type Result<T> = std::result::Result<T, Error>;

/// Floor every count starts from so that `ln` never sees zero
pub const EPSILON: f64 = 1e-7;

const TOTAL_POSITIVE: StoreKey = StoreKey::Scalar(ModelScalar::TotalPositive);
const TOTAL_NEGATIVE: StoreKey = StoreKey::Scalar(ModelScalar::TotalNegative);

/// Positive and negative observations of a feature (or of the whole model)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountPair {
    pub positive: f64,
    pub negative: f64,
}

impl Default for CountPair {
    fn default() -> Self {
        Self {
            positive: EPSILON,
            negative: EPSILON,
        }
    }
}

/// Counter based naive bayes classifier.
///
/// Each side of a feature's [`CountPair`] is stored under its own key, as are
/// the two running totals.
pub struct NaiveBayes<S> {
    counts: WeightCache<S>,
    total: CountPair,
}

impl<S: WeightStore> NaiveBayes<S> {
    pub fn new(store: S) -> Result<Self> {
        let counts = WeightCache::new(store);
        let total = CountPair {
            positive: counts.fetch(&TOTAL_POSITIVE, EPSILON)?,
            negative: counts.fetch(&TOTAL_NEGATIVE, EPSILON)?,
        };
        Ok(Self { counts, total })
    }

    pub fn totals(&self) -> CountPair {
        self.total
    }

    pub fn counts<K: Into<FeatureKey>>(&self, key: K) -> Result<CountPair> {
        let key = key.into();
        Ok(CountPair {
            positive: self
                .counts
                .fetch(&StoreKey::PositiveCount(key.clone()), EPSILON)?,
            negative: self.counts.fetch(&StoreKey::NegativeCount(key), EPSILON)?,
        })
    }

    pub fn store(&self) -> &S {
        self.counts.store()
    }

    fn log_likelihoods(&self, x: &FeatureVector) -> Result<(f64, f64)> {
        let CountPair {
            positive: total_positive,
            negative: total_negative,
        } = self.total;

        let mut positive = 0.0;
        let mut negative = 0.0;
        for (key, count) in x.iter() {
            let pair = self.counts(key.clone())?;
            positive += (pair.positive / total_positive).ln() * count;
            negative += (pair.negative / total_negative).ln() * count;
        }

        let total = total_positive + total_negative;
        positive += (total_positive / total).ln();
        negative += (total_negative / total).ln();
        Ok((positive, negative))
    }
}

impl<S: WeightStore> Classifier for NaiveBayes<S> {
    fn algorithm(&self) -> Algorithm {
        Algorithm::NaiveBayes
    }

    fn train(&mut self, x: &FeatureVector, y: Label) -> Result<()> {
        let (side, total_key): (fn(FeatureKey) -> StoreKey, StoreKey) = if y > 0.0 {
            (StoreKey::PositiveCount, TOTAL_POSITIVE)
        } else {
            (StoreKey::NegativeCount, TOTAL_NEGATIVE)
        };

        let mut total = if y > 0.0 {
            self.total.positive
        } else {
            self.total.negative
        };

        for (key, count) in x.iter() {
            let key = side(key.clone());
            let current = self.counts.fetch(&key, EPSILON)?;
            self.counts.update(key, current + count)?;
            total += count;
        }

        self.counts.update(total_key, total)?;
        if y > 0.0 {
            self.total.positive = total;
        } else {
            self.total.negative = total;
        }

        tracing::debug!(label = y, features = x.len(), total, "counted example");
        Ok(())
    }

    /// Returns `1.0` when the positive log-likelihood is strictly greater, `-1.0` otherwise
    fn test(&self, x: &FeatureVector) -> Result<f64> {
        let (positive, negative) = self.log_likelihoods(x)?;
        Ok(if positive > negative { 1.0 } else { -1.0 })
    }
}
