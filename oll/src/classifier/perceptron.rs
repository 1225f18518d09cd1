use crate::algorithm::Algorithm;
use crate::classifier::Classifier;
use crate::data::{FeatureKey, FeatureVector, Label};
use crate::error::Error;
use crate::store::{ModelScalar, StoreKey, WeightCache, WeightStore};

type Result<T> = std::result::Result<T, Error>;

const BIAS: StoreKey = StoreKey::Scalar(ModelScalar::Bias);

/// How strongly a single mistake moves the weights.
///
/// These are fixed parts of each algorithm rather than tunables: the threshold
/// and the step formula together are what distinguish the variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggressiveness {
    /// Plain perceptron. Constant step, updates only on a non-positive margin.
    Passive,
    /// Step grows with the squared norm of the example.
    Aggressive,
    /// Step proportional to the margin violation, clamped to `delta`.
    AggressiveI { delta: f64 },
    /// Step proportional to the margin violation, softened by `delta`.
    AggressiveII { delta: f64 },
}

impl Aggressiveness {
    pub const DELTA: f64 = 1.0;

    pub fn for_algorithm(algorithm: Algorithm) -> Option<Self> {
        match algorithm {
            Algorithm::Perceptron => Some(Aggressiveness::Passive),
            Algorithm::PerceptronAggressive => Some(Aggressiveness::Aggressive),
            Algorithm::PerceptronAggressive1 => Some(Aggressiveness::AggressiveI {
                delta: Self::DELTA,
            }),
            Algorithm::PerceptronAggressive2 => Some(Aggressiveness::AggressiveII {
                delta: Self::DELTA,
            }),
            Algorithm::NaiveBayes => None,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Aggressiveness::Passive => Algorithm::Perceptron,
            Aggressiveness::Aggressive => Algorithm::PerceptronAggressive,
            Aggressiveness::AggressiveI { .. } => Algorithm::PerceptronAggressive1,
            Aggressiveness::AggressiveII { .. } => Algorithm::PerceptronAggressive2,
        }
    }

    /// Examples scoring at or below this value trigger an update
    pub fn threshold(&self) -> f64 {
        match self {
            Aggressiveness::Passive => 0.0,
            _ => 1.0,
        }
    }

    /// Magnitude of the update for `x` given its current `score` (label times margin)
    pub fn normalize(&self, x: &FeatureVector, score: f64) -> f64 {
        let norm = 1.0 + x.sum_of_squares();
        match *self {
            Aggressiveness::Passive => 1.0,
            Aggressiveness::Aggressive => norm,
            Aggressiveness::AggressiveI { delta } => delta.min((1.0 - score) / norm),
            Aggressiveness::AggressiveII { delta } => (1.0 - score) / (norm + 1.0 / (2.0 * delta)),
        }
    }
}

/// Mistake-driven linear classifier whose weights live in a [`WeightStore`].
///
/// Note that the bias is updated multiplicatively (`bias *= step`), so a model
/// starting from a zero bias keeps a zero bias.
pub struct Perceptron<S> {
    weights: WeightCache<S>,
    bias: f64,
    aggressiveness: Aggressiveness,
}

impl<S: WeightStore> Perceptron<S> {
    /// Binds the classifier to an opened store and loads the persisted bias
    pub fn new(store: S, aggressiveness: Aggressiveness) -> Result<Self> {
        let weights = WeightCache::new(store);
        let bias = weights.fetch(&BIAS, 0.0)?;
        Ok(Self {
            weights,
            bias,
            aggressiveness,
        })
    }

    pub fn aggressiveness(&self) -> Aggressiveness {
        self.aggressiveness
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Current weight of a feature, 0.0 if it was never trained
    pub fn weight<K: Into<FeatureKey>>(&self, key: K) -> Result<f64> {
        self.weights.fetch(&StoreKey::Weight(key.into()), 0.0)
    }

    pub fn store(&self) -> &S {
        self.weights.store()
    }

    fn margin(&self, x: &FeatureVector) -> Result<f64> {
        let mut margin = self.bias;
        for (key, count) in x.iter() {
            margin += self.weights.fetch(&StoreKey::Weight(key.clone()), 0.0)? * count;
        }
        Ok(margin)
    }

    fn update(&mut self, x: &FeatureVector, step: f64) -> Result<()> {
        for (key, count) in x.iter() {
            let key = StoreKey::Weight(key.clone());
            let weight = self.weights.fetch(&key, 0.0)?;
            self.weights.update(key, weight + step * count)?;
        }

        let bias = self.bias * step;
        self.weights.update(BIAS, bias)?;
        self.bias = bias;
        Ok(())
    }
}

impl<S: WeightStore> Classifier for Perceptron<S> {
    fn algorithm(&self) -> Algorithm {
        self.aggressiveness.algorithm()
    }

    fn train(&mut self, x: &FeatureVector, y: Label) -> Result<()> {
        if y != 1.0 && y != -1.0 {
            tracing::warn!(label = y, "rejecting label");
            return Err(Error::InvalidLabel(y));
        }

        let score = y * self.margin(x)?;
        if score > self.aggressiveness.threshold() {
            tracing::debug!(score, "margin satisfied, skipping update");
            return Ok(());
        }

        let step = y * self.aggressiveness.normalize(x, score);
        tracing::debug!(score, step, features = x.len(), "updating weights");
        self.update(x, step)
    }

    fn test(&self, x: &FeatureVector) -> Result<f64> {
        self.margin(x)
    }
}

#[cfg(test)]
mod test {
    use super::{Aggressiveness, Perceptron};
    use crate::algorithm::Algorithm;
    use crate::classifier::Classifier;
    use crate::data::FeatureVector;
    use crate::error::Error;
    use crate::store::cache::test::CountingStore;
    use crate::store::{MemoryStore, ModelScalar, StoreKey, WeightStore};

    fn perceptron(aggressiveness: Aggressiveness) -> anyhow::Result<Perceptron<MemoryStore>> {
        let mut store = MemoryStore::new();
        store.open()?;
        Ok(Perceptron::new(store, aggressiveness)?)
    }

    fn vector(counts: &[(&str, f64)]) -> anyhow::Result<FeatureVector> {
        Ok(FeatureVector::from_counts(counts.iter().copied())?)
    }

    #[test]
    fn trained_key_moves_toward_label() -> anyhow::Result<()> {
        let mut model = perceptron(Aggressiveness::Passive)?;
        let x = vector(&[("ab", 1.0)])?;

        model.train(&x, 1.0)?;
        assert!(model.test(&x)? > 0.0);
        assert_eq!(model.test(&vector(&[("zz", 1.0)])?)?, 0.0);
        assert_eq!(model.weight("ab")?, 1.0);
        Ok(())
    }

    #[test]
    fn negative_label() -> anyhow::Result<()> {
        let mut model = perceptron(Aggressiveness::Passive)?;
        let x = vector(&[("ab", 2.0), ("bc", 1.0)])?;

        model.train(&x, -1.0)?;
        assert_eq!(model.weight("ab")?, -2.0);
        assert_eq!(model.weight("bc")?, -1.0);
        assert!(model.test(&x)? < 0.0);
        Ok(())
    }

    #[test]
    fn no_update_once_margin_is_satisfied() -> anyhow::Result<()> {
        let mut model = perceptron(Aggressiveness::Passive)?;
        let x = vector(&[("ab", 1.0)])?;

        model.train(&x, 1.0)?;
        model.train(&x, 1.0)?;
        assert_eq!(model.weight("ab")?, 1.0);
        Ok(())
    }

    #[test]
    fn converges_on_single_example() -> anyhow::Result<()> {
        for aggressiveness in [Aggressiveness::Passive, Aggressiveness::Aggressive] {
            for y in [1.0, -1.0] {
                let mut model = perceptron(aggressiveness)?;
                let x = vector(&[("ab", 1.0), ("bc", 3.0), ("cd", 0.5)])?;

                let mut rounds = 0;
                while y * model.test(&x)? <= aggressiveness.threshold() {
                    model.train(&x, y)?;
                    rounds += 1;
                    assert!(rounds < 100, "{aggressiveness:?} did not converge");
                }
            }
        }
        Ok(())
    }

    #[test]
    fn passive_aggressive_margin_improves_monotonically() -> anyhow::Result<()> {
        let policies = [
            Aggressiveness::AggressiveI { delta: 1.0 },
            Aggressiveness::AggressiveII { delta: 1.0 },
        ];
        for aggressiveness in policies {
            let mut model = perceptron(aggressiveness)?;
            let x = vector(&[("ab", 1.0), ("bc", 2.0)])?;

            let mut previous = model.test(&x)?;
            for _ in 0..10 {
                model.train(&x, 1.0)?;
                let current = model.test(&x)?;
                assert!(current > previous, "{aggressiveness:?} stalled");
                assert!(current <= 1.0);
                previous = current;
            }
        }
        Ok(())
    }

    #[test]
    fn normalize_per_variant() -> anyhow::Result<()> {
        // 1 + 1^2 + 2^2
        let x = vector(&[("ab", 1.0), ("bc", 2.0)])?;

        assert_eq!(Aggressiveness::Passive.normalize(&x, 0.3), 1.0);
        assert_eq!(Aggressiveness::Aggressive.normalize(&x, 0.3), 6.0);
        assert_eq!(
            Aggressiveness::AggressiveI { delta: 1.0 }.normalize(&x, 0.4),
            0.6 / 6.0
        );
        assert_eq!(
            Aggressiveness::AggressiveII { delta: 1.0 }.normalize(&x, 0.4),
            0.6 / 6.5
        );
        Ok(())
    }

    #[test]
    fn aggressive_one_is_clamped_to_delta() -> anyhow::Result<()> {
        let policy = Aggressiveness::AggressiveI { delta: 1.0 };
        let empty = FeatureVector::new();

        // (1 - -10) / 1 would be 11
        assert_eq!(policy.normalize(&empty, -10.0), 1.0);
        assert_eq!(policy.normalize(&vector(&[("ab", 0.1)])?, -1000.0), 1.0);
        Ok(())
    }

    #[test]
    fn thresholds() {
        assert_eq!(Aggressiveness::Passive.threshold(), 0.0);
        assert_eq!(Aggressiveness::Aggressive.threshold(), 1.0);
        assert_eq!(Aggressiveness::AggressiveI { delta: 1.0 }.threshold(), 1.0);
        assert_eq!(Aggressiveness::AggressiveII { delta: 1.0 }.threshold(), 1.0);
    }

    #[test]
    fn bias_is_multiplicative() -> anyhow::Result<()> {
        let mut store = MemoryStore::new();
        store.open()?;
        store.set(&StoreKey::Scalar(ModelScalar::Bias).encode(), 0.5)?;

        let mut model = Perceptron::new(store, Aggressiveness::Aggressive)?;
        assert_eq!(model.bias(), 0.5);

        // margin 0.5 <= 1, step = 1 * (1 + 2^2) = 5
        let x = vector(&[("ab", 2.0)])?;
        model.train(&x, 1.0)?;
        assert_eq!(model.weight("ab")?, 10.0);
        assert_eq!(model.bias(), 2.5);
        assert_eq!(
            model
                .store()
                .get(&StoreKey::Scalar(ModelScalar::Bias).encode())?,
            Some(2.5)
        );
        Ok(())
    }

    #[test]
    fn zero_bias_stays_zero() -> anyhow::Result<()> {
        let mut model = perceptron(Aggressiveness::Passive)?;
        model.train(&vector(&[("ab", 1.0)])?, 1.0)?;
        model.train(&vector(&[("cd", 1.0)])?, -1.0)?;
        assert_eq!(model.bias(), 0.0);
        assert_eq!(model.test(&FeatureVector::new())?, 0.0);
        Ok(())
    }

    #[test]
    fn every_touched_weight_is_persisted() -> anyhow::Result<()> {
        let mut model = perceptron(Aggressiveness::Passive)?;
        model.train(&vector(&[("ab", 1.0), ("bc", 2.0)])?, 1.0)?;

        let store = model.store();
        assert_eq!(store.get(&StoreKey::Weight("ab".into()).encode())?, Some(1.0));
        assert_eq!(store.get(&StoreKey::Weight("bc".into()).encode())?, Some(2.0));
        assert_eq!(
            store.get(&StoreKey::Scalar(ModelScalar::Bias).encode())?,
            Some(0.0)
        );
        assert_eq!(store.len(), 3);
        Ok(())
    }

    #[test]
    fn test_is_idempotent_and_does_not_write() -> anyhow::Result<()> {
        let mut store = CountingStore::default();
        store.open()?;
        let mut model = Perceptron::new(store, Aggressiveness::Passive)?;
        model.train(&vector(&[("ab", 1.0)])?, 1.0)?;

        let x = vector(&[("ab", 1.0), ("unseen", 4.0)])?;
        let first = model.test(&x)?;
        let lookups = model.store().lookups();
        let second = model.test(&x)?;

        assert_eq!(first, second);
        assert_eq!(model.store().lookups(), lookups);
        assert_eq!(model.store().inner.len(), 2);
        Ok(())
    }

    #[test]
    fn rejects_labels_outside_of_family() -> anyhow::Result<()> {
        let mut model = perceptron(Aggressiveness::Passive)?;
        let x = vector(&[("ab", 1.0)])?;
        for y in [0.0, 2.0, -0.5, f64::NAN] {
            assert!(matches!(model.train(&x, y), Err(Error::InvalidLabel(_))));
        }
        assert!(model.store().is_empty());
        Ok(())
    }

    #[test]
    fn reloads_from_store() -> anyhow::Result<()> {
        let mut model = perceptron(Aggressiveness::Passive)?;
        let x = vector(&[("ab", 1.0)])?;
        model.train(&x, -1.0)?;

        let store = model.store().clone();
        let reloaded = Perceptron::new(store, Aggressiveness::Passive)?;
        assert_eq!(reloaded.test(&x)?, model.test(&x)?);
        assert_eq!(reloaded.algorithm(), Algorithm::Perceptron);
        Ok(())
    }
}
