pub mod cache;
pub mod memory;

use derive_more::Display;

use crate::data::FeatureKey;
use crate::error::Error;
use crate::Extension;

pub use cache::WeightCache;
pub use memory::MemoryStore;

type Result<T> = std::result::Result<T, Error>;

/// Durable mapping of byte keys to `f64` values that a classifier's weights live in.
///
/// Implementations must keep keys binary-exact; keys are not guaranteed to be UTF-8.
pub trait WeightStore: Extension + Send + Sync {
    /// Establishes the underlying storage handle, creating the schema on first use.
    /// Calling it again once opened is a no-op.
    fn open(&mut self) -> Result<()>;

    /// Returns the persisted value of `key`, or `None` if it was never written
    fn get(&self, key: &[u8]) -> Result<Option<f64>>;

    /// Creates or replaces the persisted value of `key`. The write is durable once this returns.
    fn set(&mut self, key: &[u8], value: f64) -> Result<()>;
}

impl<S: WeightStore + ?Sized> WeightStore for Box<S> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn get(&self, key: &[u8]) -> Result<Option<f64>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &[u8], value: f64) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<S: Extension + ?Sized> Extension for Box<S> {
    fn id(&self) -> String {
        (**self).id()
    }

    fn name(&self) -> String {
        (**self).name()
    }

    fn description(&self) -> String {
        (**self).description()
    }
}

/// Model-wide scalars stored next to the per-feature entries
#[derive(Hash, Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ModelScalar {
    #[display(fmt = "bias")]
    Bias,
    #[display(fmt = "total_positive")]
    TotalPositive,
    #[display(fmt = "total_negative")]
    TotalNegative,
}

/// Key of a single stored value.
///
/// Each variant is encoded with its own leading tag byte so that a feature key
/// can never alias a model scalar or an entry of another kind.
#[derive(Hash, Debug, Clone, PartialEq, Eq)]
pub enum StoreKey {
    /// Perceptron weight of a feature
    Weight(FeatureKey),
    /// Naive bayes positive count of a feature
    PositiveCount(FeatureKey),
    /// Naive bayes negative count of a feature
    NegativeCount(FeatureKey),
    Scalar(ModelScalar),
}

const WEIGHT_TAG: u8 = b'w';
const POSITIVE_TAG: u8 = b'p';
const NEGATIVE_TAG: u8 = b'n';
const SCALAR_TAG: u8 = b'_';

impl StoreKey {
    pub fn encode(&self) -> Vec<u8> {
        let (tag, body) = match self {
            StoreKey::Weight(key) => (WEIGHT_TAG, key.as_bytes()),
            StoreKey::PositiveCount(key) => (POSITIVE_TAG, key.as_bytes()),
            StoreKey::NegativeCount(key) => (NEGATIVE_TAG, key.as_bytes()),
            StoreKey::Scalar(ModelScalar::Bias) => (SCALAR_TAG, &b"bias"[..]),
            StoreKey::Scalar(ModelScalar::TotalPositive) => (SCALAR_TAG, &b"total_positive"[..]),
            StoreKey::Scalar(ModelScalar::TotalNegative) => (SCALAR_TAG, &b"total_negative"[..]),
        };
        let mut encoded = Vec::with_capacity(body.len() + 1);
        encoded.push(tag);
        encoded.extend_from_slice(body);
        encoded
    }
}
