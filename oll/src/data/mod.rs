pub mod vectorize;

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use vectorize::{make_vector, NGramVectorizer, Vectorizer};

type Result<T> = std::result::Result<T, Error>;

/// Signed label of an example. The perceptron family only accepts `1.0` and `-1.0`,
/// naive bayes only looks at the sign.
pub type Label = f64;

/// Opaque identifier of one dimension of the sparse feature space.
///
/// Keys are raw bytes and are never assumed to be valid UTF-8.
#[derive(Hash, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FeatureKey(Vec<u8>);

impl FeatureKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl Borrow<[u8]> for FeatureKey {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for FeatureKey {
    fn from(key: &str) -> Self {
        FeatureKey(key.as_bytes().to_vec())
    }
}

impl From<String> for FeatureKey {
    fn from(key: String) -> Self {
        FeatureKey(key.into_bytes())
    }
}

impl From<&[u8]> for FeatureKey {
    fn from(key: &[u8]) -> Self {
        FeatureKey(key.to_vec())
    }
}

impl From<Vec<u8>> for FeatureKey {
    fn from(key: Vec<u8>) -> Self {
        FeatureKey(key)
    }
}

/// Sparse mapping of feature key to a non-negative count.
///
/// Iteration follows insertion order so that every pass over a vector touches
/// the weight store in the same order.
///
/// Serialized as a map of hex encoded keys to counts. Deserializing validates
/// every count the same way [`FeatureVector::insert`] does.
#[derive(Default, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "IndexMap<String, f64>", into = "IndexMap<String, f64>")]
pub struct FeatureVector {
    features: IndexMap<FeatureKey, f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a vector from explicit `(key, count)` pairs. Repeated keys are summed.
    ///
    /// # Example
    ///
    /// ```
    /// use oll::data::FeatureVector;
    ///
    /// let x = FeatureVector::from_counts([("ab", 2.0), ("bc", 1.0), ("ab", 1.0)]).unwrap();
    /// assert_eq!(x.get("ab"), Some(3.0));
    /// assert_eq!(x.len(), 2);
    /// ```
    pub fn from_counts<K, I>(counts: I) -> Result<Self>
    where
        K: Into<FeatureKey>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut vector = FeatureVector::new();
        for (key, count) in counts {
            vector.add(key.into(), count)?;
        }
        Ok(vector)
    }

    /// Sets the count of `key`, replacing any previous count
    pub fn insert<K: Into<FeatureKey>>(&mut self, key: K, count: f64) -> Result<()> {
        let key = key.into();
        validate(&key, count)?;
        self.features.insert(key, count);
        Ok(())
    }

    /// Adds one occurrence of `key`
    pub fn increment<K: Into<FeatureKey>>(&mut self, key: K) {
        *self.features.entry(key.into()).or_insert(0.0) += 1.0;
    }

    fn add(&mut self, key: FeatureKey, count: f64) -> Result<()> {
        validate(&key, count)?;
        *self.features.entry(key).or_insert(0.0) += count;
        Ok(())
    }

    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<f64> {
        self.features.get(key.as_ref()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureKey, f64)> {
        self.features.iter().map(|(key, count)| (key, *count))
    }

    pub fn keys(&self) -> impl Iterator<Item = &FeatureKey> {
        self.features.keys()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Sum of the squared counts
    pub fn sum_of_squares(&self) -> f64 {
        self.features.values().map(|count| count * count).sum()
    }
}

fn validate(key: &FeatureKey, count: f64) -> Result<()> {
    if !count.is_finite() || count < 0.0 {
        tracing::warn!(key = %key, count, "rejecting feature count");
        return Err(Error::InvalidCount {
            key: key.to_string(),
            count,
        });
    }
    Ok(())
}

impl TryFrom<IndexMap<String, f64>> for FeatureVector {
    type Error = Error;

    fn try_from(encoded: IndexMap<String, f64>) -> Result<Self> {
        let mut vector = FeatureVector::new();
        for (key, count) in encoded {
            let key = match hex::decode(&key) {
                Ok(key) => key,
                Err(_) => return Err(Error::InvalidFeatureKey(key)),
            };
            vector.insert(key, count)?;
        }
        Ok(vector)
    }
}

impl From<FeatureVector> for IndexMap<String, f64> {
    fn from(vector: FeatureVector) -> Self {
        vector
            .features
            .into_iter()
            .map(|(key, count)| (hex::encode(key.as_bytes()), count))
            .collect()
    }
}

impl<K: Into<FeatureKey>> FromIterator<K> for FeatureVector {
    /// Counts each occurrence of a key as 1
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut vector = FeatureVector::new();
        for key in iter {
            vector.increment(key);
        }
        vector
    }
}
