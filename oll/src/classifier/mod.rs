pub mod naive_bayes;
pub mod perceptron;

use crate::algorithm::Algorithm;
use crate::data::{FeatureVector, Label};
use crate::error::Error;
use crate::store::WeightStore;
use crate::sync::{Arc, RwLock};

pub use naive_bayes::NaiveBayes;
pub use perceptron::{Aggressiveness, Perceptron};

type Result<T> = std::result::Result<T, Error>;

/// Online binary classifier that learns one example at a time.
///
/// `train` takes `&mut self`, so a single classifier can only ever have one
/// writer. `test` only fills the weight cache and may run from many readers.
pub trait Classifier: Send + Sync {
    /// Algorithm the classifier was created with
    fn algorithm(&self) -> Algorithm;

    /// Learns from a single example. Every touched weight is durable once this returns.
    fn train(&mut self, x: &FeatureVector, y: Label) -> Result<()>;

    /// Scores an example; the sign of the score is the predicted label
    fn test(&self, x: &FeatureVector) -> Result<f64>;

    /// Predicted label of an example, `1.0` or `-1.0`
    fn predict(&self, x: &FeatureVector) -> Result<Label> {
        self.test(x).map(|score| if score > 0.0 { 1.0 } else { -1.0 })
    }
}

/// Classifier shared between threads. Trains take the write lock, tests the read lock.
pub type SharedClassifier = Arc<RwLock<Box<dyn Classifier>>>;

pub fn into_shared(classifier: Box<dyn Classifier>) -> SharedClassifier {
    Arc::new(RwLock::new(classifier))
}

/// Creates the classifier registered under `algorithm`, bound to `store`.
///
/// The name is resolved before the store is touched, so an unsupported name
/// never opens storage.
///
/// # Example
///
/// ```
/// use oll::data::make_vector;
/// use oll::store::MemoryStore;
/// use oll::Classifier;
///
/// let mut classifier = oll::create("Perceptron_Aggressive", MemoryStore::new()).unwrap();
/// classifier.train(&make_vector("good morning"), 1.0).unwrap();
/// assert_eq!(classifier.predict(&make_vector("good morning")).unwrap(), 1.0);
///
/// assert!(oll::create("foo", MemoryStore::new()).is_err());
/// ```
pub fn create<S>(algorithm: &str, store: S) -> Result<Box<dyn Classifier>>
where
    S: WeightStore + 'static,
{
    let algorithm = algorithm.parse::<Algorithm>()?;
    create_with(algorithm, store)
}

/// Opens `store` and creates the classifier for `algorithm` on top of it
pub fn create_with<S>(algorithm: Algorithm, mut store: S) -> Result<Box<dyn Classifier>>
where
    S: WeightStore + 'static,
{
    store.open()?;
    tracing::debug!(%algorithm, store = %store.id(), "creating classifier");

    let classifier: Box<dyn Classifier> = match algorithm {
        Algorithm::Perceptron => Box::new(Perceptron::new(store, Aggressiveness::Passive)?),
        Algorithm::PerceptronAggressive => {
            Box::new(Perceptron::new(store, Aggressiveness::Aggressive)?)
        }
        Algorithm::PerceptronAggressive1 => Box::new(Perceptron::new(
            store,
            Aggressiveness::AggressiveI {
                delta: Aggressiveness::DELTA,
            },
        )?),
        Algorithm::PerceptronAggressive2 => Box::new(Perceptron::new(
            store,
            Aggressiveness::AggressiveII {
                delta: Aggressiveness::DELTA,
            },
        )?),
        Algorithm::NaiveBayes => Box::new(NaiveBayes::new(store)?),
    };
    Ok(classifier)
}
