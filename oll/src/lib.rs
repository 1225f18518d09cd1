pub mod sync {
    pub use parking_lot::{RwLock, RwLockReadGuard, RwLockUpgradableReadGuard, RwLockWriteGuard};
    pub use std::sync::Arc;
}

pub mod algorithm;
pub mod classifier;
pub mod config;
pub mod data;
pub mod error;
pub mod store;

pub use algorithm::Algorithm;
pub use classifier::{create, create_with, Classifier, SharedClassifier};
pub use data::{FeatureKey, FeatureVector, Label};
pub use store::WeightStore;

pub trait Extension {
    /// Returns an id of the extension. Should be the crate name (eg in a `oll-store-backend` format)
    fn id(&self) -> String;

    /// Returns the name of an extension
    fn name(&self) -> String;

    /// Returns the description of the extension
    fn description(&self) -> String {
        format!(
            "{} is an extension that is designed to be used as a weight store",
            self.name()
        )
    }
}
