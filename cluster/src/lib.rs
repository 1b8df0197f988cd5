pub mod clusterer;
pub mod error;
pub mod kmeans;
pub mod preferences;

pub use clusterer::{ClusterOutcome, Clusterer};
pub use error::ClusterError;
pub use kmeans::{KMeansConfig, kmeans};
pub use preferences::preference_lists;
