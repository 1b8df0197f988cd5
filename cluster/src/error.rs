use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("cluster: bad cluster count: k={k}, points={n}")]
    BadClusterCount { k: usize, n: usize },

    #[error("cluster: dimension mismatch: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("cluster: {0}")]
    Survey(#[from] bunkmate_survey::SurveyError),

    #[error("cluster: {0}")]
    Affinity(#[from] bunkmate_affinity::AffinityError),
}
