use thiserror::Error;

#[derive(Error, Debug)]
pub enum PairingError {
    #[error("pairing: {0}")]
    Survey(#[from] bunkmate_survey::SurveyError),

    #[error("pairing: {0}")]
    Affinity(#[from] bunkmate_affinity::AffinityError),

    #[error("pairing: store error: {0}")]
    Store(String),
}
