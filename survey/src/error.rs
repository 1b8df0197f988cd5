use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("survey: store error: {0}")]
    Store(String),
}
