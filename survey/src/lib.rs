pub mod error;
pub mod response;
pub mod store;

pub use error::SurveyError;
pub use response::{
    NEUTRAL_RATING, QUESTION_COUNT, RATING_MAX, RATING_MIN, RawResponse, ResponseVector,
};
pub use store::{MemoryResponseStore, ResponseStore};
