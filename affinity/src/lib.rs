pub mod assignment;
pub mod cosine;
pub mod error;
pub mod matrix;
pub mod reciprocal;

pub use assignment::{Assignment, assign, match_by_assignment};
pub use cosine::cosine_similarity;
pub use error::AffinityError;
pub use matrix::{Candidate, SimilarityMatrix};
pub use reciprocal::reciprocal_candidates;
