use thiserror::Error;

#[derive(Error, Debug)]
pub enum AffinityError {
    #[error("affinity: dimension mismatch: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("affinity: duplicate user id {0}")]
    DuplicateUser(i64),

    #[error("affinity: cost matrix not square: row {row} has {got} columns, want {want}")]
    NotSquare { row: usize, got: usize, want: usize },
}
