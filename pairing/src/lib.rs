pub mod error;
pub mod matchmaker;
pub mod store;
pub mod types;

pub use error::PairingError;
pub use matchmaker::{Matchmaker, MatchmakerConfig};
pub use store::{MATCH_LIMIT, MatchStore, MemoryMatchStore};
pub use types::{BestMatch, MatchRecord, PairKey, RoundOutcome};
