use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of questions in the roommate questionnaire.
pub const QUESTION_COUNT: usize = 25;

/// Lowest rating on the questionnaire's Likert scale.
pub const RATING_MIN: u8 = 1;

/// Highest rating on the questionnaire's Likert scale.
pub const RATING_MAX: u8 = 7;

/// Rating substituted for skipped questions.
pub const NEUTRAL_RATING: u8 = 4;

/// RawResponse is one questionnaire submission as stored.
///
/// Answers are positional: `answers[i]` is the rating for question i+1,
/// `None` if the question was skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResponse {
    pub user_id: i64,

    pub answers: [Option<u8>; QUESTION_COUNT],

    #[serde(rename = "ts")]
    pub submitted_at: DateTime<Utc>,
}

/// ResponseVector is the cleaned numeric vector the engine computes on.
/// Every entry is a rating in `[RATING_MIN, RATING_MAX]`; skipped questions
/// hold `NEUTRAL_RATING`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseVector {
    pub user_id: i64,
    pub values: [f32; QUESTION_COUNT],
}

impl RawResponse {
    pub fn new(user_id: i64, answers: [Option<u8>; QUESTION_COUNT]) -> Self {
        Self {
            user_id,
            answers,
            submitted_at: Utc::now(),
        }
    }

    /// Convert to the filled numeric vector: skipped answers become
    /// `NEUTRAL_RATING`, present answers are clamped into the rating range.
    /// A fully-answered, in-range response converts without change.
    pub fn to_vector(&self) -> ResponseVector {
        let mut values = [0.0f32; QUESTION_COUNT];
        for (i, answer) in self.answers.iter().enumerate() {
            let rating = match answer {
                Some(r) => (*r).clamp(RATING_MIN, RATING_MAX),
                None => NEUTRAL_RATING,
            };
            values[i] = rating as f32;
        }
        ResponseVector {
            user_id: self.user_id,
            values,
        }
    }

    /// True if every question was answered.
    pub fn is_complete(&self) -> bool {
        self.answers.iter().all(|a| a.is_some())
    }
}

impl ResponseVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
