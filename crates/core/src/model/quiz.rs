use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("correct answers ({correct}) exceed question count ({total})")]
    TooManyCorrect { correct: u32, total: u32 },
}

//
// ─── QUIZ ATTEMPT ──────────────────────────────────────────────────────────────
//

/// One graded quiz attempt as stored on the concept's `quizzes` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub correct: u32,
    pub total: u32,
    pub percentage: f64,
}

impl QuizAttempt {
    /// Build an attempt from a raw score, computing the stored percentage.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` for an empty quiz and
    /// `QuizError::TooManyCorrect` if `correct > total`.
    pub fn score(correct: u32, total: u32) -> Result<Self, QuizError> {
        if total == 0 {
            return Err(QuizError::NoQuestions);
        }
        if correct > total {
            return Err(QuizError::TooManyCorrect { correct, total });
        }

        Ok(Self {
            correct,
            total,
            percentage: (f64::from(correct) / f64::from(total)) * 100.0,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
