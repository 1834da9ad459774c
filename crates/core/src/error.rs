use thiserror::Error;

use crate::model::{ParseStatusError, QuizError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    ParseStatus(#[from] ParseStatusError),
}
