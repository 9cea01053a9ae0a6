use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Code conflict: {0}")]
    Conflict(String),

    #[error("Mark {value} from judge {judge_id} is outside 0..=100")]
    MarkOutOfRange { judge_id: String, value: f64 },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
