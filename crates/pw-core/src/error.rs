use thiserror::Error;

pub type PwResult<T> = Result<T, PwError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PwError {
    #[error("Invalid tag name '{name}': {reason}")]
    InvalidTagName { name: String, reason: &'static str },
}
