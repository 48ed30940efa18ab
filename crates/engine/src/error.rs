//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidAmount`], [`InvalidParticipants`] and [`InvalidField`] thrown
//!   when an input is rejected before anything is written.
//! - [`KeyNotFound`] thrown when a group or an expense is not found.
//! - [`Database`] thrown when the store fails.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidParticipants`]: EngineError::InvalidParticipants
//!  [`InvalidField`]: EngineError::InvalidField
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid participants: {0}")]
    InvalidParticipants(String),
    #[error("Invalid field: {0}")]
    InvalidField(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// `true` for the errors raised while validating an input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::InvalidParticipants(_) | Self::InvalidField(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidParticipants(a), Self::InvalidParticipants(b)) => a == b,
            (Self::InvalidField(a), Self::InvalidField(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_family() {
        assert!(EngineError::InvalidAmount("x".to_string()).is_validation());
        assert!(EngineError::InvalidParticipants("x".to_string()).is_validation());
        assert!(EngineError::InvalidField("x".to_string()).is_validation());
        assert!(!EngineError::KeyNotFound("x".to_string()).is_validation());
        assert!(!EngineError::Database(DbErr::Custom("x".to_string())).is_validation());
    }
}
