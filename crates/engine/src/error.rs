//! The module contains the errors the engine can throw.
//!
//! - [`KeyNotFound`] when a referenced record does not exist.
//! - [`Validation`] when caller input is malformed.
//! - [`Auth`] when the source credential is missing or rejected.
//! - [`Source`] when the external bookkeeping API misbehaves.
//!
//! [`KeyNotFound`]: EngineError::KeyNotFound
//! [`Validation`]: EngineError::Validation
//! [`Auth`]: EngineError::Auth
//! [`Source`]: EngineError::Source
use sea_orm::DbErr;
use thiserror::Error;

use crate::source::SourceError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Authentication required: {0}")]
    Auth(String),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Auth(a), Self::Auth(b)) => a == b,
            (Self::Source(a), Self::Source(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
