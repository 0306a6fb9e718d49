use thiserror::Error;

use crate::contract::model::ObjectId;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User with id {id} was not found")]
    UserNotFound { id: ObjectId },

    #[error("User with name '{name}' already exists")]
    NameAlreadyExists { name: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("Invalid filter: {message}")]
    InvalidFilter { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn user_not_found(id: ObjectId) -> Self {
        Self::UserNotFound { id }
    }

    pub fn name_already_exists(name: String) -> Self {
        Self::NameAlreadyExists { name }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
