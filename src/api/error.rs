use thiserror::Error;

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;

use crate::attributes::AttributeError;
use crate::environment::{DefinitionError, EnvironmentError};

pub const UNKNOWN_TYPE_MESSAGE: &str = "Unknown POST request type";
pub const BAD_SYNTAX_MESSAGE: &str = "Bad syntax";

/// Why a POSTed command was not applied.
///
/// Callers only ever see one of two wire messages; the variant is kept for
/// logs and tests.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("request body could not be read: {0}")]
    UnreadableBody(#[from] BytesRejection),

    #[error("request body is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("unknown command type {0}")]
    UnknownType(String),

    #[error("robot `{0}` not found")]
    RobotNotFound(String),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

impl CommandError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownType(_) => StatusCode::IM_A_TEAPOT,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn wire_message(&self) -> &'static str {
        match self {
            Self::UnknownType(_) => UNKNOWN_TYPE_MESSAGE,
            _ => BAD_SYNTAX_MESSAGE,
        }
    }
}
