//! Error types for robot definitions and the simulation environment.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading robot or scene XML.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// Missing required element.
    #[error("missing required element: {element} in {context}")]
    MissingElement {
        element: &'static str,
        context: String,
    },

    /// Missing required attribute.
    #[error("missing required attribute: {attribute} on {element}")]
    MissingAttribute {
        attribute: &'static str,
        element: String,
    },

    /// Element text could not be interpreted.
    #[error("invalid value in <{element}>: {message}")]
    InvalidValue { element: String, message: String },

    #[error("unknown joint type: {0}")]
    UnknownJointType(String),

    #[error("duplicate joint name: {0}")]
    DuplicateJoint(String),

    /// A `<Robot file="...">` include could not be read.
    #[error("failed to read {path}: {source}")]
    Include {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DefinitionError {
    pub fn missing_element(element: &'static str, context: impl Into<String>) -> Self {
        Self::MissingElement {
            element,
            context: context.into(),
        }
    }

    pub fn missing_attribute(attribute: &'static str, element: impl Into<String>) -> Self {
        Self::MissingAttribute {
            attribute,
            element: element.into(),
        }
    }

    pub fn invalid_value(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            element: element.into(),
            message: message.into(),
        }
    }
}

impl From<quick_xml::Error> for DefinitionError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

/// Errors raised by environment operations.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("failed to read scene {path}: {source}")]
    SceneRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scene {path}: {source}")]
    SceneDefinition {
        path: PathBuf,
        #[source]
        source: DefinitionError,
    },

    /// A robot with this name is already loaded.
    #[error("robot name already in use: {0}")]
    DuplicateName(String),

    /// The handle no longer refers to a loaded robot.
    #[error("robot handle is no longer valid")]
    StaleHandle,
}

/// Result alias for definition parsing.
pub type DefinitionResult<T> = std::result::Result<T, DefinitionError>;
