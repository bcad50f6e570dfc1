use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::CommandError;

/// Uniform response body. Keys are emitted in declaration order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Envelope {
    #[serde(rename = "Success")]
    pub success: u8,
    #[serde(rename = "Error Message")]
    pub error_message: String,
    #[serde(rename = "Robots")]
    pub robots: Vec<String>,
}

impl Envelope {
    pub fn success(robots: Vec<String>) -> Self {
        Self {
            success: 1,
            error_message: String::new(),
            robots,
        }
    }

    pub fn failure(message: impl Into<String>, robots: Vec<String>) -> Self {
        Self {
            success: 0,
            error_message: message.into(),
            robots,
        }
    }
}

/// A decoded POST body.
#[derive(Clone, Debug, PartialEq)]
pub enum RobotCommand {
    /// Add a robot from its XML definition.
    Add { xml: String },
    /// Change attributes of a robot; keys are applied in request order.
    Set {
        robot: String,
        attributes: Map<String, Value>,
    },
    Remove { robot: String },
    /// Reserved; accepted and ignored.
    Download,
}

impl RobotCommand {
    pub fn from_body(body: &[u8]) -> Result<Self, CommandError> {
        let request: Value = serde_json::from_slice(body)?;
        Self::from_value(&request)
    }

    pub fn from_value(request: &Value) -> Result<Self, CommandError> {
        let object = request.as_object().ok_or(CommandError::NotAnObject)?;
        let kind = object.get("type").ok_or(CommandError::MissingField("type"))?;

        match kind.as_str() {
            Some("add") => Ok(Self::Add {
                xml: decode_definition(string_field(object, "xml")?)?,
            }),
            Some("set") => Ok(Self::Set {
                robot: string_field(object, "robot")?.to_string(),
                attributes: object
                    .get("set")
                    .ok_or(CommandError::MissingField("set"))?
                    .as_object()
                    .cloned()
                    .ok_or(CommandError::InvalidField {
                        field: "set",
                        expected: "an object",
                    })?,
            }),
            Some("remove") => Ok(Self::Remove {
                robot: string_field(object, "robot")?.to_string(),
            }),
            Some("download") => Ok(Self::Download),
            _ => Err(CommandError::UnknownType(kind.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Set { .. } => "set",
            Self::Remove { .. } => "remove",
            Self::Download => "download",
        }
    }
}

fn string_field<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, CommandError> {
    object
        .get(field)
        .ok_or(CommandError::MissingField(field))?
        .as_str()
        .ok_or(CommandError::InvalidField {
            field,
            expected: "a string",
        })
}

/// Clients may JSON-encode the document a second time; undo that if present.
fn decode_definition(xml: &str) -> Result<String, CommandError> {
    let trimmed = xml.trim();
    if trimmed.starts_with('"') {
        return serde_json::from_str::<String>(trimmed).map_err(|_| CommandError::InvalidField {
            field: "xml",
            expected: "a robot XML document",
        });
    }
    Ok(xml.to_string())
}
