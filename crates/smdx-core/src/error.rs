//! Error taxonomy for model conversion

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmdxError {
    #[error("No input document specified")]
    InputMissing,
    #[error("Failed to parse SMDX document: {0}")]
    Parse(String),
    #[error("Invalid SMDX structure: missing <{0}> element")]
    MissingElement(String),
    #[error("Missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: String,
        attribute: String,
    },
    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    #[error("Point '{id}' has unknown type '{point_type}'")]
    UnknownPointType { id: String, point_type: String },
    #[error("Failed to serialize manifest: {0}")]
    Serialize(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for SmdxError {
    fn from(err: quick_xml::Error) -> Self {
        SmdxError::Parse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SmdxError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        SmdxError::Parse(err.to_string())
    }
}
