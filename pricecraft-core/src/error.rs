//! Domain error kinds surfaced to the user

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load or parse the reference Google Sheet.
///
/// These are reported to the user as blocking messages and never retried
/// automatically; the user re-triggers the refresh after correcting the link
/// or sharing settings.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid Google Sheet link: {0}")]
    InvalidLink(String),

    #[error("reference sheet unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("reference sheet returned HTTP {0}")]
    BadStatus(u16),

    #[error("reference sheet is missing expected header '{0}'")]
    MissingHeader(&'static str),

    #[error("malformed reference data: {0}")]
    Malformed(#[from] csv::Error),
}

/// Failure to open or rewrite the upload template workbook.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template file not found: {0}")]
    Missing(PathBuf),

    #[error("template is not a valid workbook: {0}")]
    Invalid(String),

    #[error("template worksheet part '{0}' is absent")]
    MissingSheet(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for TemplateError {
    fn from(err: zip::result::ZipError) -> Self {
        TemplateError::Invalid(err.to_string())
    }
}

impl From<quick_xml::Error> for TemplateError {
    fn from(err: quick_xml::Error) -> Self {
        TemplateError::Invalid(err.to_string())
    }
}

/// An operation was invoked in a session state that does not allow it.
#[derive(Debug, Error)]
#[error("invalid session transition: {0}")]
pub struct StateError(pub String);
