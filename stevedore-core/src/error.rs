//! Console error types and formatting

use serde::Serialize;
use thiserror::Error;

/// Error codes surfaced by the console API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A profile with the same name already exists
    DuplicateName,
    /// The addressed profile or object does not exist
    NotFound,
    /// A required field was missing or malformed
    Validation,
    /// The relational store failed
    Persistence,
    /// The object-storage endpoint failed
    RemoteCall,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateName => "DuplicateName",
            Self::NotFound => "NotFound",
            Self::Validation => "ValidationError",
            Self::Persistence => "PersistenceError",
            Self::RemoteCall => "RemoteCallError",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::DuplicateName => 409,
            Self::NotFound => 404,
            Self::Validation => 400,
            Self::Persistence => 500,
            Self::RemoteCall => 502,
        }
    }
}

/// Error rendered to the console API caller
#[derive(Debug, Error)]
#[error("{}: {}", .code.as_str(), .message)]
pub struct ConsoleError {
    pub code: ErrorCode,
    pub message: String,
    pub resource: Option<String>,
}

impl ConsoleError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            resource: None,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Format as the console's JSON error body
    pub fn to_json(&self) -> String {
        #[derive(Serialize)]
        struct JsonError<'a> {
            code: &'a str,
            message: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            resource: Option<&'a str>,
        }

        let error = JsonError {
            code: self.code.as_str(),
            message: &self.message,
            resource: self.resource.as_deref(),
        };

        serde_json::to_string(&error).unwrap_or_else(|_| {
            format!(
                r#"{{"code":"{}","message":"{}"}}"#,
                self.code.as_str(),
                self.message
            )
        })
    }
}
