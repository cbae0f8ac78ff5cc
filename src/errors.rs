use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Symbolic category of a failure, used for branching without matching on
/// the concrete error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationError,
    PersonExists,
    PersonNotFound,
    LookupFailed,
    NoCandidates,
    StorageError,
    Cancelled,
}

impl ErrorKind {
    /// Stable snake_case name sent to clients in the `kind` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::PersonExists => "person_exists",
            ErrorKind::PersonNotFound => "person_not_found",
            ErrorKind::LookupFailed => "lookup_failed",
            ErrorKind::NoCandidates => "no_candidates",
            ErrorKind::StorageError => "storage_error",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing input, detected before reaching storage.
    Validation(String),
    /// A person with the same (name, surname) pair is already stored.
    PersonExists,
    /// No person with the given id.
    PersonNotFound(i32),
    /// An enrichment service could not be reached or its answer decoded.
    LookupFailed {
        /// Which enrichment service failed ("age", "gender", "nationality").
        service: &'static str,
        reason: String,
    },
    /// The nationality service answered with no country candidates.
    NoCandidates(String),
    /// Any other persistence failure.
    Storage(sqlx::Error),
    /// The operation was cancelled or ran past its deadline.
    Cancelled(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// The symbolic kind of this error, looking through any context wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::ValidationError,
            AppError::PersonExists => ErrorKind::PersonExists,
            AppError::PersonNotFound(_) => ErrorKind::PersonNotFound,
            AppError::LookupFailed { .. } => ErrorKind::LookupFailed,
            AppError::NoCandidates(_) => ErrorKind::NoCandidates,
            AppError::Storage(_) => ErrorKind::StorageError,
            AppError::Cancelled(_) => ErrorKind::Cancelled,
            AppError::WithContext { source, .. } => source.kind(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::PersonExists => StatusCode::CONFLICT,
            ErrorKind::PersonNotFound => StatusCode::NOT_FOUND,
            ErrorKind::LookupFailed | ErrorKind::NoCandidates => StatusCode::BAD_GATEWAY,
            ErrorKind::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message safe to show to API clients. Storage details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::PersonExists => "person already exists".to_string(),
            AppError::PersonNotFound(id) => format!("person {} not found", id),
            AppError::LookupFailed { service, .. } => {
                format!("{} service unavailable", service)
            }
            AppError::NoCandidates(_) => "no nationality candidates".to_string(),
            AppError::Storage(_) => "storage error".to_string(),
            AppError::Cancelled(_) => "request cancelled".to_string(),
            AppError::WithContext { source, .. } => source.public_message(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::PersonExists => write!(f, "Person already exists"),
            AppError::PersonNotFound(id) => write!(f, "Person {} not found", id),
            AppError::LookupFailed { service, reason } => {
                write!(f, "{} lookup failed: {}", service, reason)
            }
            AppError::NoCandidates(name) => {
                write!(f, "No nationality candidates for name '{}'", name)
            }
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::Cancelled(msg) => write!(f, "Cancelled: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Storage(e) => Some(e),
            AppError::WithContext { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    /// Maps the error kind to an HTTP status and a JSON body of the form
    /// `{"status": "Error", "kind": ..., "error": ...}`.
    fn into_response(self) -> Response {
        let status = self.status();
        match self.kind() {
            ErrorKind::StorageError => tracing::error!("{}", self),
            ErrorKind::LookupFailed | ErrorKind::NoCandidates | ErrorKind::Cancelled => {
                tracing::warn!("{}", self)
            }
            _ => tracing::debug!("{}", self),
        }

        let body = Json(json!({
            "status": "Error",
            "kind": self.kind().as_str(),
            "error": self.public_message(),
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err)
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

/// Extension for sqlx::Error to add context
impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::Storage(e)),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::Storage(e)),
            context: f(),
        })
    }
}
