//! Error types for Bookcase server

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Field name to list of messages, as returned for rejected writes
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Key used for errors that do not belong to a single field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Application error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthenticated = 2,
    DbFailure = 3,
    NotFound = 4,
    BadValue = 5,
    Invalid = 6,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0:?}")]
    Fields(FieldErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Single-field validation failure
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        AppError::Fields(errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let text = err.body_text();
                deserialize_error(&text).unwrap_or(AppError::BadRequest(text))
            }
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let text = rejection.body_text();
        deserialize_error(&text).unwrap_or(AppError::BadRequest(text))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            // `/book/abc/` names no row
            PathRejection::FailedToDeserializePathParams(err) => AppError::NotFound(err.body_text()),
            other => AppError::Internal(other.body_text()),
        }
    }
}

/// Field error for a rejection text of the form
/// `<what failed>: [<field path>: ]<serde message>`.
/// `None` when the message names no field.
fn deserialize_error(text: &str) -> Option<AppError> {
    let (_, detail) = text.split_once(": ")?;
    let detail = detail
        .rfind(" at line ")
        .map_or(detail, |index| &detail[..index]);

    if let Some(field) = backticked(detail, "missing field ") {
        return Some(AppError::field(field, "This field is required."));
    }
    if let Some(field) = backticked(detail, "duplicate field ") {
        return Some(AppError::field(field, "Only one value may be given."));
    }

    let (path, message) = detail.split_once(": ")?;
    let field = path.split(['.', '[']).next()?;
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let message = if let Some(value) = backticked(message, "unknown variant ") {
        format!("\"{}\" is not a valid choice.", value)
    } else if message.starts_with("invalid type") || message.starts_with("invalid value") {
        format!("Incorrect type: {}.", message)
    } else {
        message.to_string()
    };
    Some(AppError::field(field, message))
}

/// Name quoted in backticks right after `prefix`
fn backticked<'a>(message: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = message.strip_prefix(prefix)?.strip_prefix('`')?;
    rest.split_once('`').map(|(name, _)| name)
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        AppError::Fields(fields)
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields = None;
        let (status, code, message) = match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated, msg)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg),
            AppError::Fields(errors) => {
                fields = Some(errors);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::Invalid,
                    "Invalid input".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg),
            AppError::Io(e) => {
                tracing::error!("I/O error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            fields,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct NamedForm {
        #[validate(length(min = 1, message = "This field may not be blank."))]
        name: String,
    }

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (AppError::Authentication("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::field("isbn", "bad"), StatusCode::BAD_REQUEST),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn validator_errors_become_field_messages() {
        let form = NamedForm { name: String::new() };
        let error: AppError = form.validate().unwrap_err().into();
        match error {
            AppError::Fields(fields) => {
                assert_eq!(
                    fields.get("name"),
                    Some(&vec!["This field may not be blank.".to_string()])
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    fn field_messages(error: AppError) -> FieldErrors {
        match error {
            AppError::Fields(fields) => fields,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_variant_names_the_field() {
        let text = "Failed to deserialize the JSON body into the target type: status: \
                    unknown variant `x`, expected one of `o`, `a`, `r` at line 1 column 13";
        let fields = field_messages(deserialize_error(text).unwrap());
        assert_eq!(
            fields.get("status"),
            Some(&vec!["\"x\" is not a valid choice.".to_string()])
        );
    }

    #[test]
    fn nested_type_errors_use_the_top_level_field() {
        let text = "Failed to deserialize the JSON body into the target type: genre[1]: \
                    invalid type: string \"a\", expected i32 at line 1 column 17";
        let fields = field_messages(deserialize_error(text).unwrap());
        assert_eq!(
            fields.get("genre"),
            Some(&vec!["Incorrect type: invalid type: string \"a\", expected i32.".to_string()])
        );
    }

    #[test]
    fn missing_and_duplicate_fields_are_reported() {
        let text = "Failed to deserialize the JSON body into the target type: \
                    missing field `email` at line 1 column 2";
        assert!(field_messages(deserialize_error(text).unwrap()).contains_key("email"));

        let text = "Failed to deserialize query string: duplicate field `genre`";
        assert_eq!(
            field_messages(deserialize_error(text).unwrap()).get("genre"),
            Some(&vec!["Only one value may be given.".to_string()])
        );
    }

    #[test]
    fn root_level_errors_stay_unattributed() {
        let text = "Failed to deserialize the JSON body into the target type: \
                    invalid type: sequence, expected struct BookPayload at line 1 column 0";
        assert!(deserialize_error(text).is_none());
        assert!(deserialize_error("no separator").is_none());
    }

    #[tokio::test]
    async fn field_errors_are_serialized_in_body() {
        let response = AppError::field("name", "This field may not be blank.").into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["fields"]["name"][0], "This field may not be blank.");
        assert_eq!(body["error"], "Invalid");
    }
}
