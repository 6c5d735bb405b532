//! Unified error handling with consistent API response envelope.

use std::num::{IntErrorKind, ParseIntError};

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::ValidationErrors;

use crate::i18n::{Locale, Message};
use crate::middleware::context::RequestContext;
use crate::pagination::PaginationInfo;

pub const DATA_NOT_FOUND: &str = "DATA_NOT_FOUND";
pub const DATA_VALIDATION_ERROR: &str = "DATA_VALIDATION_ERROR";
pub const INVALID_JSON: &str = "INVALID_JSON";
pub const INVALID_PATH_PARAM: &str = "INVALID_PATH_PARAM";
pub const SERVER_ERROR: &str = "SERVER_ERROR";

/// One entry of `error.details` in the envelope.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorDetail {
    pub target: String,
    pub reason: String,
    pub description: String,
}

/// Error detail in the API response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub status: String,
    pub message: String,
    pub details: Vec<ErrorDetail>,
}

/// Consistent JSON envelope for all API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub request_id: String,
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a successful result in the envelope.
    pub fn success(ctx: &RequestContext, data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            pagination: None,
            error: None,
            request_id: ctx.request_id.clone(),
            timestamp: ctx.timestamp(),
        })
    }

    /// Wrap a page of results together with its pagination metadata.
    pub fn paginated(ctx: &RequestContext, data: T, pagination: PaginationInfo) -> Json<Self> {
        Json(Self {
            data: Some(data),
            pagination: Some(pagination),
            error: None,
            request_id: ctx.request_id.clone(),
            timestamp: ctx.timestamp(),
        })
    }
}

impl ApiResponse<()> {
    /// Envelope carrying `data: null`.
    pub fn empty(ctx: &RequestContext) -> Json<Self> {
        Json(Self {
            data: None,
            pagination: None,
            error: None,
            request_id: ctx.request_id.clone(),
            timestamp: ctx.timestamp(),
        })
    }
}

/// Columns guarded by a uniqueness rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    MobilePhone,
}

impl UniqueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::MobilePhone => "mobile_phone",
        }
    }
}

/// A single failed field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    Email,
    Min(u64),
    Max(u64),
    Other(String),
}

impl FieldRule {
    pub fn reason(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Email => "email",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub rule: FieldRule,
}

impl FieldViolation {
    /// Flatten validator output into violations sorted by field. A field that
    /// failed `required` reports only that; other fields report every failed rule.
    pub fn collect(errors: &ValidationErrors) -> Vec<Self> {
        let mut violations: Vec<Self> = Vec::new();

        for (field, field_errors) in errors.field_errors() {
            let field = field.to_string();
            let mut rules: Vec<FieldRule> = field_errors.iter().map(rule_of).collect();
            if rules.contains(&FieldRule::Required) {
                rules.retain(|r| *r == FieldRule::Required);
                rules.truncate(1);
            }
            violations.extend(rules.into_iter().map(|rule| FieldViolation {
                field: field.clone(),
                rule,
            }));
        }

        violations.sort_by(|a, b| a.field.cmp(&b.field));
        violations
    }
}

fn rule_of(error: &validator::ValidationError) -> FieldRule {
    let value_len = error
        .params
        .get("value")
        .and_then(|v| v.as_str())
        .map(|s| s.chars().count() as u64);
    let bound = |name: &str| error.params.get(name).and_then(|v| v.as_u64());

    match error.code.as_ref() {
        "required" => FieldRule::Required,
        "email" => FieldRule::Email,
        "length" => match (value_len, bound("min"), bound("max")) {
            (Some(0), _, _) => FieldRule::Required,
            (Some(len), Some(min), _) if len < min => FieldRule::Min(min),
            (_, _, Some(max)) => FieldRule::Max(max),
            (_, Some(min), None) => FieldRule::Min(min),
            _ => FieldRule::Other("length".to_string()),
        },
        other => FieldRule::Other(other.to_string()),
    }
}

/// Why a path or query parameter could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamProblem {
    Invalid,
    OutOfRange,
}

impl From<&ParseIntError> for ParamProblem {
    fn from(err: &ParseIntError) -> Self {
        match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Self::OutOfRange,
            _ => Self::Invalid,
        }
    }
}

/// Why a JSON request body was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonProblem {
    Syntax(String),
    Type(String),
    Unreadable,
}

/// Application error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {} field(s) invalid", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("Duplicate {}: {value}", .field.as_str())]
    Duplicate { field: UniqueField, value: String },

    #[error("Invalid JSON body: {0:?}")]
    InvalidJson(JsonProblem),

    #[error("Invalid path parameter: {0:?}")]
    InvalidPathParam(ParamProblem),

    #[error("Invalid query parameter: {0:?}")]
    InvalidQueryParam(ParamProblem),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(FieldViolation::collect(&errors))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = |text: String| match text.split_once(": ") {
            Some((_, inner)) => inner.to_string(),
            None => text,
        };
        match rejection {
            JsonRejection::JsonSyntaxError(e) => {
                AppError::InvalidJson(JsonProblem::Syntax(detail(e.body_text())))
            }
            JsonRejection::JsonDataError(e) => {
                AppError::InvalidJson(JsonProblem::Type(detail(e.body_text())))
            }
            _ => AppError::InvalidJson(JsonProblem::Unreadable),
        }
    }
}

impl AppError {
    /// Check if this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error is a uniqueness conflict on the given field.
    pub fn is_duplicate(&self, which: UniqueField) -> bool {
        matches!(self, Self::Duplicate { field, .. } if *field == which)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Duplicate { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::InvalidJson(_)
            | AppError::InvalidPathParam(_)
            | AppError::InvalidQueryParam(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error body in the requested language.
    pub fn render(&self, locale: Locale) -> ErrorBody {
        let status = self.status();
        let (code, message, details) = match self {
            AppError::NotFound(_) => (DATA_NOT_FOUND, Message::DataNotFound.render(locale), vec![]),
            AppError::Validation(violations) => (
                DATA_VALIDATION_ERROR,
                Message::DataValidation.render(locale),
                violations
                    .iter()
                    .map(|v| ErrorDetail {
                        target: v.field.clone(),
                        reason: v.rule.reason().to_string(),
                        description: Message::FieldRule {
                            field: &v.field,
                            rule: &v.rule,
                        }
                        .render(locale),
                    })
                    .collect(),
            ),
            AppError::Duplicate { field, value } => {
                let description = match field {
                    UniqueField::Email => Message::EmailAlreadyExists(value),
                    UniqueField::MobilePhone => Message::MobilePhoneAlreadyExists(value),
                };
                (
                    DATA_VALIDATION_ERROR,
                    Message::DataValidation.render(locale),
                    vec![ErrorDetail {
                        target: field.as_str().to_string(),
                        reason: "duplicate".to_string(),
                        description: description.render(locale),
                    }],
                )
            }
            AppError::InvalidJson(problem) => {
                let message = match problem {
                    JsonProblem::Syntax(detail) => Message::JsonSyntax(detail),
                    JsonProblem::Type(detail) => Message::JsonType(detail),
                    JsonProblem::Unreadable => Message::JsonUnreadable,
                };
                (INVALID_JSON, message.render(locale), vec![])
            }
            AppError::InvalidPathParam(problem) => {
                let message = match problem {
                    ParamProblem::Invalid => Message::InvalidUrlParam,
                    ParamProblem::OutOfRange => Message::UrlParamOutOfRange,
                };
                (INVALID_PATH_PARAM, message.render(locale), vec![])
            }
            AppError::InvalidQueryParam(problem) => {
                let message = match problem {
                    ParamProblem::Invalid => Message::InvalidQueryParam,
                    ParamProblem::OutOfRange => Message::QueryParamOutOfRange,
                };
                (INVALID_PATH_PARAM, message.render(locale), vec![])
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (SERVER_ERROR, Message::Server.render(locale), vec![])
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (SERVER_ERROR, Message::Server.render(locale), vec![])
            }
        };

        ErrorBody {
            code: code.to_string(),
            status: status.as_u16().to_string(),
            message,
            details,
        }
    }
}

/// An [`AppError`] bound to the request it failed, ready to be rendered.
#[derive(Debug)]
pub struct ApiFailure {
    pub error: AppError,
    pub ctx: RequestContext,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let body = ApiResponse::<()> {
            data: None,
            pagination: None,
            error: Some(self.error.render(self.ctx.locale)),
            request_id: self.ctx.request_id.clone(),
            timestamp: self.ctx.timestamp(),
        };

        (status, Json(body)).into_response()
    }
}

/// Attach the request context to a service result.
pub trait ForRequest<T> {
    fn for_request(self, ctx: &RequestContext) -> Result<T, ApiFailure>;
}

impl<T, E: Into<AppError>> ForRequest<T> for Result<T, E> {
    fn for_request(self, ctx: &RequestContext) -> Result<T, ApiFailure> {
        self.map_err(|e| ApiFailure {
            error: e.into(),
            ctx: ctx.clone(),
        })
    }
}
