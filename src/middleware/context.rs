//! Per-request context extractor: response language and request id.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};
use chrono::{SecondsFormat, Utc};

use crate::i18n::Locale;
use crate::middleware::request_id::REQUEST_ID_HEADER;
use crate::AppState;

/// What every handler needs to build an envelope.
///
/// Use as an Axum extractor:
/// ```ignore
/// async fn handler(ctx: RequestContext) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub locale: Locale,
    pub request_id: String,
}

impl RequestContext {
    /// RFC 3339 timestamp stamped on the envelope.
    pub fn timestamp(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Resolve the locale: `?lang=`, then `Accept-Language`, then the default.
    pub fn resolve_locale(parts: &Parts, default: Locale) -> Locale {
        let from_query = parts.uri.query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "lang")
                .and_then(|(_, value)| Locale::from_tag(&value))
        });

        from_query
            .or_else(|| {
                parts
                    .headers
                    .get(ACCEPT_LANGUAGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(Locale::from_accept_language)
            })
            .unwrap_or(default)
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(RequestContext {
            locale: Self::resolve_locale(parts, state.config.default_lang),
            request_id,
        })
    }
}
