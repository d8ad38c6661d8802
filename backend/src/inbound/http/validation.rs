//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every request validation failure becomes `invalid_request` with a
//! `{field, code}` details object so clients can highlight the input.

use std::fmt::Display;
use std::str::FromStr;

use actix_web::{HttpRequest, error::JsonPayloadError, error::PathError, error::QueryPayloadError, web};
use serde_json::json;

use crate::domain::{Error, IdentifierError, Offset};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

/// Build a validation error for a single request field.
pub(crate) fn field_error(field: FieldName, code: &str, message: impl Display) -> Error {
    Error::invalid_request(message.to_string()).with_details(json!({
        "field": field.as_str(),
        "code": code,
    }))
}

fn identifier_code(error: IdentifierError) -> &'static str {
    match error {
        IdentifierError::Empty => "empty",
        IdentifierError::Invalid => "invalid_uuid",
    }
}

/// Parse an identifier path segment into its domain type.
pub(crate) fn parse_id<T>(raw: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = IdentifierError>,
{
    raw.parse::<T>().map_err(|error| {
        field_error(
            field,
            identifier_code(error),
            format!("{} must be a valid UUID", field.as_str()),
        )
    })
}

/// Convert an optional `offset` query parameter into a page offset.
pub(crate) fn parse_offset(raw: Option<i64>) -> Result<Offset, Error> {
    let Some(value) = raw else {
        return Ok(Offset::ZERO);
    };
    Offset::new(value).map_err(|error| field_error(FieldName::new("offset"), "negative", error))
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "request body must be JSON".to_owned(),
        other => format!("malformed JSON body: {other}"),
    };
    Error::invalid_request(message).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {err}")).into()
}

fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid path: {err}")).into()
}

/// Register extractor configurations that report failures as domain errors.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));
}
