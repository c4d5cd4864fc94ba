//! Uniform service responses for list endpoints.
//!
//! Services answer with a phrase key and a status; controllers translate the key through the
//! request's [`LocaleContext`] when they build the body.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::QueryConfig;
use crate::errors::DbError;
use crate::features::{QueryDescriptor, QueryTranslator};
use crate::locale::{Catalog, LocaleContext};
use crate::query::Populate;
use crate::store::DocumentStore;

pub const BAD_REQUEST_KEY: &str = "badRequest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResponseType {
    Success,
    Error,
}

/// `{type, message, statusCode, ...data}` as returned by a service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    #[serde(rename = "type")]
    pub kind: ResponseType,
    /// Phrase key, not yet translated.
    pub message: String,
    pub status_code: u16,
    #[serde(flatten)]
    pub data: Map<String, Value>,
    #[serde(skip)]
    pub vars: Vec<(String, String)>,
}

impl ServiceResponse {
    #[must_use]
    pub fn success(message: impl Into<String>, status_code: u16) -> Self {
        Self::build(ResponseType::Success, message.into(), status_code)
    }

    #[must_use]
    pub fn error(message: impl Into<String>, status_code: u16) -> Self {
        Self::build(ResponseType::Error, message.into(), status_code)
    }

    fn build(kind: ResponseType, message: String, status_code: u16) -> Self {
        Self { kind, message, status_code, data: Map::new(), vars: Vec::new() }
    }

    /// Adds one top-level data field.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Merges an object's fields into the data; non-objects go under `data`.
    #[must_use]
    pub fn with_all(mut self, value: Value) -> Self {
        match value {
            Value::Object(map) => self.data.extend(map),
            other => {
                self.data.insert("data".to_string(), other);
            }
        }
        self
    }

    /// Adds an interpolation variable for the message phrase.
    #[must_use]
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.kind == ResponseType::Success
    }

    /// HTTP status plus the controller body `{type, message, ...data}` with the message translated.
    #[must_use]
    pub fn localize(&self, locale: &LocaleContext) -> (u16, Value) {
        let vars: Vec<(&str, &str)> = self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let mut body = Map::new();
        let kind = match self.kind {
            ResponseType::Success => "Success",
            ResponseType::Error => "Error",
        };
        body.insert("type".to_string(), Value::from(kind));
        body.insert("message".to_string(), Value::from(locale.t_with(&self.message, &vars)));
        for (k, v) in &self.data {
            body.insert(k.clone(), v.clone());
        }
        (self.status_code, Value::Object(body))
    }
}

/// What a list endpoint does when the query matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyResultPolicy {
    /// `Error`, 404, with the not-found phrase.
    NotFound,
    /// `Success`, 200, with an empty record list.
    EmptySuccess,
}

/// Phrase keys for one resource's list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMessages {
    pub found: String,
    pub not_found: String,
}

impl ListMessages {
    #[must_use]
    pub fn new(found: impl Into<String>, not_found: impl Into<String>) -> Self {
        Self { found: found.into(), not_found: not_found.into() }
    }
}

impl Default for ListMessages {
    fn default() -> Self {
        Self::new("successfulRecordsFound", "noRecordsFound")
    }
}

/// Per-request state built at request entry.
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    pub descriptor: QueryDescriptor,
    pub locale: LocaleContext,
    pub config: &'a QueryConfig,
}

impl<'a> RequestContext<'a> {
    #[must_use]
    pub const fn new(descriptor: QueryDescriptor, locale: LocaleContext, config: &'a QueryConfig) -> Self {
        Self { descriptor, locale, config }
    }

    /// Parses the raw query string and negotiates the language from the request headers.
    #[must_use]
    pub fn from_request(
        config: &'a QueryConfig,
        catalog: &Catalog,
        query_string: &str,
        detected_language: Option<&str>,
        accept_language: Option<&str>,
    ) -> Self {
        Self {
            descriptor: QueryDescriptor::from_query_string(query_string),
            locale: LocaleContext::negotiate(catalog, detected_language, accept_language),
            config,
        }
    }
}

/// Runs the request's descriptor against `collection` and shapes the outcome as a service
/// response.
///
/// # Errors
/// Store faults are returned unchanged; malformed input becomes a 400 response instead.
pub async fn list_resources<S: DocumentStore>(
    store: &S,
    ctx: &RequestContext<'_>,
    collection: &str,
    populate: Option<&Populate>,
    messages: &ListMessages,
    policy: EmptyResultPolicy,
) -> Result<ServiceResponse, DbError> {
    let translator = QueryTranslator::new(store, ctx.config);
    let result = match translator.execute(collection, &ctx.descriptor, populate).await {
        Ok(r) => r,
        Err(DbError::BadRequest(reason)) => {
            log::debug!("rejected list query on {collection}: {reason}");
            return Ok(ServiceResponse::error(BAD_REQUEST_KEY, 400).var("reason", reason));
        }
        Err(e) => {
            log::error!("list query on {collection} failed: {e}");
            return Err(e);
        }
    };
    if result.is_empty() && policy == EmptyResultPolicy::NotFound {
        return Ok(ServiceResponse::error(messages.not_found.clone(), 404));
    }
    Ok(ServiceResponse::success(messages.found.clone(), 200).with_all(result.to_json()?))
}
