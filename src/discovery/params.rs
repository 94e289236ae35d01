//! Call parameters and the filtered parameter bag sent to a method

use super::document::MethodDescriptor;
use crate::gcp::http::MediaBody;
use serde_json::{Map, Value};

/// Reserved key for the JSON request body
pub const BODY: &str = "body";

/// Caller-supplied arguments for one request.
///
/// Callers may pass a superset of what a method declares; anything the
/// method does not know about is dropped when the [`ParameterBag`] is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: Map<String, Value>,
    body: Option<Value>,
    media_body: Option<MediaBody>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named argument. The reserved name `body` sets the request body.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a named argument only when a value is present
    pub fn with_opt<V: Into<Value>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_media(mut self, media: MediaBody) -> Self {
        self.media_body = Some(media);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        if name == BODY {
            self.body = Some(value);
        } else {
            self.values.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn media_body(&self) -> Option<&MediaBody> {
        self.media_body.as_ref()
    }
}

/// Parameters actually forwarded to a method: the declared ones the caller
/// supplied, plus `body` and `media_body` which always pass through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    pub values: Map<String, Value>,
    pub body: Option<Value>,
    pub media_body: Option<MediaBody>,
}

impl ParameterBag {
    /// Intersect `params` with the parameters `method` declares.
    ///
    /// Missing required parameters are not reported here; the service
    /// rejects the call instead. Null values count as "not supplied".
    pub fn filter(method: &MethodDescriptor, params: Params) -> Self {
        let Params {
            values: mut supplied,
            body,
            media_body,
        } = params;

        let values = method
            .parameters
            .keys()
            .filter_map(|name| {
                let value = supplied.remove(name)?;
                (!value.is_null()).then(|| (name.clone(), value))
            })
            .collect();

        if !supplied.is_empty() {
            tracing::trace!(dropped = ?supplied.keys().collect::<Vec<_>>(), "undeclared parameters dropped");
        }

        Self {
            values,
            body,
            media_body,
        }
    }
}
