//! # Request / Response Envelopes
//!
//! The two value objects exchanged between client and service.
//!
//! ## Invariants
//!
//! - A `Request` for `encrypt`/`decrypt` names a cipher method; a
//!   `capabilities` request does not.
//! - A `Response` carries the `id` and `operation` of its originating request.
//! - `data` holds the transformed text on success and the diagnostic on failure.

use crate::entities::{Operation, RequestId, ResultCode};
use serde::{Deserialize, Serialize};

/// Separator between method names in a capabilities response.
pub const CAPABILITY_SEPARATOR: char = ',';

/// An operation request sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Correlation id assigned by the issuer.
    pub id: RequestId,
    /// Requested operation.
    pub operation: Operation,
    /// Cipher method name, required for encrypt/decrypt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Text to transform. May be empty.
    #[serde(default)]
    pub data: String,
}

impl Request {
    /// Build a capabilities request.
    #[must_use]
    pub fn capabilities(id: RequestId) -> Self {
        Self {
            id,
            operation: Operation::Capabilities,
            method: None,
            data: String::new(),
        }
    }

    /// Build an encrypt request.
    #[must_use]
    pub fn encrypt(id: RequestId, method: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id,
            operation: Operation::Encrypt,
            method: Some(method.into()),
            data: data.into(),
        }
    }

    /// Build a decrypt request.
    #[must_use]
    pub fn decrypt(id: RequestId, method: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id,
            operation: Operation::Decrypt,
            method: Some(method.into()),
            data: data.into(),
        }
    }

    /// Method name, or the empty string when absent.
    #[must_use]
    pub fn method_name(&self) -> &str {
        self.method.as_deref().unwrap_or_default()
    }
}

/// The service's answer to a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Id of the originating request.
    pub id: RequestId,
    /// Echo of the originating request's operation.
    pub operation: Operation,
    /// Success or failure kind.
    pub result: ResultCode,
    /// Transformed text on success, diagnostic on failure.
    #[serde(default)]
    pub data: String,
}

impl Response {
    /// Successful response to `request`.
    #[must_use]
    pub fn success(request: &Request, data: impl Into<String>) -> Self {
        Self {
            id: request.id,
            operation: request.operation,
            result: ResultCode::Success,
            data: data.into(),
        }
    }

    /// Failed response to `request` with a diagnostic.
    #[must_use]
    pub fn failure(request: &Request, result: ResultCode, diagnostic: impl Into<String>) -> Self {
        Self {
            id: request.id,
            operation: request.operation,
            result,
            data: diagnostic.into(),
        }
    }

    /// Returns true if the result code is success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// Diagnostic text of a failed response.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        if self.is_success() {
            None
        } else {
            Some(&self.data)
        }
    }

    /// Method names listed by a successful capabilities response.
    ///
    /// Empty for any other kind of response.
    #[must_use]
    pub fn capability_names(&self) -> Vec<&str> {
        if self.operation != Operation::Capabilities || !self.is_success() {
            return Vec::new();
        }
        self.data
            .split(CAPABILITY_SEPARATOR)
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// Either kind of message that can appear on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// Client → service.
    Request(Request),
    /// Service → client.
    Response(Response),
}

impl Envelope {
    /// Correlation id of the wrapped message.
    #[must_use]
    pub fn id(&self) -> RequestId {
        match self {
            Envelope::Request(request) => request.id,
            Envelope::Response(response) => response.id,
        }
    }

    /// Operation of the wrapped message.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Envelope::Request(request) => request.operation,
            Envelope::Response(response) => response.operation,
        }
    }
}

impl From<Request> for Envelope {
    fn from(request: Request) -> Self {
        Envelope::Request(request)
    }
}

impl From<Response> for Envelope {
    fn from(response: Response) -> Self {
        Envelope::Response(response)
    }
}
