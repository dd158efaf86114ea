//! # Message Codec
//!
//! Serializes envelopes to datagram bytes and back.
//!
//! ## Wire Format
//!
//! A flat JSON object with fixed field names, encoded with the configured
//! [`TextEncoding`]:
//!
//! ```text
//! request:  {"id": 0, "operation": "encrypt", "method": "rot13", "data": "abc"}
//! response: {"id": 0, "operation": "encrypt", "result": 0, "data": "nop"}
//! ```
//!
//! A document carrying a `result` field is a response; anything else is a
//! request. Unrecognised fields are ignored and therefore dropped on re-encode.

use crate::encoding::TextEncoding;
use crate::error::CodecError;
use serde_json::{json, Map, Value};
use shared_types::{Envelope, Operation, Request, RequestId, Response};

/// Field names used on the wire.
pub mod fields {
    pub const ID: &str = "id";
    pub const OPERATION: &str = "operation";
    pub const METHOD: &str = "method";
    pub const DATA: &str = "data";
    pub const RESULT: &str = "result";
}

/// Stateless envelope codec bound to one text encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCodec {
    encoding: TextEncoding,
}

impl MessageCodec {
    /// Create a codec using `encoding` for both directions.
    #[must_use]
    pub fn new(encoding: TextEncoding) -> Self {
        Self { encoding }
    }

    /// The text encoding in use.
    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Encode any envelope.
    #[must_use]
    pub fn encode(&self, envelope: &Envelope) -> Vec<u8> {
        match envelope {
            Envelope::Request(request) => self.encode_request(request),
            Envelope::Response(response) => self.encode_response(response),
        }
    }

    /// Encode a request.
    ///
    /// `method` is written only when present; `data` is always written for
    /// encrypt/decrypt and only when non-empty for capabilities.
    #[must_use]
    pub fn encode_request(&self, request: &Request) -> Vec<u8> {
        let mut object = Map::new();
        object.insert(fields::ID.into(), json!(request.id.value()));
        object.insert(fields::OPERATION.into(), json!(request.operation.as_str()));
        if let Some(method) = &request.method {
            object.insert(fields::METHOD.into(), json!(method));
        }
        if request.operation.requires_method() || !request.data.is_empty() {
            object.insert(fields::DATA.into(), json!(request.data));
        }
        self.encoding.encode(&Value::Object(object).to_string())
    }

    /// Encode a response.
    #[must_use]
    pub fn encode_response(&self, response: &Response) -> Vec<u8> {
        let mut object = Map::new();
        object.insert(fields::ID.into(), json!(response.id.value()));
        object.insert(fields::OPERATION.into(), json!(response.operation.as_str()));
        object.insert(fields::RESULT.into(), json!(response.result.code()));
        object.insert(fields::DATA.into(), json!(response.data));
        self.encoding.encode(&Value::Object(object).to_string())
    }

    /// Decode a datagram into an envelope.
    ///
    /// # Errors
    ///
    /// `CodecError::Malformed` if the bytes are not text in the configured
    /// encoding, not a JSON object, lack a field required for the declared
    /// operation, or carry an `id` that is not a non-negative integer.
    pub fn decode(&self, bytes: &[u8]) -> Result<Envelope, CodecError> {
        let object = self.decode_object(bytes)?;

        if object.contains_key(fields::RESULT) {
            let response: Response = serde_json::from_value(Value::Object(object))
                .map_err(|e| CodecError::malformed(format!("invalid response: {e}")))?;
            return Ok(Envelope::Response(response));
        }

        let request: Request = serde_json::from_value(Value::Object(object))
            .map_err(|e| CodecError::malformed(format!("invalid request: {e}")))?;
        if request.operation.requires_method() && request.method.is_none() {
            return Err(CodecError::malformed(format!(
                "{} request without method",
                request.operation
            )));
        }
        Ok(Envelope::Request(request))
    }

    /// Decode a datagram that must be a request.
    ///
    /// # Errors
    ///
    /// `CodecError::Malformed` on any decode failure or if the datagram is a
    /// response.
    pub fn decode_request(&self, bytes: &[u8]) -> Result<Request, CodecError> {
        match self.decode(bytes)? {
            Envelope::Request(request) => Ok(request),
            Envelope::Response(response) => Err(CodecError::malformed(format!(
                "expected request, got response {}",
                response.id
            ))),
        }
    }

    /// Decode a datagram that must be a response.
    ///
    /// # Errors
    ///
    /// `CodecError::Malformed` on any decode failure or if the datagram is a
    /// request.
    pub fn decode_response(&self, bytes: &[u8]) -> Result<Response, CodecError> {
        match self.decode(bytes)? {
            Envelope::Response(response) => Ok(response),
            Envelope::Request(request) => Err(CodecError::malformed(format!(
                "expected response, got request {}",
                request.id
            ))),
        }
    }

    /// Best-effort extraction of `id` and `operation` from a datagram that
    /// failed full decoding.
    ///
    /// Lets a service answer a broken request instead of dropping it silently.
    #[must_use]
    pub fn peek_header(&self, bytes: &[u8]) -> Option<(RequestId, Operation)> {
        let object = self.decode_object(bytes).ok()?;
        let id = object.get(fields::ID)?.as_u64()?;
        let operation = object.get(fields::OPERATION)?.as_str()?.parse().ok()?;
        Some((RequestId::new(id), operation))
    }

    fn decode_object(&self, bytes: &[u8]) -> Result<Map<String, Value>, CodecError> {
        let text = self.encoding.decode(bytes)?;
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(object)) => Ok(object),
            Ok(other) => Err(CodecError::malformed(format!(
                "expected JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(CodecError::malformed(format!("invalid JSON: {e}"))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
