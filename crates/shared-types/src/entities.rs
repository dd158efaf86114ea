//! # Core Entities
//!
//! Identifiers and enumerations carried inside every envelope.

use crate::errors::ParseOperationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Correlation id linking a response to the request that caused it.
///
/// Assigned by the issuer at send time, monotonically increasing and never
/// reused within one issuer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Create from a raw counter value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw counter value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RequestId> for u64 {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

/// Operation requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// List the cipher methods the service supports.
    Capabilities,
    /// Encrypt `data` with `method`.
    Encrypt,
    /// Decrypt `data` with `method`.
    Decrypt,
}

impl Operation {
    /// All operations, in wire order.
    pub const ALL: [Operation; 3] = [
        Operation::Capabilities,
        Operation::Encrypt,
        Operation::Decrypt,
    ];

    /// Wire name of the operation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::Capabilities => "capabilities",
            Operation::Encrypt => "encrypt",
            Operation::Decrypt => "decrypt",
        }
    }

    /// Whether requests for this operation must name a cipher method.
    #[must_use]
    pub const fn requires_method(&self) -> bool {
        matches!(self, Operation::Encrypt | Operation::Decrypt)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ParseOperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "capabilities" => Ok(Operation::Capabilities),
            "encrypt" => Ok(Operation::Encrypt),
            "decrypt" => Ok(Operation::Decrypt),
            other => Err(ParseOperationError(other.to_string())),
        }
    }
}

/// Outcome code of a response. `0` is success, every other value a failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// The operation completed.
    Success,
    /// The requested cipher method is not registered.
    UnknownMethod,
    /// The cipher could not process the given input.
    TransformFailure,
    /// The request was structurally invalid.
    InvalidRequest,
    /// A failure code this build does not know about.
    Other(i64),
}

impl ResultCode {
    /// Numeric wire value.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            ResultCode::Success => 0,
            ResultCode::UnknownMethod => 1,
            ResultCode::TransformFailure => 2,
            ResultCode::InvalidRequest => 3,
            ResultCode::Other(code) => *code,
        }
    }

    /// Map a numeric wire value back to a code.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => ResultCode::Success,
            1 => ResultCode::UnknownMethod,
            2 => ResultCode::TransformFailure,
            3 => ResultCode::InvalidRequest,
            other => ResultCode::Other(other),
        }
    }

    /// Returns true for the success code.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code() == 0
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCode::Success => write!(f, "success (0)"),
            ResultCode::UnknownMethod => write!(f, "unknown method (1)"),
            ResultCode::TransformFailure => write!(f, "transform failure (2)"),
            ResultCode::InvalidRequest => write!(f, "invalid request (3)"),
            ResultCode::Other(code) => write!(f, "failure ({code})"),
        }
    }
}

impl Serialize for ResultCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for ResultCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(ResultCode::from_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_wire_names() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert!("Encrypt".parse::<Operation>().is_err());
        assert!("".parse::<Operation>().is_err());
    }

    #[test]
    fn test_requires_method() {
        assert!(!Operation::Capabilities.requires_method());
        assert!(Operation::Encrypt.requires_method());
        assert!(Operation::Decrypt.requires_method());
    }

    #[test]
    fn test_result_code_mapping() {
        assert!(ResultCode::Success.is_success());
        assert!(!ResultCode::UnknownMethod.is_success());
        assert_eq!(ResultCode::from_code(2), ResultCode::TransformFailure);
        assert_eq!(ResultCode::from_code(-7), ResultCode::Other(-7));
        assert_eq!(ResultCode::Other(42).code(), 42);
        assert!(!ResultCode::Other(42).is_success());
    }

    #[test]
    fn test_serde_representation() {
        assert_eq!(serde_json::to_string(&RequestId::new(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&Operation::Capabilities).unwrap(),
            "\"capabilities\""
        );
        assert_eq!(serde_json::to_string(&ResultCode::UnknownMethod).unwrap(), "1");
        let code: ResultCode = serde_json::from_str("9").unwrap();
        assert_eq!(code, ResultCode::Other(9));
    }
}
