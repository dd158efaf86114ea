//! # Crypto Service
//!
//! Turns one request into one response. Registry misses and cipher failures
//! become failure responses; nothing here returns a Rust error.

use ec_01_cipher_methods::AlgorithmRegistry;
use shared_types::{Operation, Request, Response, ResultCode, CAPABILITY_SEPARATOR};
use std::sync::Arc;
use tracing::{debug, warn};

/// Applies registered cipher methods to requests.
#[derive(Debug, Clone)]
pub struct CryptoService {
    registry: Arc<AlgorithmRegistry>,
}

impl CryptoService {
    /// Create a service over a fully initialised registry.
    #[must_use]
    pub fn new(registry: Arc<AlgorithmRegistry>) -> Self {
        Self { registry }
    }

    /// Service with every built-in method registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(AlgorithmRegistry::with_defaults()))
    }

    /// The registry methods are resolved from.
    #[must_use]
    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Produce the response to `request`.
    ///
    /// The response always carries the request's `id` and `operation`.
    pub fn handle(&self, request: &Request) -> Response {
        match request.operation {
            Operation::Capabilities => {
                let separator = CAPABILITY_SEPARATOR.to_string();
                let names = self.registry.list_names().join(separator.as_str());
                Response::success(request, names)
            }
            Operation::Encrypt | Operation::Decrypt => self.transform(request),
        }
    }

    fn transform(&self, request: &Request) -> Response {
        let Some(method) = request.method.as_deref() else {
            return Response::failure(
                request,
                ResultCode::InvalidRequest,
                format!("{} request without method", request.operation),
            );
        };

        let algorithm = match self.registry.resolve(method) {
            Ok(algorithm) => algorithm,
            Err(e) => {
                debug!(request_id = %request.id, method, "Unknown cipher method");
                return Response::failure(request, ResultCode::UnknownMethod, e.to_string());
            }
        };

        let outcome = if request.operation == Operation::Encrypt {
            algorithm.encrypt(&request.data)
        } else {
            algorithm.decrypt(&request.data)
        };

        match outcome {
            Ok(text) => Response::success(request, text),
            Err(e) => {
                warn!(request_id = %request.id, method, error = %e, "Cipher transform failed");
                Response::failure(request, ResultCode::TransformFailure, e.reason)
            }
        }
    }
}

impl Default for CryptoService {
    fn default() -> Self {
        Self::with_defaults()
    }
}
