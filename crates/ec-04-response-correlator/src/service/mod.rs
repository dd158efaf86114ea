//! Client-side services: issuing, correlating and routing.

pub mod correlator;
pub mod issuer;
pub mod router;

pub use correlator::{ResponseCorrelator, DEFAULT_CHANNEL_CAPACITY};
pub use issuer::RequestIssuer;
pub use router::ResponseRouter;
