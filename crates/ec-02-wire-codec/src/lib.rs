//! # Wire Codec Subsystem
//!
//! **Subsystem ID:** 2
//!
//! Converts `Request`/`Response` envelopes to the textual datagram format
//! and back.
//!
//! ## Example
//!
//! ```rust
//! use ec_02_wire_codec::{MessageCodec, TextEncoding};
//! use shared_types::{Envelope, Request, RequestId};
//!
//! let codec = MessageCodec::new(TextEncoding::Utf16);
//! let request = Request::encrypt(RequestId::new(0), "rot13", "Hello");
//!
//! let bytes = codec.encode_request(&request);
//! assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
//! assert_eq!(codec.decode(&bytes).unwrap(), Envelope::Request(request));
//!
//! assert!(codec.decode(b"garbage").is_err());
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod codec;
pub mod encoding;
pub mod error;

pub use codec::MessageCodec;
pub use encoding::TextEncoding;
pub use error::CodecError;
