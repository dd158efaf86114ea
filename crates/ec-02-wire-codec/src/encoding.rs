//! # Text Encoding
//!
//! Both peers must agree on the character encoding of a datagram, otherwise
//! non-ASCII payloads are corrupted. The encoding is therefore part of the
//! codec configuration rather than guessed per datagram.
//!
//! ## UTF-16 layout
//!
//! Encode: byte-order mark `FE FF` followed by big-endian code units.
//! Decode: a leading `FE FF` or `FF FE` mark selects the byte order; without
//! a mark the data is read as big-endian.

use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Big-endian byte-order mark.
const BOM_BE: [u8; 2] = [0xFE, 0xFF];

/// Little-endian byte-order mark.
const BOM_LE: [u8; 2] = [0xFF, 0xFE];

/// Character encoding used to turn envelope text into datagram bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    /// UTF-16 with byte-order mark. The default wire encoding.
    #[default]
    #[serde(rename = "utf-16", alias = "utf16")]
    Utf16,
    /// Plain UTF-8.
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
}

impl TextEncoding {
    /// Encode text into bytes.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Utf16 => {
                let mut bytes = Vec::with_capacity(2 + text.len() * 2);
                bytes.extend_from_slice(&BOM_BE);
                for unit in text.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_be_bytes());
                }
                bytes
            }
        }
    }

    /// Decode bytes into text.
    ///
    /// # Errors
    ///
    /// `CodecError::Malformed` if the bytes are not valid in this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| CodecError::malformed(format!("invalid UTF-8: {e}"))),
            TextEncoding::Utf16 => decode_utf16(bytes),
        }
    }

    /// Configuration name of the encoding.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf16 => "utf-16",
            TextEncoding::Utf8 => "utf-8",
        }
    }
}

fn decode_utf16(bytes: &[u8]) -> Result<String, CodecError> {
    if bytes.len() % 2 != 0 {
        return Err(CodecError::malformed(format!(
            "odd UTF-16 byte length {}",
            bytes.len()
        )));
    }

    let (body, little_endian) = if let Some(rest) = bytes.strip_prefix(&BOM_BE[..]) {
        (rest, false)
    } else if let Some(rest) = bytes.strip_prefix(&BOM_LE[..]) {
        (rest, true)
    } else {
        (bytes, false)
    };

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            let pair = [pair[0], pair[1]];
            if little_endian {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            }
        })
        .collect();

    String::from_utf16(&units).map_err(|e| CodecError::malformed(format!("invalid UTF-16: {e}")))
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextEncoding {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-16" | "utf16" => Ok(TextEncoding::Utf16),
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            other => Err(CodecError::UnsupportedEncoding(other.to_string())),
        }
    }
}
