//! # Shift Cipher
//!
//! Caesar-style letter rotation over a fixed 26-letter alphabet.
//!
//! Lowercase ASCII letters rotate within `a..=z`, uppercase within `A..=Z`.
//! Everything else (digits, punctuation, whitespace, non-ASCII) is copied
//! unchanged. With an offset of 13 the transform is its own inverse, which is
//! the classic ROT13.
//!
//! Not cryptographically meaningful.

use crate::ports::{CipherAlgorithm, CipherOutcome};

/// Size of the Latin alphabet each case rotates within.
pub const ALPHABET_SIZE: u8 = 26;

/// Offset of the ROT13 method.
pub const ROT13_OFFSET: u8 = 13;

/// Offset of the classic Caesar method.
pub const CAESAR_OFFSET: u8 = 3;

/// Letter rotation by a fixed offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftCipher {
    name: String,
    /// Forward offset, always in `0..ALPHABET_SIZE`.
    offset: u8,
}

impl ShiftCipher {
    /// Create a shift cipher. The offset is reduced modulo the alphabet size.
    pub fn new(name: impl Into<String>, offset: u8) -> Self {
        Self {
            name: name.into(),
            offset: offset % ALPHABET_SIZE,
        }
    }

    /// The `rot13` method.
    #[must_use]
    pub fn rot13() -> Self {
        Self::new("rot13", ROT13_OFFSET)
    }

    /// The `caesar` method (offset 3).
    #[must_use]
    pub fn caesar() -> Self {
        Self::new("caesar", CAESAR_OFFSET)
    }

    /// Forward offset applied by `encrypt`.
    #[must_use]
    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// Returns true when encrypt and decrypt are the same transform.
    #[must_use]
    pub fn is_self_inverse(&self) -> bool {
        (self.offset * 2) % ALPHABET_SIZE == 0
    }

    fn rotate_text(text: &str, offset: u8) -> String {
        text.chars().map(|c| rotate_char(c, offset)).collect()
    }
}

/// Rotate one character forward by `offset` if it is an ASCII letter.
fn rotate_char(c: char, offset: u8) -> char {
    let base = if c.is_ascii_lowercase() {
        b'a'
    } else if c.is_ascii_uppercase() {
        b'A'
    } else {
        return c;
    };
    // c is ASCII here, so the cast is lossless
    let position = c as u8 - base;
    char::from(base + (position + offset) % ALPHABET_SIZE)
}

impl CipherAlgorithm for ShiftCipher {
    fn name(&self) -> &str {
        &self.name
    }

    fn encrypt(&self, plaintext: &str) -> CipherOutcome {
        Ok(Self::rotate_text(plaintext, self.offset))
    }

    fn decrypt(&self, ciphertext: &str) -> CipherOutcome {
        Ok(Self::rotate_text(
            ciphertext,
            (ALPHABET_SIZE - self.offset) % ALPHABET_SIZE,
        ))
    }
}
