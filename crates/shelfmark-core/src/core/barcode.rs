// crates/shelfmark-core/src/core/barcode.rs
// ============================================================================
// Module: Shelfmark Barcode Model
// Description: Luhn-checked barcode values carried by absolute identifiers.
// Purpose: Guarantee that every stored barcode satisfies its own check digit.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A barcode is a decimal digit string whose final digit is a Luhn check digit
//! computed over the preceding payload. Construction validates the check digit,
//! so a [`Barcode`] in hand is always self-consistent. Serde round-trips go
//! through the same validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Barcode value assigned when a generation request supplies none.
///
/// Fourteen zeros; the Luhn check digit of a zero payload is zero, so the
/// default is valid under the same rules as scanned values.
pub const DEFAULT_BARCODE_VALUE: &str = "00000000000000";

/// Minimum digit count: one payload digit plus the check digit.
const MIN_BARCODE_DIGITS: usize = 2;

/// Maximum digit count; keeps the numeric form within `u64`.
const MAX_BARCODE_DIGITS: usize = 19;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Barcode validation errors raised at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BarcodeError {
    /// No value was supplied.
    #[error("barcode value is empty")]
    Empty,
    /// The value contains a non-decimal character.
    #[error("barcode value {value} contains a non-decimal character")]
    NonNumeric {
        /// Offending value.
        value: String,
    },
    /// The value is too short to carry a payload and a check digit.
    #[error("barcode value {value} is shorter than {MIN_BARCODE_DIGITS} digits")]
    TooShort {
        /// Offending value.
        value: String,
    },
    /// The value exceeds the supported digit count.
    #[error("barcode value {value} is longer than {MAX_BARCODE_DIGITS} digits")]
    TooLong {
        /// Offending value.
        value: String,
    },
    /// The trailing digit does not match the Luhn check over the payload.
    #[error("barcode value {value} fails its check digit: expected {expected}, found {found}")]
    CheckDigitMismatch {
        /// Offending value.
        value: String,
        /// Check digit computed over the payload.
        expected: u8,
        /// Trailing digit actually present.
        found: u8,
    },
}

// ============================================================================
// SECTION: Barcode Value
// ============================================================================

/// Validated barcode value.
///
/// # Invariants
/// - Every digit is a decimal character.
/// - The final digit equals the Luhn check digit of the leading payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Barcode(String);

impl Barcode {
    /// Creates a barcode from a digit string, validating the check digit.
    ///
    /// # Errors
    ///
    /// Returns [`BarcodeError`] when the value is empty, non-numeric, outside
    /// the supported digit count, or fails its Luhn check.
    pub fn new(value: impl Into<String>) -> Result<Self, BarcodeError> {
        let value = value.into();
        if value.is_empty() {
            return Err(BarcodeError::Empty);
        }
        if !value.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(BarcodeError::NonNumeric { value });
        }
        if value.len() < MIN_BARCODE_DIGITS {
            return Err(BarcodeError::TooShort { value });
        }
        if value.len() > MAX_BARCODE_DIGITS {
            return Err(BarcodeError::TooLong { value });
        }
        let expected = Self::check_digit_for(&value[..value.len() - 1]);
        let found = trailing_digit(&value);
        if expected != found {
            return Err(BarcodeError::CheckDigitMismatch {
                value,
                expected,
                found,
            });
        }
        Ok(Self(value))
    }

    /// Computes the Luhn check digit for a payload of decimal digits.
    ///
    /// Non-digit characters contribute nothing; callers validate the payload
    /// separately when that matters.
    #[must_use]
    pub fn check_digit_for(payload: &str) -> u8 {
        let sum: u32 = payload
            .bytes()
            .rev()
            .filter(u8::is_ascii_digit)
            .enumerate()
            .map(|(position, byte)| {
                let digit = u32::from(byte - b'0');
                if position % 2 == 0 {
                    let doubled = digit * 2;
                    if doubled > 9 { doubled - 9 } else { doubled }
                } else {
                    digit
                }
            })
            .sum();
        let check = (10 - sum % 10) % 10;
        u8::try_from(check).unwrap_or(0)
    }

    /// Returns the full digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the payload digits preceding the check digit.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.0[..self.0.len() - 1]
    }

    /// Returns the trailing check digit.
    #[must_use]
    pub fn check_digit(&self) -> u8 {
        trailing_digit(&self.0)
    }

    /// Returns the individual digits in order.
    #[must_use]
    pub fn digits(&self) -> Vec<u8> {
        self.0.bytes().map(|byte| byte - b'0').collect()
    }

    /// Returns the numeric form of the full value.
    #[must_use]
    pub fn integer(&self) -> u64 {
        self.0
            .bytes()
            .fold(0_u64, |acc, byte| acc * 10 + u64::from(byte - b'0'))
    }
}

impl Default for Barcode {
    fn default() -> Self {
        Self(DEFAULT_BARCODE_VALUE.to_string())
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for Barcode {
    type Error = BarcodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Barcode {
    type Error = BarcodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Barcode> for String {
    fn from(value: Barcode) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the numeric value of a digit string's final character.
fn trailing_digit(value: &str) -> u8 {
    value.bytes().last().map_or(0, |byte| byte - b'0')
}
