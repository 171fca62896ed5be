//! Error types for UID parsing and line framing

use thiserror::Error;

/// Errors that can occur while parsing identifiers or protocol lines
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Identifier has the wrong number of symbols
    #[error("invalid length: expected {expected} symbols, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Identifier contains a byte outside the 64-symbol alphabet
    #[error("invalid symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    /// Line exceeded the framing limit before a terminator arrived
    #[error("line too long: {0} bytes without terminator")]
    LineTooLong(usize),
}
