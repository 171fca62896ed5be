//! Identifier types and the bus alphabet
//!
//! A UID is 19 symbols long: a 2-symbol vendor prefix followed by a
//! 17-symbol suffix. Every symbol is drawn from a fixed 64-symbol alphabet.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// The 64 symbols a UID may contain, in ascending order
pub const ALPHABET: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Length of the vendor prefix (the probe anchor)
pub const PREFIX_LEN: usize = 2;

/// Length of the suffix following the vendor prefix
pub const SUFFIX_LEN: usize = 17;

/// Total UID length
pub const UID_LEN: usize = PREFIX_LEN + SUFFIX_LEN;

/// Returns true if `b` belongs to the UID alphabet
pub fn is_symbol(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn validate(s: &str, expected: usize) -> Result<(), ParseError> {
    if s.len() != expected {
        return Err(ParseError::InvalidLength {
            expected,
            actual: s.len(),
        });
    }
    let bad = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii() || !is_symbol(*c as u8));
    if let Some((position, symbol)) = bad {
        return Err(ParseError::InvalidSymbol { symbol, position });
    }
    Ok(())
}

/// Order in which the discovery walk tries alphabet symbols at each depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlphabetOrder {
    /// `0` first, `_` last
    #[default]
    Ascending,
    /// `_` first, `0` last
    Descending,
}

impl AlphabetOrder {
    /// Iterate the alphabet in this order
    pub fn symbols(self) -> Box<dyn Iterator<Item = u8>> {
        match self {
            AlphabetOrder::Ascending => Box::new(ALPHABET.iter().copied()),
            AlphabetOrder::Descending => Box::new(ALPHABET.iter().rev().copied()),
        }
    }

    /// The opposite order
    pub fn reversed(self) -> Self {
        match self {
            AlphabetOrder::Ascending => AlphabetOrder::Descending,
            AlphabetOrder::Descending => AlphabetOrder::Ascending,
        }
    }
}

/// A complete, validated device identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Uid(String);

impl Uid {
    /// Parse and validate a UID
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        validate(s, UID_LEN)?;
        Ok(Self(s.to_string()))
    }

    /// The UID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 2-symbol vendor prefix
    pub fn prefix(&self) -> &str {
        &self.0[..PREFIX_LEN]
    }

    /// The 17-symbol suffix
    pub fn suffix(&self) -> &str {
        &self.0[PREFIX_LEN..]
    }

    /// Returns true if this UID belongs to `prefix`
    pub fn has_prefix(&self, prefix: &VendorPrefix) -> bool {
        self.prefix() == prefix.as_str()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Uid {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Uid {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Uid {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        validate(&s, UID_LEN)?;
        Ok(Self(s))
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}

/// A validated 2-symbol vendor prefix
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct VendorPrefix(String);

impl VendorPrefix {
    /// Parse and validate a vendor prefix
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        validate(s, PREFIX_LEN)?;
        Ok(Self(s.to_string()))
    }

    /// The prefix as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VendorPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VendorPrefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for VendorPrefix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VendorPrefix {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        validate(&s, PREFIX_LEN)?;
        Ok(Self(s))
    }
}

impl From<VendorPrefix> for String {
    fn from(prefix: VendorPrefix) -> Self {
        prefix.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_is_64_distinct_symbols() {
        let mut seen = std::collections::HashSet::new();
        for &b in ALPHABET {
            assert!(is_symbol(b));
            assert!(seen.insert(b));
        }
        assert_eq!(seen.len(), 64);
    }

    #[test]
    fn test_parse_valid_uid() {
        let uid = Uid::parse("AB1234567890abcdef_").unwrap();
        assert_eq!(uid.prefix(), "AB");
        assert_eq!(uid.suffix(), "1234567890abcdef_");
        assert_eq!(uid.to_string(), "AB1234567890abcdef_");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert_eq!(
            Uid::parse("AB123"),
            Err(ParseError::InvalidLength {
                expected: 19,
                actual: 5
            })
        );
    }

    #[test]
    fn test_parse_rejects_foreign_symbol() {
        assert_eq!(
            Uid::parse("AB12345678901234.67"),
            Err(ParseError::InvalidSymbol {
                symbol: '.',
                position: 16
            })
        );
    }

    #[test]
    fn test_vendor_prefix() {
        assert!(VendorPrefix::parse("CB").is_ok());
        assert!(VendorPrefix::parse("C").is_err());
        assert!(VendorPrefix::parse("CBA").is_err());
        assert!(VendorPrefix::parse("C ").is_err());

        let uid: Uid = "CB00000000000000001".parse().unwrap();
        assert!(uid.has_prefix(&"CB".parse().unwrap()));
        assert!(!uid.has_prefix(&"AB".parse().unwrap()));
    }

    #[test]
    fn test_alphabet_order() {
        let asc: Vec<u8> = AlphabetOrder::Ascending.symbols().collect();
        let desc: Vec<u8> = AlphabetOrder::Descending.symbols().collect();
        assert_eq!(asc.first(), Some(&b'0'));
        assert_eq!(desc.first(), Some(&b'_'));
        assert_eq!(asc.iter().rev().copied().collect::<Vec<_>>(), desc);
        assert_eq!(AlphabetOrder::Ascending.reversed(), AlphabetOrder::Descending);
    }
}
