//! Probe pattern matching
//!
//! A probe is split into an anchor (its first two symbols) and a tail
//! (everything after the anchor). A UID answers a probe when the anchor
//! equals the start of the UID and the tail equals the end of the UID:
//!
//! ```text
//! probe:  1 2 x x 5 6        anchor "12", tail "xx56"
//! uid:    1 2 a b x x 5 6    -> matches
//! ```

use crate::uid::PREFIX_LEN;

/// Number of leading probe symbols compared against the start of a UID
pub fn anchor_len(pattern: &str) -> usize {
    pattern.len().min(PREFIX_LEN)
}

/// Number of trailing probe symbols compared against the end of a UID
pub fn tail_len(pattern: &str) -> usize {
    pattern.len().saturating_sub(PREFIX_LEN)
}

/// Check whether `pattern` matches `uid`
///
/// Fails closed: an empty pattern, or one longer than the UID, never matches.
pub fn matches(pattern: &str, uid: &str) -> bool {
    let (p, u) = (pattern.as_bytes(), uid.as_bytes());
    if p.is_empty() || p.len() > u.len() {
        return false;
    }

    let anchor = anchor_len(pattern);
    let tail = tail_len(pattern);

    p[..anchor] == u[..anchor] && p[anchor..] == u[u.len() - tail..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_anchor_and_tail() {
        assert!(matches("12xx56", "12abxx56"));
        assert!(matches("12", "123456"));
        assert!(matches("1", "123456"));
        assert!(matches("123456", "123456"));
    }

    #[test]
    fn test_tail_matches_end_of_uid() {
        // anchor "12", tail "xx56" must be the last four symbols
        assert!(!matches("12xx56", "12abc56"));
        assert!(matches("12bc56", "12abc56"));
        assert!(matches("1256", "12abc56"));
        assert!(!matches("1257", "123456"));
        assert!(matches("12c56", "12abc56"));
    }

    #[test]
    fn test_anchor_mismatch() {
        assert!(!matches("13", "123456"));
        assert!(!matches("2", "123456"));
    }

    #[test]
    fn test_fails_closed() {
        assert!(!matches("", "123456"));
        assert!(!matches("", ""));
        assert!(!matches("1234567", "123456"));
    }

    #[test]
    fn test_overlapping_anchor_and_tail() {
        // A 3-symbol UID probed with its full value overlaps nothing;
        // a probe equal in length to the UID must equal it
        assert!(matches("ABC", "ABC"));
        assert!(!matches("ABD", "ABC"));
    }

    fn symbol_string(max: usize) -> impl Strategy<Value = String> {
        proptest::string::string_regex(&format!("[0-9A-Za-z_-]{{0,{}}}", max)).unwrap()
    }

    proptest! {
        #[test]
        fn matches_agrees_with_definition(p in symbol_string(21), u in symbol_string(21)) {
            let anchor = p.len().min(2);
            let expected = !p.is_empty()
                && p.len() <= u.len()
                && p[..anchor] == u[..anchor]
                && p[anchor..] == u[u.len() - (p.len() - anchor)..];
            prop_assert_eq!(matches(&p, &u), expected);
        }

        #[test]
        fn longer_pattern_never_matches(u in symbol_string(19), extra in symbol_string(4)) {
            let p = format!("{}{}x", u, extra);
            prop_assert!(!matches(&p, &u));
        }

        #[test]
        fn anchor_plus_any_suffix_of_uid_matches(u in "[0-9A-Za-z_-]{19}", cut in 0usize..=17) {
            let p = format!("{}{}", &u[..2], &u[2 + cut..]);
            prop_assert!(matches(&p, &u));
        }
    }
}
