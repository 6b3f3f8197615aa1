//! Source identifiers
//!
//! A source is a trading terminal or account feed. Source ids are matched
//! case-insensitively everywhere: secret lookup, the latest-snapshot map,
//! body/header consistency and history queries all go through
//! [`source_key`]. Listings are ordered with [`cmp_ignore_case`].

use std::cmp::Ordering;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything outside the RFC 3986 unreserved set is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Normalised lookup key for a source id.
///
/// Lowercases the id so that `ACCT-1` and `acct-1` address the same source.
/// Surrounding whitespace is kept; ids are trimmed where they enter the
/// system (header parsing), not here.
pub fn source_key(source_id: &str) -> String {
    source_id.to_lowercase()
}

/// Case-insensitive source-id equality.
pub fn same_source(a: &str, b: &str) -> bool {
    a == b || source_key(a) == source_key(b)
}

/// Case-insensitive ordinal ordering of source ids.
///
/// Compares code points after folding each one to upper case, so `_` (0x5F)
/// sorts after letters: `accta` < `acct_1`. Characters whose upper case is
/// not a single character compare as themselves.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars().map(fold_upper).cmp(b.chars().map(fold_upper))
}

fn fold_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(folded), None) => folded,
        _ => c,
    }
}

/// Percent-encode a source id for use as one URL path segment.
pub fn path_segment(source_id: &str) -> String {
    utf8_percent_encode(source_id, PATH_SEGMENT).to_string()
}

/// True when the id is empty or whitespace only.
pub fn is_blank(source_id: &str) -> bool {
    source_id.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_source_key_lowercases() {
        assert_eq!(source_key("ACCT-1"), "acct-1");
        assert_eq!(source_key("Demo-Source-01"), "demo-source-01");
    }

    #[test]
    fn test_same_source_ignores_case() {
        assert!(same_source("Acct-1", "aCCT-1"));
        assert!(!same_source("acct-1", "acct-2"));
    }

    #[test]
    fn test_cmp_ignore_case_folds_to_upper() {
        assert_eq!(cmp_ignore_case("accta", "acct_1"), Ordering::Less);
        assert_eq!(cmp_ignore_case("ACCT_1", "accta"), Ordering::Greater);
        assert_eq!(cmp_ignore_case("Acct-1", "aCCT-1"), Ordering::Equal);
        assert_eq!(cmp_ignore_case("acct", "acct-1"), Ordering::Less);
        // Multi-character upper case (ß -> SS) is left as is
        assert_eq!(cmp_ignore_case("straße", "STRAßE"), Ordering::Equal);
    }

    #[test]
    fn test_path_segment_escapes_reserved() {
        assert_eq!(path_segment("acct-1_a.b~c"), "acct-1_a.b~c");
        assert_eq!(path_segment("desk 7/eu"), "desk%207%2Feu");
        assert_eq!(path_segment("konto-ü"), "konto-%C3%BC");
        assert_eq!(path_segment("a?b#c%"), "a%3Fb%23c%25");
    }

    #[test]
    fn test_blank_detection() {
        assert!(is_blank(""));
        assert!(is_blank("   \t"));
        assert!(!is_blank(" a "));
    }

    proptest! {
        #[test]
        fn prop_same_source_matches_uppercase(id in "[a-zA-Z0-9_-]{1,24}") {
            prop_assert!(same_source(&id, &id.to_uppercase()));
        }
    }
}
