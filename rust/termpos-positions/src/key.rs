//! Composite table keys for position lists.
//!
//! A key is the term, packed as a self-terminating sort-preserving string,
//! followed by the document id packed as a sort-preserving integer. Byte order of
//! keys therefore groups all documents of a term together, ordered by ascending
//! document id, and [`term_prefix`] is a prefix of exactly the keys of one term.

use termpos_common::{Result, verify_data};
use termpos_pack::sortable::{
    pack_string_preserving_sort, pack_uint_preserving_sort, unpack_string_preserving_sort,
    unpack_uint_preserving_sort,
};

/// Document identifier.
pub type DocId = u64;

/// Word offset of a term occurrence within a document.
pub type TermPos = u64;

/// Number of occurrences of a term.
pub type TermCount = u64;

/// Builds the table key for the position list of `term` in document `did`.
pub fn make_key(did: DocId, term: &[u8]) -> Vec<u8> {
    let mut key = term_prefix(term);
    pack_uint_preserving_sort(&mut key, did);
    key
}

/// Returns the key prefix shared by the position lists of `term` in every
/// document.
pub fn term_prefix(term: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(term.len() + 2 + 9);
    pack_string_preserving_sort(&mut key, term, false);
    key
}

/// Splits a key built by [`make_key`] back into its document id and term.
pub fn parse_key(key: &[u8]) -> Result<(DocId, Vec<u8>)> {
    let mut data = key;
    let term = unpack_string_preserving_sort(&mut data, false)?;
    let did = unpack_uint_preserving_sort(&mut data)?;
    verify_data!(position_key, data.is_empty());
    Ok((did, term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inverts_make_key() {
        for (did, term) in [
            (0u64, &b""[..]),
            (1, b"cat"),
            (255, b"a\0b"),
            (256, b"\0"),
            (u64::MAX, b"\xff\xff"),
        ] {
            let key = make_key(did, term);
            assert!(key.starts_with(&term_prefix(term)));
            assert_eq!(parse_key(&key).unwrap(), (did, term.to_vec()));
        }
    }

    #[test]
    fn test_keys_group_by_term_then_document() {
        let mut pairs = Vec::new();
        for term in [&b"cat"[..], b"cats", b"ca", b"c\0t", b"dog", b""] {
            for did in [0u64, 7, 255, 256, 70000, 1 << 40, u64::MAX] {
                pairs.push((term.to_vec(), did));
            }
        }
        let mut by_key = pairs.clone();
        by_key.sort_by_key(|(term, did)| make_key(*did, term));
        pairs.sort();
        assert_eq!(by_key, pairs);
    }

    #[test]
    fn test_term_prefix_excludes_longer_terms() {
        let prefix = term_prefix(b"cat");
        assert!(!make_key(3, b"cats").starts_with(&prefix));
        assert!(!make_key(3, b"cat\0").starts_with(&prefix));
        assert!(make_key(3, b"cat").starts_with(&prefix));
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        let mut key = make_key(42, b"dog");
        key.push(0);
        assert!(parse_key(&key).unwrap_err().is_corrupt_data());

        let key = make_key(42, b"dog");
        assert!(parse_key(&key[..key.len() - 1]).unwrap_err().is_corrupt_data());
        assert!(parse_key(b"dog").unwrap_err().is_corrupt_data());
    }
}
