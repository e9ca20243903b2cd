/// Content fingerprint of a split dataset.
///
/// Every bundle is serialized to JSON in region-id order and fed to SHA-256,
/// each preceded by its region id and a newline. Two splits with the same
/// bundles therefore share a fingerprint regardless of how they were loaded,
/// which lets history records tell "same data, slower run" apart from "new
/// data".
use sha2::{Digest, Sha256};

use crate::model::SplitData;

/// Encodes a byte slice as a lowercase hexadecimal string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX_CHARS[(b >> 4) as usize] as char);
        out.push(HEX_CHARS[(b & 0x0f) as usize] as char);
    }
    out
}

/// Returns the 64-character lowercase hex SHA-256 fingerprint of `split`.
///
/// # Errors
///
/// Returns the serializer error if a bundle cannot be encoded as JSON.
pub fn dataset_fingerprint(split: &SplitData) -> Result<String, serde_json::Error> {
    let mut hasher = Sha256::new();
    for (region_id, bundle) in split {
        hasher.update(region_id.as_bytes());
        hasher.update(b"\n");
        hasher.update(serde_json::to_vec(bundle)?);
    }
    Ok(hex_encode(&hasher.finalize()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::test_helpers::{bundle, healthy_world, room, split_of};

    #[test]
    fn fingerprint_is_stable_and_hex() {
        let split = healthy_world().split;
        let a = dataset_fingerprint(&split).expect("fingerprint");
        let b = dataset_fingerprint(&split.clone()).expect("fingerprint");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn any_room_change_changes_the_fingerprint() {
        let before = split_of(vec![("a", bundle("a", vec![room("a1", &[])]))]);
        let after = split_of(vec![("a", bundle("a", vec![room("a2", &[])]))]);
        assert_ne!(
            dataset_fingerprint(&before).expect("fingerprint"),
            dataset_fingerprint(&after).expect("fingerprint")
        );
    }

    #[test]
    fn empty_split_hashes_empty_input() {
        assert_eq!(
            dataset_fingerprint(&SplitData::new()).expect("fingerprint"),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
