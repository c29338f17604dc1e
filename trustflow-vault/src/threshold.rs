//! XOR-additive secret sharing over base64 shares.
//!
//! The store-mode scheme: a plaintext is split into N equal-length random
//! buffers whose XOR equals the plaintext bytes; each share travels
//! base64-encoded, and a share set is the comma-joined list. Any N-1 shares
//! reveal nothing; combining all of them recovers the plaintext exactly.
//! The scheme itself is treated as an external primitive — this module only
//! carries its dealer and combiner sides.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use rand::Rng;

/// Errors from share reconstruction.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// A share was not valid base64.
    #[error("share is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// Shares had differing lengths or the set was empty.
    #[error("share set is empty or inconsistent")]
    Inconsistent,

    /// The combined bytes were not valid UTF-8.
    #[error("reconstructed secret is not valid UTF-8")]
    NotUtf8,
}

/// Splits a plaintext into `n` XOR-additive shares, base64-encoded.
///
/// # Panics
///
/// Panics if `n` is zero; a cluster always has at least one node.
#[must_use]
pub fn split_secret(secret: &str, n: usize) -> Vec<String> {
    assert!(n > 0, "cluster must have at least one node");
    let plain = secret.as_bytes();
    let mut rng = rand::rng();

    let mut running = plain.to_vec();
    let mut shares = Vec::with_capacity(n);
    for _ in 0..n - 1 {
        let mut share = vec![0u8; plain.len()];
        rng.fill_bytes(&mut share);
        for (acc, byte) in running.iter_mut().zip(&share) {
            *acc ^= byte;
        }
        shares.push(b64.encode(&share));
    }
    shares.push(b64.encode(&running));
    shares
}

/// Combines base64 shares back into the plaintext.
///
/// # Errors
///
/// Returns [`ShareError`] when the set is empty, a share fails to decode,
/// lengths differ, or the result is not UTF-8.
pub fn combine_shares<S: AsRef<str>>(shares: &[S]) -> Result<String, ShareError> {
    let mut decoded = Vec::with_capacity(shares.len());
    for share in shares {
        decoded.push(b64.decode(share.as_ref().trim())?);
    }

    let Some(first) = decoded.first() else {
        return Err(ShareError::Inconsistent);
    };
    let len = first.len();
    if decoded.iter().any(|s| s.len() != len) {
        return Err(ShareError::Inconsistent);
    }

    let mut plain = vec![0u8; len];
    for share in &decoded {
        for (acc, byte) in plain.iter_mut().zip(share) {
            *acc ^= byte;
        }
    }

    String::from_utf8(plain).map_err(|_| ShareError::NotUtf8)
}

/// Splits into the comma-joined wire form stored on each node.
#[must_use]
pub fn split_to_record(secret: &str, n: usize) -> String {
    split_secret(secret, n).join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_then_combine_recovers_plaintext() {
        let address = "0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08";
        let shares = split_secret(address, 3);
        assert_eq!(shares.len(), 3);
        assert_eq!(combine_shares(&shares).unwrap(), address);
    }

    #[test]
    fn test_single_node_cluster_is_the_identity() {
        let shares = split_secret("secret", 1);
        assert_eq!(combine_shares(&shares).unwrap(), "secret");
    }

    #[test]
    fn test_missing_share_does_not_reconstruct() {
        let address = "0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08";
        let shares = split_secret(address, 3);
        // Two of three shares either fail UTF-8 or decode to garbage,
        // never to the plaintext.
        if let Ok(recovered) = combine_shares(&shares[..2]) {
            assert_ne!(recovered, address);
        }
    }

    #[test]
    fn test_comma_joined_record_roundtrip() {
        let record = split_to_record("0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08", 4);
        let shares: Vec<&str> = record.split(',').collect();
        assert_eq!(
            combine_shares(&shares).unwrap(),
            "0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08"
        );
    }

    #[test]
    fn test_inconsistent_lengths_are_rejected() {
        let err = combine_shares(&[b64.encode("abc"), b64.encode("abcd")]).unwrap_err();
        assert!(matches!(err, ShareError::Inconsistent));
    }

    #[test]
    fn test_empty_set_is_rejected() {
        let err = combine_shares::<String>(&[]).unwrap_err();
        assert!(matches!(err, ShareError::Inconsistent));
    }

    #[test]
    fn test_invalid_base64_is_an_encoding_error() {
        let err = combine_shares(&["not base64!!"]).unwrap_err();
        assert!(matches!(err, ShareError::Encoding(_)));
    }
}
