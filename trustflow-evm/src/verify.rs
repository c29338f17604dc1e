//! Owner signature verification.
//!
//! Signatures are verified over the *exact string bytes* the client claims
//! were signed, using the EIP-191 personal-message scheme. Re-serializing
//! parsed content before verifying is a signature-bypass bug: the payload is
//! only parsed after recovery succeeds and the signer matches.

use alloy_primitives::{Address, Bytes, Signature, hex};

use trustflow::book::{AddressBookContainer, parse_signed_entries};
use trustflow::proto::error::AuthorizationError;
use trustflow::timestamp::UnixTimestamp;

/// Recovers the address that produced `signature` over `message`.
///
/// The signature is a hex string (`0x` prefix optional) of the 65-byte
/// `r || s || v` form produced by personal-message signing.
///
/// # Errors
///
/// Returns [`AuthorizationError::InvalidSignatureFormat`] when the signature
/// cannot be decoded, parsed, or recovered.
pub fn recover_personal_signer(
    message: &str,
    signature: &str,
) -> Result<Address, AuthorizationError> {
    let raw = hex::decode(signature)
        .map_err(|e| AuthorizationError::InvalidSignatureFormat(e.to_string()))?;
    recover_personal_signer_raw(message, &raw)
}

/// [`recover_personal_signer`] over already-decoded signature bytes, for
/// re-verifying a stored container.
///
/// # Errors
///
/// Returns [`AuthorizationError::InvalidSignatureFormat`] when the bytes do
/// not parse or recovery fails.
pub fn recover_personal_signer_raw(
    message: &str,
    signature: &[u8],
) -> Result<Address, AuthorizationError> {
    let signature = Signature::from_raw(signature)
        .map_err(|e| AuthorizationError::InvalidSignatureFormat(e.to_string()))?;
    signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| AuthorizationError::InvalidSignatureFormat(e.to_string()))
}

/// Recovers the signer and requires it to match `claimed`.
///
/// Address comparison is by value; parsing already normalized case.
///
/// # Errors
///
/// [`AuthorizationError::InvalidSignatureFormat`] on unrecoverable input,
/// [`AuthorizationError::SignatureMismatch`] when the recovered signer
/// differs from `claimed`.
pub fn verify_owner(
    message: &str,
    signature: &str,
    claimed: Address,
) -> Result<Address, AuthorizationError> {
    let recovered = recover_personal_signer(message, signature)?;
    if recovered != claimed {
        return Err(AuthorizationError::SignatureMismatch);
    }
    Ok(recovered)
}

/// The full address-book write path: verify, then (and only then) parse.
///
/// On success returns the container to persist, carrying the exact signed
/// string, the signature, the lowercased entries, and the payload timestamp
/// (falling back to `now`).
///
/// # Errors
///
/// Signature errors as in [`verify_owner`];
/// [`AuthorizationError::MalformedPayload`] when the verified message does
/// not parse as an entries object.
pub fn verify_and_build_container(
    owner: Address,
    message: &str,
    signature: &str,
    now: UnixTimestamp,
) -> Result<AddressBookContainer, AuthorizationError> {
    let raw = hex::decode(signature)
        .map_err(|e| AuthorizationError::InvalidSignatureFormat(e.to_string()))?;
    let recovered = recover_personal_signer_raw(message, &raw)?;
    if recovered != owner {
        return Err(AuthorizationError::SignatureMismatch);
    }

    let (entries, timestamp) = parse_signed_entries(message)?;

    Ok(AddressBookContainer {
        owner,
        signed_message: message.to_owned(),
        signature: Bytes::from(raw),
        entries,
        timestamp: timestamp.unwrap_or(now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_signer::SignerSync;
    use alloy_signer_local::PrivateKeySigner;

    fn signed(message: &str) -> (PrivateKeySigner, String) {
        let signer = PrivateKeySigner::random();
        let signature = signer.sign_message_sync(message.as_bytes()).unwrap();
        (signer, hex::encode_prefixed(signature.as_bytes()))
    }

    #[test]
    fn test_signature_round_trip_recovers_signer() {
        let message = r#"{"entries":{"designer":"0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08"}}"#;
        let (signer, signature) = signed(message);

        let recovered = recover_personal_signer(message, &signature).unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[test]
    fn test_verify_owner_rejects_other_signer() {
        let message = "payload";
        let (_, signature) = signed(message);
        let other = PrivateKeySigner::random().address();

        let err = verify_owner(message, &signature, other).unwrap_err();
        assert!(matches!(err, AuthorizationError::SignatureMismatch));
    }

    #[test]
    fn test_garbage_signature_is_a_format_error() {
        let err = recover_personal_signer("payload", "0xdeadbeef").unwrap_err();
        assert!(matches!(err, AuthorizationError::InvalidSignatureFormat(_)));
    }

    #[test]
    fn test_verification_uses_exact_message_bytes() {
        // Same logical JSON, different whitespace: must recover different
        // signers, because the scheme signs bytes, not structure.
        let message = r#"{"a": 1}"#;
        let (signer, signature) = signed(message);

        let reserialized = r#"{"a":1}"#;
        let recovered = recover_personal_signer(reserialized, &signature).unwrap();
        assert_ne!(recovered, signer.address());
    }

    #[test]
    fn test_build_container_parses_only_after_verification() {
        // A valid signature over a non-entries payload must reach the
        // payload error, not a signature error.
        let message = "\"not an object\"";
        let (signer, signature) = signed(message);

        let err = verify_and_build_container(
            signer.address(),
            message,
            &signature,
            UnixTimestamp::from_secs(0),
        )
        .unwrap_err();
        assert!(matches!(err, AuthorizationError::MalformedPayload(_)));
    }

    #[test]
    fn test_build_container_carries_exact_message_and_entries() {
        let message = concat!(
            r#"{"domain":"TrustFlow","entries":"#,
            r#"{"Designer":"0xB7BdA0b6a477db6c370B6e83311Efe1092Ba6a08"},"#,
            r#""timestamp":1700000000,"version":1}"#
        );
        let (signer, signature) = signed(message);

        let container = verify_and_build_container(
            signer.address(),
            message,
            &signature,
            UnixTimestamp::from_secs(1),
        )
        .unwrap();

        assert_eq!(container.signed_message, message);
        assert_eq!(container.owner, signer.address());
        assert_eq!(container.timestamp, UnixTimestamp::from_secs(1_700_000_000));
        assert!(container.entries.contains_key("designer"));
    }
}
