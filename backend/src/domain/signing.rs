//! Ed25519 key generation, address derivation, and signing.
//!
//! Addresses follow the single-signer authentication-key scheme: the SHA3-256
//! digest of the public key followed by the scheme byte `0x00`.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha3::{Digest, Sha3_256};

use crate::domain::account::{AccountAddress, AccountValidationError};
use crate::domain::credential::{CredentialValue, SigningKeyHex, to_signing_hex};

/// Scheme byte appended to the public key when deriving an address.
const SINGLE_SIGNER_SCHEME: u8 = 0x00;

/// Signing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    /// Key material did not decode to a 32-byte Ed25519 secret key.
    #[error("signing key must be 32 bytes of hex, got {length} bytes")]
    InvalidKeyLength {
        /// Decoded length in bytes.
        length: usize,
    },
    /// Key material was not valid hex.
    #[error("signing key is not valid hex")]
    InvalidKeyEncoding,
}

/// Freshly generated account key material.
pub struct GeneratedKey {
    /// Credential in the canonical stored shape.
    pub credential: CredentialValue,
    /// Canonical signing-key hex.
    pub signing_key: SigningKeyHex,
    /// Ledger address derived from the public key.
    pub address: AccountAddress,
}

/// Signature over a ledger signing message, hex-encoded for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSignature {
    /// 0x-prefixed hex of the Ed25519 public key.
    pub public_key_hex: String,
    /// 0x-prefixed hex of the 64-byte signature.
    pub signature_hex: String,
}

/// Generate a new Ed25519 keypair and derive its ledger address.
///
/// # Panics
/// Never panics: a freshly generated key always normalises and always derives
/// a structurally valid address.
pub fn generate() -> GeneratedKey {
    let signing_key = SigningKey::generate(&mut OsRng);
    let hex_form = format!("0x{}", hex::encode(signing_key.to_bytes()));
    let credential = CredentialValue::from_hex(&hex_form);
    let canonical = to_signing_hex(&credential)
        .unwrap_or_else(|| unreachable_key("generated key failed normalisation"));
    let address = derive_address(&signing_key.verifying_key())
        .unwrap_or_else(|_| unreachable_key("derived address failed validation"));
    GeneratedKey {
        credential,
        signing_key: canonical,
        address,
    }
}

/// Derive the ledger address for a public key.
pub fn derive_address(public_key: &VerifyingKey) -> Result<AccountAddress, AccountValidationError> {
    let mut hasher = Sha3_256::new();
    hasher.update(public_key.as_bytes());
    hasher.update([SINGLE_SIGNER_SCHEME]);
    AccountAddress::new(format!("0x{}", hex::encode(hasher.finalize())))
}

/// Sign a ledger signing message with the canonical key material.
pub fn sign_message(
    key: &SigningKeyHex,
    message: &[u8],
) -> Result<MessageSignature, SigningError> {
    let signing_key = decode_signing_key(key)?;
    let signature = signing_key.sign(message);
    Ok(MessageSignature {
        public_key_hex: format!("0x{}", hex::encode(signing_key.verifying_key().as_bytes())),
        signature_hex: format!("0x{}", hex::encode(signature.to_bytes())),
    })
}

fn decode_signing_key(key: &SigningKeyHex) -> Result<SigningKey, SigningError> {
    let digits = key.as_str().strip_prefix("0x").unwrap_or(key.as_str());
    let bytes = hex::decode(digits).map_err(|_| SigningError::InvalidKeyEncoding)?;
    let secret: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| SigningError::InvalidKeyLength { length: bytes.len() })?;
    Ok(SigningKey::from_bytes(&secret))
}

fn unreachable_key(context: &str) -> ! {
    // Both closures guard structurally impossible states for a fresh key.
    panic!("invariant violated: {context}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Verifier;

    #[test]
    fn generated_addresses_are_structurally_valid_and_distinct() {
        let first = generate();
        let second = generate();
        assert_ne!(first.address, second.address);
        assert!(first.address.as_ref().starts_with("0x"));
        assert_eq!(first.address.as_ref().len(), 66);
    }

    #[test]
    fn address_derivation_is_deterministic() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let a = derive_address(&key.verifying_key()).expect("valid address");
        let b = derive_address(&key.verifying_key()).expect("valid address");
        assert_eq!(a, b);
    }

    #[test]
    fn signatures_verify_against_the_generated_public_key() {
        let generated = generate();
        let message = b"signing message bytes";
        let signed = sign_message(&generated.signing_key, message).expect("signable");

        let public_bytes =
            hex::decode(signed.public_key_hex.trim_start_matches("0x")).expect("hex public key");
        let public: [u8; 32] = public_bytes.as_slice().try_into().expect("32 bytes");
        let verifying = VerifyingKey::from_bytes(&public).expect("valid public key");

        let signature_bytes =
            hex::decode(signed.signature_hex.trim_start_matches("0x")).expect("hex signature");
        let signature = ed25519_dalek::Signature::from_slice(&signature_bytes).expect("signature");
        verifying.verify(message, &signature).expect("verifies");
    }

    #[test]
    fn short_key_material_is_rejected() {
        let credential = crate::domain::credential::CredentialValue::from_hex("0xabcd");
        let key = crate::domain::credential::to_signing_hex(&credential).expect("resolvable");
        assert_eq!(
            sign_message(&key, b"msg"),
            Err(SigningError::InvalidKeyLength { length: 2 })
        );
    }
}
