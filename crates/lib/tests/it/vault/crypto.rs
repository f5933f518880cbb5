use kobllux::{
    KdfParams,
    vault::crypto::{NONCE_LENGTH, SALT_LENGTH, decrypt, encrypt},
};
use serde::{Deserialize, Serialize};

use crate::helpers::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Secrets {
    user: String,
    tokens: Vec<String>,
}

fn secrets() -> Secrets {
    Secrets {
        user: "Ana".into(),
        tokens: vec!["sk-1".into(), "sk-2".into()],
    }
}

#[test]
fn test_encrypt_decrypt_round_trip() {
    let payload = encrypt(&secrets(), "correct horse", &TEST_KDF).unwrap();
    assert_eq!(payload.salt.len(), SALT_LENGTH);
    assert_eq!(payload.iv.len(), NONCE_LENGTH);

    let back: Secrets = decrypt(&payload, "correct horse", &TEST_KDF).unwrap();
    assert_eq!(back, secrets());
}

#[test]
fn test_wrong_passphrase_fails() {
    let payload = encrypt(&secrets(), "correct horse", &TEST_KDF).unwrap();
    let err = decrypt::<Secrets>(&payload, "battery staple", &TEST_KDF).unwrap_err();
    assert!(err.is_decryption_error());
    assert_eq!(err.module(), "vault");
}

#[test]
fn test_encryption_is_not_deterministic() {
    let a = encrypt(&secrets(), "p", &TEST_KDF).unwrap();
    let b = encrypt(&secrets(), "p", &TEST_KDF).unwrap();
    assert_ne!(a.salt, b.salt);
    assert_ne!(a.iv, b.iv);
    assert_ne!(a.ciphertext, b.ciphertext);
    assert_ne!(a.to_bundle_string().unwrap(), b.to_bundle_string().unwrap());
}

#[test]
fn test_ciphertext_does_not_contain_plaintext() {
    let payload = encrypt(&secrets(), "p", &TEST_KDF).unwrap();
    let bundle = payload.to_bundle_string().unwrap();
    assert!(!bundle.contains("sk-1"));
    assert!(!bundle.contains("Ana"));
}

#[test]
fn test_truncated_salt_fails_generically() {
    let mut payload = encrypt(&secrets(), "p", &TEST_KDF).unwrap();
    payload.salt.clear();
    let err = decrypt::<Secrets>(&payload, "p", &TEST_KDF).unwrap_err();
    assert!(err.is_decryption_error());
    assert_eq!(err.to_string(), "incorrect passphrase or corrupted data");
}

#[test]
fn test_tampered_cost_parameters_fail_generically() {
    let payload = encrypt(&secrets(), "p", &TEST_KDF).unwrap();

    let mut invalid = payload.clone();
    invalid.kdf = Some(KdfParams::new(0, 0, 0));
    assert!(decrypt::<Secrets>(&invalid, "p", &TEST_KDF).unwrap_err().is_decryption_error());

    // Refused up front; deriving with this much memory would never finish.
    let mut oversized = payload;
    oversized.kdf = Some(KdfParams::new(u32::MAX, u32::MAX, u32::MAX));
    assert!(decrypt::<Secrets>(&oversized, "p", &TEST_KDF).unwrap_err().is_decryption_error());
}

#[test]
fn test_bundle_from_cheaper_parameters_still_opens() {
    let payload = encrypt(&secrets(), "p", &TEST_KDF).unwrap();
    let back: Secrets = decrypt(&payload, "p", &KdfParams::new(128, 2, 1)).unwrap();
    assert_eq!(back, secrets());
}
