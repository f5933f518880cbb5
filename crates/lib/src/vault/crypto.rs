//! Passphrase-based encryption of the credential bundle.
//!
//! Argon2id derives a 256-bit key from the passphrase and a fresh random salt;
//! AES-256-GCM encrypts the JSON form of the plaintext under a fresh nonce.
//! Every call to [`encrypt`] therefore yields a different bundle.

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng},
};
use argon2::{Argon2, Params};
use rand::RngCore;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use zeroize::Zeroizing;

use super::errors::VaultError;
use crate::Result;

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;

/// Nonce length for AES-GCM (12 bytes standard)
pub const NONCE_LENGTH: usize = 12;

/// Derived key length for AES-256 (32 bytes)
pub const KEY_LENGTH: usize = 32;

/// Default Argon2 memory cost in KiB (19 MiB)
pub const DEFAULT_ARGON2_M_COST: u32 = 19 * 1024;
/// Default Argon2 time cost (iterations)
pub const DEFAULT_ARGON2_T_COST: u32 = 2;
/// Default Argon2 parallelism
pub const DEFAULT_ARGON2_P_COST: u32 = 1;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub m_cost: u32,
    /// Time cost (iterations)
    pub t_cost: u32,
    /// Parallelism
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: DEFAULT_ARGON2_M_COST,
            t_cost: DEFAULT_ARGON2_T_COST,
            p_cost: DEFAULT_ARGON2_P_COST,
        }
    }
}

impl KdfParams {
    /// Build explicit cost parameters.
    pub const fn new(m_cost: u32, t_cost: u32, p_cost: u32) -> Self {
        Self {
            m_cost,
            t_cost,
            p_cost,
        }
    }

    /// The component-wise maximum of these parameters and the defaults.
    fn ceiling(&self) -> Self {
        let default = Self::default();
        Self {
            m_cost: self.m_cost.max(default.m_cost),
            t_cost: self.t_cost.max(default.t_cost),
            p_cost: self.p_cost.max(default.p_cost),
        }
    }

    fn fits_within(&self, ceiling: &Self) -> bool {
        self.m_cost <= ceiling.m_cost
            && self.t_cost <= ceiling.t_cost
            && self.p_cost <= ceiling.p_cost
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(self.m_cost, self.t_cost, self.p_cost, Some(KEY_LENGTH))
            .map_err(|e| VaultError::KeyDerivation {
                reason: format!("Invalid Argon2 parameters: {e}"),
            })?;
        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }
}

/// An encrypted credential bundle.
///
/// Serializes with byte arrays as JSON number arrays, so the bundle
/// round-trips through string storage unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// Random Argon2 salt
    #[serde(rename = "s")]
    pub salt: Vec<u8>,
    /// Random AES-GCM nonce
    pub iv: Vec<u8>,
    /// Ciphertext with the authentication tag appended
    #[serde(rename = "d")]
    pub ciphertext: Vec<u8>,
    /// Cost parameters that produced the key, absent in older bundles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfParams>,
}

impl EncryptedPayload {
    /// The string form stored inside the bundle envelope.
    pub fn to_bundle_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            VaultError::EncryptionFailed {
                reason: format!("Failed to serialize bundle: {e}"),
            }
            .into()
        })
    }

    /// Parse a bundle string.
    ///
    /// A malformed bundle is indistinguishable from a corrupted one and fails
    /// with [`VaultError::DecryptionFailed`].
    pub fn from_bundle_str(bundle: &str) -> Result<Self> {
        serde_json::from_str(bundle).map_err(|_| VaultError::DecryptionFailed.into())
    }
}

/// Derive the AES key for `passphrase` and `salt`.
///
/// Deterministic: the same inputs always give the same key.
pub fn derive_key(
    passphrase: &str,
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LENGTH]>> {
    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    params
        .argon2()?
        .hash_password_into(passphrase.as_bytes(), salt, key.as_mut())
        .map_err(|e| VaultError::KeyDerivation {
            reason: format!("Key derivation failed: {e}"),
        })?;
    Ok(key)
}

/// Encrypt raw bytes under a fresh salt and nonce.
pub fn encrypt_bytes(
    plaintext: &[u8],
    passphrase: &str,
    params: &KdfParams,
) -> Result<EncryptedPayload> {
    let mut salt = vec![0u8; SALT_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);

    let key = derive_key(passphrase, &salt, params)?;
    let cipher =
        Aes256Gcm::new_from_slice(key.as_ref()).map_err(|e| VaultError::EncryptionFailed {
            reason: format!("Failed to create cipher: {e}"),
        })?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext =
        cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| VaultError::EncryptionFailed {
                reason: format!("Encryption failed: {e}"),
            })?;

    Ok(EncryptedPayload {
        salt,
        iv: nonce.to_vec(),
        ciphertext,
        kdf: Some(*params),
    })
}

/// Decrypt a bundle back into raw bytes.
///
/// `expected` supplies the cost parameters for bundles that do not record
/// their own, and bounds the ones that do: a bundle asking for more memory,
/// time or lanes than the larger of `expected` and the defaults is rejected
/// before any key derivation runs. Every malformed field fails with
/// [`VaultError::DecryptionFailed`].
pub fn decrypt_bytes(
    payload: &EncryptedPayload,
    passphrase: &str,
    expected: &KdfParams,
) -> Result<Zeroizing<Vec<u8>>> {
    if payload.salt.len() != SALT_LENGTH || payload.iv.len() != NONCE_LENGTH {
        return Err(VaultError::DecryptionFailed.into());
    }

    let params = match payload.kdf {
        Some(recorded) if !recorded.fits_within(&expected.ceiling()) => {
            tracing::debug!(?recorded, "bundle cost parameters exceed the accepted ceiling");
            return Err(VaultError::DecryptionFailed.into());
        }
        Some(recorded) => recorded,
        None => *expected,
    };
    let key = derive_key(passphrase, &payload.salt, &params)
        .map_err(|_| VaultError::DecryptionFailed)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|_| VaultError::DecryptionFailed)?;

    let nonce = Nonce::from_slice(&payload.iv);
    cipher
        .decrypt(nonce, payload.ciphertext.as_slice())
        .map(Zeroizing::new)
        .map_err(|_| VaultError::DecryptionFailed.into())
}

/// Serialize `plaintext` as JSON and encrypt it.
pub fn encrypt<T: Serialize + ?Sized>(
    plaintext: &T,
    passphrase: &str,
    params: &KdfParams,
) -> Result<EncryptedPayload> {
    let json = Zeroizing::new(serde_json::to_vec(plaintext).map_err(|e| {
        VaultError::EncryptionFailed {
            reason: format!("Failed to serialize plaintext: {e}"),
        }
    })?);
    encrypt_bytes(&json, passphrase, params)
}

/// Decrypt a bundle and parse the JSON plaintext.
///
/// A plaintext that decrypts but does not parse is reported as a
/// decryption failure.
pub fn decrypt<T: DeserializeOwned>(
    payload: &EncryptedPayload,
    passphrase: &str,
    expected: &KdfParams,
) -> Result<T> {
    let bytes = decrypt_bytes(payload, passphrase, expected)?;
    serde_json::from_slice(&bytes).map_err(|_| VaultError::DecryptionFailed.into())
}
