//! Vault integration tests
//!
//! Encryption round trips through the public crypto functions and the
//! Unset / Locked / Unlocked lifecycle.

mod crypto;
