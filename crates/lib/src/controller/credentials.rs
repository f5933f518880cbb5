//! The credential list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One named API token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Identifier, unique within the list
    pub id: String,
    /// Display name, never empty
    pub name: String,
    /// API token, possibly empty
    #[serde(default)]
    pub token: String,
    /// Whether this is the active credential
    #[serde(default)]
    pub active: bool,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("active", &self.active)
            .finish()
    }
}

/// Ordered credentials with at most one active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CredentialList {
    items: Vec<Credential>,
}

impl CredentialList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from stored credentials.
    ///
    /// If the input marks more than one credential active, only the first
    /// keeps the flag.
    pub fn from_vec(mut items: Vec<Credential>) -> Self {
        let mut seen_active = false;
        for credential in &mut items {
            if credential.active {
                if seen_active {
                    tracing::warn!(id = %credential.id, "clearing duplicate active flag");
                    credential.active = false;
                }
                seen_active = true;
            }
        }
        Self { items }
    }

    /// Append `credential`.
    ///
    /// The first credential in an empty list becomes active; later ones are
    /// added inactive.
    pub fn push(&mut self, mut credential: Credential) -> &Credential {
        credential.active = self.items.is_empty();
        self.items.push(credential);
        &self.items[self.items.len() - 1]
    }

    /// Make `id` the only active credential.
    ///
    /// Returns the newly active credential, or `None` (with nothing changed)
    /// if no credential has that id.
    pub fn activate(&mut self, id: &str) -> Option<&Credential> {
        let index = self.items.iter().position(|c| c.id == id)?;
        for (i, credential) in self.items.iter_mut().enumerate() {
            credential.active = i == index;
        }
        Some(&self.items[index])
    }

    /// Remove `id`. No replacement becomes active.
    pub fn remove(&mut self, id: &str) -> Option<Credential> {
        let index = self.items.iter().position(|c| c.id == id)?;
        Some(self.items.remove(index))
    }

    /// The active credential, if any.
    pub fn active(&self) -> Option<&Credential> {
        self.items.iter().find(|c| c.active)
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut Credential> {
        self.items.iter_mut().find(|c| c.active)
    }

    /// Look up a credential by id.
    pub fn get(&self, id: &str) -> Option<&Credential> {
        self.items.iter().find(|c| c.id == id)
    }

    /// Whether `id` is in the list.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Credentials in insertion order.
    pub fn as_slice(&self) -> &[Credential] {
        &self.items
    }

    /// Number of credentials.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'de> Deserialize<'de> for CredentialList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<Credential>::deserialize(deserializer).map(Self::from_vec)
    }
}

/// Lowercase base-36 rendering of `n`.
pub(crate) fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
