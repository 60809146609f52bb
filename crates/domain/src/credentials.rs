//! User credential material
//!
//! A credential binds a user identifier to the TLS identity used to reach
//! the backend on that user's behalf.

use std::fmt;

/// Private key and certificate bundle for a mutually-authenticated client.
#[derive(Clone, PartialEq, Eq)]
pub enum KeyStore {
    /// DER-encoded PKCS#12 archive, unlocked with the registration password.
    Pkcs12(Vec<u8>),
    /// PEM bundle with the certificate chain and an unencrypted private key.
    Pem(Vec<u8>),
}

impl KeyStore {
    /// Short format name for logs.
    pub const fn format(&self) -> &'static str {
        match self {
            Self::Pkcs12(_) => "pkcs12",
            Self::Pem(_) => "pem",
        }
    }

    /// Raw keystore bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Pkcs12(bytes) | Self::Pem(bytes) => bytes,
        }
    }
}

// Key material never reaches logs
impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyStore::{}({} bytes)", self.format(), self.as_bytes().len())
    }
}

/// Credential registration for one user.
#[derive(Clone)]
pub struct UserCredential {
    pub user_id: String,
    pub key_store: KeyStore,
    pub key_store_password: String,
}

impl UserCredential {
    pub fn new(
        user_id: impl Into<String>,
        key_store: KeyStore,
        key_store_password: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            key_store,
            key_store_password: key_store_password.into(),
        }
    }
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredential")
            .field("user_id", &self.user_id)
            .field("key_store", &self.key_store)
            .field("key_store_password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let credential =
            UserCredential::new("jira", KeyStore::Pkcs12(vec![1, 2, 3]), "changeit");
        let rendered = format!("{credential:?}");

        assert!(rendered.contains("jira"));
        assert!(rendered.contains("pkcs12(3 bytes)"));
        assert!(!rendered.contains("changeit"));
    }
}
