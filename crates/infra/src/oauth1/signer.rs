//! RSA-SHA1 signers for OAuth1 requests
//!
//! Parsing an RSA key is expensive, so signers are cached per key
//! fingerprint and shared by every provider using the same key.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bridgekit_domain::OAuth1Error;
use dashmap::DashMap;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};
use tracing::debug;

/// Signs OAuth1 base strings with one RSA private key.
pub struct RsaSigner {
    signing_key: SigningKey<Sha1>,
    public_key: RsaPublicKey,
}

impl RsaSigner {
    /// Parse `material`: PEM (PKCS#8 or PKCS#1) or base64 DER.
    pub fn from_key_material(material: &str) -> Result<Self, OAuth1Error> {
        let private_key = parse_private_key(material)?;
        let public_key = private_key.to_public_key();
        Ok(Self { signing_key: SigningKey::<Sha1>::new(private_key), public_key })
    }

    /// Base64 RSA-SHA1 signature of `base_string`.
    pub fn sign(&self, base_string: &str) -> Result<String, OAuth1Error> {
        let signature = self
            .signing_key
            .try_sign(base_string.as_bytes())
            .map_err(|e| OAuth1Error::failure(format!("Failed to sign request: {e}")))?;
        Ok(STANDARD.encode(signature.to_bytes()))
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }
}

impl std::fmt::Debug for RsaSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaSigner").finish_non_exhaustive()
    }
}

fn parse_private_key(material: &str) -> Result<RsaPrivateKey, OAuth1Error> {
    let trimmed = material.trim();
    if trimmed.is_empty() {
        return Err(OAuth1Error::failure("RSA private key is empty"));
    }

    if trimmed.starts_with("-----BEGIN") {
        return RsaPrivateKey::from_pkcs8_pem(trimmed)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(trimmed))
            .map_err(|e| OAuth1Error::failure(format!("Invalid PEM private key: {e}")));
    }

    // Keys pasted from properties files may carry escaped padding.
    let cleaned: String =
        trimmed.chars().filter(|c| !c.is_whitespace() && *c != '\\').collect();
    let der = STANDARD
        .decode(cleaned)
        .map_err(|e| OAuth1Error::failure(format!("Private key is not valid base64: {e}")))?;

    RsaPrivateKey::from_pkcs8_der(&der)
        .or_else(|_| RsaPrivateKey::from_pkcs1_der(&der))
        .map_err(|e| OAuth1Error::failure(format!("Invalid DER private key: {e}")))
}

/// Process-wide cache of [`RsaSigner`]s keyed by key fingerprint.
#[derive(Debug, Default)]
pub struct OAuthRsaSignerFactory {
    signers: DashMap<String, Arc<RsaSigner>>,
}

impl OAuthRsaSignerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signer for `private_key`, parsed on first use.
    pub fn signer(&self, private_key: &str) -> Result<Arc<RsaSigner>, OAuth1Error> {
        let fingerprint = format!("{:x}", Sha1::digest(private_key.trim().as_bytes()));
        if let Some(signer) = self.signers.get(&fingerprint) {
            return Ok(Arc::clone(signer.value()));
        }

        let signer = Arc::new(RsaSigner::from_key_material(private_key)?);
        debug!(fingerprint = %&fingerprint[..8], "cached new OAuth1 signer");
        Ok(Arc::clone(self.signers.entry(fingerprint).or_insert(signer).value()))
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}
