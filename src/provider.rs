// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Key provider and signer interfaces, plus an in-memory implementation.
//!
//! A provider hands out key pairs; the request builder only ever talks to the
//! returned [`Signer`] and never sees private key material.

use crate::pem;
use crate::pkcs10::{Curve, KeyAlgorithm};
use log::debug;
use rsa::pkcs8::DecodePrivateKey;
use rsa::rand_core::OsRng;
use rsa::signature::{DigestSigner, SignatureEncoding, Signer as _};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};
use spki::EncodePublicKey;
use thiserror::Error;

/// Key generation failure reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key generation failed: {details}")]
pub struct KeyGenError {
    pub details: String,
}

impl KeyGenError {
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

/// Signing failure reported by a key pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    #[error("signing failed: token session is not logged in")]
    NotLoggedIn,
    #[error("signing failed: {details}")]
    Failed { details: String },
}

impl SignError {
    pub fn failed(details: impl ToString) -> Self {
        SignError::Failed {
            details: details.to_string(),
        }
    }
}

/// A key pair able to prove possession of its private half.
pub trait Signer {
    /// Returns the DER-encoded SubjectPublicKeyInfo of the key pair.
    fn public_key_der(&self) -> Vec<u8>;

    /// Signs `data` with the canonical scheme of the key's algorithm. DSA and
    /// ECDSA signatures are returned as DER `Dss-Sig-Value`s.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignError>;
}

/// Source of fresh key pairs, typically a token.
pub trait KeyProvider {
    type KeyPair: Signer;

    fn generate_key_pair(&self, algorithm: &KeyAlgorithm) -> Result<Self::KeyPair, KeyGenError>;
}

enum SigningKey {
    Rsa(rsa::pkcs1v15::SigningKey<Sha256>),
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    Dsa(dsa::SigningKey),
}

/// SoftwareKey is an in-memory key pair usable as a request signer. RSA keys
/// sign with PKCS#1 v1.5 over SHA-256, DSA keys with RFC 6979 nonces over
/// SHA-256, and ECDSA keys with RFC 6979 nonces over SHA-256 (P-256) or
/// SHA-384 (P-384).
pub struct SoftwareKey {
    key: SigningKey,
    public_key_der: Vec<u8>,
}

impl SoftwareKey {
    /// generate creates a new random key pair for the given algorithm.
    pub fn generate(algorithm: &KeyAlgorithm) -> Result<Self, KeyGenError> {
        let mut rng = OsRng;

        let key = match algorithm {
            KeyAlgorithm::Rsa { bits } => {
                let key = RsaPrivateKey::new(&mut rng, *bits as usize)
                    .map_err(|e| KeyGenError::new(e.to_string()))?;
                Self::from_rsa(key)?
            }
            KeyAlgorithm::Ecdsa(Curve::P256) => {
                Self::from_p256(p256::ecdsa::SigningKey::random(&mut rng))?
            }
            KeyAlgorithm::Ecdsa(Curve::P384) => {
                Self::from_p384(p384::ecdsa::SigningKey::random(&mut rng))?
            }
            KeyAlgorithm::Dsa { bits } => {
                let size = match *bits {
                    // Legacy strength, kept reachable for lowered policies
                    #[allow(deprecated)]
                    1024 => dsa::KeySize::DSA_1024_160,
                    2048 => dsa::KeySize::DSA_2048_256,
                    3072 => dsa::KeySize::DSA_3072_256,
                    _ => {
                        return Err(KeyGenError::new(format!(
                            "no DSA domain size for {bits} bits"
                        )));
                    }
                };
                let components = dsa::Components::generate(&mut rng, size);
                Self::from_dsa(dsa::SigningKey::generate(&mut rng, components))?
            }
        };
        debug!("generated {algorithm} software key");
        Ok(key)
    }

    /// from_rsa wraps an existing RSA private key.
    pub fn from_rsa(key: RsaPrivateKey) -> Result<Self, KeyGenError> {
        let key = rsa::pkcs1v15::SigningKey::<Sha256>::new(key);
        let spki = key
            .as_ref()
            .to_public_key()
            .to_public_key_der()
            .map_err(|e| KeyGenError::new(e.to_string()))?;
        Ok(Self {
            key: SigningKey::Rsa(key),
            public_key_der: spki.into_vec(),
        })
    }

    /// from_p256 wraps an existing P-256 signing key.
    pub fn from_p256(key: p256::ecdsa::SigningKey) -> Result<Self, KeyGenError> {
        let spki = key
            .verifying_key()
            .to_public_key_der()
            .map_err(|e| KeyGenError::new(e.to_string()))?;
        Ok(Self {
            key: SigningKey::P256(key),
            public_key_der: spki.into_vec(),
        })
    }

    /// from_p384 wraps an existing P-384 signing key.
    pub fn from_p384(key: p384::ecdsa::SigningKey) -> Result<Self, KeyGenError> {
        let spki = key
            .verifying_key()
            .to_public_key_der()
            .map_err(|e| KeyGenError::new(e.to_string()))?;
        Ok(Self {
            key: SigningKey::P384(key),
            public_key_der: spki.into_vec(),
        })
    }

    /// from_dsa wraps an existing DSA signing key.
    pub fn from_dsa(key: dsa::SigningKey) -> Result<Self, KeyGenError> {
        let spki = key
            .verifying_key()
            .to_public_key_der()
            .map_err(|e| KeyGenError::new(e.to_string()))?;
        Ok(Self {
            key: SigningKey::Dsa(key),
            public_key_der: spki.into_vec(),
        })
    }

    /// from_pkcs8_pem loads an RSA, DSA, P-256 or P-384 key from a PKCS#8
    /// `PRIVATE KEY` PEM block.
    pub fn from_pkcs8_pem(pem_str: &str) -> Result<Self, KeyGenError> {
        let (kind, der) = pem::decode(pem_str.as_bytes())
            .map_err(|e| KeyGenError::new(e.to_string()))?;
        if kind != "PRIVATE KEY" {
            return Err(KeyGenError::new(format!("invalid PEM tag {kind}")));
        }
        if let Ok(key) = RsaPrivateKey::from_pkcs8_der(&der) {
            return Self::from_rsa(key);
        }
        if let Ok(key) = p256::ecdsa::SigningKey::from_pkcs8_der(&der) {
            return Self::from_p256(key);
        }
        if let Ok(key) = p384::ecdsa::SigningKey::from_pkcs8_der(&der) {
            return Self::from_p384(key);
        }
        if let Ok(key) = dsa::SigningKey::from_pkcs8_der(&der) {
            return Self::from_dsa(key);
        }
        Err(KeyGenError::new("unsupported PKCS#8 private key"))
    }

    /// algorithm returns the key algorithm of this key pair.
    pub fn algorithm(&self) -> KeyAlgorithm {
        match &self.key {
            SigningKey::Rsa(key) => {
                use rsa::traits::PublicKeyParts;
                KeyAlgorithm::Rsa {
                    bits: key.as_ref().n().bits() as u32,
                }
            }
            SigningKey::P256(_) => KeyAlgorithm::Ecdsa(Curve::P256),
            SigningKey::P384(_) => KeyAlgorithm::Ecdsa(Curve::P384),
            SigningKey::Dsa(key) => KeyAlgorithm::Dsa {
                bits: key.verifying_key().components().p().bits() as u32,
            },
        }
    }
}

impl Signer for SoftwareKey {
    fn public_key_der(&self) -> Vec<u8> {
        self.public_key_der.clone()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignError> {
        match &self.key {
            SigningKey::Rsa(key) => {
                let sig = key.try_sign(data).map_err(SignError::failed)?;
                Ok(sig.to_vec())
            }
            SigningKey::P256(key) => {
                let sig: p256::ecdsa::Signature = key.try_sign(data).map_err(SignError::failed)?;
                Ok(sig.to_der().as_bytes().to_vec())
            }
            SigningKey::P384(key) => {
                let sig: p384::ecdsa::Signature = key.try_sign(data).map_err(SignError::failed)?;
                Ok(sig.to_der().as_bytes().to_vec())
            }
            SigningKey::Dsa(key) => {
                let sig: dsa::Signature = key
                    .try_sign_digest(Sha256::new_with_prefix(data))
                    .map_err(SignError::failed)?;
                Ok(sig.to_vec())
            }
        }
    }
}

/// SoftwareKeyProvider generates unprotected in-memory key pairs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareKeyProvider;

impl KeyProvider for SoftwareKeyProvider {
    type KeyPair = SoftwareKey;

    fn generate_key_pair(&self, algorithm: &KeyAlgorithm) -> Result<SoftwareKey, KeyGenError> {
        SoftwareKey::generate(algorithm)
    }
}
