// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Password-protected in-memory token.
//!
//! The token follows the usual hardware token lifecycle: a password is set
//! once, a session logs in with it, and key pairs generated during the
//! session can only sign while the session stays logged in. Nothing is
//! persisted; dropping the token drops its keys.

use crate::pkcs10::KeyAlgorithm;
use crate::provider::{KeyGenError, KeyProvider, SignError, Signer, SoftwareKey};
use argon2::{Algorithm, Argon2, Params, Version};
use log::{debug, info, warn};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroizing;

/// Size of the random salt mixed into the password hash.
const SALT_SIZE: usize = 16;

/// Argon2id passes over memory.
const ARGON2_TIME: u32 = 2;
/// Argon2id memory cost in KiB.
const ARGON2_MEMORY: u32 = 19 * 1024;
/// Argon2id lanes.
const ARGON2_THREADS: u32 = 1;

/// Error type for token session management.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token password is already initialized")]
    AlreadyInitialized,
    #[error("token password is not initialized")]
    NotInitialized,
    #[error("incorrect token password")]
    IncorrectPassword,
    #[error("token password must not be empty")]
    EmptyPassword,
    #[error("failed to gather randomness: {details}")]
    Random { details: String },
    #[error("failed to hash token password: {details}")]
    Kdf { details: String },
}

/// Password is a token secret, wiped from memory on drop.
pub struct Password(Zeroizing<Vec<u8>>);

impl Password {
    /// Wraps a secret, taking ownership of its bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Password {
    fn from(secret: &str) -> Self {
        Self::new(secret.as_bytes())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}

/// Salted Argon2id hash of the token password.
struct PasswordRecord {
    salt: [u8; SALT_SIZE],
    hash: [u8; 32],
}

impl PasswordRecord {
    fn digest(salt: &[u8; SALT_SIZE], password: &Password) -> Result<[u8; 32], TokenError> {
        let kdf_error = |e: argon2::Error| TokenError::Kdf {
            details: e.to_string(),
        };
        let params = Params::new(ARGON2_MEMORY, ARGON2_TIME, ARGON2_THREADS, Some(32))
            .map_err(kdf_error)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut output = [0u8; 32];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut output)
            .map_err(kdf_error)?;
        Ok(output)
    }
}

struct Session {
    label: String,
    logged_in: AtomicBool,
    record: Mutex<Option<PasswordRecord>>,
}

/// SoftwareToken is an in-memory, login-gated key provider. Clones share
/// the same session.
#[derive(Clone)]
pub struct SoftwareToken {
    session: Arc<Session>,
}

impl SoftwareToken {
    /// Creates an uninitialized token.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            session: Arc::new(Session {
                label: label.into(),
                logged_in: AtomicBool::new(false),
                record: Mutex::new(None),
            }),
        }
    }

    /// Returns the token label used in log lines.
    pub fn label(&self) -> &str {
        &self.session.label
    }

    /// Sets the token password. Only allowed once.
    pub fn init_password(&self, password: &Password) -> Result<(), TokenError> {
        if password.as_bytes().is_empty() {
            return Err(TokenError::EmptyPassword);
        }
        let mut record = self
            .session
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if record.is_some() {
            return Err(TokenError::AlreadyInitialized);
        }
        let mut salt = [0u8; SALT_SIZE];
        getrandom::fill(&mut salt).map_err(|e| TokenError::Random {
            details: e.to_string(),
        })?;

        let hash = PasswordRecord::digest(&salt, password)?;
        *record = Some(PasswordRecord { salt, hash });

        info!("token {}: password initialized", self.session.label);
        Ok(())
    }

    /// Opens a session if the password matches.
    pub fn login(&self, password: &Password) -> Result<(), TokenError> {
        let record = self
            .session
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let record = record.as_ref().ok_or(TokenError::NotInitialized)?;

        let hash = PasswordRecord::digest(&record.salt, password)?;
        if !bool::from(hash[..].ct_eq(&record.hash[..])) {
            warn!("token {}: login rejected", self.session.label);
            return Err(TokenError::IncorrectPassword);
        }
        self.session.logged_in.store(true, Ordering::SeqCst);

        info!("token {}: logged in", self.session.label);
        Ok(())
    }

    /// Closes the session. Key pairs stop signing until the next login.
    pub fn logout(&self) {
        if self.session.logged_in.swap(false, Ordering::SeqCst) {
            info!("token {}: logged out", self.session.label);
        }
    }

    /// Reports whether a session is open.
    pub fn is_logged_in(&self) -> bool {
        self.session.logged_in.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for SoftwareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftwareToken")
            .field("label", &self.session.label)
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}

/// TokenKeyPair is a key pair living on a [`SoftwareToken`].
pub struct TokenKeyPair {
    key: SoftwareKey,
    session: Arc<Session>,
}

impl TokenKeyPair {
    /// Returns the algorithm and size (or curve) of the key pair.
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.key.algorithm()
    }
}

impl Signer for TokenKeyPair {
    fn public_key_der(&self) -> Vec<u8> {
        self.key.public_key_der()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignError> {
        if !self.session.logged_in.load(Ordering::SeqCst) {
            return Err(SignError::NotLoggedIn);
        }
        debug!("token {}: signing {} bytes", self.session.label, data.len());
        self.key.sign(data)
    }
}

impl KeyProvider for SoftwareToken {
    type KeyPair = TokenKeyPair;

    fn generate_key_pair(&self, algorithm: &KeyAlgorithm) -> Result<TokenKeyPair, KeyGenError> {
        if !self.is_logged_in() {
            return Err(KeyGenError::new(format!(
                "token {} is not logged in",
                self.session.label
            )));
        }
        let key = SoftwareKey::generate(algorithm)?;
        info!("token {}: generated {algorithm} key pair", self.session.label);

        Ok(TokenKeyPair {
            key,
            session: self.session.clone(),
        })
    }
}
