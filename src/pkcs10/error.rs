// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::provider::{KeyGenError, SignError};
use thiserror::Error;

/// Result type used by pkcs10 APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type used by pkcs10 APIs.
///
/// Input errors (`InvalidSubject`, `UnsupportedAlgorithm`) mean the caller
/// should fix the request, environment errors (`KeyGen`, `Sign`) mean the
/// token or key provider failed.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid subject name: {details}")]
    InvalidSubject { details: String },
    #[error("unsupported key algorithm: {details}")]
    UnsupportedAlgorithm { details: String },
    #[error(transparent)]
    KeyGen(#[from] KeyGenError),
    #[error(transparent)]
    Sign(#[from] SignError),
    #[error("DER encoding error: {0}")]
    Encoding(#[from] der::Error),
    #[error("encoded request info does not match the signed bytes")]
    EncodingMismatch,
    #[error("certification request parse error: {details}")]
    Parse { details: String },
    #[error("certification request signature verification failed: {details}")]
    Verify { details: String },
    #[error("PEM block is not a CERTIFICATE REQUEST")]
    InvalidPemLabel,
    #[error(transparent)]
    Pem(#[from] crate::pem::Error),
    #[error("invalid request policy: {details}")]
    Config { details: String },
}

impl Error {
    /// Returns whether the caller supplied a bad subject or algorithm.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidSubject { .. } | Error::UnsupportedAlgorithm { .. }
        )
    }

    /// Returns whether key generation or signing failed in the provider.
    pub fn is_environment_error(&self) -> bool {
        matches!(self, Error::KeyGen(_) | Error::Sign(_))
    }

    pub(super) fn invalid_subject(details: impl Into<String>) -> Self {
        Error::InvalidSubject {
            details: details.into(),
        }
    }

    pub(super) fn unsupported(details: impl Into<String>) -> Self {
        Error::UnsupportedAlgorithm {
            details: details.into(),
        }
    }

    pub(super) fn parse(details: impl ToString) -> Self {
        Error::Parse {
            details: details.to_string(),
        }
    }
}
