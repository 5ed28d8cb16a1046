// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! PKCS#10 certification requests.
//!
//! https://datatracker.ietf.org/doc/html/rfc2986
//!
//! A request binds a subject name to a freshly generated public key, and is
//! signed by the matching private key as proof of possession:
//!
//! ```text
//! CertificationRequest ::= SEQUENCE {
//!     certificationRequestInfo  CertificationRequestInfo,
//!     signatureAlgorithm        AlgorithmIdentifier,
//!     signature                 BIT STRING }
//!
//! CertificationRequestInfo ::= SEQUENCE {
//!     version       INTEGER { v1(0) },
//!     subject       Name,
//!     subjectPKInfo SubjectPublicKeyInfo,
//!     attributes    [0] IMPLICIT SET OF Attribute }
//! ```
//!
//! Requests are produced by [`CertRequestBuilder`] and can be read back and
//! checked with [`parse_der`] and [`CertificationRequest::verify`].

mod algorithm;
mod builder;
mod error;
mod name;
mod parse;
mod policy;

pub use algorithm::{Curve, DSA_SIZES, KeyAlgorithm};
pub use builder::{CertRequestBuilder, build};
pub use error::{Error, Result};
pub use name::{AttributeType, NameAttribute, SubjectName};
pub use parse::{CertificationRequest, parse_der, parse_pem};
pub use policy::{RSA_CEILING_BITS, RSA_FLOOR_BITS, RequestPolicy};

/// PEM label for certification requests.
pub const PEM_LABEL: &str = "CERTIFICATE REQUEST";

/// Legacy PEM label still emitted by some tools.
pub const PEM_LABEL_LEGACY: &str = "NEW CERTIFICATE REQUEST";

/// Wraps a DER request into a PEM block.
pub fn to_pem(der: &[u8]) -> String {
    crate::pem::encode(PEM_LABEL, der)
}

/// Unwraps a PEM request block into DER, accepting either request label.
pub fn from_pem(text: &str) -> Result<Vec<u8>> {
    let (label, der) = crate::pem::decode(text.as_bytes())?;
    if label != PEM_LABEL && label != PEM_LABEL_LEGACY {
        return Err(Error::InvalidPemLabel);
    }
    Ok(der)
}
