// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{Curve, Error, KeyAlgorithm, Result, SubjectName};
use const_oid::ObjectIdentifier;
use der::{Decode, Encode, Header, Reader, SliceReader};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::{DigestVerifier, Verifier};
use sha2::{Digest, Sha256};
use x509_cert::request::CertReq;

/// A decoded PKCS#10 certification request.
#[derive(Clone, Debug)]
pub struct CertificationRequest {
    inner: CertReq,
    subject: SubjectName,
    key_algorithm: KeyAlgorithm,
    public_key_der: Vec<u8>,
    info_der: Vec<u8>,
}

/// Parses a DER-encoded certification request. Trailing data, unknown key
/// algorithms and subjects with unrecognized attributes are rejected.
pub fn parse_der(der: &[u8]) -> Result<CertificationRequest> {
    let inner = CertReq::from_der(der).map_err(Error::parse)?;
    let info_der = signed_info_bytes(der).map_err(Error::parse)?.to_vec();

    let subject = SubjectName::from_x509_name(&inner.info.subject)?;
    if subject.is_empty() {
        return Err(Error::parse("request subject is empty"));
    }
    let public_key_der = inner.info.public_key.to_der()?;
    let key_algorithm = KeyAlgorithm::from_public_key(&inner.info.public_key)?;

    Ok(CertificationRequest {
        inner,
        subject,
        key_algorithm,
        public_key_der,
        info_der,
    })
}

/// Parses a PEM-wrapped certification request.
pub fn parse_pem(text: &str) -> Result<CertificationRequest> {
    parse_der(&super::from_pem(text)?)
}

impl CertificationRequest {
    /// Returns the requested subject.
    pub fn subject(&self) -> &SubjectName {
        &self.subject
    }

    /// Returns the DER-encoded SubjectPublicKeyInfo.
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }

    /// Returns the algorithm (and size or curve) of the embedded key.
    pub fn key_algorithm(&self) -> KeyAlgorithm {
        self.key_algorithm
    }

    /// Returns the OID of the signatureAlgorithm field.
    pub fn signature_algorithm(&self) -> ObjectIdentifier {
        self.inner.algorithm.oid
    }

    /// Returns the raw signature bytes.
    pub fn signature(&self) -> &[u8] {
        self.inner.signature.raw_bytes()
    }

    /// Returns the exact CertificationRequestInfo bytes that were signed.
    pub fn info_der(&self) -> &[u8] {
        &self.info_der
    }

    /// Returns the underlying x509-cert structure.
    pub fn as_x509(&self) -> &CertReq {
        &self.inner
    }

    /// Checks the proof-of-possession signature against the embedded key.
    pub fn verify(&self) -> Result<()> {
        let expected = self.key_algorithm.signature_oid();
        if self.inner.algorithm.oid != expected {
            return Err(Error::Verify {
                details: format!(
                    "signature algorithm {} does not match {} key",
                    self.inner.algorithm.oid, self.key_algorithm
                ),
            });
        }
        let signature = self.inner.signature.as_bytes().ok_or_else(|| Error::Verify {
            details: "signature has unused bits".to_string(),
        })?;
        let info = self.info_der.as_slice();
        let key = self.public_key_der.as_slice();

        match self.key_algorithm {
            KeyAlgorithm::Rsa { .. } => {
                let public = rsa::RsaPublicKey::from_public_key_der(key).map_err(verify_error)?;
                let verifier = rsa::pkcs1v15::VerifyingKey::<Sha256>::new(public);
                let sig = rsa::pkcs1v15::Signature::try_from(signature).map_err(verify_error)?;
                verifier.verify(info, &sig).map_err(verify_error)
            }
            KeyAlgorithm::Ecdsa(Curve::P256) => {
                let verifier =
                    p256::ecdsa::VerifyingKey::from_public_key_der(key).map_err(verify_error)?;
                let sig = p256::ecdsa::Signature::from_der(signature).map_err(verify_error)?;
                verifier.verify(info, &sig).map_err(verify_error)
            }
            KeyAlgorithm::Ecdsa(Curve::P384) => {
                let verifier =
                    p384::ecdsa::VerifyingKey::from_public_key_der(key).map_err(verify_error)?;
                let sig = p384::ecdsa::Signature::from_der(signature).map_err(verify_error)?;
                verifier.verify(info, &sig).map_err(verify_error)
            }
            KeyAlgorithm::Dsa { .. } => {
                let verifier = dsa::VerifyingKey::from_public_key_der(key).map_err(verify_error)?;
                let sig = dsa::Signature::try_from(signature).map_err(verify_error)?;
                verifier
                    .verify_digest(Sha256::new_with_prefix(info), &sig)
                    .map_err(verify_error)
            }
        }
    }
}

fn verify_error(err: impl ToString) -> Error {
    Error::Verify {
        details: err.to_string(),
    }
}

/// Returns the first element of the outer SEQUENCE, which is the
/// CertificationRequestInfo exactly as encoded.
pub(super) fn signed_info_bytes(der: &[u8]) -> der::Result<&[u8]> {
    let mut reader = SliceReader::new(der)?;
    Header::decode(&mut reader)?;
    reader.tlv_bytes()
}
