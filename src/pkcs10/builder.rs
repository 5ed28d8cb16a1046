// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::parse::signed_info_bytes;
use super::{Error, KeyAlgorithm, RequestPolicy, Result, SubjectName};
use crate::provider::{KeyGenError, KeyProvider, Signer};
use der::asn1::BitString;
use der::{Decode, Encode};
use spki::SubjectPublicKeyInfoOwned;
use x509_cert::attr::Attributes;
use x509_cert::request::{CertReq, CertReqInfo, Version};

/// Builds DER-encoded PKCS#10 certification requests.
///
/// The builder holds nothing but its policy, so one instance can be shared
/// across threads. Every call validates the subject and algorithm before
/// the provider is contacted, and returns either the complete request or an
/// error, never partial output.
#[derive(Clone, Debug, Default)]
pub struct CertRequestBuilder {
    policy: RequestPolicy,
}

impl CertRequestBuilder {
    /// Creates a builder with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder enforcing a custom policy.
    pub fn with_policy(policy: RequestPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// Returns the policy every request is checked against.
    pub fn policy(&self) -> &RequestPolicy {
        &self.policy
    }

    /// Generates a fresh key pair through `provider` and returns the signed
    /// request for it.
    pub fn build<P: KeyProvider + ?Sized>(
        &self,
        subject: &SubjectName,
        algorithm: &KeyAlgorithm,
        provider: &P,
    ) -> Result<Vec<u8>> {
        self.build_retaining_key(subject, algorithm, provider)
            .map(|(der, _)| der)
    }

    /// Like [`build`](Self::build), but also hands back the generated key
    /// pair for use once the certificate is issued.
    pub fn build_retaining_key<P: KeyProvider + ?Sized>(
        &self,
        subject: &SubjectName,
        algorithm: &KeyAlgorithm,
        provider: &P,
    ) -> Result<(Vec<u8>, P::KeyPair)> {
        self.check(subject, algorithm)?;

        let key = provider.generate_key_pair(algorithm)?;
        let der = encode_request(subject, algorithm, &key)?;
        Ok((der, key))
    }

    /// Builds a request for a key pair the caller already holds.
    pub fn build_with_key<S: Signer + ?Sized>(
        &self,
        subject: &SubjectName,
        algorithm: &KeyAlgorithm,
        signer: &S,
    ) -> Result<Vec<u8>> {
        self.check(subject, algorithm)?;
        encode_request(subject, algorithm, signer)
    }

    fn check(&self, subject: &SubjectName, algorithm: &KeyAlgorithm) -> Result<()> {
        self.policy.check_subject(subject)?;
        self.policy.check_algorithm(algorithm)
    }
}

/// Builds a request under the default policy.
pub fn build<P: KeyProvider + ?Sized>(
    subject: &SubjectName,
    algorithm: &KeyAlgorithm,
    provider: &P,
) -> Result<Vec<u8>> {
    CertRequestBuilder::new().build(subject, algorithm, provider)
}

/// Assembles and signs the request. Inputs are already validated.
fn encode_request<S: Signer + ?Sized>(
    subject: &SubjectName,
    algorithm: &KeyAlgorithm,
    signer: &S,
) -> Result<Vec<u8>> {
    // The key must be exactly the kind and size that was asked for
    let public_key = SubjectPublicKeyInfoOwned::from_der(&signer.public_key_der())
        .map_err(|e| KeyGenError::new(format!("malformed public key: {e}")))?;
    let actual = KeyAlgorithm::from_public_key(&public_key)
        .map_err(|e| KeyGenError::new(format!("unusable public key: {e}")))?;
    if actual != *algorithm {
        return Err(KeyGenError::new(format!(
            "provider returned a {actual} key for a {algorithm} request"
        ))
        .into());
    }
    let info = CertReqInfo {
        version: Version::V1,
        subject: subject.to_x509_name()?,
        public_key,
        attributes: Attributes::new(),
    };
    let info_der = info.to_der()?;

    // Proof of possession over the exact encoded info
    let signature = signer.sign(&info_der)?;

    let request = CertReq {
        info,
        algorithm: algorithm.signature_algorithm(),
        signature: BitString::from_bytes(&signature)?,
    };
    let der = request.to_der()?;

    if signed_info_bytes(&der)? != info_der.as_slice() {
        return Err(Error::EncodingMismatch);
    }
    Ok(der)
}
