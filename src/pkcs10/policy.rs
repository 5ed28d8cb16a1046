// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::algorithm::DSA_SIZES;
use super::{Curve, Error, KeyAlgorithm, Result, SubjectName};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest RSA modulus any policy may allow.
pub const RSA_FLOOR_BITS: u32 = 512;

/// Largest RSA modulus any policy may allow. Bigger keys cannot be loaded
/// back for verification.
pub const RSA_CEILING_BITS: u32 = 4096;

/// Limits applied to every request before the key provider is contacted.
///
/// Loadable from TOML; missing fields take their defaults:
///
/// ```toml
/// min_rsa_bits = 3072
/// curves = ["p384"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestPolicy {
    /// Minimum accepted RSA modulus size, never below [`RSA_FLOOR_BITS`].
    pub min_rsa_bits: u32,
    /// Maximum accepted RSA modulus size, never above [`RSA_CEILING_BITS`].
    pub max_rsa_bits: u32,
    /// Minimum accepted DSA modulus size.
    pub min_dsa_bits: u32,
    /// Curves allowed for ECDSA keys.
    pub curves: Vec<Curve>,
    /// Maximum number of attributes in a subject.
    pub max_subject_attributes: usize,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            min_rsa_bits: 2048,
            max_rsa_bits: RSA_CEILING_BITS,
            min_dsa_bits: 2048,
            curves: vec![Curve::P256, Curve::P384],
            max_subject_attributes: 16,
        }
    }
}

impl RequestPolicy {
    /// Parses and validates a policy from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let policy: Self = toml::from_str(text).map_err(|e| Error::Config {
            details: e.to_string(),
        })?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reads and validates a policy from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            details: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml(&text)
    }

    /// Checks the policy itself for consistency.
    pub fn validate(&self) -> Result<()> {
        let fail = |details: String| Err(Error::Config { details });

        if self.min_rsa_bits < RSA_FLOOR_BITS {
            return fail(format!(
                "min_rsa_bits {} is below the {RSA_FLOOR_BITS} bit floor",
                self.min_rsa_bits
            ));
        }
        if self.max_rsa_bits < self.min_rsa_bits {
            return fail(format!(
                "max_rsa_bits {} is below min_rsa_bits {}",
                self.max_rsa_bits, self.min_rsa_bits
            ));
        }
        if self.max_rsa_bits > RSA_CEILING_BITS {
            return fail(format!(
                "max_rsa_bits {} is above the {RSA_CEILING_BITS} bit ceiling",
                self.max_rsa_bits
            ));
        }
        if self.min_dsa_bits > DSA_SIZES[DSA_SIZES.len() - 1] {
            return fail(format!(
                "min_dsa_bits {} excludes every DSA size",
                self.min_dsa_bits
            ));
        }
        if self.max_subject_attributes == 0 {
            return fail("max_subject_attributes must be positive".to_string());
        }
        Ok(())
    }

    /// Rejects algorithms and sizes this policy does not allow.
    pub fn check_algorithm(&self, algorithm: &KeyAlgorithm) -> Result<()> {
        match *algorithm {
            KeyAlgorithm::Rsa { bits: 0 } => {
                Err(Error::unsupported("RSA key size must be positive"))
            }
            KeyAlgorithm::Rsa { bits } => {
                let min = self.min_rsa_bits.max(RSA_FLOOR_BITS);
                if bits < min {
                    return Err(Error::unsupported(format!(
                        "RSA-{bits} is below the {min} bit minimum"
                    )));
                }
                let max = self.max_rsa_bits.min(RSA_CEILING_BITS);
                if bits > max {
                    return Err(Error::unsupported(format!(
                        "RSA-{bits} exceeds the {max} bit maximum"
                    )));
                }
                Ok(())
            }
            KeyAlgorithm::Dsa { bits } => {
                if !DSA_SIZES.contains(&bits) {
                    return Err(Error::unsupported(format!(
                        "DSA-{bits} is not one of {DSA_SIZES:?}"
                    )));
                }
                if bits < self.min_dsa_bits {
                    return Err(Error::unsupported(format!(
                        "DSA-{bits} is below the {} bit minimum",
                        self.min_dsa_bits
                    )));
                }
                Ok(())
            }
            KeyAlgorithm::Ecdsa(curve) => {
                if !self.curves.contains(&curve) {
                    return Err(Error::unsupported(format!(
                        "curve {} is not allowed",
                        curve.name()
                    )));
                }
                Ok(())
            }
        }
    }

    /// Rejects empty, malformed or oversized subjects.
    pub fn check_subject(&self, subject: &SubjectName) -> Result<()> {
        subject.validate()?;
        if subject.len() > self.max_subject_attributes {
            return Err(Error::invalid_subject(format!(
                "subject has {} attributes, at most {} allowed",
                subject.len(),
                self.max_subject_attributes
            )));
        }
        Ok(())
    }
}
