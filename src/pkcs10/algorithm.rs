// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{Error, Result};
use const_oid::ObjectIdentifier;
use der::Decode;
use der::asn1::{Any, Uint};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use std::fmt;
use std::str::FromStr;

/// OID for rsaEncryption (1.2.840.113549.1.1.1).
pub const OID_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
/// OID for id-dsa (1.2.840.10040.4.1).
pub const OID_DSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10040.4.1");
/// OID for id-ecPublicKey (1.2.840.10045.2.1).
pub const OID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// OID for sha256WithRSAEncryption (1.2.840.113549.1.1.11).
pub const OID_SHA256_WITH_RSA: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
/// OID for id-dsa-with-sha256 (2.16.840.1.101.3.4.3.2).
pub const OID_DSA_WITH_SHA256: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.3.2");
/// OID for ecdsa-with-SHA256 (1.2.840.10045.4.3.2).
pub const OID_ECDSA_WITH_SHA256: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
/// OID for ecdsa-with-SHA384 (1.2.840.10045.4.3.3).
pub const OID_ECDSA_WITH_SHA384: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");

/// DSA modulus sizes accepted in requests (FIPS 186-4).
pub const DSA_SIZES: [u32; 3] = [1024, 2048, 3072];

/// Named elliptic curves usable for ECDSA keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Curve {
    P256,
    P384,
}

impl Curve {
    /// Returns the named curve OID carried in the SPKI parameters.
    pub fn oid(self) -> ObjectIdentifier {
        match self {
            Curve::P256 => ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7"),
            Curve::P384 => ObjectIdentifier::new_unwrap("1.3.132.0.34"),
        }
    }

    /// Looks up a curve by its named curve OID.
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        [Curve::P256, Curve::P384]
            .into_iter()
            .find(|curve| curve.oid() == *oid)
    }

    /// Returns the NIST name of the curve.
    pub fn name(self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Curve::P256 => f.write_str("p256"),
            Curve::P384 => f.write_str("p384"),
        }
    }
}

impl FromStr for Curve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "p256" | "p-256" | "secp256r1" | "prime256v1" => Ok(Curve::P256),
            "p384" | "p-384" | "secp384r1" => Ok(Curve::P384),
            _ => Err(Error::unsupported(format!("unknown curve '{s}'"))),
        }
    }
}

impl Serialize for Curve {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Curve {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Key algorithm and size requested for a certification request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// RSA with the given modulus size in bits.
    Rsa { bits: u32 },
    /// DSA with the given prime modulus size in bits.
    Dsa { bits: u32 },
    /// ECDSA over a named curve.
    Ecdsa(Curve),
}

impl KeyAlgorithm {
    /// Returns the SPKI algorithm OID of keys of this algorithm.
    pub fn key_oid(&self) -> ObjectIdentifier {
        match self {
            KeyAlgorithm::Rsa { .. } => OID_RSA_ENCRYPTION,
            KeyAlgorithm::Dsa { .. } => OID_DSA,
            KeyAlgorithm::Ecdsa(_) => OID_EC_PUBLIC_KEY,
        }
    }

    /// Returns the OID of the canonical signature scheme.
    pub fn signature_oid(&self) -> ObjectIdentifier {
        match self {
            KeyAlgorithm::Rsa { .. } => OID_SHA256_WITH_RSA,
            KeyAlgorithm::Dsa { .. } => OID_DSA_WITH_SHA256,
            KeyAlgorithm::Ecdsa(Curve::P256) => OID_ECDSA_WITH_SHA256,
            KeyAlgorithm::Ecdsa(Curve::P384) => OID_ECDSA_WITH_SHA384,
        }
    }

    /// Returns the signatureAlgorithm identifier placed in the request. RSA
    /// carries explicit NULL parameters, DSA and ECDSA omit them (RFC 5758).
    pub fn signature_algorithm(&self) -> AlgorithmIdentifierOwned {
        let parameters = match self {
            KeyAlgorithm::Rsa { .. } => Some(Any::null()),
            _ => None,
        };
        AlgorithmIdentifierOwned {
            oid: self.signature_oid(),
            parameters,
        }
    }

    /// Derives the algorithm and size (or curve) of a public key. RSA sizes
    /// come from the modulus, DSA sizes from the prime `p` of the domain
    /// parameters.
    pub fn from_public_key(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let oid = spki.algorithm.oid;
        let params = spki.algorithm.parameters.as_ref();

        if oid == OID_RSA_ENCRYPTION {
            let key = spki
                .subject_public_key
                .as_bytes()
                .ok_or_else(|| Error::parse("RSA key has unused bits"))?;
            let key = rsa::pkcs1::RsaPublicKey::from_der(key).map_err(Error::parse)?;
            Ok(KeyAlgorithm::Rsa {
                bits: bit_len(key.modulus.as_bytes()),
            })
        } else if oid == OID_EC_PUBLIC_KEY {
            let curve = params
                .and_then(|p| p.decode_as::<ObjectIdentifier>().ok())
                .ok_or_else(|| Error::parse("EC key without a named curve"))?;
            Curve::from_oid(&curve)
                .map(KeyAlgorithm::Ecdsa)
                .ok_or_else(|| Error::parse(format!("unsupported curve {curve}")))
        } else if oid == OID_DSA {
            // Dss-Parms ::= SEQUENCE { p, q, g }
            let dss = params
                .and_then(|p| p.decode_as::<Vec<Uint>>().ok())
                .filter(|ints| ints.len() == 3)
                .ok_or_else(|| Error::parse("DSA key without domain parameters"))?;
            Ok(KeyAlgorithm::Dsa {
                bits: bit_len(dss[0].as_bytes()),
            })
        } else {
            Err(Error::parse(format!("unsupported public key algorithm {oid}")))
        }
    }
}

/// Bit length of a big-endian unsigned integer without leading zero bytes.
fn bit_len(bytes: &[u8]) -> u32 {
    let lead = bytes.first().map_or(0, |b| b.leading_zeros() as usize);
    (bytes.len() * 8 - lead) as u32
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::Rsa { bits } => write!(f, "rsa:{bits}"),
            KeyAlgorithm::Dsa { bits } => write!(f, "dsa:{bits}"),
            KeyAlgorithm::Ecdsa(curve) => write!(f, "ecdsa:{curve}"),
        }
    }
}

impl FromStr for KeyAlgorithm {
    type Err = Error;

    /// Parses `rsa:<bits>`, `dsa:<bits>` or `ecdsa:<curve>`.
    fn from_str(s: &str) -> Result<Self> {
        let (kind, param) = s
            .split_once(':')
            .ok_or_else(|| Error::unsupported(format!("malformed key algorithm '{s}'")))?;

        let bits = || {
            param
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::unsupported(format!("invalid key size '{param}'")))
        };
        match kind.trim().to_ascii_lowercase().as_str() {
            "rsa" => Ok(KeyAlgorithm::Rsa { bits: bits()? }),
            "dsa" => Ok(KeyAlgorithm::Dsa { bits: bits()? }),
            "ec" | "ecdsa" => Ok(KeyAlgorithm::Ecdsa(param.trim().parse()?)),
            _ => Err(Error::unsupported(format!("unknown key algorithm '{kind}'"))),
        }
    }
}

impl Serialize for KeyAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for KeyAlgorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
