// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! PKCS#10 certificate request generation over pluggable key providers.
//!
//! ```no_run
//! use certreq::pkcs10::{self, Curve, KeyAlgorithm, SubjectName};
//! use certreq::token::SoftwareToken;
//!
//! let token = SoftwareToken::new("internal");
//! token.init_password(&"secret".into()).unwrap();
//! token.login(&"secret".into()).unwrap();
//!
//! let subject: SubjectName = "CN=test.example.com".parse().unwrap();
//! let der = pkcs10::build(&subject, &KeyAlgorithm::Ecdsa(Curve::P256), &token).unwrap();
//! println!("{}", pkcs10::to_pem(&der));
//! ```

pub mod pem;
pub mod pkcs10;
pub mod provider;
pub mod token;

#[cfg(test)]
mod testutil;
