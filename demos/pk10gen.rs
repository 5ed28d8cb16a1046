// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Demo: generate a certificate request on a software token.
//!
//! Usage: pk10gen <rsa|dsa|ecdsa> [bits|curve] [subject]
//!
//! 1. Set up a software token and log in
//! 2. Generate a key pair on the token
//! 3. Print the PEM request and what it decodes to
//!
//! Set RUST_LOG=debug to watch the token at work.

use certreq::pkcs10::{self, CertRequestBuilder, KeyAlgorithm, RequestPolicy, SubjectName};
use certreq::token::SoftwareToken;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.len() > 3 {
        eprintln!("usage: pk10gen <rsa|dsa|ecdsa> [bits|curve] [subject]");
        return ExitCode::from(2);
    }
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pk10gen: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    // Pick the key algorithm, defaulting the size or curve per kind
    let param = match (args[0].as_str(), args.get(1)) {
        (_, Some(param)) => param.as_str(),
        ("rsa" | "dsa", None) => "2048",
        (_, None) => "p256",
    };
    let algorithm: KeyAlgorithm = format!("{}:{param}", args[0]).parse()?;
    let subject: SubjectName = args
        .get(2)
        .map_or("cn=christina Fu", String::as_str)
        .parse()?;

    // Admit legacy RSA and DSA sizes down to the hard floors
    let policy = RequestPolicy {
        min_rsa_bits: pkcs10::RSA_FLOOR_BITS,
        min_dsa_bits: pkcs10::DSA_SIZES[0],
        ..Default::default()
    };
    let builder = CertRequestBuilder::with_policy(policy)?;

    println!("1. Initializing software token...");
    let token = SoftwareToken::new("internal");
    token.init_password(&"netscape".into())?;
    token.login(&"netscape".into())?;

    println!("2. Generating {algorithm} request for '{subject}'...");
    let der = builder.build(&subject, &algorithm, &token)?;
    token.logout();

    println!("3. Request:\n");
    print!("{}", pkcs10::to_pem(&der));

    let request = pkcs10::parse_der(&der)?;
    request.verify()?;
    println!("\n   subject:   {}", request.subject());
    println!("   key:       {}", request.key_algorithm());
    println!("   signature: {} (verified)", request.signature_algorithm());
    Ok(())
}
