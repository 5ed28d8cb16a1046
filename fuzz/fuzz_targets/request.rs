// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![no_main]

use certreq::pkcs10::{parse_der, parse_pem, to_pem};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Anything that parses must verify or fail cleanly, and survive PEM framing
    if let Ok(request) = parse_der(data) {
        let _ = request.verify();

        let again = parse_pem(&to_pem(data)).expect("reframed request must parse");
        assert_eq!(again.info_der(), request.info_der());
        assert_eq!(again.subject(), request.subject());
    }
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_pem(text);
    }
});
