// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Strict PEM framing (RFC 7468) for requests and keys.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

const PEM_HEADER: &str = "-----BEGIN ";
const PEM_FOOTER: &str = "-----END ";
const PEM_ENDING: &str = "-----";

/// Width of a base64 body line.
const LINE_WIDTH: usize = 64;

/// Error type for PEM framing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("pem: input is not UTF-8 text")]
    NotText,
    #[error("pem: missing PEM header")]
    MissingHeader,
    #[error("pem: malformed PEM header")]
    MalformedHeader,
    #[error("pem: missing PEM footer")]
    MissingFooter,
    #[error("pem: empty PEM body")]
    EmptyBody,
    #[error("pem: inconsistent line endings")]
    LineEndings,
    #[error("pem: body line {line} has invalid width")]
    LineWidth { line: usize },
    #[error("pem: trailing data after PEM block")]
    TrailingData,
    #[error("pem: invalid base64: {details}")]
    Base64 { details: String },
}

/// Decodes a single PEM block, returning its label and payload.
///
/// The header must start at the first byte and the footer must end the input,
/// optionally followed by one line ending. Lines end in `\n` or `\r\n`,
/// whichever the header uses, and every body line but the last is exactly 64
/// characters wide.
pub fn decode(data: &[u8]) -> Result<(String, Vec<u8>), Error> {
    let text = std::str::from_utf8(data).map_err(|_| Error::NotText)?;
    if !text.starts_with(PEM_HEADER) {
        return Err(Error::MissingHeader);
    }
    let newline = text.find('\n').ok_or(Error::MalformedHeader)?;
    let eol = if text[..newline].ends_with('\r') {
        "\r\n"
    } else {
        "\n"
    };
    let header = &text[..newline + 1 - eol.len()];
    let label = header
        .strip_prefix(PEM_HEADER)
        .and_then(|rest| rest.strip_suffix(PEM_ENDING))
        .filter(|label| !label.is_empty() && !label.contains('-'))
        .ok_or(Error::MalformedHeader)?;
    let footer = format!("{PEM_FOOTER}{label}{PEM_ENDING}");

    let mut body = String::new();
    let mut widths = Vec::new();
    let mut closed = false;
    let mut consumed = newline + 1;

    for line in text[consumed..].split_inclusive('\n') {
        // The footer line may lack the line ending
        let content = match line.strip_suffix(eol) {
            Some(content) if !content.ends_with('\r') => content,
            _ if !line.ends_with('\n') => line,
            _ => return Err(Error::LineEndings),
        };
        consumed += line.len();
        if content == footer {
            closed = true;
            break;
        }
        widths.push(content.len());
        body.push_str(content);
    }
    if !closed {
        return Err(Error::MissingFooter);
    }
    if consumed != text.len() {
        return Err(Error::TrailingData);
    }
    if body.is_empty() {
        return Err(Error::EmptyBody);
    }
    for (i, width) in widths.iter().enumerate() {
        let last = i + 1 == widths.len();
        if *width == 0 || *width > LINE_WIDTH || (!last && *width != LINE_WIDTH) {
            return Err(Error::LineWidth { line: i + 1 });
        }
    }
    let payload = STANDARD.decode(body).map_err(|e| Error::Base64 {
        details: e.to_string(),
    })?;
    Ok((label.to_string(), payload))
}

/// Encodes data as a PEM block with the given label, using 64 character
/// lines and `\n` line endings.
pub fn encode(label: &str, data: &[u8]) -> String {
    let b64 = STANDARD.encode(data);

    let mut buf = String::with_capacity(b64.len() + b64.len() / LINE_WIDTH + 2 * label.len() + 32);
    buf.push_str(PEM_HEADER);
    buf.push_str(label);
    buf.push_str(PEM_ENDING);
    buf.push('\n');

    // Base64 output is ASCII, so byte offsets are char boundaries
    let mut rest = b64.as_str();
    while !rest.is_empty() {
        let (line, tail) = rest.split_at(rest.len().min(LINE_WIDTH));
        buf.push_str(line);
        buf.push('\n');
        rest = tail;
    }
    buf.push_str(PEM_FOOTER);
    buf.push_str(label);
    buf.push_str(PEM_ENDING);
    buf.push('\n');
    buf
}
