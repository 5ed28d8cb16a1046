// certreq: PKCS#10 certificate request generation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{Error, Result};
use const_oid::ObjectIdentifier;
use der::asn1::{Any, SetOfVec};
use der::{Tag, Tagged};
use std::fmt;
use std::str::FromStr;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};

/// OID for CommonName (2.5.4.3).
const OID_CN: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// OID for serialNumber (2.5.4.5).
const OID_SERIAL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.5");
/// OID for countryName (2.5.4.6).
const OID_C: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
/// OID for localityName (2.5.4.7).
const OID_L: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
/// OID for stateOrProvinceName (2.5.4.8).
const OID_ST: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
/// OID for organizationName (2.5.4.10).
const OID_O: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
/// OID for organizationalUnitName (2.5.4.11).
const OID_OU: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");
/// OID for PKCS#9 emailAddress (1.2.840.113549.1.9.1).
const OID_EMAIL: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");
/// OID for userId (0.9.2342.19200300.100.1.1).
const OID_UID: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.1");
/// OID for domainComponent (0.9.2342.19200300.100.1.25).
const OID_DC: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.25");

/// ASN.1 string type an attribute value is encoded with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StringKind {
    Utf8,
    Printable,
    Ia5,
}

/// Attribute types the encoder recognizes in a subject name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeType {
    CommonName,
    SerialNumber,
    Country,
    Locality,
    State,
    Organization,
    OrganizationalUnit,
    Email,
    UserId,
    DomainComponent,
}

impl AttributeType {
    const ALL: [AttributeType; 10] = [
        AttributeType::CommonName,
        AttributeType::SerialNumber,
        AttributeType::Country,
        AttributeType::Locality,
        AttributeType::State,
        AttributeType::Organization,
        AttributeType::OrganizationalUnit,
        AttributeType::Email,
        AttributeType::UserId,
        AttributeType::DomainComponent,
    ];

    /// Returns the attribute OID.
    pub fn oid(self) -> ObjectIdentifier {
        match self {
            AttributeType::CommonName => OID_CN,
            AttributeType::SerialNumber => OID_SERIAL_NUMBER,
            AttributeType::Country => OID_C,
            AttributeType::Locality => OID_L,
            AttributeType::State => OID_ST,
            AttributeType::Organization => OID_O,
            AttributeType::OrganizationalUnit => OID_OU,
            AttributeType::Email => OID_EMAIL,
            AttributeType::UserId => OID_UID,
            AttributeType::DomainComponent => OID_DC,
        }
    }

    /// Returns the canonical string keyword (`CN`, `O`, ...).
    pub fn keyword(self) -> &'static str {
        match self {
            AttributeType::CommonName => "CN",
            AttributeType::SerialNumber => "SERIALNUMBER",
            AttributeType::Country => "C",
            AttributeType::Locality => "L",
            AttributeType::State => "ST",
            AttributeType::Organization => "O",
            AttributeType::OrganizationalUnit => "OU",
            AttributeType::Email => "E",
            AttributeType::UserId => "UID",
            AttributeType::DomainComponent => "DC",
        }
    }

    /// Looks up an attribute by keyword, ignoring ASCII case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword.eq_ignore_ascii_case("EMAILADDRESS") {
            return Some(AttributeType::Email);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.keyword().eq_ignore_ascii_case(keyword))
    }

    /// Looks up an attribute by OID.
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.oid() == *oid)
    }

    fn string_kind(self) -> StringKind {
        match self {
            AttributeType::Country | AttributeType::SerialNumber => StringKind::Printable,
            AttributeType::Email | AttributeType::DomainComponent => StringKind::Ia5,
            _ => StringKind::Utf8,
        }
    }

    /// Upper bound on the value length (RFC 5280 Appendix A).
    fn max_len(self) -> usize {
        match self {
            AttributeType::Country => 2,
            AttributeType::Locality | AttributeType::State => 128,
            AttributeType::Email | AttributeType::UserId | AttributeType::DomainComponent => 255,
            _ => 64,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single subject attribute, encoded as its own RDN.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameAttribute {
    /// Attribute type.
    pub kind: AttributeType,
    /// Attribute value text.
    pub value: String,
}

impl NameAttribute {
    fn validate(&self) -> Result<()> {
        let kind = self.kind;
        if self.value.is_empty() {
            return Err(Error::invalid_subject(format!("{kind} value must not be empty")));
        }
        let len = self.value.chars().count();
        if len > kind.max_len() {
            return Err(Error::invalid_subject(format!(
                "{kind} value exceeds {} characters",
                kind.max_len()
            )));
        }
        if kind == AttributeType::Country
            && !(len == 2 && self.value.bytes().all(|b| b.is_ascii_alphabetic()))
        {
            return Err(Error::invalid_subject("C must be a two letter country code"));
        }
        match kind.string_kind() {
            StringKind::Printable if !is_printable_string(&self.value) => Err(
                Error::invalid_subject(format!("{kind} contains invalid PrintableString characters")),
            ),
            StringKind::Ia5 if !self.value.is_ascii() => Err(Error::invalid_subject(format!(
                "{kind} contains invalid IA5String characters"
            ))),
            _ => Ok(()),
        }
    }

    fn as_any(&self) -> Result<Any> {
        let tag = match self.kind.string_kind() {
            StringKind::Utf8 => Tag::Utf8String,
            StringKind::Printable => Tag::PrintableString,
            StringKind::Ia5 => Tag::Ia5String,
        };
        Ok(Any::new(tag, self.value.as_bytes())?)
    }
}

fn is_printable_string(value: &str) -> bool {
    value.as_bytes().iter().all(|b| {
        b.is_ascii_alphanumeric()
            || matches!(
                *b,
                b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?'
            )
    })
}

/// Subject distinguished name represented as ordered attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubjectName {
    /// Ordered list of RDN attributes.
    pub attrs: Vec<NameAttribute>,
}

impl SubjectName {
    /// Creates an empty subject.
    pub fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    /// Adds a CN attribute.
    pub fn cn(self, value: impl Into<String>) -> Self {
        self.push(AttributeType::CommonName, value)
    }

    /// Adds an arbitrary recognized attribute.
    pub fn push(mut self, kind: AttributeType, value: impl Into<String>) -> Self {
        self.attrs.push(NameAttribute {
            kind,
            value: value.into(),
        });
        self
    }

    /// Returns the first CN value, if any.
    pub fn common_name(&self) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.kind == AttributeType::CommonName)
            .map(|attr| attr.value.as_str())
    }

    /// Reports whether the name has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Returns the number of attributes, one per RDN.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Checks that the subject is non-empty and every value fits its type.
    pub fn validate(&self) -> Result<()> {
        if self.attrs.is_empty() {
            return Err(Error::invalid_subject("subject must not be empty"));
        }
        self.attrs.iter().try_for_each(NameAttribute::validate)
    }

    pub(super) fn to_x509_name(&self) -> Result<Name> {
        let mut rdns = Vec::with_capacity(self.attrs.len());
        for attr in &self.attrs {
            let set = SetOfVec::try_from(vec![AttributeTypeAndValue {
                oid: attr.kind.oid(),
                value: attr.as_any()?,
            }])?;
            rdns.push(RelativeDistinguishedName::from(set));
        }
        Ok(RdnSequence(rdns))
    }

    pub(super) fn from_x509_name(name: &Name) -> Result<Self> {
        let mut attrs = Vec::with_capacity(name.0.len());
        for rdn in &name.0 {
            let atavs = rdn.0.as_slice();
            if atavs.len() != 1 {
                return Err(Error::parse("multi-valued RDNs are not supported"));
            }
            let atav = &atavs[0];
            let kind = AttributeType::from_oid(&atav.oid)
                .ok_or_else(|| Error::parse(format!("unrecognized attribute {}", atav.oid)))?;

            let tag = atav.value.tag();
            if !matches!(tag, Tag::Utf8String | Tag::PrintableString | Tag::Ia5String) {
                return Err(Error::parse(format!("unsupported {kind} value tag {tag}")));
            }
            let value = String::from_utf8(atav.value.value().to_vec()).map_err(Error::parse)?;
            attrs.push(NameAttribute { kind, value });
        }
        Ok(Self { attrs })
    }
}

impl FromStr for SubjectName {
    type Err = Error;

    /// Parses `CN=foo, O=Bar` style names. Keywords ignore case, and `\`
    /// escapes the next character in a value.
    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(Error::invalid_subject("subject must not be empty"));
        }
        let mut name = SubjectName::new();
        for (keyword, value) in split_components(s)? {
            let kind = AttributeType::from_keyword(&keyword).ok_or_else(|| {
                Error::invalid_subject(format!("unrecognized attribute '{keyword}'"))
            })?;
            name = name.push(kind, value);
        }
        name.validate()?;
        Ok(name)
    }
}

impl fmt::Display for SubjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attr) in self.attrs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}=", attr.kind)?;
            let last = attr.value.chars().count().saturating_sub(1);
            for (j, c) in attr.value.chars().enumerate() {
                let edge_space = c == ' ' && (j == 0 || j == last);
                if matches!(c, ',' | '+' | '=' | '\\') || edge_space {
                    f.write_str("\\")?;
                }
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// Splits a textual subject into trimmed `(keyword, value)` pairs.
fn split_components(input: &str) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    let mut keyword = String::new();
    let mut value: Vec<(char, bool)> = Vec::new();
    let mut in_value = false;

    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let next = chars
                    .next()
                    .ok_or_else(|| Error::invalid_subject("dangling escape at end of subject"))?;
                if !in_value {
                    return Err(Error::invalid_subject("escapes are not allowed in keywords"));
                }
                value.push((next, true));
            }
            '=' if !in_value => in_value = true,
            '+' => return Err(Error::invalid_subject("multi-valued RDNs are not supported")),
            ',' => {
                out.push(finish_component(&keyword, &value, in_value)?);
                keyword.clear();
                value.clear();
                in_value = false;
            }
            _ if in_value => value.push((c, false)),
            _ => keyword.push(c),
        }
    }
    out.push(finish_component(&keyword, &value, in_value)?);
    Ok(out)
}

fn finish_component(
    keyword: &str,
    value: &[(char, bool)],
    in_value: bool,
) -> Result<(String, String)> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(Error::invalid_subject("missing attribute keyword"));
    }
    if !in_value {
        return Err(Error::invalid_subject(format!("attribute '{keyword}' has no value")));
    }
    // Only unescaped whitespace is insignificant around a value
    let start = value
        .iter()
        .position(|&(c, escaped)| escaped || !c.is_whitespace())
        .unwrap_or(value.len());
    let end = value
        .iter()
        .rposition(|&(c, escaped)| escaped || !c.is_whitespace())
        .map_or(start, |i| i + 1);

    let text = value[start..end].iter().map(|&(c, _)| c).collect();
    Ok((keyword.to_string(), text))
}
