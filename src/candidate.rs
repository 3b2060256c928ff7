// Copyright (C) 2020 Matthew Waters <matthew@centricular.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! ICE Candidates

pub use parse::{parse_candidate, Field, ParseCandidateError, Position};

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// The network transport of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Transport {
    /// UDP
    Udp,
    /// TCP (RFC 6544)
    Tcp,
}

/// Errors when parsing a [`Transport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseTransportError {
    UnknownTransport,
}

impl Error for ParseTransportError {}

impl fmt::Display for ParseTransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl TryFrom<&[u8]> for Transport {
    type Error = ParseTransportError;

    fn try_from(s: &[u8]) -> Result<Self, Self::Error> {
        match s {
            b"UDP" => Ok(Transport::Udp),
            b"TCP" => Ok(Transport::Tcp),
            _ => Err(ParseTransportError::UnknownTransport),
        }
    }
}

impl FromStr for Transport {
    type Err = ParseTransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.as_bytes())
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match &self {
            Transport::Udp => "UDP",
            Transport::Tcp => "TCP",
        })
    }
}

/// The type of the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum CandidateType {
    /// The candidate is a local network interface
    Host,
    /// The candidate was discovered from incoming data
    PeerReflexive,
    /// The candidate was discovered by asking an external server (STUN/TURN)
    ServerReflexive,
    /// The candidate will relay all data through an external server (TURN).
    Relayed,
}

/// Errors when parsing a [`CandidateType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseCandidateTypeError {
    UnknownCandidateType,
}

impl Error for ParseCandidateTypeError {}

impl fmt::Display for ParseCandidateTypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&format!("{:?}", self))
    }
}

impl TryFrom<&[u8]> for CandidateType {
    type Error = ParseCandidateTypeError;

    fn try_from(s: &[u8]) -> Result<Self, Self::Error> {
        match s {
            b"host" => Ok(CandidateType::Host),
            b"prflx" => Ok(CandidateType::PeerReflexive),
            b"srflx" => Ok(CandidateType::ServerReflexive),
            b"relay" => Ok(CandidateType::Relayed),
            _ => Err(ParseCandidateTypeError::UnknownCandidateType),
        }
    }
}

impl FromStr for CandidateType {
    type Err = ParseCandidateTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.as_bytes())
    }
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match &self {
            CandidateType::Host => "host",
            CandidateType::PeerReflexive => "prflx",
            CandidateType::ServerReflexive => "srflx",
            CandidateType::Relayed => "relay",
        })
    }
}

/// The related address (`raddr`) and port (`rport`) of a derived candidate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelatedAddress {
    /// The related connection address token
    pub address: String,
    /// The related port
    pub port: u16,
}

/// Displays a byte sequence replacing anything that is not printable ASCII with `?`.
///
/// Extension keys and values are arbitrary bytes.  This never fails and never writes a
/// control character.
///
/// # Examples
///
/// ```
/// # use candidateparser::candidate::PrintableBytes;
/// assert_eq!(PrintableBytes(b"a\x00b\xffc").to_string(), "a?b?c");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintableBytes<'a>(pub &'a [u8]);

impl fmt::Display for PrintableBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self
            .0
            .iter()
            .map(|&b| {
                if (0x20..=0x7e).contains(&b) {
                    b as char
                } else {
                    '?'
                }
            })
            .collect();
        f.pad(&s)
    }
}

/// Extension attributes keyed by their raw name bytes.
///
/// Iteration order is not meaningful and callers must not depend on it.
pub type Extensions = BTreeMap<Vec<u8>, Vec<u8>>;

/// A fully validated ICE candidate attribute value.
///
/// Only ever produced by a successful parse and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCandidate {
    foundation: String,
    component_id: u16,
    transport: Transport,
    priority: u64,
    connection_address: String,
    port: u16,
    candidate_type: CandidateType,
    related: Option<RelatedAddress>,
    // storage order is an implementation detail, see ParsedCandidate::extensions()
    extensions: Extensions,
}

/// Owned copy of every field of a [`ParsedCandidate`].
///
/// Holds no reference to the input line or to the parser and can be handed to code
/// that manages memory differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateParts {
    pub foundation: String,
    pub component_id: u16,
    pub transport: Transport,
    pub priority: u64,
    pub connection_address: String,
    pub port: u16,
    pub candidate_type: CandidateType,
    pub rel_address: Option<String>,
    pub rel_port: Option<u16>,
    /// Extension pairs in unspecified order.  Keys are unique.
    pub extensions: Vec<(Vec<u8>, Vec<u8>)>,
}

impl ParsedCandidate {
    /// The foundation
    pub fn foundation(&self) -> &str {
        &self.foundation
    }

    /// The component, in the range `1..=256`
    pub fn component_id(&self) -> u16 {
        self.component_id
    }

    /// The network transport
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// The priority, in the range `0..=2^31 - 1`
    pub fn priority(&self) -> u64 {
        self.priority
    }

    /// The connection address token.  This is either an IP literal or a domain name and
    /// is not resolved or validated further.
    pub fn connection_address(&self) -> &str {
        &self.connection_address
    }

    /// The port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The type of the candidate
    pub fn candidate_type(&self) -> CandidateType {
        self.candidate_type
    }

    /// The related address and port, if any
    pub fn related(&self) -> Option<&RelatedAddress> {
        self.related.as_ref()
    }

    /// The related address.  Present exactly when [`rel_port()`](Self::rel_port) is.
    pub fn rel_address(&self) -> Option<&str> {
        self.related.as_ref().map(|r| r.address.as_str())
    }

    /// The related port.  Present exactly when [`rel_address()`](Self::rel_address) is.
    pub fn rel_port(&self) -> Option<u16> {
        self.related.as_ref().map(|r| r.port)
    }

    /// Iterate over the extension attributes.
    ///
    /// The iteration order is unspecified.  When a key was repeated in the parsed line
    /// only the last value is retained.
    pub fn extensions(&self) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        self.extensions
            .iter()
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Retrieve the value of the extension attribute `key`
    pub fn extension(&self, key: &[u8]) -> Option<&[u8]> {
        self.extensions.get(key).map(Vec::as_slice)
    }

    /// Serialize this candidate to the attribute value form used in SDP, including the
    /// `candidate:` prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// # use candidateparser::candidate::*;
    /// # use std::str::FromStr;
    /// let line = "candidate:1 1 UDP 2130706431 192.168.1.1 8998 typ srflx raddr 10.0.1.1 rport 8998";
    /// let cand = ParsedCandidate::from_str(line).unwrap();
    /// assert_eq!(cand.to_sdp_bytes(), line.as_bytes());
    /// ```
    pub fn to_sdp_bytes(&self) -> Vec<u8> {
        let mut ret = format!(
            "candidate:{} {} {} {} {} {} typ {}",
            self.foundation,
            self.component_id,
            self.transport,
            self.priority,
            self.connection_address,
            self.port,
            self.candidate_type
        )
        .into_bytes();

        if let Some(related) = &self.related {
            ret.extend_from_slice(
                format!(" raddr {} rport {}", related.address, related.port).as_bytes(),
            );
        }

        for (key, val) in self.extensions() {
            ret.push(b' ');
            ret.extend_from_slice(key);
            ret.push(b' ');
            ret.extend_from_slice(val);
        }
        ret
    }

    /// Move every field out into an owned [`CandidateParts`]
    pub fn into_parts(self) -> CandidateParts {
        let (rel_address, rel_port) = match self.related {
            Some(related) => (Some(related.address), Some(related.port)),
            None => (None, None),
        };
        CandidateParts {
            foundation: self.foundation,
            component_id: self.component_id,
            transport: self.transport,
            priority: self.priority,
            connection_address: self.connection_address,
            port: self.port,
            candidate_type: self.candidate_type,
            rel_address,
            rel_port,
            extensions: self.extensions.into_iter().collect(),
        }
    }
}

impl From<ParsedCandidate> for CandidateParts {
    fn from(cand: ParsedCandidate) -> Self {
        cand.into_parts()
    }
}

impl FromStr for ParsedCandidate {
    type Err = ParseCandidateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_candidate(s.as_bytes())
    }
}

impl fmt::Display for ParsedCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ParsedCandidate {{")?;
        writeln!(f, "    foundation         : {}", self.foundation)?;
        writeln!(f, "    component_id       : {}", self.component_id)?;
        writeln!(f, "    transport          : {}", self.transport)?;
        writeln!(f, "    priority           : {}", self.priority)?;
        writeln!(f, "    connection_address : {}", self.connection_address)?;
        writeln!(f, "    port               : {}", self.port)?;
        writeln!(f, "    candidate_type     : {}", self.candidate_type)?;
        match &self.related {
            Some(related) => {
                writeln!(f, "    rel_address        : {}", related.address)?;
                writeln!(f, "    rel_port           : {}", related.port)?;
            }
            None => {
                writeln!(f, "    rel_address        : -")?;
                writeln!(f, "    rel_port           : -")?;
            }
        }
        if self.extensions.is_empty() {
            writeln!(f, "    extensions         : -")?;
        } else {
            writeln!(f, "    extensions         : {{")?;
            for (key, val) in self.extensions() {
                writeln!(
                    f,
                    "        {} => {}",
                    PrintableBytes(key),
                    PrintableBytes(val)
                )?;
            }
            writeln!(f, "    }}")?;
        }
        write!(f, "}}")
    }
}

pub mod parse {
    use std::error::Error;
    use std::fmt;
    use std::ops::RangeInclusive;

    use nom::bytes::complete::{tag, take_while};
    use nom::character::complete::digit1;
    use nom::combinator::all_consuming;

    use super::{CandidateType, Extensions, ParsedCandidate, RelatedAddress, Transport};
    use crate::tokenize::{Token, Tokens};

    const COMPONENT_ID_RANGE: RangeInclusive<u64> = 1..=256;
    const PRIORITY_RANGE: RangeInclusive<u64> = 0..=(1 << 31) - 1;
    const PORT_RANGE: RangeInclusive<u64> = 0..=u16::MAX as u64;

    /// The grammar position a failure is attributed to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Field {
        Foundation,
        ComponentId,
        Transport,
        Priority,
        ConnectionAddress,
        Port,
        /// The literal `typ` keyword before the candidate type
        TypKeyword,
        CandidateType,
        RelatedAddress,
        RelatedPort,
        Extension,
    }

    impl fmt::Display for Field {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.pad(match self {
                Field::Foundation => "foundation",
                Field::ComponentId => "component-id",
                Field::Transport => "transport",
                Field::Priority => "priority",
                Field::ConnectionAddress => "connection-address",
                Field::Port => "port",
                Field::TypKeyword => "'typ' keyword",
                Field::CandidateType => "candidate-type",
                Field::RelatedAddress => "rel-addr",
                Field::RelatedPort => "rel-port",
                Field::Extension => "extension attribute",
            })
        }
    }

    /// Location of the offending token
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Position {
        /// Zero based index of the token, not counting any `candidate:` prefix
        pub token: usize,
        /// Byte offset of the token in the input line
        pub offset: usize,
    }

    impl From<Token<'_>> for Position {
        fn from(token: Token<'_>) -> Self {
            Self {
                token: token.index,
                offset: token.offset,
            }
        }
    }

    /// Errors produced when parsing a candidate
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ParseCandidateError {
        /// The line ended before all mandatory fields were present
        TruncatedInput { expected: Field },
        /// A token is not valid for its position, or the `typ` keyword is missing
        MalformedToken { field: Field, position: Position },
        /// A numeric field is not a base-10 unsigned integer
        InvalidNumber { field: Field, position: Position },
        /// A numeric field is outside of its allowed range
        OutOfRange { field: Field, position: Position },
        /// The transport or candidate type is not known
        UnknownEnumValue { field: Field, position: Position },
        /// A name without a value, or only one of `raddr`/`rport`
        IncompletePair { field: Field, position: Position },
    }

    impl ParseCandidateError {
        /// The field the error is attributed to
        pub fn field(&self) -> Field {
            match *self {
                Self::TruncatedInput { expected } => expected,
                Self::MalformedToken { field, .. }
                | Self::InvalidNumber { field, .. }
                | Self::OutOfRange { field, .. }
                | Self::UnknownEnumValue { field, .. }
                | Self::IncompletePair { field, .. } => field,
            }
        }

        /// The location of the offending token.  `None` when the line was truncated.
        pub fn position(&self) -> Option<Position> {
            match *self {
                Self::TruncatedInput { .. } => None,
                Self::MalformedToken { position, .. }
                | Self::InvalidNumber { position, .. }
                | Self::OutOfRange { position, .. }
                | Self::UnknownEnumValue { position, .. }
                | Self::IncompletePair { position, .. } => Some(position),
            }
        }
    }

    impl Error for ParseCandidateError {}

    impl fmt::Display for ParseCandidateError {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            let reason = match self {
                Self::TruncatedInput { expected } => {
                    return write!(f, "Truncated input, expected {}", expected)
                }
                Self::MalformedToken { .. } => "Malformed",
                Self::InvalidNumber { .. } => "Invalid number for",
                Self::OutOfRange { .. } => "Out of range",
                Self::UnknownEnumValue { .. } => "Unknown",
                Self::IncompletePair { .. } => "Incomplete pair for",
            };
            match self.position() {
                Some(pos) => write!(
                    f,
                    "{} {} at token {} (byte offset {})",
                    reason,
                    self.field(),
                    pos.token,
                    pos.offset
                ),
                None => write!(f, "{} {}", reason, self.field()),
            }
        }
    }

    fn next_token<'a>(
        tokens: &mut Tokens<'a>,
        expected: Field,
    ) -> Result<Token<'a>, ParseCandidateError> {
        tokens
            .next()
            .ok_or(ParseCandidateError::TruncatedInput { expected })
    }

    // Unicode format characters (bidi overrides, zero width joiners, ...) would reorder or
    // hide text when a token is displayed
    fn is_invisible_format(c: char) -> bool {
        matches!(
            c,
            '\u{00ad}'
                | '\u{061c}'
                | '\u{180e}'
                | '\u{200b}'..='\u{200f}'
                | '\u{202a}'..='\u{202e}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{206f}'
                | '\u{feff}'
                | '\u{fff9}'..='\u{fffb}'
        )
    }

    // non-empty UTF-8 without any whitespace, control or invisible format characters
    fn text_token(token: Token<'_>, field: Field) -> Result<&str, ParseCandidateError> {
        let malformed = ParseCandidateError::MalformedToken {
            field,
            position: token.into(),
        };
        let s = std::str::from_utf8(token.bytes).map_err(|_| malformed)?;
        if s.is_empty()
            || s
                .chars()
                .any(|c| c.is_control() || c.is_whitespace() || is_invisible_format(c))
        {
            return Err(malformed);
        }
        Ok(s)
    }

    fn number_token<T: TryFrom<u64>>(
        token: Token<'_>,
        field: Field,
        range: RangeInclusive<u64>,
    ) -> Result<T, ParseCandidateError> {
        let position = token.into();
        let (_, digits) =
            all_consuming(digit1::<_, nom::error::Error<_>>)(token.bytes)
                .map_err(|_| ParseCandidateError::InvalidNumber { field, position })?;
        let out_of_range = ParseCandidateError::OutOfRange { field, position };
        // only ASCII digits remain, the only possible failure is overflow
        let value: u64 = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(out_of_range)?;
        if !range.contains(&value) {
            return Err(out_of_range);
        }
        T::try_from(value).map_err(|_| out_of_range)
    }

    fn pair_field(name: &[u8]) -> Field {
        match name {
            b"raddr" => Field::RelatedAddress,
            b"rport" => Field::RelatedPort,
            _ => Field::Extension,
        }
    }

    /// Parse a single candidate attribute value.
    ///
    /// A leading `candidate:` is skipped if present.  Parsing stops at the first invalid
    /// token.
    ///
    /// # Examples
    ///
    /// ```
    /// # use candidateparser::candidate::*;
    /// let cand = parse_candidate(b"candidate:1 1 UDP 2130706431 192.168.1.1 8998 typ host")
    ///     .unwrap();
    /// assert_eq!(cand.foundation(), "1");
    /// assert_eq!(cand.port(), 8998);
    ///
    /// assert!(matches!(
    ///     parse_candidate(b"1 1 UDP 2130706431 192.168.1.1 8998"),
    ///     Err(ParseCandidateError::TruncatedInput { expected: Field::TypKeyword })
    /// ));
    /// ```
    // https://datatracker.ietf.org/doc/html/rfc8839#section-5.1
    pub fn parse_candidate(line: &[u8]) -> Result<ParsedCandidate, ParseCandidateError> {
        let s = take_while::<_, _, nom::error::Error<_>>(|b: u8| b.is_ascii_whitespace())(line)
            .map(|(s, _)| s)
            .unwrap_or(line);
        let s = tag::<_, _, nom::error::Error<_>>(&b"candidate:"[..])(s)
            .map(|(s, _)| s)
            .unwrap_or(s);
        let mut tokens = Tokens::starting_at(line, line.len() - s.len());

        let token = next_token(&mut tokens, Field::Foundation)?;
        let foundation = text_token(token, Field::Foundation)?.to_owned();

        let token = next_token(&mut tokens, Field::ComponentId)?;
        let component_id = number_token(token, Field::ComponentId, COMPONENT_ID_RANGE)?;

        let token = next_token(&mut tokens, Field::Transport)?;
        let transport = Transport::try_from(token.bytes).map_err(|_| {
            ParseCandidateError::UnknownEnumValue {
                field: Field::Transport,
                position: token.into(),
            }
        })?;

        let token = next_token(&mut tokens, Field::Priority)?;
        let priority = number_token(token, Field::Priority, PRIORITY_RANGE)?;

        let token = next_token(&mut tokens, Field::ConnectionAddress)?;
        let connection_address = text_token(token, Field::ConnectionAddress)?.to_owned();

        let token = next_token(&mut tokens, Field::Port)?;
        let port = number_token(token, Field::Port, PORT_RANGE)?;

        let token = next_token(&mut tokens, Field::TypKeyword)?;
        if token.bytes != b"typ" {
            return Err(ParseCandidateError::MalformedToken {
                field: Field::TypKeyword,
                position: token.into(),
            });
        }

        let token = next_token(&mut tokens, Field::CandidateType)?;
        let candidate_type = CandidateType::try_from(token.bytes).map_err(|_| {
            ParseCandidateError::UnknownEnumValue {
                field: Field::CandidateType,
                position: token.into(),
            }
        })?;

        let mut related = None;
        let mut extensions = Extensions::new();
        while let Some(name) = tokens.next() {
            let value = tokens
                .next()
                .ok_or(ParseCandidateError::IncompletePair {
                    field: pair_field(name.bytes),
                    position: name.into(),
                })?;
            match name.bytes {
                b"raddr" => {
                    if related.is_some() {
                        return Err(ParseCandidateError::MalformedToken {
                            field: Field::RelatedAddress,
                            position: name.into(),
                        });
                    }
                    let address = text_token(value, Field::RelatedAddress)?.to_owned();
                    let incomplete = ParseCandidateError::IncompletePair {
                        field: Field::RelatedPort,
                        position: name.into(),
                    };
                    tokens
                        .next()
                        .filter(|t| t.bytes == b"rport")
                        .ok_or(incomplete)?;
                    let port_token = tokens.next().ok_or(incomplete)?;
                    let port = number_token(port_token, Field::RelatedPort, PORT_RANGE)?;
                    related = Some(RelatedAddress { address, port });
                }
                b"rport" => {
                    return Err(ParseCandidateError::IncompletePair {
                        field: Field::RelatedAddress,
                        position: name.into(),
                    })
                }
                _ => {
                    extensions.insert(name.bytes.to_vec(), value.bytes.to_vec());
                }
            }
        }

        let cand = ParsedCandidate {
            foundation,
            component_id,
            transport,
            priority,
            connection_address,
            port,
            candidate_type,
            related,
            extensions,
        };
        trace!("parsed candidate {:?}", cand);
        Ok(cand)
    }
}
