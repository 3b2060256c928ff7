// Copyright (C) 2020 Matthew Waters <matthew@centricular.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Whitespace tokenizer for candidate lines
//!
//! Tokens are byte-exact slices of the input.  Nothing is copied and no text encoding is
//! assumed.

use std::iter::FusedIterator;

use nom::bytes::complete::{take_while, take_while1};

fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace()
}

/// A single whitespace separated token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Zero based position of the token in the line
    pub index: usize,
    /// Byte offset of the first byte of the token in the original line
    pub offset: usize,
    /// The raw bytes of the token, never empty and never containing ASCII whitespace
    pub bytes: &'a [u8],
}

/// Lazy iterator over the [`Token`]s of a line.
///
/// Cloning produces an independent iterator starting from the same position.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    line: &'a [u8],
    remaining: &'a [u8],
    index: usize,
}

/// Split `line` on runs of ASCII whitespace.
///
/// Leading and trailing whitespace (including line terminators) produce no tokens.
///
/// # Examples
///
/// ```
/// # use candidateparser::tokenize::tokenize;
/// let tokens: Vec<_> = tokenize(b" 1 1\tUDP\r\n").map(|t| t.bytes).collect();
/// assert_eq!(tokens, [&b"1"[..], b"1", b"UDP"]);
/// ```
pub fn tokenize(line: &[u8]) -> Tokens<'_> {
    Tokens::starting_at(line, 0)
}

impl<'a> Tokens<'a> {
    // Offsets of produced tokens are still relative to the start of @line
    pub(crate) fn starting_at(line: &'a [u8], start: usize) -> Self {
        Self {
            line,
            remaining: &line[start.min(line.len())..],
            index: 0,
        }
    }

    /// Byte offset into the line of the next unconsumed byte
    pub fn offset(&self) -> usize {
        self.line.len() - self.remaining.len()
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (s, _) = take_while::<_, _, nom::error::Error<_>>(is_space)(self.remaining).ok()?;
        self.remaining = s;
        let offset = self.offset();
        let (s, bytes) =
            take_while1::<_, _, nom::error::Error<_>>(|b: u8| !is_space(b))(s).ok()?;
        self.remaining = s;
        let token = Token {
            index: self.index,
            offset,
            bytes,
        };
        self.index += 1;
        Some(token)
    }
}

impl FusedIterator for Tokens<'_> {}
