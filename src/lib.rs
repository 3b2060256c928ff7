// Copyright (C) 2020 Matthew Waters <matthew@centricular.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # candidateparser
//!
//! Parsing and validation of a single ICE `candidate` attribute value as found in SDP
//! ([RFC 8839 Section 5.1](https://datatracker.ietf.org/doc/html/rfc8839#section-5.1)).
//!
//! ```
//! # use candidateparser::candidate::*;
//! let cand: ParsedCandidate = "1 1 UDP 2130706431 192.168.1.1 8998 typ host generation 0"
//!     .parse()
//!     .unwrap();
//! assert_eq!(cand.component_id(), 1);
//! assert_eq!(cand.candidate_type(), CandidateType::Host);
//! assert_eq!(cand.extension(b"generation"), Some(&b"0"[..]));
//! ```

#[macro_use]
extern crate tracing;

pub mod candidate;
pub mod tokenize;

#[cfg(test)]
pub(crate) mod tests {
    use once_cell::sync::Lazy;
    use tracing_subscriber::EnvFilter;

    static TRACING: Lazy<()> = Lazy::new(|| {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    });

    pub fn test_init_log() {
        Lazy::force(&TRACING);
    }
}
