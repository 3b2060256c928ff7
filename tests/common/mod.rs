// Copyright (C) 2020 Matthew Waters <matthew@centricular.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use candidateparser::candidate::{parse_candidate, ParseCandidateError, ParsedCandidate};

pub fn debug_init() {
    static TRACING: Once = Once::new();

    TRACING.call_once(|| {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    });
}

#[allow(dead_code)]
pub fn parse(line: &str) -> Result<ParsedCandidate, ParseCandidateError> {
    let res = parse_candidate(line.as_bytes());
    debug!("parsed {:?} into {:?}", line, res);
    res
}

// re-parse the canonical form and check nothing changed
#[allow(dead_code)]
pub fn assert_round_trip(cand: &ParsedCandidate) {
    let sdp = cand.to_sdp_bytes();
    match parse_candidate(&sdp) {
        Ok(reparsed) => assert_eq!(&reparsed, cand),
        Err(e) => panic!(
            "failed to re-parse {:?}: {}",
            String::from_utf8_lossy(&sdp),
            e
        ),
    }
}
