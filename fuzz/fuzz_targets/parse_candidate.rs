#![no_main]
use libfuzzer_sys::fuzz_target;

#[macro_use]
extern crate tracing;
use tracing_subscriber::EnvFilter;

use candidateparser::candidate::*;

use std::sync::Once;

#[derive(arbitrary::Arbitrary, Debug)]
struct Data<'data> {
    data: &'data [u8],
}

pub fn debug_init() {
    static TRACING: Once = Once::new();

    TRACING.call_once(|| {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    });
}

fuzz_target!(|data: Data| {
    debug_init();
    let res = parse_candidate(data.data);
    debug!("candidate result {:?}", res);
    if let Ok(cand) = res {
        let _ = cand.to_string();
        assert_eq!(parse_candidate(&cand.to_sdp_bytes()), Ok(cand));
    }
});
