#![no_main]
use libfuzzer_sys::fuzz_target;

#[macro_use]
extern crate tracing;
use tracing_subscriber::EnvFilter;

use candidateparser::candidate::*;

use std::sync::Once;

// mostly well formed lines so that the range checks and the extension tail get exercised
#[derive(arbitrary::Arbitrary, Debug)]
struct Fields<'data> {
    foundation: &'data str,
    component_id: u32,
    transport: Transport,
    priority: u64,
    address: &'data str,
    port: u32,
    candidate_type: CandidateType,
    related: Option<(&'data str, u32)>,
    extensions: Vec<(&'data [u8], &'data [u8])>,
}

pub fn debug_init() {
    static TRACING: Once = Once::new();

    TRACING.call_once(|| {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    });
}

fuzz_target!(|fields: Fields| {
    debug_init();
    let mut line = format!(
        "{} {} {} {} {} {} typ {}",
        fields.foundation,
        fields.component_id,
        fields.transport,
        fields.priority,
        fields.address,
        fields.port,
        fields.candidate_type
    )
    .into_bytes();
    if let Some((raddr, rport)) = fields.related {
        line.extend_from_slice(format!(" raddr {} rport {}", raddr, rport).as_bytes());
    }
    for (key, val) in fields.extensions.iter() {
        line.push(b' ');
        line.extend_from_slice(key);
        line.push(b' ');
        line.extend_from_slice(val);
    }

    let res = parse_candidate(&line);
    debug!("candidate result {:?}", res);
    if let Ok(cand) = res {
        assert!((1..=256).contains(&cand.component_id()));
        assert!(cand.priority() < 1 << 31);
        assert_eq!(cand.rel_address().is_some(), cand.rel_port().is_some());
        assert_eq!(parse_candidate(&cand.to_sdp_bytes()), Ok(cand));
    }
});
