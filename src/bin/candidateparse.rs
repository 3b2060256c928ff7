// Copyright (C) 2020 Matthew Waters <matthew@centricular.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate tracing;

use tracing_subscriber::EnvFilter;

use std::io::{self, BufRead};

use candidateparser::candidate::{parse_candidate, PrintableBytes};

// prints the parsed candidate and returns whether @line was valid
fn parse_and_print(line: &[u8]) -> bool {
    match parse_candidate(line) {
        Ok(cand) => {
            println!("{}", cand);
            true
        }
        Err(e) => {
            info!("failed to parse {:?}", String::from_utf8_lossy(line));
            println!("{}: {}", PrintableBytes(line), e);
            false
        }
    }
}

fn main() -> io::Result<()> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    let args: Vec<_> = std::env::args_os().skip(1).collect();
    let mut all_ok = true;
    if args.is_empty() {
        let stdin = io::stdin();
        for line in stdin.lock().split(b'\n') {
            let line = line?;
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            all_ok &= parse_and_print(&line);
        }
    } else {
        for arg in args {
            all_ok &= parse_and_print(arg.as_encoded_bytes());
        }
    }

    if !all_ok {
        std::process::exit(1);
    }
    Ok(())
}
