// Copyright (C) 2020 Matthew Waters <matthew@centricular.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::ffi::OsStr;
use std::io::Write;
use std::process::{Command, Output, Stdio};

#[macro_use]
extern crate tracing;

mod common;

const HOST: &str = "1 1 UDP 2130706431 192.168.1.1 8998 typ host";

fn run_args<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(env!("CARGO_BIN_EXE_candidateparse"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    debug!("candidateparse args output {:?}", output);
    output
}

fn run_stdin(input: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_candidateparse"))
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input).unwrap();
    let output = child.wait_with_output().unwrap();
    debug!("candidateparse stdin output {:?}", output);
    output
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn valid_argument() {
    common::debug_init();
    let output = run_args([HOST]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("ParsedCandidate {\n"));
    assert!(out.contains("    candidate_type     : host\n"));
}

#[test]
fn invalid_argument_fails() {
    common::debug_init();
    let output = run_args([HOST, "1 257 UDP 10 1.2.3.4 80 typ host"]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("    candidate_type     : host\n"));
    assert!(out.contains(
        "1 257 UDP 10 1.2.3.4 80 typ host: Out of range component-id at token 1 (byte offset 2)\n"
    ));
}

#[test]
fn stdin_lines() {
    common::debug_init();
    let output = run_stdin(format!("{}\n\n   \r\n{} generation 0\n", HOST, HOST).as_bytes());
    assert!(output.status.success());
    let out = stdout(&output);
    assert_eq!(out.matches("ParsedCandidate {").count(), 2);
    assert!(out.contains("        generation => 0\n"));
}

#[test]
fn stdin_invalid_line_fails() {
    common::debug_init();
    let output = run_stdin(format!("{}\n1 1 UDP 1 1.2.3.4 80\n", HOST).as_bytes());
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert_eq!(out.matches("ParsedCandidate {").count(), 1);
    assert!(out.contains("Truncated input, expected 'typ' keyword"));
}

#[cfg(unix)]
#[test]
fn raw_argument_bytes() {
    use std::os::unix::ffi::OsStrExt;

    common::debug_init();
    let line = b"\xff 1 UDP 1 1.2.3.4 80 typ host k v\xfe";
    let from_args = run_args([OsStr::from_bytes(line)]);
    let mut stdin_line = line.to_vec();
    stdin_line.push(b'\n');
    let from_stdin = run_stdin(&stdin_line);
    assert_eq!(from_args.status.code(), Some(1));
    assert_eq!(from_args.stdout, from_stdin.stdout);
    assert!(stdout(&from_args).contains("Malformed foundation at token 0 (byte offset 0)"));

    let from_args = run_args([OsStr::from_bytes(b"f 1 UDP 1 1.2.3.4 80 typ host k v\xfe")]);
    assert!(from_args.status.success());
    assert!(stdout(&from_args).contains("        k => v?\n"));
}
