//! Key pairs shared by the integration tests. RSA generation is slow, so
//! each pair is generated once per test binary.

#![allow(dead_code)]

use std::sync::OnceLock;

use sharevault::{generate_key_pair, KeyPair};

static ALICE: OnceLock<KeyPair> = OnceLock::new();
static BOB: OnceLock<KeyPair> = OnceLock::new();

pub fn alice() -> &'static KeyPair {
    ALICE.get_or_init(|| generate_key_pair().unwrap())
}

pub fn bob() -> &'static KeyPair {
    BOB.get_or_init(|| generate_key_pair().unwrap())
}
