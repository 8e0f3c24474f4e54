//! Shared fixtures for unit tests. RSA generation is slow, so each pair is
//! generated once per test binary.

use std::sync::OnceLock;

use zeroize::Zeroizing;

use crate::asymmetric;

type DerPair = (Vec<u8>, Zeroizing<Vec<u8>>);

static PAIR_A: OnceLock<DerPair> = OnceLock::new();
static PAIR_B: OnceLock<DerPair> = OnceLock::new();

fn get(cell: &'static OnceLock<DerPair>) -> (&'static [u8], &'static [u8]) {
    let (public, private) = cell.get_or_init(|| asymmetric::generate(2048).unwrap());
    (public.as_slice(), private.as_slice())
}

pub fn rsa_pair_a() -> (&'static [u8], &'static [u8]) {
    get(&PAIR_A)
}

pub fn rsa_pair_b() -> (&'static [u8], &'static [u8]) {
    get(&PAIR_B)
}
