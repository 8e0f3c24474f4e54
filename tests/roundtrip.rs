mod common;

use proptest::prelude::*;
use sharevault::{decrypt_with_private_key, encrypt_for_recipient};

#[test]
fn test_roundtrip() {
    let alice = common::alice();
    let plaintext = b"board minutes, 2024-03";

    let envelope = encrypt_for_recipient(plaintext, &alice.public_key).unwrap();
    let recovered = decrypt_with_private_key(&envelope, &alice.private_key).unwrap();
    assert_eq!(recovered, plaintext);
}

#[test]
fn test_empty_plaintext_roundtrips() {
    let alice = common::alice();
    let envelope = encrypt_for_recipient(&[], &alice.public_key).unwrap();
    assert_eq!(envelope.ciphertext.len(), 16, "only the GCM tag remains");
    assert!(decrypt_with_private_key(&envelope, &alice.private_key)
        .unwrap()
        .is_empty());
}

#[test]
fn test_decrypt_is_repeatable() {
    let alice = common::alice();
    let envelope = encrypt_for_recipient(b"read me twice", &alice.public_key).unwrap();
    let first = decrypt_with_private_key(&envelope, &alice.private_key).unwrap();
    let second = decrypt_with_private_key(&envelope, &alice.private_key).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_every_encryption_is_fresh() {
    // Identical inputs must never share a content key, nonce or ciphertext.
    let alice = common::alice();
    let a = encrypt_for_recipient(b"same bytes", &alice.public_key).unwrap();
    let b = encrypt_for_recipient(b"same bytes", &alice.public_key).unwrap();

    assert_ne!(a.iv, b.iv);
    assert_ne!(a.ciphertext, b.ciphertext);
    assert_ne!(a.wrapped_content_key, b.wrapped_content_key);
}

#[test]
fn test_nonces_never_repeat() {
    let alice = common::alice();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..64 {
        let envelope = encrypt_for_recipient(b"x", &alice.public_key).unwrap();
        assert!(seen.insert(envelope.iv), "nonce reused");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn encrypt_decrypt_always_roundtrips(plaintext in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let alice = common::alice();
        let envelope = encrypt_for_recipient(&plaintext, &alice.public_key).unwrap();
        let recovered = decrypt_with_private_key(&envelope, &alice.private_key).unwrap();
        prop_assert_eq!(recovered, plaintext);
    }
}
