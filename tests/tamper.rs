//! Tampering with any envelope field, or decrypting with the wrong key,
//! must fail with `Decryption` and never return plaintext.

mod common;

use sharevault::{
    decrypt_with_private_key, encrypt_for_recipient, EncryptedEnvelope, ShareVaultError,
};

fn assert_rejected(envelope: &EncryptedEnvelope) {
    let alice = common::alice();
    match decrypt_with_private_key(envelope, &alice.private_key) {
        Err(ShareVaultError::Decryption) => {}
        Err(other) => panic!("wrong error kind: {other:?}"),
        Ok(_) => panic!("tampered envelope decrypted"),
    }
}

fn sealed() -> EncryptedEnvelope {
    encrypt_for_recipient(b"the original, untouched payload", &common::alice().public_key).unwrap()
}

#[test]
fn test_every_iv_bit_flip_detected() {
    let original = sealed();
    for bit in 0..original.iv.len() * 8 {
        let mut envelope = original.clone();
        envelope.iv[bit / 8] ^= 1 << (bit % 8);
        assert_rejected(&envelope);
    }
}

#[test]
fn test_every_ciphertext_bit_flip_detected() {
    let original = sealed();
    for bit in 0..original.ciphertext.len() * 8 {
        let mut envelope = original.clone();
        envelope.ciphertext[bit / 8] ^= 1 << (bit % 8);
        assert_rejected(&envelope);
    }
}

#[test]
fn test_every_wrapped_key_byte_flip_detected() {
    let original = sealed();
    for byte in 0..original.wrapped_content_key.len() {
        // Low bit of every byte, plus the high bit of every eighth.
        let bits: &[u8] = if byte % 8 == 0 { &[0, 7] } else { &[0] };
        for bit in bits {
            let mut envelope = original.clone();
            envelope.wrapped_content_key[byte] ^= 1 << bit;
            assert_rejected(&envelope);
        }
    }
}

#[test]
fn test_truncation_detected() {
    let mut short_ct = sealed();
    short_ct.ciphertext.pop();
    assert_rejected(&short_ct);

    let mut short_key = sealed();
    short_key.wrapped_content_key.pop();
    assert_rejected(&short_key);

    let mut empty = sealed();
    empty.ciphertext.clear();
    assert_rejected(&empty);
}

#[test]
fn test_cross_key_isolation() {
    let alice = common::alice();
    let bob = common::bob();
    let for_alice = encrypt_for_recipient(b"for alice only", &alice.public_key).unwrap();

    let result = decrypt_with_private_key(&for_alice, &bob.private_key);
    assert!(matches!(result, Err(ShareVaultError::Decryption)));
}

#[test]
fn test_swapped_wrapped_keys_detected() {
    // A content key from another envelope unwraps fine but fails the tag.
    let a = sealed();
    let b = sealed();
    let spliced = EncryptedEnvelope {
        wrapped_content_key: b.wrapped_content_key,
        ..a
    };
    assert_rejected(&spliced);
}
