mod common;

use proptest::prelude::*;
use sharevault::{
    unwrap_private_key, wrap_private_key, EncodedWrappedKey, PrivateKey, ShareVaultError,
    WrappedPrivateKey,
};

#[test]
fn test_wrap_roundtrip() {
    let alice = common::alice();
    let wrapped = wrap_private_key(&alice.private_key, "Str0ngPass!").unwrap();
    assert_eq!(wrapped.salt.len(), 16);
    assert_eq!(wrapped.iv.len(), 12);

    let recovered = unwrap_private_key(&wrapped, "Str0ngPass!").unwrap();
    assert_eq!(recovered, alice.private_key);
}

#[test]
fn test_wrong_password_returns_no_bytes() {
    let alice = common::alice();
    let wrapped = wrap_private_key(&alice.private_key, "Str0ngPass!").unwrap();

    let result = unwrap_private_key(&wrapped, "wrong");
    assert!(matches!(result, Err(ShareVaultError::InvalidPassword)));
}

#[test]
fn test_corrupted_wrap_indistinguishable_from_wrong_password() {
    let alice = common::alice();
    let mut wrapped = wrap_private_key(&alice.private_key, "Str0ngPass!").unwrap();
    wrapped.salt[0] ^= 0x80;

    let corrupted = unwrap_private_key(&wrapped, "Str0ngPass!").unwrap_err();
    let wrong = unwrap_private_key(&wrapped, "wrong").unwrap_err();
    assert_eq!(corrupted.to_string(), wrong.to_string());
}

#[test]
fn test_wrapped_key_survives_json() {
    let alice = common::alice();
    let wrapped = wrap_private_key(&alice.private_key, "Str0ngPass!").unwrap();

    let json = serde_json::to_string(&wrapped.to_encoded()).unwrap();
    let encoded: EncodedWrappedKey = serde_json::from_str(&json).unwrap();
    let reloaded = WrappedPrivateKey::from_encoded(&encoded).unwrap();

    let recovered: PrivateKey = unwrap_private_key(&reloaded, "Str0ngPass!").unwrap();
    assert_eq!(recovered, alice.private_key);
}

#[test]
fn test_malformed_encoded_fields_rejected() {
    let alice = common::alice();
    let mut encoded = wrap_private_key(&alice.private_key, "Str0ngPass!")
        .unwrap()
        .to_encoded();
    encoded.iv = "AAAA".into();
    assert!(matches!(
        WrappedPrivateKey::from_encoded(&encoded),
        Err(ShareVaultError::Encoding("iv"))
    ));
}

proptest! {
    // Each case runs PBKDF2 three times at 100k iterations.
    #![proptest_config(ProptestConfig::with_cases(4))]

    #[test]
    fn only_the_wrapping_password_unwraps(pw1 in "\\PC{1,24}", pw2 in "\\PC{1,24}") {
        prop_assume!(pw1 != pw2);
        let alice = common::alice();
        let wrapped = wrap_private_key(&alice.private_key, &pw1).unwrap();

        prop_assert!(unwrap_private_key(&wrapped, &pw1).is_ok());
        prop_assert!(matches!(
            unwrap_private_key(&wrapped, &pw2),
            Err(ShareVaultError::InvalidPassword)
        ));
    }
}
