//! End-to-end properties of the envelope core: round trips, uniqueness,
//! tamper and wrong-key detection, and input rejection.

use envelope::{
    decrypt, encrypt, generate_master_key, load_master_key, validate_secure_record, EncryptInput,
    ErrorKind, SecureRecord,
};
use serde_json::{json, Map, Value};

fn key() -> envelope::MasterKey {
    generate_master_key().unwrap()
}

fn round_trip(payload: Value) {
    let mk = key();
    let input = EncryptInput::new("party_rt", payload.clone());
    let record = encrypt(&input, mk.as_bytes()).unwrap();
    let result = decrypt(&record, mk.as_bytes()).unwrap();
    assert_eq!(result.party_id, "party_rt");
    assert_eq!(result.payload, payload);
}

/// Flip one bit of a hex-encoded field and return the re-encoded string.
fn flip_bit(hex_field: &str, bit: usize) -> String {
    let mut bytes = hex::decode(hex_field).unwrap();
    bytes[bit / 8] ^= 1 << (bit % 8);
    hex::encode(bytes)
}

fn field_mut<'a>(record: &'a mut SecureRecord, name: &str) -> &'a mut String {
    match name {
        "payload_ct" => &mut record.payload_ct,
        "payload_tag" => &mut record.payload_tag,
        "dek_wrapped" => &mut record.dek_wrapped,
        "dek_wrap_tag" => &mut record.dek_wrap_tag,
        other => panic!("unknown field {other}"),
    }
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn round_trips_assorted_payloads() {
    round_trip(json!({}));
    round_trip(json!({"amount": 100, "currency": "AED"}));
    round_trip(json!({
        "nested": {"deep": {"deeper": [1, 2, {"x": null}]}},
        "flags": [true, false],
        "none": null,
        "float": 1.5,
        "negative": -42,
        "big": 9007199254740993u64,
    }));
    round_trip(json!({"text": "مرحبا — 你好 — 🚀", "emoji_key_🔑": "ok"}));
}

#[test]
fn round_trips_thousand_keys() {
    let mut map = Map::new();
    for i in 0..1000 {
        map.insert(format!("key_{i}"), json!(i));
    }
    round_trip(Value::Object(map));
}

#[test]
fn record_survives_json_storage() {
    let mk = key();
    let record = encrypt(&EncryptInput::new("p", json!({"a": 1})), mk.as_bytes()).unwrap();
    let stored = serde_json::to_string(&record).unwrap();
    let loaded: SecureRecord = serde_json::from_str(&stored).unwrap();
    assert_eq!(decrypt(&loaded, mk.as_bytes()).unwrap().payload, json!({"a": 1}));

    let untyped: Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(validate_secure_record(&untyped).unwrap(), record);
}

// ---------------------------------------------------------------------------
// Uniqueness
// ---------------------------------------------------------------------------

#[test]
fn same_input_encrypts_differently() {
    let mk = key();
    let input = EncryptInput::new("p", json!({"amount": 1}));
    let a = encrypt(&input, mk.as_bytes()).unwrap();
    let b = encrypt(&input, mk.as_bytes()).unwrap();
    assert_ne!(a.id, b.id);
    assert_ne!(a.payload_nonce, b.payload_nonce);
    assert_ne!(a.payload_ct, b.payload_ct);
    assert_ne!(a.dek_wrap_nonce, b.dek_wrap_nonce);
    assert_ne!(a.dek_wrapped, b.dek_wrapped);
}

// ---------------------------------------------------------------------------
// Tamper and wrong-key detection
// ---------------------------------------------------------------------------

#[test]
fn every_single_bit_flip_is_detected() {
    let mk = key();
    let record = encrypt(
        &EncryptInput::new("p", json!({"amount": 100, "currency": "AED"})),
        mk.as_bytes(),
    )
    .unwrap();

    for name in ["payload_ct", "payload_tag", "dek_wrapped", "dek_wrap_tag"] {
        let bits = field_mut(&mut record.clone(), name).len() * 4;
        for bit in 0..bits {
            let mut tampered = record.clone();
            let slot = field_mut(&mut tampered, name);
            *slot = flip_bit(slot, bit);
            let err = decrypt(&tampered, mk.as_bytes()).unwrap_err();
            assert_eq!(
                err.kind(),
                ErrorKind::Authentication,
                "bit {bit} of {name} was not detected"
            );
        }
    }
}

#[test]
fn wrong_master_key_is_authentication_failure() {
    let record = encrypt(&EncryptInput::new("p", json!({"a": 1})), key().as_bytes()).unwrap();
    let err = decrypt(&record, key().as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(err.is_security_event());
}

#[test]
fn wrong_key_and_tampering_are_indistinguishable() {
    let mk = key();
    let record = encrypt(&EncryptInput::new("p", json!({"a": 1})), mk.as_bytes()).unwrap();

    let wrong_key = decrypt(&record, key().as_bytes()).unwrap_err();
    let mut tampered = record.clone();
    tampered.payload_tag = flip_bit(&tampered.payload_tag, 0);
    let tampered = decrypt(&tampered, mk.as_bytes()).unwrap_err();

    assert_eq!(wrong_key.kind(), tampered.kind());
    assert_eq!(wrong_key.to_string(), tampered.to_string());
}

// ---------------------------------------------------------------------------
// Length / format / input rejection
// ---------------------------------------------------------------------------

#[test]
fn one_byte_nonce_is_validation_error() {
    let mk = key();
    let mut record = encrypt(&EncryptInput::new("p", json!({"a": 1})), mk.as_bytes()).unwrap();
    record.payload_nonce = "aa".into();
    assert_eq!(
        decrypt(&record, mk.as_bytes()).unwrap_err().kind(),
        ErrorKind::Validation
    );
}

#[test]
fn malformed_master_key_strings_rejected() {
    for bad in ["a".repeat(62), "a".repeat(66), format!("g{}", "0".repeat(63))] {
        let err = load_master_key(&bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyManagement);
    }
}

#[test]
fn invalid_encrypt_inputs_rejected() {
    let mk = key();
    let cases = [
        EncryptInput::new("", json!({"a": 1})),
        EncryptInput::new("p", Value::Null),
        EncryptInput::new("p", json!([1, 2, 3])),
    ];
    for input in cases {
        let err = encrypt(&input, mk.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_calls_are_independent() {
    let mk = key();
    std::thread::scope(|s| {
        for t in 0..8 {
            let mk = &mk;
            s.spawn(move || {
                for i in 0..25 {
                    let payload = json!({"thread": t, "i": i});
                    let record =
                        encrypt(&EncryptInput::new(format!("p{t}"), payload.clone()), mk.as_bytes())
                            .unwrap();
                    let result = decrypt(&record, mk.as_bytes()).unwrap();
                    assert_eq!(result.payload, payload);
                    assert_eq!(result.party_id, format!("p{t}"));
                }
            });
        }
    });
}
