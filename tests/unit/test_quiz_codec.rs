//! Unit tests for the quiz payload obfuscation codec.

use puzzle_panda_api::services::quiz_codec;

#[test]
fn encode_decode_round_trip() {
    let plain = "Which planet is known as the Red Planet?";
    let encoded = quiz_codec::encode(plain);
    assert_ne!(encoded, plain);
    assert_eq!(quiz_codec::decode(&encoded).unwrap(), plain);
}

#[test]
fn encode_is_plain_base64() {
    // The obfuscation is deliberately reversible by any base64 decoder.
    assert_eq!(quiz_codec::encode("Paris"), "UGFyaXM=");
}

#[test]
fn decode_rejects_garbage() {
    assert!(quiz_codec::decode("!!not-base64!!").is_err());
}

#[test]
fn handles_unicode_answers() {
    let plain = "කොළඹ";
    assert_eq!(
        quiz_codec::decode(&quiz_codec::encode(plain)).unwrap(),
        plain
    );
}
