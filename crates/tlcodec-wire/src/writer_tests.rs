use crate::{WireError, Writer};

fn hex_words(bytes: &[u8]) -> String {
    bytes
        .chunks(4)
        .map(|w| w.iter().map(|b| format!("{b:02x}")).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn scalars_are_little_endian() {
    let mut w = Writer::new();
    w.write_nat(1);
    w.write_int(-2);
    w.write_long(0x0102_0304_0506_0708);
    w.write_magic(0x1cb5_c415);

    insta::assert_snapshot!(hex_words(w.as_bytes()), @"01000000 feffffff 08070605 04030201 15c4b51c");
}

#[test]
fn double_layout() {
    let mut w = Writer::new();
    w.write_double(1.0);

    assert_eq!(w.as_bytes(), &1.0f64.to_le_bytes());
}

#[test]
fn short_string_is_padded() {
    let mut w = Writer::new();
    w.write_string("abc").unwrap();
    w.write_string("hello").unwrap();
    w.write_string("").unwrap();

    insta::assert_snapshot!(hex_words(w.as_bytes()), @"03616263 0568656c 6c6f0000 00000000");
}

#[test]
fn long_bytes_use_four_byte_header() {
    let payload = vec![0xAA; 254];
    let mut w = Writer::new();
    w.write_bytes(&payload).unwrap();

    let out = w.as_bytes();
    assert_eq!(&out[..4], &[0xFE, 0xFE, 0x00, 0x00]);
    assert_eq!(out.len(), 260);
    assert!(out[258..].iter().all(|&b| b == 0));
}

#[test]
fn boundary_length_keeps_short_header() {
    let payload = vec![1u8; 253];
    let mut w = Writer::new();
    w.write_bytes(&payload).unwrap();

    assert_eq!(w.as_bytes()[0], 253);
    assert_eq!(w.len(), 256);
}

#[test]
fn oversized_payload_rejected() {
    let payload = vec![0u8; 0x0100_0000];
    let mut w = Writer::new();

    assert_eq!(
        w.write_bytes(&payload),
        Err(WireError::PayloadTooLong { len: 0x0100_0000 })
    );
    assert!(w.is_empty());
}

#[test]
fn truncate_discards_partial_output() {
    let mut w = Writer::new();
    w.write_nat(7);
    let len = w.len();
    w.write_long(9);
    w.truncate(len);

    assert_eq!(w.into_bytes(), vec![7, 0, 0, 0]);
}
