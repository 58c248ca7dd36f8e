use crate::{Reader, WireError, Writer};

#[test]
fn reads_what_writer_wrote() {
    let mut w = Writer::new();
    w.write_nat(42);
    w.write_int(-7);
    w.write_long(i64::MIN);
    w.write_double(2.5);
    w.write_string("héllo").unwrap();
    w.write_bytes(&[0u8; 300]).unwrap();
    let bytes = w.into_bytes();

    let mut r = Reader::new(&bytes);
    assert_eq!(r.read_nat(), Ok(42));
    assert_eq!(r.read_int(), Ok(-7));
    assert_eq!(r.read_long(), Ok(i64::MIN));
    assert_eq!(r.read_double(), Ok(2.5));
    assert_eq!(r.read_string(), Ok("héllo"));
    assert_eq!(r.read_bytes().map(<[u8]>::len), Ok(300));
    assert!(r.is_at_end());
}

#[test]
fn short_read_fails_without_advancing() {
    let bytes = [1, 2, 3];
    let mut r = Reader::new(&bytes);

    assert_eq!(
        r.read_nat(),
        Err(WireError::InsufficientData {
            offset: 0,
            needed: 4,
            remaining: 3,
        })
    );
    assert_eq!(r.position(), 0);
}

#[test]
fn truncated_string_restores_position() {
    // Header claims 5 bytes, only 2 follow.
    let bytes = [5, b'a', b'b'];
    let mut r = Reader::new(&bytes);

    assert!(matches!(
        r.read_string(),
        Err(WireError::InsufficientData { .. })
    ));
    assert_eq!(r.position(), 0);
}

#[test]
fn missing_padding_is_insufficient() {
    let bytes = [2, b'h', b'i'];
    let mut r = Reader::new(&bytes);

    assert!(r.read_bytes().is_err());
}

#[test]
fn invalid_length_marker() {
    let bytes = [0xFF, 0, 0, 0];
    let mut r = Reader::new(&bytes);

    assert_eq!(r.read_bytes(), Err(WireError::MalformedString { offset: 0 }));
}

#[test]
fn invalid_utf8() {
    let mut w = Writer::new();
    w.write_bytes(&[0xC3, 0x28]).unwrap();
    let bytes = w.into_bytes();
    let mut r = Reader::new(&bytes);

    assert_eq!(r.read_string(), Err(WireError::InvalidUtf8 { offset: 0 }));
    assert_eq!(r.position(), 0);
}

#[test]
fn mark_and_rewind() {
    let bytes = [1, 0, 0, 0, 2, 0, 0, 0];
    let mut r = Reader::new(&bytes);
    r.read_nat().unwrap();

    let mark = r.mark();
    assert_eq!(r.read_magic(), Ok(2));
    assert_eq!(r.remaining(), 0);

    r.rewind(mark);
    assert_eq!(r.position(), 4);
    assert_eq!(r.read_int(), Ok(2));
}
