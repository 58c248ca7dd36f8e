/// Failure while reading or writing wire primitives.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("insufficient data at offset {offset}: need {needed} bytes, {remaining} remaining")]
    InsufficientData {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("malformed length header at offset {offset}")]
    MalformedString { offset: usize },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("payload of {len} bytes exceeds the 3-byte length limit")]
    PayloadTooLong { len: usize },
}
