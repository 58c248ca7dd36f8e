use tlcodec_wire::WireError;

/// Failure of one encode or decode call.
///
/// Terminal for the value being processed; the engine stays usable.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("unknown magic #{magic:08x} for `{type_name}`")]
    UnknownMagic { type_name: String, magic: u32 },

    #[error("value matches no constructor of `{type_name}` (found `{found}`)")]
    InvalidConstructor { type_name: String, found: String },

    #[error("field `{field}` of `{constructor}` disagrees with its field mask")]
    MissingRequiredField { constructor: String, field: String },

    #[error("forwarded function `{callee}` is not registered")]
    UnknownForwardedFunction { callee: String },

    #[error(transparent)]
    InsufficientData(#[from] WireError),

    #[error("`{field}`: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("`{field}`: array has {actual} elements, expected {expected}")]
    ArrayLengthMismatch {
        field: String,
        expected: u32,
        actual: usize,
    },

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("`{field}`: {count} array elements exceed the limit of {limit}")]
    ElementLimitExceeded { field: String, count: u32, limit: u32 },

    #[error("recursion limit {0} exceeded")]
    RecursionLimitExceeded(u32),

    #[error("`{field}`: type parameter `{param}` is not bound")]
    UnboundParameter { field: String, param: String },
}
