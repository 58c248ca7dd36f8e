use std::fmt;

/// One broken schema invariant, located by `Type.constructor.field`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub location: String,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.kind)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ViolationKind {
    #[error("duplicate field index {0}")]
    DuplicateIndex(u32),

    #[error("mask refers to `{0}`, which is not an earlier argument")]
    MaskNotEarlier(String),

    #[error("mask argument `{0}` must be a required natural")]
    MaskNotNat(String),

    #[error("mask bit {0} is out of range")]
    MaskBitRange(u8),

    #[error("natural variable refers to `{0}`, which is not an earlier natural argument")]
    BadNatVar(String),

    #[error("type parameter {0} is out of range")]
    BadTypeVar(usize),

    #[error("`{ty}` expects {expected} type arguments, got {found}")]
    ArityMismatch {
        ty: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {position} of `{ty}` must be a {expected}")]
    ParamKindMismatch {
        ty: String,
        position: usize,
        expected: &'static str,
    },

    #[error("forwarded argument must name a type parameter")]
    ForwardedNotTypeVar,

    #[error("field type is a natural literal or variable")]
    NatAsFieldType,

    #[error("array count must be a natural")]
    ArrayCountNotNat,

    #[error("array item must be a type")]
    ArrayItemNotType,

    #[error("type has no constructors")]
    NoConstructors,

    #[error("default constructor on a type with a single constructor")]
    DefaultOnBare,

    #[error("magic #{0:08x} is used by more than one constructor")]
    DuplicateMagic(u32),

    #[error("magic #{magic:08x} is also used by `{other}`")]
    DuplicateFunctionMagic { magic: u32, other: String },

    #[error("constructor parameters do not match the type parameters")]
    ParamsMismatch,

    #[error("unknown type id {0}")]
    UnknownType(u32),
}

/// Error produced while compiling a schema.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    #[error("schema verification failed with {} violations", .0.len())]
    Invalid(Vec<Violation>),
}

impl CompileError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid(v) => v,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
