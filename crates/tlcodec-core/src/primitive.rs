//! Builtin wire primitives.
//!
//! Every schema carries one builtin TypeDef per primitive. Builtins have a
//! single constructor, so they are always bare and never write a magic.

/// Wire primitive kinds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Primitive {
    /// `#` - unsigned 32-bit natural, used for counts and field masks.
    Nat = 0,
    /// `int` - signed 32-bit integer.
    Int = 1,
    /// `long` - signed 64-bit integer.
    Long = 2,
    /// `double` - IEEE 754 binary64.
    Double = 3,
    /// `string` - length-prefixed UTF-8 text.
    String = 4,
    /// `bytes` - length-prefixed raw bytes.
    Bytes = 5,
}

impl Primitive {
    /// All primitives in builtin TypeId order.
    pub const ALL: [Primitive; 6] = [
        Self::Nat,
        Self::Int,
        Self::Long,
        Self::Double,
        Self::String,
        Self::Bytes,
    ];

    /// Name used when the primitive is referenced inside a declaration (`int`, `#`).
    pub fn tl_name(self) -> &'static str {
        match self {
            Self::Nat => "#",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }

    /// Name of the builtin TypeDef (`Int`, `#`).
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Nat => "#",
            Self::Int => "Int",
            Self::Long => "Long",
            Self::Double => "Double",
            Self::String => "String",
            Self::Bytes => "Bytes",
        }
    }

    /// Resolve a reference name, accepting both `int` and `Int` spellings.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.tl_name() == name || p.type_name() == name)
    }
}
