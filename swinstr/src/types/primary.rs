#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

/// Represents an integer type with a specific bit width.
///
/// Signeness is not represented here; all integer types are treated as unsigned.
/// Instructions that operate on signed integers will interpret the bits accordingly.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct IType {
    num_bits: u32,
}

impl IType {
    /// Common integer types.
    pub const I1: Self = Self { num_bits: 1 };
    pub const I8: Self = Self { num_bits: 8 };
    pub const I16: Self = Self { num_bits: 16 };
    pub const I32: Self = Self { num_bits: 32 };
    pub const I64: Self = Self { num_bits: 64 };
    pub const I128: Self = Self { num_bits: 128 };
    pub const MIN_BITS: u32 = 1;
    pub const MAX_BITS: u32 = (1 << 23) - 1;

    #[inline]
    const fn check_validity(num_bits: u32) -> bool {
        num_bits >= Self::MIN_BITS && num_bits <= Self::MAX_BITS
    }

    /// Creates a new `IType` with the specified number of bits.
    #[inline]
    pub const fn new(num_bits: u32) -> Option<Self> {
        if Self::check_validity(num_bits) {
            Some(Self { num_bits })
        } else {
            None
        }
    }

    /// Returns the number of bits of the integer type.
    #[inline]
    pub const fn num_bits(&self) -> u32 {
        self.num_bits
    }

    /// Returns the maximum value that can be represented by this integer type.
    ///
    /// Notice that this maximum value is itself limited to u64, for bigger integers
    /// we simply return `None`.
    #[inline]
    pub const fn max_value(&self) -> Option<u64> {
        if self.num_bits > 64 {
            None
        } else if self.num_bits == 64 {
            Some(u64::MAX)
        } else {
            Some((1u64 << self.num_bits) - 1)
        }
    }
}

impl std::fmt::Display for IType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "i{}", self.num_bits)
    }
}

/// Represents a floating-point type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FType {
    /// 16-bit floating point value (IEEE-754 binary16)
    /// Also known as "half precision".
    Fp16,

    /// 16-bit "brain" floating point value (7-bit significand). Provide
    /// the same number of exponent bits as `FType::Fp32`, so that it matches the
    /// dynamic range but with greatly reduced precision.
    Bf16,

    /// 32-bit floating point value (IEEE-754 binary32)
    /// Also known as "single precision".
    /// Corresponds to Rust's `f32` type and C's `float`.
    Fp32,

    /// 64-bit floating point value (IEEE-754 binary64)
    /// Also known as "double precision".
    /// Corresponds to Rust's `f64` type and C's `double`.
    Fp64,

    /// 128-bit floating point value (IEEE-754 binary128)
    /// Also known as "quadruple precision".
    Fp128,

    /// 80-bit floating point value (X87 extended precision)
    /// This is C's `long double` on x86 targets.
    X86Fp80,

    /// 128-bit floating point value (two 64-bit values)
    PPCFp128,
}

impl FType {
    /// Storage width in bits.
    pub const fn bit_width(&self) -> u32 {
        match self {
            FType::Fp16 | FType::Bf16 => 16,
            FType::Fp32 => 32,
            FType::Fp64 => 64,
            FType::X86Fp80 => 80,
            FType::Fp128 | FType::PPCFp128 => 128,
        }
    }

    /// Number of significand bits (including the implicit one).
    pub const fn significand_bits(&self) -> u32 {
        match self {
            FType::Fp16 => 11,
            FType::Bf16 => 8,
            FType::Fp32 => 24,
            FType::Fp64 => 53,
            FType::X86Fp80 => 64,
            FType::PPCFp128 => 106,
            FType::Fp128 => 113,
        }
    }

    /// Returns `true` if every value of `self` is exactly representable in `other`.
    pub const fn widens_to(&self, other: FType) -> bool {
        match (self, other) {
            (FType::Bf16, FType::Fp16) | (FType::Fp16, FType::Bf16) => false,
            _ => self.significand_bits() <= other.significand_bits(),
        }
    }
}

impl std::fmt::Display for FType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FType::Fp16 => "half",
            FType::Bf16 => "bfloat",
            FType::Fp32 => "float",
            FType::Fp64 => "double",
            FType::Fp128 => "fp128",
            FType::X86Fp80 => "x86_fp80",
            FType::PPCFp128 => "ppc_fp128",
        };
        write!(f, "{}", s)
    }
}

/// Pointer type is represented as a primary basic type.
///
/// Pointers are opaque and do not have an associated pointee type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PtrType;

impl std::fmt::Display for PtrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ptr")
    }
}

/// Represents any primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PrimaryType {
    Int(IType),
    Float(FType),
    Ptr(PtrType),
}

macro_rules! primary_type_from {
    ($typ:ty, $lbl:ident) => {
        impl From<$typ> for PrimaryType {
            fn from(value: $typ) -> Self {
                PrimaryType::$lbl(value)
            }
        }
    };
}

primary_type_from! { IType, Int }
primary_type_from! { FType, Float }
primary_type_from! { PtrType, Ptr }

impl std::fmt::Display for PrimaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimaryType::Int(itype) => write!(f, "{}", itype),
            PrimaryType::Float(ftype) => write!(f, "{}", ftype),
            PrimaryType::Ptr(ptr_type) => write!(f, "{}", ptr_type),
        }
    }
}
