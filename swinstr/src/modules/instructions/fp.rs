//! Floating‑point instructions
//!
//! IEEE‑754 oriented arithmetic operations and comparisons. Each instruction
//! specifies its destination `Name`, the floating‑point type of its operands,
//! and input operands.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{
    modules::{
        instructions::{Instruction, InstructionFlags},
        operand::{Name, Operand},
    },
    types::primary::{FType, IType, PrimaryType},
};

/// Floating-point comparison operations
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FCmpOp {
    /// Ordered and equal (i.e., neither operand is NaN and lhs == rhs)
    Oeq,
    /// Ordered and greater than (i.e., neither operand is NaN and lhs > rhs)
    Ogt,
    /// Ordered and greater than or equal (i.e., neither operand is NaN and lhs >= rhs)
    Oge,
    /// Ordered and less than (i.e., neither operand is NaN and lhs < rhs)
    Olt,
    /// Ordered and less than or equal (i.e., neither operand is NaN and lhs <= rhs)
    Ole,
    /// Ordered and not equal (i.e., neither operand is NaN and lhs != rhs)
    One,
    /// Unordered or equal (i.e., at least one operand is NaN or lhs == rhs)
    Ueq,
    /// Unordered or greater than (i.e., at least one operand is NaN or lhs > rhs)
    Ugt,
    /// Unordered or greater than or equal (i.e., at least one operand is NaN or lhs >= rhs)
    Uge,
    /// Unordered or less than (i.e., at least one operand is NaN or lhs < rhs)
    Ult,
    /// Unordered or less than or equal (i.e., at least one operand is NaN or lhs <= rhs)
    Ule,
    /// Unordered or not equal (i.e., at least one operand is NaN or lhs != rhs)
    Une,
    /// Ordered (i.e., neither operand is NaN)
    Ord,
}

impl FCmpOp {
    /// Mnemonic used when printing the comparison.
    pub fn to_str(&self) -> &'static str {
        match self {
            FCmpOp::Oeq => "oeq",
            FCmpOp::Ogt => "ogt",
            FCmpOp::Oge => "oge",
            FCmpOp::Olt => "olt",
            FCmpOp::Ole => "ole",
            FCmpOp::One => "one",
            FCmpOp::Ueq => "ueq",
            FCmpOp::Ugt => "ugt",
            FCmpOp::Uge => "uge",
            FCmpOp::Ult => "ult",
            FCmpOp::Ule => "ule",
            FCmpOp::Une => "une",
            FCmpOp::Ord => "ord",
        }
    }

    /// Returns `true` for the ordered predicates, which are false whenever an
    /// operand is NaN.
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            FCmpOp::Oeq
                | FCmpOp::Ogt
                | FCmpOp::Oge
                | FCmpOp::Olt
                | FCmpOp::Ole
                | FCmpOp::One
                | FCmpOp::Ord
        )
    }

    /// Evaluate the comparison on concrete values.
    pub fn evaluate(&self, lhs: f64, rhs: f64) -> bool {
        let unordered = lhs.is_nan() || rhs.is_nan();
        match self {
            FCmpOp::Oeq => !unordered && lhs == rhs,
            FCmpOp::Ogt => !unordered && lhs > rhs,
            FCmpOp::Oge => !unordered && lhs >= rhs,
            FCmpOp::Olt => !unordered && lhs < rhs,
            FCmpOp::Ole => !unordered && lhs <= rhs,
            FCmpOp::One => !unordered && lhs != rhs,
            FCmpOp::Ueq => unordered || lhs == rhs,
            FCmpOp::Ugt => unordered || lhs > rhs,
            FCmpOp::Uge => unordered || lhs >= rhs,
            FCmpOp::Ult => unordered || lhs < rhs,
            FCmpOp::Ule => unordered || lhs <= rhs,
            FCmpOp::Une => unordered || lhs != rhs,
            FCmpOp::Ord => !unordered,
        }
    }
}

macro_rules! define_fp_binary {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Hash, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name {
            pub dest: Name,
            pub ty: FType,
            pub lhs: Operand,
            pub rhs: Operand,
        }

        impl Instruction for $name {
            fn flags(&self) -> InstructionFlags {
                InstructionFlags::SIMPLE | InstructionFlags::ARITHMETIC_FP
            }

            fn operands(&self) -> impl Iterator<Item = &Operand> {
                [&self.lhs, &self.rhs].into_iter()
            }

            fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
                [&mut self.lhs, &mut self.rhs].into_iter()
            }

            fn destination(&self) -> Option<Name> {
                Some(self.dest)
            }

            fn set_destination(&mut self, name: Name) {
                self.dest = name;
            }

            fn destination_type(&self) -> Option<PrimaryType> {
                Some(self.ty.into())
            }
        }
    };
}

define_fp_binary! {
    /// Floating-point addition instruction
    FAdd
}

define_fp_binary! {
    /// Floating-point subtraction instruction
    FSub
}

define_fp_binary! {
    /// Floating-point multiplication instruction
    FMul
}

define_fp_binary! {
    /// Floating-point division instruction
    FDiv
}

/// Floating-point negation instruction
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FNeg {
    pub dest: Name,
    pub ty: FType,
    pub value: Operand,
}

impl Instruction for FNeg {
    fn flags(&self) -> InstructionFlags {
        InstructionFlags::SIMPLE | InstructionFlags::ARITHMETIC_FP
    }

    fn operands(&self) -> impl Iterator<Item = &Operand> {
        std::iter::once(&self.value)
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        std::iter::once(&mut self.value)
    }

    fn destination(&self) -> Option<Name> {
        Some(self.dest)
    }

    fn set_destination(&mut self, name: Name) {
        self.dest = name;
    }

    fn destination_type(&self) -> Option<PrimaryType> {
        Some(self.ty.into())
    }
}

/// Floating-point comparison instruction
///
/// `ty` is the type of both operands; the result is always an `i1`.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FCmp {
    pub dest: Name,
    pub ty: FType,
    pub lhs: Operand,
    pub rhs: Operand,
    pub op: FCmpOp,
}

impl Instruction for FCmp {
    fn flags(&self) -> InstructionFlags {
        InstructionFlags::SIMPLE | InstructionFlags::ARITHMETIC_FP
    }

    fn operands(&self) -> impl Iterator<Item = &Operand> {
        [&self.lhs, &self.rhs].into_iter()
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        [&mut self.lhs, &mut self.rhs].into_iter()
    }

    fn destination(&self) -> Option<Name> {
        Some(self.dest)
    }

    fn set_destination(&mut self, name: Name) {
        self.dest = name;
    }

    fn destination_type(&self) -> Option<PrimaryType> {
        Some(IType::I1.into())
    }
}
