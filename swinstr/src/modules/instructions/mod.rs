use auto_enums::auto_enum;
use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumDiscriminants, EnumIs, EnumTryAs};

use crate::{
    modules::operand::{Name, Operand},
    types::primary::PrimaryType,
};

pub mod fp;
pub mod int;
pub mod misc;

bitflags! {
    /// Flags providing additional information about instructions, such as
    /// whether an instruction has side-effects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InstructionFlags: u32 {
        /// Instruction defined are simple which is a weaker form of having no side-effects.
        ///
        /// A "simple" instruction could be freely duplicated and removing a
        /// duplicated simple instruction would not change the program semantics.
        ///
        /// 1. Invoke instructions are not simple as they may have side-effects
        ///    (including writing to a global error indicator).
        /// 2. Phi instructions are considered simple as they are just SSA value selectors.
        /// 3. All arithmetic, logical and conversion instructions are considered simple.
        const SIMPLE = 1 << 1;

        /// This instruction is an arithmetic operation
        ///
        /// Used to group both integer and floating-point arithmetic instructions.
        const ARITHMETIC = 1 << 6;

        /// This instruction is a integer arithmetic operation
        const ARITHMETIC_INT = Self::ARITHMETIC.bits() | (1 << 7);

        /// This instruction is a floating-point arithmetic operation
        ///
        /// This includes all FP arithmetic and FP comparison instructions (e.g., fadd, fcmp)
        const ARITHMETIC_FP = Self::ARITHMETIC.bits() | (1 << 8);

        /// This instruction is *potentially* affecting or accessing memory state.
        /// This regroups function calls.
        const MEMORY = 1 << 9;
    }
}

/// Common interface implemented by every instruction node.
///
/// This trait provides lightweight, zero‑allocation iteration over an
/// instruction's input operands and exposes its optional destination SSA
/// name when present.
pub trait Instruction {
    fn flags(&self) -> InstructionFlags;

    /// Returns true if this instruction is "simple", see [`InstructionFlags::SIMPLE`].
    #[inline]
    fn is_simple(&self) -> bool {
        self.flags().contains(InstructionFlags::SIMPLE)
    }

    /// Iterate over all input operands for this instruction.
    fn operands(&self) -> impl Iterator<Item = &Operand>;

    /// Mutably iterate over all input operands for this instruction.
    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand>;

    /// Return the destination SSA name if the instruction produces a result.
    fn destination(&self) -> Option<Name> {
        None
    }

    /// Type of the destination SSA name if the instruction produces a result.
    fn destination_type(&self) -> Option<PrimaryType> {
        None
    }

    /// Update the destination SSA name for this instruction. No-op if the
    /// instruction does not produce a result.
    fn set_destination(&mut self, _name: Name) {}

    /// Convenience iterator over referenced SSA names (i.e., register
    /// operands). Immediates are ignored.
    fn dependencies(&self) -> impl Iterator<Item = Name> {
        self.operands().filter_map(|op| match op {
            Operand::Reg(reg) => Some(*reg),
            _ => None,
        })
    }
}

/// Discriminated union covering all public instruction kinds.
///
/// Use this enum to store heterogeneous instruction streams and to pattern‑match
/// on specific operations. The generated `SwInstrOp` discriminant (via
/// `strum`) can be helpful for fast classification.
#[derive(Debug, Clone, Hash, PartialEq, Eq, EnumIs, EnumTryAs, EnumDiscriminants)]
#[strum_discriminants(name(SwInstrOp))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SwInstr {
    // Floating-point instructions
    FAdd(fp::FAdd),
    FSub(fp::FSub),
    FMul(fp::FMul),
    FDiv(fp::FDiv),
    FNeg(fp::FNeg),
    FCmp(fp::FCmp),

    // Bitwise instructions
    IOr(int::IOr),

    // Misc instructions
    Cast(misc::Cast),
    Invoke(misc::Invoke),
    Phi(misc::Phi),
}

impl SwInstrOp {
    /// Return the canonical mnemonic used when printing this instruction.
    pub fn opname(&self) -> &'static str {
        match self {
            SwInstrOp::FAdd => "fadd",
            SwInstrOp::FSub => "fsub",
            SwInstrOp::FMul => "fmul",
            SwInstrOp::FDiv => "fdiv",
            SwInstrOp::FNeg => "fneg",
            SwInstrOp::FCmp => "fcmp",
            SwInstrOp::IOr => "or",
            SwInstrOp::Cast => "cast",
            SwInstrOp::Invoke => "call",
            SwInstrOp::Phi => "phi",
        }
    }
}

impl SwInstr {
    /// Return the discriminant for this instruction value.
    pub fn op(&self) -> SwInstrOp {
        self.into()
    }
}

macro_rules! define_instr_any_instr {
    (
        $($variant:ident),* $(,)?
    ) => {
        impl Instruction for SwInstr {
            fn flags(&self) -> InstructionFlags {
                match self {
                    $(
                        SwInstr::$variant(instr) => instr.flags(),
                    )*
                }
            }

            #[auto_enum(Iterator)]
            fn operands(&self) -> impl Iterator<Item = &Operand> {
                match self {
                    $(
                        SwInstr::$variant(instr) => instr.operands(),
                    )*
                }
            }

            #[auto_enum(Iterator)]
            fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
                match self {
                    $(
                        SwInstr::$variant(instr) => instr.operands_mut(),
                    )*
                }
            }

            fn destination(&self) -> Option<Name> {
                match self {
                    $(
                        SwInstr::$variant(instr) => instr.destination(),
                    )*
                }
            }

            fn set_destination(&mut self, name: Name) {
                match self {
                    $(
                        SwInstr::$variant(instr) => instr.set_destination(name),
                    )*
                }
            }

            fn destination_type(&self) -> Option<PrimaryType> {
                match self {
                    $(
                        SwInstr::$variant(instr) => instr.destination_type(),
                    )*
                }
            }
        }
    };
}

define_instr_any_instr! {
    FAdd,
    FSub,
    FMul,
    FDiv,
    FNeg,
    FCmp,
    IOr,
    Cast,
    Invoke,
    Phi,
}

macro_rules! define_swinstr_from {
    ($typ:ty, $variant:ident) => {
        impl From<$typ> for SwInstr {
            fn from(inst: $typ) -> Self {
                SwInstr::$variant(inst)
            }
        }
    };
}

define_swinstr_from!(fp::FAdd, FAdd);
define_swinstr_from!(fp::FSub, FSub);
define_swinstr_from!(fp::FMul, FMul);
define_swinstr_from!(fp::FDiv, FDiv);
define_swinstr_from!(fp::FNeg, FNeg);
define_swinstr_from!(fp::FCmp, FCmp);

define_swinstr_from!(int::IOr, IOr);

define_swinstr_from!(misc::Cast, Cast);
define_swinstr_from!(misc::Invoke, Invoke);
define_swinstr_from!(misc::Phi, Phi);
