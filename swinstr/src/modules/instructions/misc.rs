use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::{EnumIs, EnumTryAs};

use crate::{
    modules::{
        instructions::{Instruction, InstructionFlags},
        operand::{Label, Name, Operand},
    },
    types::primary::PrimaryType,
};

bitflags! {
    /// Attributes attached to an individual call site.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct CallFlags: u8 {
        /// The call must not be recognized as a call to a built-in library
        /// routine, even if the callee symbol matches one (C's `-fno-builtin`).
        const NO_BUILTIN = 1 << 0;

        /// The call is a tail call candidate.
        const TAIL = 1 << 1;
    }
}

/// Target of a call.
#[derive(Debug, Clone, Hash, PartialEq, Eq, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Callee {
    /// Direct call to a named function (defined in the module or external).
    Symbol(String),
    /// Call through a function pointer.
    Indirect(Operand),
}

impl Callee {
    pub fn operand(&self) -> Option<&Operand> {
        match self {
            Callee::Symbol(_) => None,
            Callee::Indirect(operand) => Some(operand),
        }
    }

    pub fn operand_mut(&mut self) -> Option<&mut Operand> {
        match self {
            Callee::Symbol(_) => None,
            Callee::Indirect(operand) => Some(operand),
        }
    }
}

/// Function call instruction
///
/// Calls always resume at the next instruction; a callee that cannot complete
/// either returns an error code or never returns (e.g., abort).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Invoke {
    /// The destination SSA name for the return value, if any.
    pub dest: Option<Name>,

    /// The return type of the function being called. `None` for `void` functions.
    pub ty: Option<PrimaryType>,

    /// The function being called.
    pub callee: Callee,

    /// The argument operands to pass to the function.
    pub args: SmallVec<Operand, 2>,

    /// Call-site attributes.
    pub flags: CallFlags,
}

impl Invoke {
    /// Name of the called function for direct calls.
    pub fn symbol(&self) -> Option<&str> {
        match &self.callee {
            Callee::Symbol(name) => Some(name.as_str()),
            Callee::Indirect(_) => None,
        }
    }

    /// Returns the `index`-th call argument.
    pub fn arg(&self, index: usize) -> Option<&Operand> {
        self.args.get(index)
    }

    #[inline]
    pub fn is_no_builtin(&self) -> bool {
        self.flags.contains(CallFlags::NO_BUILTIN)
    }
}

impl Instruction for Invoke {
    fn flags(&self) -> InstructionFlags {
        InstructionFlags::MEMORY
    }

    fn operands(&self) -> impl Iterator<Item = &Operand> {
        self.callee.operand().into_iter().chain(self.args.iter())
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        self.callee
            .operand_mut()
            .into_iter()
            .chain(self.args.iter_mut())
    }

    fn destination(&self) -> Option<Name> {
        self.dest
    }

    fn set_destination(&mut self, name: Name) {
        // Cannot change a void return to a non-void return
        if self.dest.is_some() {
            self.dest = Some(name);
        }
    }

    fn destination_type(&self) -> Option<PrimaryType> {
        self.ty
    }
}

/// Phi instruction
///
/// This instruction selects a value based on control flow. It is used to merge
/// values coming from different basic blocks. It should always be placed at the
/// beginning of a basic block.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Phi {
    /// The destination SSA name for the result of the phi instruction.
    pub dest: Name,

    /// The type of the value being selected.
    pub ty: PrimaryType,

    /// The incoming values and their corresponding predecessor basic blocks.
    pub values: Vec<(Label, Operand)>,
}

impl Instruction for Phi {
    fn flags(&self) -> InstructionFlags {
        InstructionFlags::SIMPLE
    }

    fn operands(&self) -> impl Iterator<Item = &Operand> {
        self.values.iter().map(|(_, op)| op)
    }

    fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        self.values.iter_mut().map(|(_, op)| op)
    }

    fn destination(&self) -> Option<Name> {
        Some(self.dest)
    }

    fn set_destination(&mut self, name: Name) {
        self.dest = name;
    }

    fn destination_type(&self) -> Option<PrimaryType> {
        Some(self.ty)
    }
}

/// Conversion operation performed by a [`Cast`].
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CastOp {
    /// Unsigned integer to floating point.
    UiToFp,
    /// Signed integer to floating point.
    SiToFp,
    /// Floating point to a wider floating point.
    FpExt,
    /// Floating point to a narrower floating point.
    FpTrunc,
    /// Floating point to unsigned integer.
    FpToUi,
    /// Floating point to signed integer.
    FpToSi,
}

impl CastOp {
    pub fn to_str(&self) -> &'static str {
        match self {
            CastOp::UiToFp => "uitofp",
            CastOp::SiToFp => "sitofp",
            CastOp::FpExt => "fpext",
            CastOp::FpTrunc => "fptrunc",
            CastOp::FpToUi => "fptoui",
            CastOp::FpToSi => "fptosi",
        }
    }

    /// Returns `true` for the integer to floating-point conversions.
    pub fn is_int_to_fp(&self) -> bool {
        matches!(self, CastOp::UiToFp | CastOp::SiToFp)
    }
}

/// Type conversion instruction
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cast {
    pub dest: Name,
    pub op: CastOp,
    pub value: Operand,
    /// Type of `value`.
    pub from: PrimaryType,
    /// Type of the result.
    pub to: PrimaryType,
}

impl Instruction for Cast {
    fn flags(&self) -> InstructionFlags {
        InstructionFlags::SIMPLE
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
        Some(self.to)
    }
}
