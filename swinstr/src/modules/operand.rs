//! Shared operand types for instructions.
//!
//! An instruction operand can be a reference to another SSA value (`Reg`)
//! or an immediate constant (`Imm`). Code labels only appear in terminators
//! and phi nodes.
use crate::consts::{AnyConst, fp::FConst, int::IConst};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

/// SSA value identifier used to name the destination or reference another
/// instruction's result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Name(pub u32);

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Represents a code label used as a target for control‑flow instructions.
///
/// Labels and control-flow may not cross function boundaries. Thus, labels are
/// only valid within the function they are defined in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Label(pub u32);

impl Label {
    pub const NIL: Label = Label(0);

    /// Returns true if this is the "nil" label (i.e., label 0).
    ///
    /// This label is reserved as the 'function entry' label. It should always be present.
    pub fn is_nil(&self) -> bool {
        self == &Label::NIL
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "label %block_{}", self.0)
        } else {
            write!(f, "%block_{}", self.0)
        }
    }
}

/// Instruction operand.
#[derive(Clone, Debug, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operand {
    /// Reference to a previously defined SSA value.
    Reg(Name),
    /// Immediate literal (integer or floating‑point).
    Imm(AnyConst),
}

impl From<Name> for Operand {
    fn from(name: Name) -> Self {
        Operand::Reg(name)
    }
}

impl From<FConst> for Operand {
    fn from(value: FConst) -> Self {
        Operand::Imm(AnyConst::Float(value))
    }
}

impl From<IConst> for Operand {
    fn from(value: IConst) -> Self {
        Operand::Imm(AnyConst::Int(value))
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Reg(name) => write!(f, "{}", name),
            Operand::Imm(constant) => write!(f, "{}", constant),
        }
    }
}
