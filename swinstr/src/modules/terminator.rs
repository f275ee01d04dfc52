//! Module definitions for control flow instructions.
//!
//! Branching and flow control operations. Each terminator specifies its
//! target labels and input operands as needed.
use auto_enums::auto_enum;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

use crate::modules::operand::{Label, Name, Operand};

/// Relative likelihood of the two outcomes of a conditional branch.
///
/// The probability of taking the true edge is `taken / (taken + not_taken)`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BranchWeights {
    pub taken: u32,
    pub not_taken: u32,
}

impl BranchWeights {
    pub const fn new(taken: u32, not_taken: u32) -> Self {
        Self { taken, not_taken }
    }

    /// Probability of taking the true edge.
    pub fn taken_probability(&self) -> f64 {
        let total = self.taken as f64 + self.not_taken as f64;
        if total == 0.0 {
            0.5
        } else {
            self.taken as f64 / total
        }
    }
}

/// Conditional branch instruction
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CBranch {
    /// The condition operand; should evaluate to a boolean value.
    ///
    /// The condition is evaluated, and if it is true (non-zero), control
    /// transfers to `target_true`; otherwise, it transfers to `target_false`.
    pub cond: Operand,
    /// The label to jump to if the condition is true.
    pub target_true: Label,
    /// The label to jump to if the condition is false.
    pub target_false: Label,
    /// Optional branch-probability hint.
    pub weights: Option<BranchWeights>,
}

/// Unconditional jump instruction
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Jump {
    /// The label to jump to.
    pub target: Label,
}

/// Return from function instruction. Optionally returns a value.
///
/// If `value` is `None`, it indicates a `void` return.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ret {
    pub value: Option<Operand>,
}

/// Trap instruction to indicate an unrecoverable error or exceptional condition.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trap;

/// Control flow terminator instructions
#[derive(Debug, Clone, Hash, PartialEq, Eq, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Terminator {
    CBranch(CBranch),
    Jump(Jump),
    Ret(Ret),
    Trap(Trap),
}

impl Terminator {
    #[auto_enum(Iterator)]
    pub fn operands(&self) -> impl Iterator<Item = &Operand> {
        match self {
            Terminator::CBranch(cbranch) => std::iter::once(&cbranch.cond),
            Terminator::Jump(_) => std::iter::empty(),
            Terminator::Ret(ret) => ret.value.iter(),
            Terminator::Trap(_) => std::iter::empty(),
        }
    }

    #[auto_enum(Iterator)]
    pub fn operands_mut(&mut self) -> impl Iterator<Item = &mut Operand> {
        match self {
            Terminator::CBranch(cbranch) => std::iter::once(&mut cbranch.cond),
            Terminator::Jump(_) => std::iter::empty(),
            Terminator::Ret(ret) => ret.value.iter_mut(),
            Terminator::Trap(_) => std::iter::empty(),
        }
    }

    pub fn dependencies(&self) -> impl Iterator<Item = Name> {
        self.operands().filter_map(|op| match op {
            Operand::Reg(name) => Some(*name),
            _ => None,
        })
    }

    /// Labels of the blocks control may transfer to.
    #[auto_enum(Iterator)]
    pub fn successors(&self) -> impl Iterator<Item = Label> + '_ {
        match self {
            Terminator::CBranch(cbranch) => [cbranch.target_true, cbranch.target_false].into_iter(),
            Terminator::Jump(jump) => std::iter::once(jump.target),
            Terminator::Ret(_) => std::iter::empty(),
            Terminator::Trap(_) => std::iter::empty(),
        }
    }

    /// Redirect every edge going to `from` so that it goes to `to` instead.
    pub fn replace_successor(&mut self, from: Label, to: Label) {
        match self {
            Terminator::CBranch(cbranch) => {
                if cbranch.target_true == from {
                    cbranch.target_true = to;
                }
                if cbranch.target_false == from {
                    cbranch.target_false = to;
                }
            }
            Terminator::Jump(jump) => {
                if jump.target == from {
                    jump.target = to;
                }
            }
            Terminator::Ret(_) | Terminator::Trap(_) => {}
        }
    }
}

impl std::fmt::Display for Terminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Terminator::CBranch(cbranch) => {
                write!(
                    f,
                    "branch {}, {:#}, {:#}",
                    cbranch.cond, cbranch.target_true, cbranch.target_false
                )?;
                if let Some(weights) = cbranch.weights {
                    write!(f, ", !weights({}, {})", weights.taken, weights.not_taken)?;
                }
                Ok(())
            }
            Terminator::Jump(jump) => write!(f, "jump {:#}", jump.target),
            Terminator::Ret(ret) => match &ret.value {
                Some(value) => write!(f, "ret {}", value),
                None => write!(f, "ret void"),
            },
            Terminator::Trap(_) => write!(f, "trap"),
        }
    }
}

macro_rules! define_terminator_from {
    ($typ:ty, $variant:ident) => {
        impl From<$typ> for Terminator {
            fn from(inst: $typ) -> Self {
                Terminator::$variant(inst)
            }
        }
    };
}

define_terminator_from!(CBranch, CBranch);
define_terminator_from!(Jump, Jump);
define_terminator_from!(Ret, Ret);
define_terminator_from!(Trap, Trap);
