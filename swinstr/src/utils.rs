use strum::{EnumIs, EnumTryAs};
use thiserror::Error;

use crate::modules::operand::{Label, Name};

#[derive(Debug, PartialEq, Eq, Hash, EnumIs, EnumTryAs, Error)]
pub enum Error {
    /// Several instructions define the same SSA name.
    #[error(
        "Multiple operations with shared destination target violate SSA requirements. The name `{duplicate}` is defined more than once within the same function."
    )]
    DuplicateSSAName { duplicate: Name },

    /// No basic block with the entrypoint label was found.
    #[error(
        "By convention, the entrypoint basic block of a function must have label `%block_0`. No such basic block was found."
    )]
    MissingEntryBlock,

    /// An operand refers to an unresolved name.
    #[error(
        "A operand refers to an undefined name: `{undefined}`. This name was never defined in the function."
    )]
    UndefinedSSAName { undefined: Name },

    /// Phi instructions must be the first instructions or following other phi instructions in a basic block.
    #[error(
        "Phi instructions must be the first instructions in a basic block or follow other phi instructions. The basic block `{block}` contains a phi instruction that is not the first instruction."
    )]
    PhiNotFirstInstruction { block: Label },

    /// A phi lists an incoming block that does not branch to the phi's block.
    #[error(
        "A phi instruction in basic block `{block}` has an incoming value for `{predecessor}` which is not a predecessor of `{block}`."
    )]
    UnknownPhiPredecessor { block: Label, predecessor: Label },

    /// The basic block referenced cannot be found within the function.
    #[error(
        "The basic block `{label}` referenced in function `{function}` is not defined within the function."
    )]
    UndefinedBasicBlock { function: String, label: Label },

    /// An instruction handle points past the end of its block.
    #[error("No instruction at index {index} of basic block `{block}`.")]
    InstructionOutOfBounds { block: Label, index: usize },

    /// A block cannot be split in the middle of its leading phi instructions.
    #[error("Basic block `{block}` cannot be split before index {index}, which lies within its phi instructions.")]
    InvalidSplitPoint { block: Label, index: usize },

    /// A value is used at a point its definition does not dominate.
    #[error("The use of `{name}` in basic block `{block}` is not dominated by its definition.")]
    UseNotDominated { name: Name, block: Label },
}
