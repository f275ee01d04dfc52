//! Instruction IR modules
//!
//! This module groups the building blocks of a function body: instructions,
//! terminators, basic blocks and the functions and modules owning them.
//! Submodules contain families of operations:
//!
//! - `instructions`: floating‑point arithmetic and comparisons, bitwise or,
//!   casts, calls and phi nodes
//! - `terminator`: branches, jumps and returns
//! - `operand`: shared operand, label and SSA name types
//! - `builder`: programmatic construction of functions
//!
//! You typically manipulate instructions via the `SwInstr` enum which is a
//! tagged union of all concrete instruction forms.
use std::collections::{BTreeMap, BTreeSet};

use bitflags::bitflags;
use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    consts::{AnyConst, fp::FConst},
    modules::{
        instructions::{Instruction, SwInstr},
        operand::{Label, Name, Operand},
        terminator::{BranchWeights, CBranch, Jump, Terminator},
    },
    types::primary::{IType, PrimaryType},
    utils::Error,
};

pub mod builder;
pub mod fmt;
pub mod instructions;
pub mod operand;
pub mod terminator;

bitflags! {
    /// Function-level attributes relevant to optimization decisions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct FunctionAttributes: u32 {
        /// Optimize for code size (`-Os`).
        const OPTIMIZE_FOR_SIZE = 1 << 0;
        /// Aggressively minimize code size (`-Oz`).
        const MINIMIZE_SIZE = 1 << 1;
        /// The function is rarely executed.
        const COLD = 1 << 2;
    }
}

impl FunctionAttributes {
    /// Returns `true` if either size attribute is present.
    pub fn optimizes_for_size(&self) -> bool {
        self.intersects(Self::OPTIMIZE_FOR_SIZE | Self::MINIMIZE_SIZE)
    }
}

/// Position of an instruction inside a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InstructionRef {
    pub block: Label,
    pub index: usize,
}

impl InstructionRef {
    pub const fn new(block: Label, index: usize) -> Self {
        Self { block, index }
    }
}

/// Outcome of [`Function::split_block_and_insert_if_then`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SplitBlock {
    /// The block that was split. It now ends with the conditional branch.
    pub head: Label,
    /// The new, initially empty, block executed when the condition holds.
    pub then: Label,
    /// The continuation block holding the instructions from the split point on.
    pub tail: Label,
    /// Index in `head` of the first instruction that moved to `tail`.
    pub split_index: usize,
}

impl SplitBlock {
    /// Translate a handle taken before the split into one valid after it.
    pub fn relocate(&self, at: InstructionRef) -> InstructionRef {
        if at.block == self.head && at.index >= self.split_index {
            InstructionRef::new(self.tail, at.index - self.split_index)
        } else {
            at
        }
    }
}

/// A basic block within a function, containing a sequence of instructions
/// and ending with a control flow terminator.
///
/// `name` is purely informative and is used when printing the function.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BasicBlock {
    pub label: Label,
    pub name: Option<String>,
    pub instructions: Vec<SwInstr>,
    pub terminator: Terminator,
}

impl BasicBlock {
    pub fn new(label: Label, terminator: Terminator) -> Self {
        Self {
            label,
            name: None,
            instructions: Vec::new(),
            terminator,
        }
    }

    /// Index of the first instruction that is not a phi, i.e. the first
    /// position where a regular instruction may be inserted.
    pub fn first_insertion_point(&self) -> usize {
        self.instructions
            .iter()
            .position(|instr| !instr.is_phi())
            .unwrap_or(self.instructions.len())
    }
}

/// A function made of basic blocks and parameter metadata.
///
/// A `Function` owns its control‑flow graph (`body`). Parameters are
/// represented as a list of `(Name, PrimaryType)` pairs.
///
/// By convention the entrypoint is the basic block with the [`Label::NIL`] label.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Function {
    pub uuid: Uuid,
    pub name: Option<String>,
    pub params: Vec<(Name, PrimaryType)>,
    pub return_type: Option<PrimaryType>,
    pub body: BTreeMap<Label, BasicBlock>,
    pub attributes: FunctionAttributes,
}

impl Function {
    fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.uuid.to_string())
    }

    fn block_mut(&mut self, label: Label) -> Result<&mut BasicBlock, Error> {
        let function = self.display_name();
        self.body
            .get_mut(&label)
            .ok_or(Error::UndefinedBasicBlock { function, label })
    }

    /// Find next available [`Name`].
    pub fn next_available_name(&self) -> Name {
        let params = self.params.iter().map(|(name, _)| *name);
        let defined = self
            .body
            .values()
            .flat_map(|bb| bb.instructions.iter())
            .filter_map(|instr| instr.destination());

        params
            .chain(defined)
            .max()
            .map(|Name(n)| Name(n + 1))
            .unwrap_or(Name(0))
    }

    /// Find next available [`Label`].
    pub fn next_available_label(&self) -> Label {
        self.body
            .keys()
            .next_back()
            .map(|Label(n)| Label(n + 1))
            .unwrap_or(Label::NIL)
    }

    /// Iterate over every instruction of the function, block by block.
    pub fn instructions(&self) -> impl Iterator<Item = (InstructionRef, &SwInstr)> {
        self.body.values().flat_map(|bb| {
            bb.instructions
                .iter()
                .enumerate()
                .map(move |(index, instr)| (InstructionRef::new(bb.label, index), instr))
        })
    }

    pub fn instruction(&self, at: InstructionRef) -> Option<&SwInstr> {
        self.body.get(&at.block)?.instructions.get(at.index)
    }

    /// Locate the instruction defining `name`.
    pub fn find_definition(&self, name: Name) -> Option<InstructionRef> {
        self.instructions()
            .find(|(_, instr)| instr.destination() == Some(name))
            .map(|(at, _)| at)
    }

    /// The instruction defining `name`, `None` for parameters and unknown names.
    pub fn definition(&self, name: Name) -> Option<&SwInstr> {
        self.find_definition(name)
            .and_then(|at| self.instruction(at))
    }

    /// Primitive type of a value.
    pub fn value_type(&self, operand: &Operand) -> Option<PrimaryType> {
        match operand {
            Operand::Imm(AnyConst::Int(iconst)) => Some(iconst.ty.into()),
            Operand::Imm(AnyConst::Float(fconst)) => Some(fconst.ty.into()),
            Operand::Reg(name) => self
                .params
                .iter()
                .find(|(param, _)| param == name)
                .map(|(_, ty)| *ty)
                .or_else(|| self.definition(*name)?.destination_type()),
        }
    }

    /// Number of operands (instructions and terminators) reading `name`.
    pub fn use_count(&self, name: Name) -> usize {
        self.body
            .values()
            .map(|bb| {
                let in_instructions: usize = bb
                    .instructions
                    .iter()
                    .map(|instr| instr.dependencies().filter(|dep| *dep == name).count())
                    .sum();
                let in_terminator = bb.terminator.dependencies().filter(|dep| *dep == name).count();
                in_instructions + in_terminator
            })
            .sum()
    }

    pub fn has_uses(&self, name: Name) -> bool {
        self.use_count(name) > 0
    }

    /// The floating-point literal behind `operand`, if it is one.
    pub fn constant_fp<'a>(&self, operand: &'a Operand) -> Option<&'a FConst> {
        match operand {
            Operand::Imm(AnyConst::Float(fconst)) => Some(fconst),
            _ => None,
        }
    }

    /// If `operand` was produced by converting an integer to floating point
    /// (`uitofp`/`sitofp`), the type of that integer.
    pub fn int_to_fp_source(&self, operand: &Operand) -> Option<IType> {
        let Operand::Reg(name) = operand else {
            return None;
        };
        let cast = self.definition(*name)?.try_as_cast_ref()?;
        if !cast.op.is_int_to_fp() {
            return None;
        }
        cast.from.try_as_int()
    }

    /// Labels of the blocks branching to `label`.
    pub fn predecessors(&self, label: Label) -> impl Iterator<Item = Label> {
        self.body
            .values()
            .filter(move |bb| bb.terminator.successors().any(|succ| succ == label))
            .map(|bb| bb.label)
    }

    /// Insert `instr` so that it ends up at position `at`.
    pub fn insert_instruction(&mut self, at: InstructionRef, instr: SwInstr) -> Result<(), Error> {
        let block = self.block_mut(at.block)?;
        if at.index > block.instructions.len() {
            return Err(Error::InstructionOutOfBounds {
                block: at.block,
                index: at.index,
            });
        }
        block.instructions.insert(at.index, instr);
        Ok(())
    }

    /// Remove and return the instruction at position `at`.
    pub fn remove_instruction(&mut self, at: InstructionRef) -> Result<SwInstr, Error> {
        let block = self.block_mut(at.block)?;
        if at.index >= block.instructions.len() {
            return Err(Error::InstructionOutOfBounds {
                block: at.block,
                index: at.index,
            });
        }
        Ok(block.instructions.remove(at.index))
    }

    /// Split the block containing `split_before` and guard a new block by `cond`.
    ///
    /// ```text
    ///   head:                          head:
    ///     A                              A
    ///     B   <- split_before            branch cond, then, tail
    ///     C                     ==>    then:
    ///     <terminator>                   jump tail
    ///                                  tail:
    ///                                    B
    ///                                    C
    ///                                    <terminator>
    /// ```
    ///
    /// Phi nodes of the former successors of `head` are updated to name `tail`
    /// as their incoming block. Instructions and their relative order are left
    /// untouched; `cond` must be available at the end of `head`.
    pub fn split_block_and_insert_if_then(
        &mut self,
        cond: Operand,
        split_before: InstructionRef,
        weights: Option<BranchWeights>,
    ) -> Result<SplitBlock, Error> {
        let then = self.next_available_label();
        let tail = Label(then.0 + 1);

        let head = self.block_mut(split_before.block)?;
        if split_before.index > head.instructions.len() {
            return Err(Error::InstructionOutOfBounds {
                block: split_before.block,
                index: split_before.index,
            });
        }
        if split_before.index < head.first_insertion_point() {
            return Err(Error::InvalidSplitPoint {
                block: split_before.block,
                index: split_before.index,
            });
        }

        let moved = head.instructions.split_off(split_before.index);
        let terminator = std::mem::replace(
            &mut head.terminator,
            CBranch {
                cond,
                target_true: then,
                target_false: tail,
                weights,
            }
            .into(),
        );

        let successors: BTreeSet<Label> = terminator.successors().collect();
        let mut tail_block = BasicBlock::new(tail, terminator);
        tail_block.instructions = moved;

        self.body
            .insert(then, BasicBlock::new(then, Jump { target: tail }.into()));
        self.body.insert(tail, tail_block);

        for succ in successors {
            if let Some(bb) = self.body.get_mut(&succ) {
                for phi in bb.instructions.iter_mut().filter_map(SwInstr::try_as_phi_mut) {
                    for (incoming, _) in phi.values.iter_mut() {
                        if *incoming == split_before.block {
                            *incoming = tail;
                        }
                    }
                }
            }
        }

        trace!(
            "Split {} at index {} into then {} and tail {}",
            split_before.block, split_before.index, then, tail
        );

        Ok(SplitBlock {
            head: split_before.block,
            then,
            tail,
            split_index: split_before.index,
        })
    }

    /// Verify SSA form:
    /// 1) The entry block exists.
    /// 2) Each name is defined exactly once.
    /// 3) Each operand refers to a defined name.
    pub fn check_ssa(&self) -> Result<(), Error> {
        let mut defined_names = BTreeSet::new();

        // Ensure existence of entry block
        if !self.body.contains_key(&Label::NIL) {
            return Err(Error::MissingEntryBlock);
        }

        // Construct a set of defined names from parameters
        for (name, _) in self.params.iter() {
            if !defined_names.insert(*name) {
                return Err(Error::DuplicateSSAName { duplicate: *name });
            }
        }

        // Same for each instruction destination of each basic block
        for (_, instr) in self.instructions() {
            if let Some(dest) = instr.destination() {
                if !defined_names.insert(dest) {
                    return Err(Error::DuplicateSSAName { duplicate: dest });
                }
            }
        }

        // Now ensure all operands refer to defined names
        for bb in self.body.values() {
            let used = bb
                .instructions
                .iter()
                .flat_map(|instr| instr.dependencies().collect::<Vec<_>>())
                .chain(bb.terminator.dependencies());
            for name in used {
                if !defined_names.contains(&name) {
                    return Err(Error::UndefinedSSAName { undefined: name });
                }
            }
        }

        Ok(())
    }

    /// Verify the shape of the control-flow graph:
    /// 1) Every branch target exists.
    /// 2) Phi instructions lead their block.
    /// 3) Phi incoming blocks are predecessors of the phi's block.
    pub fn check_cfg(&self) -> Result<(), Error> {
        for bb in self.body.values() {
            for succ in bb.terminator.successors() {
                if !self.body.contains_key(&succ) {
                    return Err(Error::UndefinedBasicBlock {
                        function: self.display_name(),
                        label: succ,
                    });
                }
            }

            let leading = bb.first_insertion_point();
            if bb.instructions[leading..].iter().any(SwInstr::is_phi) {
                return Err(Error::PhiNotFirstInstruction { block: bb.label });
            }

            let predecessors: BTreeSet<Label> = self.predecessors(bb.label).collect();
            for phi in bb.instructions.iter().filter_map(SwInstr::try_as_phi_ref) {
                for (incoming, _) in &phi.values {
                    if !predecessors.contains(incoming) {
                        return Err(Error::UnknownPhiPredecessor {
                            block: bb.label,
                            predecessor: *incoming,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Run every structural check on the function.
    pub fn verify(&self) -> Result<(), Error> {
        self.check_ssa()?;
        self.check_cfg()?;
        self.check_dominance()
    }
}

/// A module containing defined functions.
///
/// `Module` acts as the compilation unit boundary for symbol visibility.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Module {
    pub functions: BTreeMap<Uuid, Function>,
}

impl Module {
    pub fn insert(&mut self, function: Function) -> Uuid {
        let uuid = function.uuid;
        self.functions.insert(uuid, function);
        uuid
    }

    pub fn verify(&self) -> Result<(), Error> {
        self.functions.values().try_for_each(Function::verify)
    }
}
