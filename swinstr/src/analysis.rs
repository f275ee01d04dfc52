//! Control-flow analyses over [`Function`] bodies.
use std::collections::BTreeMap;

use petgraph::{
    algo::dominators::{self, Dominators},
    prelude::DiGraphMap,
};

use crate::{
    modules::{
        Function, InstructionRef,
        instructions::{Instruction, SwInstr},
        operand::{Label, Name},
    },
    utils::Error,
};

/// Dominator tree of a function, rooted at its entry block.
pub struct DominatorTree {
    inner: Dominators<Label>,
}

impl DominatorTree {
    /// Returns `true` if `a` dominates `b`. A block dominates itself.
    ///
    /// Blocks unreachable from the entry are dominated by nothing.
    pub fn dominates(&self, a: Label, b: Label) -> bool {
        let mut current = Some(b);
        while let Some(label) = current {
            if label == a {
                return true;
            }
            current = self.inner.immediate_dominator(label);
        }
        false
    }

    pub fn is_reachable(&self, label: Label) -> bool {
        label == self.inner.root() || self.inner.immediate_dominator(label).is_some()
    }
}

impl Function {
    /// Build the control-flow graph of the function. Every block is a node,
    /// including blocks that are unreachable from the entry.
    pub fn cfg(&self) -> DiGraphMap<Label, ()> {
        let mut graph = DiGraphMap::new();
        for (label, bb) in &self.body {
            graph.add_node(*label);
            for succ in bb.terminator.successors() {
                graph.add_edge(*label, succ, ());
            }
        }
        graph
    }

    /// Compute the dominator tree (Cooper, Harvey and Kennedy).
    pub fn dominator_tree(&self) -> DominatorTree {
        let graph = self.cfg();
        DominatorTree {
            inner: dominators::simple_fast(&graph, Label::NIL),
        }
    }

    /// Ensure that every use of an SSA name is dominated by its definition.
    ///
    /// Uses in phi nodes are checked at the end of the matching incoming
    /// block. Blocks unreachable from the entry are not checked.
    pub fn check_dominance(&self) -> Result<(), Error> {
        let tree = self.dominator_tree();
        let definitions: BTreeMap<Name, InstructionRef> = self
            .instructions()
            .filter_map(|(at, instr)| instr.destination().map(|dest| (dest, at)))
            .collect();

        let dominated = |name: Name, block: Label, index: Option<usize>| -> bool {
            let Some(def) = definitions.get(&name) else {
                // Parameters, or undefined names reported by `check_ssa`
                return true;
            };
            if def.block == block {
                index.is_none_or(|index| def.index < index)
            } else {
                tree.dominates(def.block, block)
            }
        };

        for (label, bb) in &self.body {
            if !tree.is_reachable(*label) {
                continue;
            }

            for (index, instr) in bb.instructions.iter().enumerate() {
                if let SwInstr::Phi(phi) = instr {
                    for (incoming, value) in &phi.values {
                        let Some(name) = value.try_as_reg_ref() else {
                            continue;
                        };
                        if tree.is_reachable(*incoming) && !dominated(*name, *incoming, None) {
                            return Err(Error::UseNotDominated {
                                name: *name,
                                block: *label,
                            });
                        }
                    }
                    continue;
                }

                for name in instr.dependencies() {
                    if !dominated(name, *label, Some(index)) {
                        return Err(Error::UseNotDominated {
                            name,
                            block: *label,
                        });
                    }
                }
            }

            for name in bb.terminator.dependencies() {
                if !dominated(name, *label, None) {
                    return Err(Error::UseNotDominated {
                        name,
                        block: *label,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        modules::{
            BasicBlock, FunctionAttributes,
            instructions::fp::FAdd,
            terminator::{Jump, Ret},
        },
        types::primary::FType,
    };
    use uuid::Uuid;

    fn function(body: Vec<BasicBlock>) -> Function {
        Function {
            uuid: Uuid::new_v4(),
            name: Some("f".into()),
            params: vec![(Name(0), FType::Fp64.into())],
            return_type: None,
            body: body.into_iter().map(|bb| (bb.label, bb)).collect(),
            attributes: FunctionAttributes::empty(),
        }
    }

    #[test]
    fn use_before_definition_in_same_block() {
        let mut entry = BasicBlock::new(Label::NIL, Ret { value: None }.into());
        entry.instructions.push(
            FAdd {
                dest: Name(1),
                ty: FType::Fp64,
                lhs: Name(2).into(),
                rhs: Name(0).into(),
            }
            .into(),
        );
        entry.instructions.push(
            FAdd {
                dest: Name(2),
                ty: FType::Fp64,
                lhs: Name(0).into(),
                rhs: Name(0).into(),
            }
            .into(),
        );
        let func = function(vec![entry]);
        assert_eq!(
            func.check_dominance(),
            Err(Error::UseNotDominated {
                name: Name(2),
                block: Label::NIL
            })
        );
    }

    #[test]
    fn unreachable_blocks_are_ignored() {
        let entry = BasicBlock::new(Label::NIL, Ret { value: None }.into());
        let mut dead = BasicBlock::new(Label(1), Jump { target: Label::NIL }.into());
        dead.instructions.push(
            FAdd {
                dest: Name(1),
                ty: FType::Fp64,
                lhs: Name(7).into(),
                rhs: Name(0).into(),
            }
            .into(),
        );
        let func = function(vec![entry, dead]);
        assert!(func.check_dominance().is_ok());
        assert!(!func.dominator_tree().is_reachable(Label(1)));
    }
}
