//! Guarding a call behind its error predicate.
use log::trace;
use swinstr::{
    consts::fp::FConst,
    modules::{
        Function, InstructionRef, SplitBlock,
        instructions::{SwInstr, fp::FCmp, int::IOr},
        operand::{Name, Operand},
        terminator::BranchWeights,
    },
    types::primary::{FType, IType},
    utils::Error,
};

use crate::{
    synth::{self, Predicate},
    utils::error::{ShrinkWrapError, ShrinkWrapResult},
};

/// Likelihood of the guarded path: errors are expected to be rare.
pub const GUARD_WEIGHTS: BranchWeights = BranchWeights::new(1, 2000);

pub const CALL_BLOCK_NAME: &str = "cdce.call";
pub const END_BLOCK_NAME: &str = "cdce.end";

/// Result of guarding a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardedCall {
    pub split: SplitBlock,
    /// Position of the call before the rewrite.
    pub original: InstructionRef,
    /// Position of the call after the rewrite, first in the guarded block.
    pub call: InstructionRef,
}

impl GuardedCall {
    /// Translate a handle taken before the rewrite into one valid after it.
    ///
    /// Must not be called with the handle of the guarded call itself.
    pub fn relocate(&self, at: InstructionRef) -> InstructionRef {
        if at.block != self.original.block || at.index < self.original.index {
            return at;
        }
        debug_assert_ne!(at, self.original, "relocating the guarded call");

        // Skip the inserted comparisons, then the call that left the tail.
        let inserted = self.split.split_index - self.original.index;
        let moved = self.split.relocate(InstructionRef::new(at.block, at.index + inserted));
        InstructionRef::new(moved.block, moved.index - 1)
    }
}

/// Builds the comparisons of a predicate without touching the function.
struct Lowering<'a> {
    function: &'a Function,
    args: &'a [Operand],
    next_name: Name,
    instrs: Vec<SwInstr>,
}

impl Lowering<'_> {
    fn fresh_name(&mut self) -> Name {
        let name = self.next_name;
        self.next_name = Name(name.0 + 1);
        name
    }

    fn comparison_type(&self, operand: &Operand) -> ShrinkWrapResult<FType> {
        match self.function.value_type(operand) {
            Some(ty) => synth::comparison_type(ty).ok_or_else(|| {
                ShrinkWrapError::UnsupportedArgumentType {
                    operand: operand.to_string(),
                    ty,
                }
            }),
            None => match operand {
                Operand::Reg(name) => Err(Error::UndefinedSSAName { undefined: *name }.into()),
                Operand::Imm(_) => Err(ShrinkWrapError::UnsupportedArgumentType {
                    operand: operand.to_string(),
                    ty: FType::Fp32.into(),
                }),
            },
        }
    }

    fn lower(&mut self, predicate: &Predicate) -> ShrinkWrapResult<Name> {
        let dest = match predicate {
            Predicate::Cmp(cmp) => {
                let lhs = self.args[cmp.arg].clone();
                let ty = self.comparison_type(&lhs)?;
                let bound = FConst::from_f32(cmp.bound).widen_to(ty);
                let dest = self.fresh_name();
                self.instrs.push(
                    FCmp {
                        dest,
                        ty,
                        lhs,
                        rhs: bound.into(),
                        op: cmp.op,
                    }
                    .into(),
                );
                dest
            }
            Predicate::Or(lhs, rhs) => {
                let lhs = self.lower(lhs)?;
                let rhs = self.lower(rhs)?;
                let dest = self.fresh_name();
                self.instrs.push(
                    IOr {
                        dest,
                        ty: IType::I1,
                        lhs: lhs.into(),
                        rhs: rhs.into(),
                    }
                    .into(),
                );
                dest
            }
        };
        Ok(dest)
    }
}

/// Make the call at `at` execute only when `predicate` holds.
///
/// ```text
///   bb:                         bb:
///     ...                         ...
///     call @f(x)        ==>       %c = <predicate on x>
///     <rest>                      branch %c, cdce.call, cdce.end, !weights(1, 2000)
///                               cdce.call:
///                                 call @f(x)
///                                 jump cdce.end
///                               cdce.end:
///                                 <rest>
/// ```
pub fn shrink_wrap_call(
    function: &mut Function,
    at: InstructionRef,
    predicate: &Predicate,
) -> ShrinkWrapResult<GuardedCall> {
    let args: Vec<Operand> = match function.instruction(at) {
        Some(SwInstr::Invoke(call)) => call.args.to_vec(),
        _ => {
            return Err(Error::InstructionOutOfBounds {
                block: at.block,
                index: at.index,
            }
            .into());
        }
    };

    // The function is left untouched if any comparison fails to lower.
    let mut lowering = Lowering {
        function: &*function,
        args: &args,
        next_name: function.next_available_name(),
        instrs: Vec::new(),
    };
    let cond = lowering.lower(predicate)?;
    let guard = lowering.instrs;

    let call_at = InstructionRef::new(at.block, at.index + guard.len());
    for (offset, instr) in guard.into_iter().enumerate() {
        function.insert_instruction(InstructionRef::new(at.block, at.index + offset), instr)?;
    }

    let split =
        function.split_block_and_insert_if_then(cond.into(), call_at, Some(GUARD_WEIGHTS))?;
    if let Some(bb) = function.body.get_mut(&split.then) {
        bb.name = Some(CALL_BLOCK_NAME.to_string());
    }
    if let Some(bb) = function.body.get_mut(&split.tail) {
        bb.name = Some(END_BLOCK_NAME.to_string());
    }

    let call = function.remove_instruction(InstructionRef::new(split.tail, 0))?;
    debug_assert!(call.is_invoke());
    let guarded = InstructionRef::new(split.then, 0);
    function.insert_instruction(guarded, call)?;

    if log::log_enabled!(log::Level::Trace) {
        for label in [split.head, split.then, split.tail] {
            if let Some(bb) = function.body.get(&label) {
                trace!("{}", bb);
            }
        }
    }

    Ok(GuardedCall {
        split,
        original: at,
        call: guarded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Comparison;
    use swinstr::modules::{
        builder::FunctionBuilder, instructions::fp::FCmpOp, instructions::misc::CastOp,
        operand::Label,
    };

    #[test]
    fn single_precision_bounds_stay_float() {
        let mut builder = FunctionBuilder::new("f");
        let x = builder.param(FType::Fp32);
        builder.call("sqrtf", [x.into()], Some(FType::Fp32.into()));
        builder.ret(None);
        let mut func = builder.build();

        let pred = Comparison::new(0, FCmpOp::Olt, 0.0).into();
        let guarded =
            shrink_wrap_call(&mut func, InstructionRef::new(Label::NIL, 0), &pred).unwrap();

        let head = &func.body[&guarded.split.head];
        let SwInstr::FCmp(cmp) = &head.instructions[0] else {
            panic!("expected a comparison");
        };
        assert_eq!(cmp.ty, FType::Fp32);
        assert_eq!(func.value_type(&cmp.rhs), Some(FType::Fp32.into()));
        func.verify().unwrap();
    }

    #[test]
    fn relocation_skips_the_moved_call() {
        let mut builder = FunctionBuilder::new("f");
        let x = builder.param(FType::Fp64);
        builder.call("acos", [x.into()], None);
        builder.call("asin", [x.into()], None);
        builder.ret(None);
        let mut func = builder.build();

        let pred = Predicate::or(
            Comparison::new(0, FCmpOp::Olt, -1.0).into(),
            Comparison::new(0, FCmpOp::Ogt, 1.0).into(),
        );
        let guarded =
            shrink_wrap_call(&mut func, InstructionRef::new(Label::NIL, 0), &pred).unwrap();
        let next = guarded.relocate(InstructionRef::new(Label::NIL, 1));

        assert_eq!(next, InstructionRef::new(guarded.split.tail, 0));
        let call = func.instruction(next).unwrap().try_as_invoke_ref().unwrap();
        assert_eq!(call.symbol(), Some("asin"));
        assert_eq!(func.body[&guarded.split.head].instructions.len(), 3);
    }

    #[test]
    fn failed_lowering_leaves_the_function_alone() {
        let mut builder = FunctionBuilder::new("f");
        let i = builder.param(IType::I8);
        let n = builder.param(IType::I32);
        let base = builder.cast(CastOp::SiToFp, i, IType::I8, FType::Fp64);
        builder.call("pow", [base.into(), n.into()], Some(FType::Fp64.into()));
        builder.ret(None);
        let mut func = builder.build();
        let before = func.clone();

        let pred = Predicate::or(
            Comparison::new(0, FCmpOp::Ole, 0.0).into(),
            Comparison::new(1, FCmpOp::Ogt, 128.0).into(),
        );
        let result = shrink_wrap_call(&mut func, InstructionRef::new(Label::NIL, 1), &pred);

        assert!(matches!(
            result,
            Err(ShrinkWrapError::UnsupportedArgumentType { .. })
        ));
        assert_eq!(func, before);
    }
}
