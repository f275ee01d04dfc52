//! Programmatic construction of [`Function`] bodies.
//!
//! ```
//! use swinstr::modules::builder::FunctionBuilder;
//! use swinstr::types::FType;
//!
//! let mut builder = FunctionBuilder::new("f");
//! let x = builder.param(FType::Fp64);
//! builder.call("sqrt", [x.into()], Some(FType::Fp64.into()));
//! builder.ret(None);
//! let func = builder.build();
//! assert!(func.verify().is_ok());
//! ```
use std::collections::BTreeMap;

use smallvec::SmallVec;
use uuid::Uuid;

use crate::{
    modules::{
        BasicBlock, Function, FunctionAttributes,
        instructions::{
            SwInstr,
            fp::{FAdd, FCmp, FCmpOp},
            int::IOr,
            misc::{CallFlags, Callee, Cast, CastOp, Invoke, Phi},
        },
        operand::{Label, Name, Operand},
        terminator::{BranchWeights, CBranch, Jump, Ret, Terminator, Trap},
    },
    types::primary::{FType, IType, PrimaryType},
};

/// Incrementally builds a [`Function`].
///
/// The builder starts positioned at the end of the entry block. Blocks that
/// are never given a terminator end with `trap`.
pub struct FunctionBuilder {
    name: String,
    params: Vec<(Name, PrimaryType)>,
    return_type: Option<PrimaryType>,
    attributes: FunctionAttributes,
    body: BTreeMap<Label, BasicBlock>,
    current: Label,
    next_name: u32,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let mut body = BTreeMap::new();
        body.insert(Label::NIL, BasicBlock::new(Label::NIL, Trap.into()));
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: None,
            attributes: FunctionAttributes::empty(),
            body,
            current: Label::NIL,
            next_name: 0,
        }
    }

    fn fresh_name(&mut self) -> Name {
        let name = Name(self.next_name);
        self.next_name += 1;
        name
    }

    fn current_block(&mut self) -> &mut BasicBlock {
        self.body
            .get_mut(&self.current)
            .unwrap_or_else(|| unreachable!("builder positioned on a missing block"))
    }

    fn push(&mut self, instr: impl Into<SwInstr>) {
        self.current_block().instructions.push(instr.into());
    }

    fn terminate(&mut self, terminator: impl Into<Terminator>) {
        self.current_block().terminator = terminator.into();
    }

    /// Append a parameter and return its SSA name.
    pub fn param(&mut self, ty: impl Into<PrimaryType>) -> Name {
        let name = self.fresh_name();
        self.params.push((name, ty.into()));
        name
    }

    pub fn returns(&mut self, ty: impl Into<PrimaryType>) -> &mut Self {
        self.return_type = Some(ty.into());
        self
    }

    pub fn attributes(&mut self, attributes: FunctionAttributes) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// The entry block is created implicitly, this creates any further block.
    pub fn create_block(&mut self, name: Option<&str>) -> Label {
        let label = self
            .body
            .keys()
            .next_back()
            .map(|Label(n)| Label(n + 1))
            .unwrap_or(Label::NIL);
        let mut block = BasicBlock::new(label, Trap.into());
        block.name = name.map(str::to_string);
        self.body.insert(label, block);
        label
    }

    pub fn position_at_end(&mut self, label: Label) {
        assert!(self.body.contains_key(&label), "unknown block {}", label);
        self.current = label;
    }

    pub fn current(&self) -> Label {
        self.current
    }

    /// Emit a direct call to `symbol`. Returns the result name unless `ret` is `None`.
    pub fn call(
        &mut self,
        symbol: &str,
        args: impl IntoIterator<Item = Operand>,
        ret: Option<PrimaryType>,
    ) -> Option<Name> {
        self.call_with_flags(symbol, args, ret, CallFlags::empty())
    }

    pub fn call_with_flags(
        &mut self,
        symbol: &str,
        args: impl IntoIterator<Item = Operand>,
        ret: Option<PrimaryType>,
        flags: CallFlags,
    ) -> Option<Name> {
        let dest = ret.map(|_| self.fresh_name());
        self.push(Invoke {
            dest,
            ty: ret,
            callee: Callee::Symbol(symbol.to_string()),
            args: args.into_iter().collect::<SmallVec<_, 2>>(),
            flags,
        });
        dest
    }

    pub fn fadd(&mut self, ty: FType, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Name {
        let dest = self.fresh_name();
        self.push(FAdd {
            dest,
            ty,
            lhs: lhs.into(),
            rhs: rhs.into(),
        });
        dest
    }

    pub fn fcmp(
        &mut self,
        op: FCmpOp,
        ty: FType,
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
    ) -> Name {
        let dest = self.fresh_name();
        self.push(FCmp {
            dest,
            ty,
            lhs: lhs.into(),
            rhs: rhs.into(),
            op,
        });
        dest
    }

    pub fn or(&mut self, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Name {
        let dest = self.fresh_name();
        self.push(IOr {
            dest,
            ty: IType::I1,
            lhs: lhs.into(),
            rhs: rhs.into(),
        });
        dest
    }

    pub fn cast(
        &mut self,
        op: CastOp,
        value: impl Into<Operand>,
        from: impl Into<PrimaryType>,
        to: impl Into<PrimaryType>,
    ) -> Name {
        let dest = self.fresh_name();
        self.push(Cast {
            dest,
            op,
            value: value.into(),
            from: from.into(),
            to: to.into(),
        });
        dest
    }

    pub fn phi(
        &mut self,
        ty: impl Into<PrimaryType>,
        values: impl IntoIterator<Item = (Label, Operand)>,
    ) -> Name {
        let dest = self.fresh_name();
        self.push(Phi {
            dest,
            ty: ty.into(),
            values: values.into_iter().collect(),
        });
        dest
    }

    pub fn ret(&mut self, value: Option<Operand>) {
        self.terminate(Ret { value });
    }

    pub fn jump(&mut self, target: Label) {
        self.terminate(Jump { target });
    }

    pub fn branch(
        &mut self,
        cond: impl Into<Operand>,
        target_true: Label,
        target_false: Label,
        weights: Option<BranchWeights>,
    ) {
        self.terminate(CBranch {
            cond: cond.into(),
            target_true,
            target_false,
            weights,
        });
    }

    pub fn build(self) -> Function {
        Function {
            uuid: Uuid::new_v4(),
            name: Some(self.name),
            params: self.params,
            return_type: self.return_type,
            body: self.body,
            attributes: self.attributes,
        }
    }
}
