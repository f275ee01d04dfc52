#![allow(dead_code)]

use std::collections::HashMap;

use swinstr::consts::AnyConst;
use swinstr::modules::builder::FunctionBuilder;
use swinstr::modules::instructions::SwInstr;
use swinstr::modules::operand::{Label, Name, Operand};
use swinstr::modules::terminator::{CBranch, Terminator};
use swinstr::modules::{Function, InstructionRef};
use swinstr::types::FType;

#[derive(Debug, Clone, Copy)]
enum Value {
    Float(f64),
    Bool(bool),
}

/// `define void @f(<ty> %0) { call <ty> @<symbol>(%0); ret void }`
pub fn single_call(symbol: &str, ty: FType) -> (Function, Name) {
    let mut builder = FunctionBuilder::new("f");
    let x = builder.param(ty);
    builder.call(symbol, [x.into()], Some(ty.into()));
    builder.ret(None);
    (builder.build(), x)
}

pub fn branch_of(function: &Function, block: Label) -> Option<&CBranch> {
    match &function.body.get(&block)?.terminator {
        Terminator::CBranch(cbranch) => Some(cbranch),
        _ => None,
    }
}

/// Positions of every call to `symbol`.
pub fn call_sites(function: &Function, symbol: &str) -> Vec<InstructionRef> {
    function
        .instructions()
        .filter(|(_, instr)| {
            instr
                .try_as_invoke_ref()
                .is_some_and(|call| call.symbol() == Some(symbol))
        })
        .map(|(at, _)| at)
        .collect()
}

fn operand_value(env: &HashMap<Name, Value>, operand: &Operand) -> Value {
    match operand {
        Operand::Reg(name) => env[name],
        Operand::Imm(AnyConst::Float(fconst)) => Value::Float(fconst.to_f64()),
        Operand::Imm(AnyConst::Int(_)) => panic!("unexpected integer immediate"),
    }
}

fn as_float(value: Value) -> f64 {
    match value {
        Value::Float(v) => v,
        Value::Bool(_) => panic!("expected a floating-point value"),
    }
}

fn as_bool(value: Value) -> bool {
    match value {
        Value::Bool(v) => v,
        Value::Float(_) => panic!("expected a boolean"),
    }
}

/// Interpret the straight-line code of `block` on the given parameter values
/// and return the value of the condition of its conditional branch.
///
/// Casts are interpreted as the identity, which is exact for the integer
/// widths used in tests.
pub fn eval_guard(function: &Function, block: Label, params: &[(Name, f64)]) -> bool {
    let mut env: HashMap<Name, Value> = params
        .iter()
        .map(|(name, value)| (*name, Value::Float(*value)))
        .collect();

    let bb = &function.body[&block];
    for instr in &bb.instructions {
        match instr {
            SwInstr::FCmp(cmp) => {
                let lhs = as_float(operand_value(&env, &cmp.lhs));
                let rhs = as_float(operand_value(&env, &cmp.rhs));
                env.insert(cmp.dest, Value::Bool(cmp.op.evaluate(lhs, rhs)));
            }
            SwInstr::IOr(or) => {
                let lhs = as_bool(operand_value(&env, &or.lhs));
                let rhs = as_bool(operand_value(&env, &or.rhs));
                env.insert(or.dest, Value::Bool(lhs || rhs));
            }
            SwInstr::Cast(cast) => {
                let value = operand_value(&env, &cast.value);
                env.insert(cast.dest, value);
            }
            _ => {}
        }
    }

    match &bb.terminator {
        Terminator::CBranch(cbranch) => as_bool(operand_value(&env, &cbranch.cond)),
        other => panic!("block {} ends with `{}`", block, other),
    }
}
