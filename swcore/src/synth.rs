//! Construction of the error predicate guarding a call.
use log::debug;
use swinstr::{
    libfunc::LibFunc,
    modules::{Function, instructions::fp::FCmpOp, instructions::misc::Invoke, operand::Operand},
    types::primary::{FType, IType, PrimaryType},
};

use crate::profile::{Bound, ErrorCondition, ErrorProfile};

/// `args[arg] <op> bound`, ordered comparison against a single-precision literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub arg: usize,
    pub op: FCmpOp,
    pub bound: f32,
}

impl Comparison {
    pub const fn new(arg: usize, op: FCmpOp, bound: f32) -> Self {
        Self { arg, op, bound }
    }

    fn on_first(bound: Bound) -> Self {
        Self::new(0, bound.op, bound.value)
    }
}

/// Boolean condition over the arguments of a call, true when the call may
/// set `errno`.
///
/// A predicate always holds at least one comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Cmp(Comparison),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn or(lhs: Predicate, rhs: Predicate) -> Self {
        Predicate::Or(Box::new(lhs), Box::new(rhs))
    }

    /// Number of comparisons.
    pub fn term_count(&self) -> usize {
        match self {
            Predicate::Cmp(_) => 1,
            Predicate::Or(lhs, rhs) => lhs.term_count() + rhs.term_count(),
        }
    }

    /// Comparisons in evaluation order.
    pub fn comparisons(&self) -> Vec<Comparison> {
        match self {
            Predicate::Cmp(cmp) => vec![*cmp],
            Predicate::Or(lhs, rhs) => {
                let mut cmps = lhs.comparisons();
                cmps.extend(rhs.comparisons());
                cmps
            }
        }
    }

    /// Evaluate on concrete argument values. Bounds widen exactly to `f64`.
    pub fn evaluate(&self, args: &[f64]) -> bool {
        match self {
            Predicate::Cmp(cmp) => cmp.op.evaluate(args[cmp.arg], cmp.bound as f64),
            Predicate::Or(lhs, rhs) => lhs.evaluate(args) || rhs.evaluate(args),
        }
    }
}

impl From<Comparison> for Predicate {
    fn from(cmp: Comparison) -> Self {
        Predicate::Cmp(cmp)
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Cmp(cmp) => write!(f, "(arg{} {} {})", cmp.arg, cmp.op.to_str(), cmp.bound),
            Predicate::Or(lhs, rhs) => write!(f, "{} || {}", lhs, rhs),
        }
    }
}

/// Build the predicate for `call` to `func` described by `profile`.
///
/// Returns `None` when the call cannot be guarded, which is never an error.
pub fn synthesize(
    function: &Function,
    call: &Invoke,
    func: LibFunc,
    profile: &ErrorProfile,
) -> Option<Predicate> {
    let predicate = match profile.condition {
        ErrorCondition::Single(bound) => Comparison::on_first(bound).into(),
        ErrorCondition::Either(first, second) => Predicate::or(
            Comparison::on_first(first).into(),
            Comparison::on_first(second).into(),
        ),
        ErrorCondition::Pow => pow_condition(function, call, func)?,
    };

    let comparable = predicate.comparisons().iter().all(|cmp| {
        call.arg(cmp.arg)
            .and_then(|arg| function.value_type(arg))
            .and_then(comparison_type)
            .is_some()
    });
    if !comparable {
        debug!("Not handled {}: compared argument is not a float", func);
        return None;
    }
    Some(predicate)
}

/// Precision a value of type `ty` is compared in. Bounds are single-precision
/// literals, so only floats at least as wide as `float` qualify.
pub fn comparison_type(ty: PrimaryType) -> Option<FType> {
    match ty {
        PrimaryType::Float(ty) if FType::Fp32.widens_to(ty) => Some(ty),
        _ => None,
    }
}

/// Upper bound on the exponent of `pow(x, y)` when `x` is converted from an
/// integer of the given width.
fn int_base_exponent_bound(ty: IType) -> Option<f32> {
    match ty.num_bits() {
        8 => Some(128.0),
        16 => Some(64.0),
        32 => Some(32.0),
        _ => None,
    }
}

/// Conservative condition for `pow(x, y)`:
///
/// 1. `x` is a constant with `1 <= x <= 255`: `y > 127`
/// 2. `x` comes from an 8, 16 or 32 bit integer: `x <= 0 || y > 128, 64, 32`
///
/// Anything else, including `powf` and `powl`, is not handled.
fn pow_condition(function: &Function, call: &Invoke, func: LibFunc) -> Option<Predicate> {
    if func != LibFunc::Pow {
        debug!("Not handled powf() and powl()");
        return None;
    }

    let base = call.arg(0)?;

    if let Some(constant) = function.constant_fp(base) {
        let value = constant.to_f64();
        let max = IType::I8.max_value().unwrap_or(u8::MAX as u64) as f64;
        if !(1.0..=max).contains(&value) {
            debug!("Not handled pow(): constant base out of range");
            return None;
        }
        return Some(Comparison::new(1, FCmpOp::Ogt, 127.0).into());
    }

    let Some(source) = function.int_to_fp_source(base) else {
        match base {
            Operand::Reg(name) if function.definition(*name).is_some() => {
                debug!("Not handled pow(): base not from integer convert")
            }
            _ => debug!("Not handled pow(): FP type base"),
        }
        return None;
    };
    let Some(upper) = int_base_exponent_bound(source) else {
        debug!("Not handled pow(): type too wide");
        return None;
    };

    Some(Predicate::or(
        Comparison::new(0, FCmpOp::Ole, 0.0).into(),
        Comparison::new(1, FCmpOp::Ogt, upper).into(),
    ))
}
