mod common;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strum::IntoEnumIterator;
use swcore::{LibCallsShrinkWrap, NoStatistics, ShrinkWrapConfig, profile};
use swinstr::libfunc::{LibFunc, TargetLibraryInfo};
use swinstr::modules::operand::Label;
use swinstr::types::FType;

use common::{eval_guard, single_call};

/// Inputs on which a routine may set `errno`, as documented for C math
/// libraries.
#[derive(Debug, Clone, Copy)]
enum ErrorSet {
    /// `x < lo || x > hi`
    Outside(f64, f64),
    /// `x <= lo || x >= hi`
    OutsideOrAt(f64, f64),
    /// `x < bound`
    Below(f64),
    /// `x <= bound`
    AtMost(f64),
    /// `x > bound`
    Above(f64),
    /// `x == inf || x == -inf`
    Infinite,
}

impl ErrorSet {
    fn contains(self, x: f64) -> bool {
        match self {
            ErrorSet::Outside(lo, hi) => x < lo || x > hi,
            ErrorSet::OutsideOrAt(lo, hi) => x <= lo || x >= hi,
            ErrorSet::Below(bound) => x < bound,
            ErrorSet::AtMost(bound) => x <= bound,
            ErrorSet::Above(bound) => x > bound,
            ErrorSet::Infinite => x.is_infinite(),
        }
    }

    fn bounds(self) -> Vec<f64> {
        match self {
            ErrorSet::Outside(lo, hi) | ErrorSet::OutsideOrAt(lo, hi) => vec![lo, hi],
            ErrorSet::Below(bound) | ErrorSet::AtMost(bound) | ErrorSet::Above(bound) => {
                vec![bound]
            }
            ErrorSet::Infinite => vec![f64::MAX, f64::MIN],
        }
    }
}

fn error_set(symbol: &str) -> Option<ErrorSet> {
    use ErrorSet::*;

    let set = match symbol {
        "acosf" | "acos" | "acosl" | "asinf" | "asin" | "asinl" => Outside(-1.0, 1.0),
        "cosf" | "cos" | "cosl" | "sinf" | "sin" | "sinl" => Infinite,
        "acoshf" | "acosh" | "acoshl" => Below(1.0),
        "sqrtf" | "sqrt" | "sqrtl" => Below(0.0),

        "coshf" | "sinhf" => Outside(-89.0, 89.0),
        "cosh" | "sinh" => Outside(-710.0, 710.0),
        "coshl" | "sinhl" => Outside(-11357.0, 11357.0),

        "expf" => Outside(-103.0, 88.0),
        "exp" => Outside(-745.0, 709.0),
        "expl" => Outside(-11399.0, 11356.0),
        "exp10f" => Outside(-45.0, 38.0),
        "exp10" => Outside(-323.0, 308.0),
        "exp10l" => Outside(-4950.0, 4932.0),
        "exp2f" => Outside(-149.0, 127.0),
        "exp2" => Outside(-1074.0, 1023.0),
        "exp2l" => Outside(-16445.0, 11383.0),
        "expm1f" => Above(88.0),
        "expm1" => Above(709.0),
        "expm1l" => Above(11356.0),

        "atanhf" | "atanh" | "atanhl" => OutsideOrAt(-1.0, 1.0),
        "logf" | "log" | "logl" | "log2f" | "log2" | "log2l" => AtMost(0.0),
        "log10f" | "log10" | "log10l" | "logbf" | "logb" | "logbl" => AtMost(0.0),
        "log1pf" | "log1p" | "log1pl" => AtMost(-1.0),
        _ => return None,
    };
    Some(set)
}

/// Values around each bound plus uniform samples, rounded to the precision of `ty`.
fn samples(set: ErrorSet, ty: FType, rng: &mut ChaCha8Rng) -> Vec<f64> {
    let bounds = set.bounds();
    let span = bounds
        .iter()
        .filter(|b| b.abs() < 1e6)
        .fold(2.0f64, |acc, b| acc.max(b.abs() * 2.0 + 2.0));

    let mut values = vec![0.0, -0.0, -1e-10, 1e-10, f64::INFINITY, f64::NEG_INFINITY, f64::NAN];
    for bound in bounds {
        for delta in [0.0, 0.01, -0.01, 0.5, -0.5, 1.0, -1.0] {
            values.push(bound + delta);
        }
    }
    values.extend((0..100).map(|_| rng.random_range(-span..span)));

    if ty == FType::Fp32 {
        values.iter_mut().for_each(|v| *v = *v as f32 as f64);
    }
    values
}

#[test]
fn every_profiled_routine_has_a_documented_error_set() {
    for func in LibFunc::iter() {
        let profiled = profile::lookup(func).is_some() && func.family() != LibFunc::Pow;
        assert_eq!(
            profiled,
            error_set(func.symbol()).is_some(),
            "{} disagrees with the documented table",
            func
        );
    }
}

#[test]
fn guards_match_documented_error_sets() {
    let tli = TargetLibraryInfo::default();
    let pass = LibCallsShrinkWrap::new(ShrinkWrapConfig::default(), &tli, &NoStatistics);
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

    for func in LibFunc::iter() {
        let Some(set) = error_set(func.symbol()) else {
            continue;
        };
        let ty = tli.argument_type(func);
        let (mut function, x) = single_call(func.symbol(), ty);
        assert!(pass.run_on_function(&mut function).unwrap(), "{} not guarded", func);
        function.verify().unwrap();

        for value in samples(set, ty, &mut rng) {
            let guarded = eval_guard(&function, Label::NIL, &[(x, value)]);
            assert_eq!(
                guarded,
                set.contains(value),
                "{}({}) guard disagrees with its error set",
                func,
                value
            );
        }
    }
}

#[test]
fn sqrt_negative_zero_is_not_an_error() {
    let tli = TargetLibraryInfo::default();
    let pass = LibCallsShrinkWrap::new(ShrinkWrapConfig::default(), &tli, &NoStatistics);
    let (mut func, x) = single_call("sqrt", FType::Fp64);
    pass.run_on_function(&mut func).unwrap();

    assert!(!eval_guard(&func, Label::NIL, &[(x, -0.0)]));
    assert!(eval_guard(&func, Label::NIL, &[(x, -1e-10)]));
    assert!(!eval_guard(&func, Label::NIL, &[(x, f64::NAN)]));
}
