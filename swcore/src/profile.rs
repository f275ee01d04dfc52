//! Error behaviour of the recognized math library routines.
//!
//! Every routine that may set `errno` has one [`ErrorProfile`] describing the
//! inputs on which it can fail. Bounds are single-precision literals; they
//! are widened to the precision of the argument when a guard is emitted.
use enum_map::EnumMap;
use once_cell::sync::Lazy;
use swinstr::{libfunc::LibFunc, modules::instructions::fp::FCmpOp};

use crate::config::{ErrorKinds, ShrinkWrapConfig};

/// How a routine reports errors, which also decides when it is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Domain error on both sides of an interval, or at both infinities.
    DomainTwoSided,
    /// Domain error below a single bound.
    DomainOneSided,
    /// Range error above a single bound.
    RangeOneSided,
    /// Range error outside an interval.
    RangeTwoSided,
    /// Domain, pole and possibly range errors sharing one condition.
    Combined,
}

/// Dispatch stages, attempted in declaration order for each candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    DomainOnly,
    RangeOnly,
    Combined,
}

impl Phase {
    pub const DISPATCH_ORDER: [Phase; 3] = [Phase::DomainOnly, Phase::RangeOnly, Phase::Combined];

    /// Whether the stage is attempted at all. The combined stage is always
    /// attempted and gated per routine by [`ErrorProfile::requires`].
    pub fn is_enabled(&self, config: &ShrinkWrapConfig) -> bool {
        match self {
            Phase::DomainOnly => config.domain_error,
            Phase::RangeOnly => config.range_error,
            Phase::Combined => true,
        }
    }
}

impl ErrorCategory {
    pub fn phase(&self) -> Phase {
        match self {
            ErrorCategory::DomainTwoSided | ErrorCategory::DomainOneSided => Phase::DomainOnly,
            ErrorCategory::RangeOneSided | ErrorCategory::RangeTwoSided => Phase::RangeOnly,
            ErrorCategory::Combined => Phase::Combined,
        }
    }
}

/// `argument <op> value`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub op: FCmpOp,
    pub value: f32,
}

impl Bound {
    pub const fn new(op: FCmpOp, value: f32) -> Self {
        Self { op, value }
    }
}

/// Shape of the error condition on the first argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorCondition {
    Single(Bound),
    Either(Bound, Bound),
    /// Depends on both arguments and on the provenance of the base, see
    /// [`crate::synth`].
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorProfile {
    pub category: ErrorCategory,
    /// Error classes that must all be enabled for the routine to be guarded.
    pub requires: ErrorKinds,
    pub condition: ErrorCondition,
}

impl ErrorProfile {
    pub fn phase(&self) -> Phase {
        self.category.phase()
    }
}

const fn single(
    category: ErrorCategory,
    requires: ErrorKinds,
    op: FCmpOp,
    value: f32,
) -> ErrorProfile {
    ErrorProfile {
        category,
        requires,
        condition: ErrorCondition::Single(Bound::new(op, value)),
    }
}

const fn either(
    category: ErrorCategory,
    requires: ErrorKinds,
    first: Bound,
    second: Bound,
) -> ErrorProfile {
    ErrorProfile {
        category,
        requires,
        condition: ErrorCondition::Either(first, second),
    }
}

/// `x < lower || x > upper`, upper bound tested first.
const fn range(lower: f32, upper: f32) -> ErrorProfile {
    either(
        ErrorCategory::RangeTwoSided,
        ErrorKinds::RANGE,
        Bound::new(FCmpOp::Ogt, upper),
        Bound::new(FCmpOp::Olt, lower),
    )
}

const DOMAIN: ErrorKinds = ErrorKinds::DOMAIN;
const DOMAIN_POLE: ErrorKinds = ErrorKinds::DOMAIN.union(ErrorKinds::POLE);
const ALL: ErrorKinds = ErrorKinds::all();

/// Profiles of every routine that may set `errno`, grouped by family
/// (single, double, extended precision).
const PROFILES: &[([LibFunc; 3], [ErrorProfile; 3])] = {
    use ErrorCategory::*;
    use FCmpOp::*;
    use LibFunc::*;

    const UNIT_INTERVAL: ErrorProfile = either(
        DomainTwoSided,
        DOMAIN,
        Bound::new(Olt, -1.0),
        Bound::new(Ogt, 1.0),
    );
    const INFINITE: ErrorProfile = either(
        DomainTwoSided,
        DOMAIN,
        Bound::new(Oeq, f32::INFINITY),
        Bound::new(Oeq, f32::NEG_INFINITY),
    );
    const BELOW_ONE: ErrorProfile = single(DomainOneSided, DOMAIN, Olt, 1.0);
    const NEGATIVE: ErrorProfile = single(DomainOneSided, DOMAIN, Olt, 0.0);
    const ATANH: ErrorProfile = either(
        Combined,
        DOMAIN_POLE,
        Bound::new(Ole, -1.0),
        Bound::new(Oge, 1.0),
    );
    const NON_POSITIVE: ErrorProfile = single(Combined, DOMAIN_POLE, Ole, 0.0);
    const LOG1P: ErrorProfile = single(Combined, DOMAIN_POLE, Ole, -1.0);
    const POW: ErrorProfile = ErrorProfile {
        category: Combined,
        requires: ALL,
        condition: ErrorCondition::Pow,
    };

    &[
        ([Acosf, Acos, Acosl], [UNIT_INTERVAL; 3]),
        ([Asinf, Asin, Asinl], [UNIT_INTERVAL; 3]),
        ([Cosf, Cos, Cosl], [INFINITE; 3]),
        ([Sinf, Sin, Sinl], [INFINITE; 3]),
        ([Acoshf, Acosh, Acoshl], [BELOW_ONE; 3]),
        ([Sqrtf, Sqrt, Sqrtl], [NEGATIVE; 3]),
        (
            [Coshf, Cosh, Coshl],
            [range(-89.0, 89.0), range(-710.0, 710.0), range(-11357.0, 11357.0)],
        ),
        (
            [Sinhf, Sinh, Sinhl],
            [range(-89.0, 89.0), range(-710.0, 710.0), range(-11357.0, 11357.0)],
        ),
        (
            [Expf, Exp, Expl],
            [range(-103.0, 88.0), range(-745.0, 709.0), range(-11399.0, 11356.0)],
        ),
        (
            [Exp10f, Exp10, Exp10l],
            [range(-45.0, 38.0), range(-323.0, 308.0), range(-4950.0, 4932.0)],
        ),
        (
            [Exp2f, Exp2, Exp2l],
            [range(-149.0, 127.0), range(-1074.0, 1023.0), range(-16445.0, 11383.0)],
        ),
        (
            [Expm1f, Expm1, Expm1l],
            [
                single(RangeOneSided, ErrorKinds::RANGE, Ogt, 88.0),
                single(RangeOneSided, ErrorKinds::RANGE, Ogt, 709.0),
                single(RangeOneSided, ErrorKinds::RANGE, Ogt, 11356.0),
            ],
        ),
        ([Atanhf, Atanh, Atanhl], [ATANH; 3]),
        ([Logf, Log, Logl], [NON_POSITIVE; 3]),
        ([Log2f, Log2, Log2l], [NON_POSITIVE; 3]),
        ([Log10f, Log10, Log10l], [NON_POSITIVE; 3]),
        ([Logbf, Logb, Logbl], [NON_POSITIVE; 3]),
        ([Log1pf, Log1p, Log1pl], [LOG1P; 3]),
        ([Powf, Pow, Powl], [POW; 3]),
    ]
};

static TABLE: Lazy<EnumMap<LibFunc, Option<ErrorProfile>>> = Lazy::new(|| {
    let mut table: EnumMap<LibFunc, Option<ErrorProfile>> = EnumMap::default();
    for (funcs, profiles) in PROFILES {
        for (func, profile) in funcs.iter().zip(profiles) {
            debug_assert!(table[*func].is_none(), "duplicate profile for {}", func);
            table[*func] = Some(*profile);
        }
    }
    table
});

/// Error profile of `func`, `None` if the routine never sets `errno` or is
/// not handled.
pub fn lookup(func: LibFunc) -> Option<&'static ErrorProfile> {
    TABLE[func].as_ref()
}
