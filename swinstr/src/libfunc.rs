//! Recognized C math library routines and their availability on the target.
use enum_map::{Enum, EnumMap};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    modules::{Function, instructions::misc::Invoke},
    types::primary::{FType, PrimaryType},
};

/// Floating-point precision a library routine operates in, derived from the
/// C naming convention (`sqrtf`, `sqrt`, `sqrtl`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Single,
    Double,
    Extended,
}

macro_rules! define_libfuncs {
    ($($family:ident => $single:ident, $double:ident, $extended:ident, arity $arity:literal;)*) => {
        /// Math library routines the optimizer knows the semantics of.
        ///
        /// The textual form of each variant is the C symbol name.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Enum, EnumIter, EnumString, IntoStaticStr,
        )]
        #[strum(serialize_all = "lowercase")]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum LibFunc {
            $($single, $double, $extended,)*
        }

        impl LibFunc {
            /// Number of arguments the routine takes.
            pub fn arity(&self) -> usize {
                match self {
                    $(LibFunc::$single | LibFunc::$double | LibFunc::$extended => $arity,)*
                }
            }

            pub fn precision(&self) -> Precision {
                match self {
                    $(
                        LibFunc::$single => Precision::Single,
                        LibFunc::$double => Precision::Double,
                        LibFunc::$extended => Precision::Extended,
                    )*
                }
            }

            /// The double-precision member of the routine's family, e.g.
            /// `Sqrt` for `Sqrtf`.
            pub fn family(&self) -> LibFunc {
                match self {
                    $(
                        LibFunc::$single | LibFunc::$double | LibFunc::$extended => {
                            LibFunc::$double
                        }
                    )*
                }
            }
        }
    };
}

define_libfuncs! {
    acos => Acosf, Acos, Acosl, arity 1;
    asin => Asinf, Asin, Asinl, arity 1;
    cos => Cosf, Cos, Cosl, arity 1;
    sin => Sinf, Sin, Sinl, arity 1;
    tan => Tanf, Tan, Tanl, arity 1;
    acosh => Acoshf, Acosh, Acoshl, arity 1;
    atanh => Atanhf, Atanh, Atanhl, arity 1;
    cosh => Coshf, Cosh, Coshl, arity 1;
    sinh => Sinhf, Sinh, Sinhl, arity 1;
    exp => Expf, Exp, Expl, arity 1;
    exp2 => Exp2f, Exp2, Exp2l, arity 1;
    exp10 => Exp10f, Exp10, Exp10l, arity 1;
    expm1 => Expm1f, Expm1, Expm1l, arity 1;
    log => Logf, Log, Logl, arity 1;
    log2 => Log2f, Log2, Log2l, arity 1;
    log10 => Log10f, Log10, Log10l, arity 1;
    logb => Logbf, Logb, Logbl, arity 1;
    log1p => Log1pf, Log1p, Log1pl, arity 1;
    sqrt => Sqrtf, Sqrt, Sqrtl, arity 1;
    cbrt => Cbrtf, Cbrt, Cbrtl, arity 1;
    fabs => Fabsf, Fabs, Fabsl, arity 1;
    pow => Powf, Pow, Powl, arity 2;
}

impl LibFunc {
    /// Look up a routine by its C symbol name.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        symbol.parse().ok()
    }

    pub fn symbol(&self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for LibFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Describes which library routines the target provides and how its C
/// floating-point types are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLibraryInfo {
    available: EnumMap<LibFunc, bool>,
    /// Representation of C's `long double`.
    pub long_double: FType,
}

impl Default for TargetLibraryInfo {
    fn default() -> Self {
        Self {
            available: EnumMap::from_fn(|_| true),
            long_double: FType::X86Fp80,
        }
    }
}

impl TargetLibraryInfo {
    /// A target lacking every `long double` routine.
    pub fn without_long_double() -> Self {
        let mut tli = Self::default();
        for func in LibFunc::iter().filter(|f| f.precision() == Precision::Extended) {
            tli.set_unavailable(func);
        }
        tli
    }

    pub fn has(&self, func: LibFunc) -> bool {
        self.available[func]
    }

    pub fn set_unavailable(&mut self, func: LibFunc) {
        self.available[func] = false;
    }

    /// Floating-point type of the arguments of `func` on this target.
    pub fn argument_type(&self, func: LibFunc) -> FType {
        match func.precision() {
            Precision::Single => FType::Fp32,
            Precision::Double => FType::Fp64,
            Precision::Extended => self.long_double,
        }
    }

    /// Identify the library routine called by `call` inside `function`.
    ///
    /// Returns `None` for indirect calls, unknown symbols and routines the
    /// target does not provide. The call must also match the routine's
    /// prototype: every argument and the result have the routine's
    /// floating-point type.
    pub fn get_lib_func(&self, function: &Function, call: &Invoke) -> Option<LibFunc> {
        let func = LibFunc::from_symbol(call.symbol()?)?;
        if !self.has(func) || call.args.len() != func.arity() {
            return None;
        }

        let expected = PrimaryType::Float(self.argument_type(func));
        let prototype = call.ty == Some(expected)
            && call
                .args
                .iter()
                .all(|arg| function.value_type(arg) == Some(expected));
        prototype.then_some(func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::builder::FunctionBuilder;

    #[test]
    fn symbols_follow_c_names() {
        assert_eq!(LibFunc::from_symbol("log1pf"), Some(LibFunc::Log1pf));
        assert_eq!(LibFunc::from_symbol("exp10l"), Some(LibFunc::Exp10l));
        assert_eq!(LibFunc::Exp2.symbol(), "exp2");
        assert_eq!(LibFunc::from_symbol("Sqrt"), None);
        assert_eq!(LibFunc::from_symbol("frexp"), None);
    }

    #[test]
    fn families_and_precisions() {
        assert_eq!(LibFunc::Powf.family(), LibFunc::Pow);
        assert_eq!(LibFunc::Coshl.precision(), Precision::Extended);
        assert_eq!(LibFunc::Pow.arity(), 2);
        assert_eq!(LibFunc::Acosh.arity(), 1);
    }

    #[test]
    fn long_double_can_be_disabled() {
        let tli = TargetLibraryInfo::without_long_double();
        assert!(!tli.has(LibFunc::Sqrtl));
        assert!(tli.has(LibFunc::Sqrtf));
        assert_eq!(tli.argument_type(LibFunc::Expl), FType::X86Fp80);
    }

    #[test]
    fn prototypes_must_match() {
        let tli = TargetLibraryInfo::default();
        let mut builder = FunctionBuilder::new("f");
        let x = builder.param(FType::Fp32);
        let d = builder.param(FType::Fp64);
        builder.call("expf", [x.into()], Some(FType::Fp32.into()));
        builder.call("exp", [x.into()], Some(FType::Fp64.into()));
        builder.call("sqrtf", [d.into()], Some(FType::Fp32.into()));
        builder.call("sqrt", [d.into()], None);
        builder.call("pow", [d.into(), x.into()], Some(FType::Fp64.into()));
        builder.call("pow", [d.into(), d.into()], Some(FType::Fp64.into()));
        builder.ret(None);
        let func = builder.build();

        let funcs: Vec<_> = func
            .instructions()
            .filter_map(|(_, instr)| instr.try_as_invoke_ref())
            .map(|call| tli.get_lib_func(&func, call))
            .collect();
        assert_eq!(
            funcs,
            [Some(LibFunc::Expf), None, None, None, None, Some(LibFunc::Pow)]
        );
    }
}
