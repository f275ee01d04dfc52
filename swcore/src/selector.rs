//! Selection of the calls the pass may guard.
use log::trace;
use swinstr::{
    libfunc::{LibFunc, TargetLibraryInfo},
    modules::{Function, InstructionRef, instructions::misc::Invoke},
    types::primary::{FType, PrimaryType},
};

use crate::profile;

/// A call whose result is unused and whose callee may set `errno`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub at: InstructionRef,
    pub func: LibFunc,
}

/// Argument precisions the transform knows how to compare against.
pub fn is_supported_precision(ty: PrimaryType) -> bool {
    matches!(
        ty,
        PrimaryType::Float(FType::Fp32 | FType::Fp64 | FType::X86Fp80)
    )
}

fn check_candidate(function: &Function, call: &Invoke, tli: &TargetLibraryInfo) -> Option<LibFunc> {
    if call.is_no_builtin() {
        return None;
    }
    if call.dest.is_some_and(|dest| function.has_uses(dest)) {
        return None;
    }

    let func = tli.get_lib_func(function, call)?;
    profile::lookup(func)?;

    let arg_type = function.value_type(call.arg(0)?)?;
    is_supported_precision(arg_type).then_some(func)
}

/// Scan `function` in block order and collect every candidate call.
pub fn collect_candidates(function: &Function, tli: &TargetLibraryInfo) -> Vec<Candidate> {
    function
        .instructions()
        .filter_map(|(at, instr)| {
            let call = instr.try_as_invoke_ref()?;
            let func = check_candidate(function, call, tli)?;
            trace!("Candidate {} at {}[{}]", func, at.block, at.index);
            Some(Candidate { at, func })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use swinstr::modules::builder::FunctionBuilder;
    use swinstr::modules::instructions::misc::CallFlags;

    #[test]
    fn filters_follow_call_properties() {
        let mut builder = FunctionBuilder::new("f");
        let x = builder.param(FType::Fp64);
        let h = builder.param(FType::Fp16);
        let double = Some(FType::Fp64.into());

        builder.call("sqrt", [x.into()], double);
        let used = builder.call("log", [x.into()], double).unwrap();
        builder.fadd(FType::Fp64, used, x);
        builder.call_with_flags("exp", [x.into()], double, CallFlags::NO_BUILTIN);
        builder.call("my_sqrt", [x.into()], double);
        builder.call("fabs", [x.into()], double);
        builder.call("sqrt", [h.into()], double);
        builder.call("acos", [x.into()], double);
        builder.ret(None);
        let func = builder.build();

        let candidates = collect_candidates(&func, &TargetLibraryInfo::default());
        let funcs: Vec<_> = candidates.iter().map(|c| c.func).collect();
        assert_eq!(funcs, [LibFunc::Sqrt, LibFunc::Acos]);
        assert_eq!(candidates[0].at.index, 0);
    }

    #[test]
    fn mismatched_prototypes_are_skipped() {
        let mut builder = FunctionBuilder::new("f");
        let x = builder.param(FType::Fp32);
        let d = builder.param(FType::Fp64);
        builder.call("exp", [x.into()], Some(FType::Fp64.into()));
        builder.call("exp", [x.into()], Some(FType::Fp32.into()));
        builder.call("sqrtf", [d.into()], Some(FType::Fp32.into()));
        builder.call("sqrt", [d.into()], None);
        builder.call("expf", [x.into()], Some(FType::Fp32.into()));
        builder.ret(None);
        let func = builder.build();

        let candidates = collect_candidates(&func, &TargetLibraryInfo::default());
        let funcs: Vec<_> = candidates.iter().map(|c| c.func).collect();
        assert_eq!(funcs, [LibFunc::Expf]);
        assert_eq!(candidates[0].at.index, 4);
    }

    #[test]
    fn unavailable_routines_are_skipped() {
        let mut builder = FunctionBuilder::new("f");
        let x = builder.param(FType::X86Fp80);
        builder.call("expl", [x.into()], Some(FType::X86Fp80.into()));
        builder.ret(None);
        let func = builder.build();

        assert_eq!(collect_candidates(&func, &TargetLibraryInfo::default()).len(), 1);
        assert!(collect_candidates(&func, &TargetLibraryInfo::without_long_double()).is_empty());
    }
}
