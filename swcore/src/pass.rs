//! The shrink-wrap pass driver.
//!
//! Calls to math routines whose result is unused cannot simply be removed
//! because they may still set `errno`. The pass keeps them but only executes
//! them when their argument lies in the routine's error set:
//!
//! ```text
//!   sqrt(x);   ==>   if (x < 0) sqrt(x);
//! ```
use log::debug;
use swinstr::{
    libfunc::TargetLibraryInfo,
    modules::{Function, Module},
    utils::Error,
};

use crate::{
    config::ShrinkWrapConfig,
    profile::{self, Phase},
    rewrite::{self, GuardedCall},
    selector::{self, Candidate},
    stats::{Statistic, StatisticsSink},
    synth,
    utils::error::ShrinkWrapResult,
};

pub struct LibCallsShrinkWrap<'a> {
    config: ShrinkWrapConfig,
    tli: &'a TargetLibraryInfo,
    stats: &'a dyn StatisticsSink,
}

impl<'a> LibCallsShrinkWrap<'a> {
    pub fn new(
        config: ShrinkWrapConfig,
        tli: &'a TargetLibraryInfo,
        stats: &'a dyn StatisticsSink,
    ) -> Self {
        Self { config, tli, stats }
    }

    /// Guard every eligible call of `function`. Returns `true` if the
    /// function was modified.
    pub fn run_on_function(&self, function: &mut Function) -> ShrinkWrapResult<bool> {
        if function.attributes.optimizes_for_size() {
            debug!(
                "Skipping {}: optimized for size",
                function.name.as_deref().unwrap_or("<anonymous>")
            );
            return Ok(false);
        }

        let mut worklist = selector::collect_candidates(function, self.tli);
        let mut changed = false;

        for i in 0..worklist.len() {
            let candidate = worklist[i];
            if let Some(guarded) = self.perform(function, &candidate)? {
                changed = true;
                for pending in &mut worklist[i + 1..] {
                    pending.at = guarded.relocate(pending.at);
                }
            }
        }

        Ok(changed)
    }

    pub fn run_on_module(&self, module: &mut Module) -> ShrinkWrapResult<bool> {
        let mut changed = false;
        for function in module.functions.values_mut() {
            changed |= self.run_on_function(function)?;
        }
        Ok(changed)
    }

    /// Try each dispatch stage in order on a single candidate.
    fn perform(
        &self,
        function: &mut Function,
        candidate: &Candidate,
    ) -> ShrinkWrapResult<Option<GuardedCall>> {
        debug!("CDCE calls: {}", candidate.func);

        let Some(profile) = profile::lookup(candidate.func) else {
            return Ok(None);
        };
        let enabled = self.config.enabled_kinds();

        for phase in Phase::DISPATCH_ORDER {
            if !phase.is_enabled(&self.config) || profile.phase() != phase {
                continue;
            }
            if !enabled.contains(profile.requires) {
                debug!(
                    "Not handled {}: requires {:?}, enabled {:?}",
                    candidate.func, profile.requires, enabled
                );
                return Ok(None);
            }

            let predicate = {
                let Some(call) = function
                    .instruction(candidate.at)
                    .and_then(|instr| instr.try_as_invoke_ref())
                else {
                    return Err(Error::InstructionOutOfBounds {
                        block: candidate.at.block,
                        index: candidate.at.index,
                    }
                    .into());
                };
                synth::synthesize(function, call, candidate.func, profile)
            };
            let Some(predicate) = predicate else {
                return Ok(None);
            };

            let guarded = rewrite::shrink_wrap_call(function, candidate.at, &predicate)?;
            debug!("Guarded {} by {}", candidate.func, predicate);
            if let Some(stat) = Statistic::for_term_count(predicate.term_count()) {
                self.stats.record(stat);
            }
            return Ok(Some(guarded));
        }

        Ok(None)
    }
}
