//! Shrink-wrapping of unused math library calls.
//!
//! A call such as `sqrt(x)` whose result is never read is dead except for
//! its effect on `errno`. [`pass::LibCallsShrinkWrap`] keeps such calls but
//! moves them behind a cheap check of their argument, so that they only run
//! when they may actually report an error.
pub mod config;
pub mod pass;
pub mod profile;
pub mod rewrite;
pub mod selector;
pub mod stats;
pub mod synth;
pub mod utils;

pub use config::{ErrorKinds, ShrinkWrapConfig};
pub use pass::LibCallsShrinkWrap;
pub use stats::{NoStatistics, PassStatistics, Statistic, StatisticsSink};
pub use utils::error::{ShrinkWrapError, ShrinkWrapResult};
