//! Compact SSA intermediate representation for floating-point code and the
//! library-call services the optimizer relies on.
pub mod analysis;
pub mod consts;
pub mod libfunc;
pub mod modules;
pub mod types;
pub mod utils;
