//! Types module
//!
//! The transform only ever reasons about scalar values, so the type system is
//! reduced to primary types (see `primary.rs`): integers of arbitrary width,
//! the usual floating-point formats and opaque pointers.
pub mod primary;

pub use primary::{FType, IType, PrimaryType, PtrType};
