#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

use crate::consts::{fp::FConst, int::IConst};

pub mod fp;
pub mod int;

/// Any literal that can appear as an immediate operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnyConst {
    Int(IConst),
    Float(FConst),
}

impl From<IConst> for AnyConst {
    fn from(value: IConst) -> Self {
        AnyConst::Int(value)
    }
}

impl From<FConst> for AnyConst {
    fn from(value: FConst) -> Self {
        AnyConst::Float(value)
    }
}

impl std::fmt::Display for AnyConst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnyConst::Int(iconst) => std::fmt::Display::fmt(iconst, f),
            AnyConst::Float(fconst) => std::fmt::Display::fmt(fconst, f),
        }
    }
}
