//! Floating‑point constants used as immediate operands.
use crate::types::primary::FType;
use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Payload of a floating-point literal.
///
/// Finite values are stored as arbitrary-precision decimals so that a literal
/// keeps its exact value when it is widened to a larger format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FValue {
    Finite(BigDecimal),
    Infinity { negative: bool },
    NaN,
}

/// A floating‑point literal paired with its `FType`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FConst {
    /// Floating-point type describing how to interpret `value`.
    pub ty: FType,

    /// Literal payload.
    pub value: FValue,
}

impl FConst {
    /// Create a new finite `FConst` from its type and value.
    pub fn new(ty: FType, value: BigDecimal) -> Self {
        Self {
            ty,
            value: FValue::Finite(value),
        }
    }

    /// Signed infinity of the given type.
    pub fn infinity(ty: FType, negative: bool) -> Self {
        Self {
            ty,
            value: FValue::Infinity { negative },
        }
    }

    /// Quiet NaN of the given type.
    pub fn nan(ty: FType) -> Self {
        Self {
            ty,
            value: FValue::NaN,
        }
    }

    /// Build a single-precision literal from a Rust `f32`.
    pub fn from_f32(value: f32) -> Self {
        Self::from_f64(FType::Fp32, value as f64)
    }

    /// Build a literal of type `ty` from a Rust `f64`. The value is taken as-is,
    /// the caller is responsible for it being representable in `ty`.
    pub fn from_f64(ty: FType, value: f64) -> Self {
        if value.is_nan() {
            Self::nan(ty)
        } else if value.is_infinite() {
            Self::infinity(ty, value.is_sign_negative())
        } else {
            // Every finite f64 has an exact decimal expansion.
            let value = BigDecimal::from_f64(value).unwrap_or_default();
            Self::new(ty, value)
        }
    }

    /// Convert the current instance into another floating-point type.
    ///
    /// The payload is kept untouched which is only exact when `new_ty` is at
    /// least as wide as the current type.
    pub fn to_type(self, new_ty: FType) -> Self {
        Self {
            ty: new_ty,
            value: self.value,
        }
    }

    /// Widen the literal to `new_ty`, the equivalent of an `fpext` constant
    /// expression.
    pub fn widen_to(self, new_ty: FType) -> Self {
        debug_assert!(
            self.ty.widens_to(new_ty),
            "cannot widen a {} literal to {}",
            self.ty,
            new_ty
        );
        self.to_type(new_ty)
    }

    /// Returns the finite payload if there is one.
    pub fn finite(&self) -> Option<&BigDecimal> {
        match &self.value {
            FValue::Finite(value) => Some(value),
            _ => None,
        }
    }

    /// Nearest `f64` to this literal.
    pub fn to_f64(&self) -> f64 {
        match &self.value {
            FValue::Finite(value) => value.to_f64().unwrap_or(f64::NAN),
            FValue::Infinity { negative: false } => f64::INFINITY,
            FValue::Infinity { negative: true } => f64::NEG_INFINITY,
            FValue::NaN => f64::NAN,
        }
    }
}

impl std::fmt::Display for FConst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            FValue::Finite(value) => write!(f, "{} {}", self.ty, value),
            FValue::Infinity { negative } => {
                write!(f, "{} {}inf", self.ty, if *negative { "-" } else { "+" })
            }
            FValue::NaN => write!(f, "{} nan", self.ty),
        }
    }
}
