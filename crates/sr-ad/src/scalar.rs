//! [`Scalar`] trait: abstraction over the primal float and [`Dual`] that
//! lets the batched kernels and the interpreter be written once and reused
//! for both evaluation **and** forward-mode Jacobian computation.

use crate::dual::Dual;
use sr_core::Float;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A scalar type the evaluation engine can run on.
///
/// Implemented for `f64` and `f32` (plain evaluation) and [`Dual`]
/// (forward-mode AD). Kernels use only this surface, so registering a
/// dispatch table for a new scalar type is a matter of implementing this
/// trait.
pub trait Scalar:
    Copy
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Sum
    + PartialOrd
    + Sized
{
    /// Number of primal-sized lanes one value occupies (1 for floats,
    /// `1 + D` for a dual). The evaluator divides its row-block width by
    /// this so a block of duals fits the same cache budget as a block of
    /// floats.
    const LANES: usize;

    /// Wrap a primal constant (tangents zero for AD types).
    fn from_float(v: Float) -> Self;

    /// Extract the primal (function) value.
    fn value(&self) -> Float;

    /// Absolute value.
    fn abs(self) -> Self;

    /// Arc cosine.
    fn acos(self) -> Self;

    /// Arc sine.
    fn asin(self) -> Self;

    /// Arc tangent.
    fn atan(self) -> Self;

    /// Real cube root.
    fn cbrt(self) -> Self;

    /// Ceiling.
    fn ceil(self) -> Self;

    /// Cosine.
    fn cos(self) -> Self;

    /// Hyperbolic cosine.
    fn cosh(self) -> Self;

    /// Exponential.
    fn exp(self) -> Self;

    /// Floor.
    fn floor(self) -> Self;

    /// Natural logarithm.
    fn ln(self) -> Self;

    /// `ln(1 + x)`.
    fn ln_1p(self) -> Self;

    /// Power with an exponent of the same scalar type.
    fn powf(self, n: Self) -> Self;

    /// Sine.
    fn sin(self) -> Self;

    /// Hyperbolic sine.
    fn sinh(self) -> Self;

    /// Square root.
    fn sqrt(self) -> Self;

    /// Tangent.
    fn tan(self) -> Self;

    /// Hyperbolic tangent.
    fn tanh(self) -> Self;

    /// `x * x` (not `pow(x, 2)`).
    #[inline]
    fn square(self) -> Self {
        self * self
    }

    /// Reciprocal.
    #[inline]
    fn recip(self) -> Self {
        Self::from_float(1.0) / self
    }

    /// IEEE-style maximum (non-smooth; AD types pass the winner's tangent).
    fn max_s(self, other: Self) -> Self;

    /// IEEE-style minimum (non-smooth; AD types pass the winner's tangent).
    fn min_s(self, other: Self) -> Self;
}

macro_rules! impl_scalar_for_float {
    ($t:ty) => {
        impl Scalar for $t {
            const LANES: usize = 1;

            #[inline]
            #[allow(clippy::unnecessary_cast)]
            fn from_float(v: Float) -> Self {
                v as $t
            }

            #[inline]
            #[allow(clippy::unnecessary_cast)]
            fn value(&self) -> Float {
                *self as Float
            }

            #[inline]
            fn abs(self) -> Self {
                <$t>::abs(self)
            }

            #[inline]
            fn acos(self) -> Self {
                <$t>::acos(self)
            }

            #[inline]
            fn asin(self) -> Self {
                <$t>::asin(self)
            }

            #[inline]
            fn atan(self) -> Self {
                <$t>::atan(self)
            }

            #[inline]
            fn cbrt(self) -> Self {
                <$t>::cbrt(self)
            }

            #[inline]
            fn ceil(self) -> Self {
                <$t>::ceil(self)
            }

            #[inline]
            fn cos(self) -> Self {
                <$t>::cos(self)
            }

            #[inline]
            fn cosh(self) -> Self {
                <$t>::cosh(self)
            }

            #[inline]
            fn exp(self) -> Self {
                <$t>::exp(self)
            }

            #[inline]
            fn floor(self) -> Self {
                <$t>::floor(self)
            }

            #[inline]
            fn ln(self) -> Self {
                <$t>::ln(self)
            }

            #[inline]
            fn ln_1p(self) -> Self {
                <$t>::ln_1p(self)
            }

            #[inline]
            fn powf(self, n: Self) -> Self {
                <$t>::powf(self, n)
            }

            #[inline]
            fn sin(self) -> Self {
                <$t>::sin(self)
            }

            #[inline]
            fn sinh(self) -> Self {
                <$t>::sinh(self)
            }

            #[inline]
            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }

            #[inline]
            fn tan(self) -> Self {
                <$t>::tan(self)
            }

            #[inline]
            fn tanh(self) -> Self {
                <$t>::tanh(self)
            }

            #[inline]
            fn max_s(self, other: Self) -> Self {
                <$t>::max(self, other)
            }

            #[inline]
            fn min_s(self, other: Self) -> Self {
                <$t>::min(self, other)
            }
        }
    };
}

impl_scalar_for_float!(f64);
impl_scalar_for_float!(f32);

impl<const D: usize> Scalar for Dual<D> {
    const LANES: usize = 1 + D;

    #[inline]
    fn from_float(v: Float) -> Self {
        Dual::constant(v)
    }

    #[inline]
    fn value(&self) -> Float {
        self.val
    }

    #[inline]
    fn abs(self) -> Self {
        Dual::abs(self)
    }

    #[inline]
    fn acos(self) -> Self {
        Dual::acos(self)
    }

    #[inline]
    fn asin(self) -> Self {
        Dual::asin(self)
    }

    #[inline]
    fn atan(self) -> Self {
        Dual::atan(self)
    }

    #[inline]
    fn cbrt(self) -> Self {
        Dual::cbrt(self)
    }

    #[inline]
    fn ceil(self) -> Self {
        Dual::ceil(self)
    }

    #[inline]
    fn cos(self) -> Self {
        Dual::cos(self)
    }

    #[inline]
    fn cosh(self) -> Self {
        Dual::cosh(self)
    }

    #[inline]
    fn exp(self) -> Self {
        Dual::exp(self)
    }

    #[inline]
    fn floor(self) -> Self {
        Dual::floor(self)
    }

    #[inline]
    fn ln(self) -> Self {
        Dual::ln(self)
    }

    #[inline]
    fn ln_1p(self) -> Self {
        Dual::ln_1p(self)
    }

    #[inline]
    fn powf(self, n: Self) -> Self {
        Dual::powf(self, n)
    }

    #[inline]
    fn sin(self) -> Self {
        Dual::sin(self)
    }

    #[inline]
    fn sinh(self) -> Self {
        Dual::sinh(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        Dual::sqrt(self)
    }

    #[inline]
    fn tan(self) -> Self {
        Dual::tan(self)
    }

    #[inline]
    fn tanh(self) -> Self {
        Dual::tanh(self)
    }

    #[inline]
    fn square(self) -> Self {
        Dual::square(self)
    }

    #[inline]
    fn recip(self) -> Self {
        Dual::recip(self)
    }

    #[inline]
    fn max_s(self, other: Self) -> Self {
        Dual::max(self, other)
    }

    #[inline]
    fn min_s(self, other: Self) -> Self {
        Dual::min(self, other)
    }
}
