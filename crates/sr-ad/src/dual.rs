//! Forward-mode dual numbers with a fixed number of derivative lanes.
//!
//! A `Dual<D>` carries the primal value plus `D` tangents, so one pass
//! through an expression differentiates with respect to `D` seeds at once.
//! `D` trades per-sweep memory against the number of sweeps; 4 or 8 fills a
//! SIMD register with double precision.

use sr_core::Float;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A dual number with `D` derivative lanes for forward-mode AD.
///
/// `val` holds the primal value, `eps[i]` holds the tangent along seed `i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dual<const D: usize> {
    /// Primal (function) value.
    pub val: Float,
    /// Tangent lanes.
    pub eps: [Float; D],
}

/// Four derivative lanes per sweep.
pub type Dual4 = Dual<4>;
/// Eight derivative lanes per sweep.
pub type Dual8 = Dual<8>;

impl<const D: usize> Dual<D> {
    /// Create a constant (all tangents zero).
    #[inline]
    pub fn constant(val: Float) -> Self {
        Self { val, eps: [0.0; D] }
    }

    /// Create an independent variable seeded along `lane`.
    #[inline]
    pub fn var(val: Float, lane: usize) -> Self {
        let mut eps = [0.0; D];
        eps[lane] = 1.0;
        Self { val, eps }
    }

    /// Create a dual with explicit tangents.
    #[inline]
    pub fn new(val: Float, eps: [Float; D]) -> Self {
        Self { val, eps }
    }

    /// Chain rule: map the primal through `f` and scale every tangent by
    /// `df`, the derivative of `f` at the primal.
    #[inline]
    fn lift(self, f: Float, df: Float) -> Self {
        Self { val: f, eps: self.eps.map(|e| e * df) }
    }

    /// Natural logarithm.
    #[inline]
    pub fn ln(self) -> Self {
        self.lift(self.val.ln(), 1.0 / self.val)
    }

    /// `ln(1 + x)`.
    #[inline]
    pub fn ln_1p(self) -> Self {
        self.lift(self.val.ln_1p(), 1.0 / (1.0 + self.val))
    }

    /// Exponential.
    #[inline]
    pub fn exp(self) -> Self {
        let e = self.val.exp();
        self.lift(e, e)
    }

    /// Square root.
    #[inline]
    pub fn sqrt(self) -> Self {
        let s = self.val.sqrt();
        self.lift(s, 0.5 / s)
    }

    /// Real cube root.
    #[inline]
    pub fn cbrt(self) -> Self {
        let c = self.val.cbrt();
        self.lift(c, 1.0 / (3.0 * c * c))
    }

    /// Absolute value; the tangent follows the sign of the primal.
    #[inline]
    pub fn abs(self) -> Self {
        self.lift(self.val.abs(), self.val.signum())
    }

    /// Sine.
    #[inline]
    pub fn sin(self) -> Self {
        self.lift(self.val.sin(), self.val.cos())
    }

    /// Cosine.
    #[inline]
    pub fn cos(self) -> Self {
        self.lift(self.val.cos(), -self.val.sin())
    }

    /// Tangent.
    #[inline]
    pub fn tan(self) -> Self {
        let c = self.val.cos();
        self.lift(self.val.tan(), 1.0 / (c * c))
    }

    /// Arc sine.
    #[inline]
    pub fn asin(self) -> Self {
        self.lift(self.val.asin(), 1.0 / (1.0 - self.val * self.val).sqrt())
    }

    /// Arc cosine.
    #[inline]
    pub fn acos(self) -> Self {
        self.lift(self.val.acos(), -1.0 / (1.0 - self.val * self.val).sqrt())
    }

    /// Arc tangent.
    #[inline]
    pub fn atan(self) -> Self {
        self.lift(self.val.atan(), 1.0 / (1.0 + self.val * self.val))
    }

    /// Hyperbolic sine.
    #[inline]
    pub fn sinh(self) -> Self {
        self.lift(self.val.sinh(), self.val.cosh())
    }

    /// Hyperbolic cosine.
    #[inline]
    pub fn cosh(self) -> Self {
        self.lift(self.val.cosh(), self.val.sinh())
    }

    /// Hyperbolic tangent.
    #[inline]
    pub fn tanh(self) -> Self {
        let t = self.val.tanh();
        self.lift(t, 1.0 - t * t)
    }

    /// Floor; tangents vanish.
    #[inline]
    pub fn floor(self) -> Self {
        Self::constant(self.val.floor())
    }

    /// Ceiling; tangents vanish.
    #[inline]
    pub fn ceil(self) -> Self {
        Self::constant(self.val.ceil())
    }

    /// `x * x`, with the product-rule tangent `2 x x'`.
    #[inline]
    pub fn square(self) -> Self {
        self.lift(self.val * self.val, 2.0 * self.val)
    }

    /// Reciprocal.
    #[inline]
    pub fn recip(self) -> Self {
        self.lift(1.0 / self.val, -1.0 / (self.val * self.val))
    }

    /// General power `a^b` with dual exponent:
    /// `d(a^b) = a^b * (b' ln a + b a'/a)`.
    #[inline]
    pub fn powf(self, rhs: Self) -> Self {
        let v = self.val.powf(rhs.val);
        let da = rhs.val * self.val.powf(rhs.val - 1.0);
        let db = v * self.val.ln();
        let mut eps = [0.0; D];
        for i in 0..D {
            eps[i] = da * self.eps[i] + db * rhs.eps[i];
        }
        Self { val: v, eps }
    }

    /// Maximum of two duals; the tangent follows the larger primal.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        if self.val >= other.val { self } else { other }
    }

    /// Minimum of two duals; the tangent follows the smaller primal.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        if self.val <= other.val { self } else { other }
    }
}

// --- Arithmetic: Dual op Dual ---

impl<const D: usize> Add for Dual<D> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut eps = self.eps;
        for i in 0..D {
            eps[i] += rhs.eps[i];
        }
        Self { val: self.val + rhs.val, eps }
    }
}

impl<const D: usize> Sub for Dual<D> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let mut eps = self.eps;
        for i in 0..D {
            eps[i] -= rhs.eps[i];
        }
        Self { val: self.val - rhs.val, eps }
    }
}

impl<const D: usize> Mul for Dual<D> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let mut eps = [0.0; D];
        for i in 0..D {
            eps[i] = self.eps[i] * rhs.val + self.val * rhs.eps[i];
        }
        Self { val: self.val * rhs.val, eps }
    }
}

impl<const D: usize> Div for Dual<D> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        let inv = 1.0 / (rhs.val * rhs.val);
        let mut eps = [0.0; D];
        for i in 0..D {
            eps[i] = (self.eps[i] * rhs.val - self.val * rhs.eps[i]) * inv;
        }
        Self { val: self.val / rhs.val, eps }
    }
}

impl<const D: usize> Neg for Dual<D> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self { val: -self.val, eps: self.eps.map(|e| -e) }
    }
}

// --- Sum / From / Default ---

impl<const D: usize> Sum for Dual<D> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::constant(0.0), |acc, x| acc + x)
    }
}

impl<const D: usize> From<Float> for Dual<D> {
    fn from(val: Float) -> Self {
        Self::constant(val)
    }
}

impl<const D: usize> Default for Dual<D> {
    fn default() -> Self {
        Self::constant(0.0)
    }
}

// --- PartialOrd (by primal value) ---

impl<const D: usize> PartialOrd for Dual<D> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.val.partial_cmp(&other.val)
    }
}
