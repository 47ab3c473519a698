//! Batched elementwise kernels.
//!
//! Every kernel has the uniform signature the dispatch table expects: it
//! receives the working buffer, the postorder node slice, the parent index,
//! and the current row-block width. Operand columns are located through the
//! sibling-stride recurrence; kernels never allocate and never touch cells
//! beyond the block width.
//!
//! Argument order follows the postorder encoding: the first argument of an
//! operator is the leftmost child in the array, which is the *last* index
//! produced by the stride walk. N-ary kinds therefore fold their tail
//! arguments into the parent column first (in fused chunks of up to five
//! column operands per pass) and combine the head argument last, preserving
//! `a - (b + c + ...)` and `a / (b * c * ...)`.

use crate::buffer::EvalBuffer;
use sr_ad::Scalar;
use sr_core::Node;

#[inline(always)]
fn unary_kernel<T: Scalar>(
    buf: &mut EvalBuffer<T>,
    parent: usize,
    rows: usize,
    f: impl Fn(T) -> T,
) {
    let width = buf.width();
    let (children, dst) = buf.split_at_parent(parent);
    let child = parent - 1;
    let src = &children[child * width..child * width + rows];
    for j in 0..rows {
        dst[j] = f(src[j]);
    }
}

#[inline(always)]
fn binary_kernel<T: Scalar>(
    buf: &mut EvalBuffer<T>,
    nodes: &[Node],
    parent: usize,
    rows: usize,
    f: impl Fn(T, T) -> T,
) {
    let width = buf.width();
    let (children, dst) = buf.split_at_parent(parent);
    let b_idx = parent - 1;
    let a_idx = b_idx - (nodes[b_idx].length as usize + 1);
    let a = &children[a_idx * width..a_idx * width + rows];
    let b = &children[b_idx * width..b_idx * width + rows];
    for j in 0..rows {
        dst[j] = f(a[j], b[j]);
    }
}

/// The n-ary fold shared by Add/Sub/Mul/Div/Fmax/Fmin.
///
/// `unary` handles arity 1 (identity, negation, or reciprocal); `combine`
/// reduces the tail arguments; `apply` joins the head argument with the
/// reduced tail.
#[inline(always)]
fn nary_kernel<T: Scalar>(
    buf: &mut EvalBuffer<T>,
    nodes: &[Node],
    parent: usize,
    rows: usize,
    unary: impl Fn(T) -> T,
    combine: impl Fn(T, T) -> T,
    apply: impl Fn(T, T) -> T,
) {
    let width = buf.width();
    let (children, dst) = buf.split_at_parent(parent);
    let col = |i: usize| &children[i * width..i * width + rows];
    let next = |i: usize| i - (nodes[i].length as usize + 1);

    let arity = nodes[parent].arity as usize;
    let mut child = parent - 1;
    if arity == 1 {
        let a = col(child);
        for j in 0..rows {
            dst[j] = unary(a[j]);
        }
        return;
    }

    // Reduce the tail arguments into the parent column in fused chunks.
    let mut remaining = arity - 1;
    let mut seeded = false;
    while remaining > 0 {
        let k = remaining.min(if seeded { 4 } else { 5 });
        let c0 = child;
        let c1 = if k >= 2 { next(c0) } else { c0 };
        let c2 = if k >= 3 { next(c1) } else { c1 };
        let c3 = if k >= 4 { next(c2) } else { c2 };
        let c4 = if k >= 5 { next(c3) } else { c3 };
        let (x0, x1, x2, x3, x4) = (col(c0), col(c1), col(c2), col(c3), col(c4));
        if seeded {
            match k {
                1 => {
                    for j in 0..rows {
                        dst[j] = combine(dst[j], x0[j]);
                    }
                }
                2 => {
                    for j in 0..rows {
                        dst[j] = combine(dst[j], combine(x0[j], x1[j]));
                    }
                }
                3 => {
                    for j in 0..rows {
                        dst[j] = combine(dst[j], combine(combine(x0[j], x1[j]), x2[j]));
                    }
                }
                _ => {
                    for j in 0..rows {
                        dst[j] = combine(
                            dst[j],
                            combine(combine(x0[j], x1[j]), combine(x2[j], x3[j])),
                        );
                    }
                }
            }
        } else {
            match k {
                1 => dst[..rows].copy_from_slice(x0),
                2 => {
                    for j in 0..rows {
                        dst[j] = combine(x0[j], x1[j]);
                    }
                }
                3 => {
                    for j in 0..rows {
                        dst[j] = combine(combine(x0[j], x1[j]), x2[j]);
                    }
                }
                4 => {
                    for j in 0..rows {
                        dst[j] = combine(combine(x0[j], x1[j]), combine(x2[j], x3[j]));
                    }
                }
                _ => {
                    for j in 0..rows {
                        dst[j] = combine(
                            combine(combine(x0[j], x1[j]), combine(x2[j], x3[j])),
                            x4[j],
                        );
                    }
                }
            }
            seeded = true;
        }
        remaining -= k;
        let last = match k {
            1 => c0,
            2 => c1,
            3 => c2,
            4 => c3,
            _ => c4,
        };
        child = next(last);
    }

    // `child` now points at the head (leftmost) argument.
    let a = col(child);
    for j in 0..rows {
        dst[j] = apply(a[j], dst[j]);
    }
}

/// N-ary addition; arity 1 is the identity.
pub fn add<T: Scalar>(buf: &mut EvalBuffer<T>, nodes: &[Node], parent: usize, rows: usize) {
    nary_kernel(buf, nodes, parent, rows, |x| x, |a, b| a + b, |a, t| a + t);
}

/// N-ary subtraction `a - (b + c + ...)`; arity 1 negates.
pub fn sub<T: Scalar>(buf: &mut EvalBuffer<T>, nodes: &[Node], parent: usize, rows: usize) {
    nary_kernel(buf, nodes, parent, rows, |x| -x, |a, b| a + b, |a, t| a - t);
}

/// N-ary multiplication; arity 1 is the identity.
pub fn mul<T: Scalar>(buf: &mut EvalBuffer<T>, nodes: &[Node], parent: usize, rows: usize) {
    nary_kernel(buf, nodes, parent, rows, |x| x, |a, b| a * b, |a, t| a * t);
}

/// N-ary division `a / (b * c * ...)`; arity 1 takes the reciprocal.
pub fn div<T: Scalar>(buf: &mut EvalBuffer<T>, nodes: &[Node], parent: usize, rows: usize) {
    nary_kernel(buf, nodes, parent, rows, |x| x.recip(), |a, b| a * b, |a, t| a / t);
}

/// Componentwise maximum over all arguments.
pub fn fmax<T: Scalar>(buf: &mut EvalBuffer<T>, nodes: &[Node], parent: usize, rows: usize) {
    nary_kernel(buf, nodes, parent, rows, |x| x, T::max_s, T::max_s);
}

/// Componentwise minimum over all arguments.
pub fn fmin<T: Scalar>(buf: &mut EvalBuffer<T>, nodes: &[Node], parent: usize, rows: usize) {
    nary_kernel(buf, nodes, parent, rows, |x| x, T::min_s, T::min_s);
}

/// Power `a^b`.
pub fn pow<T: Scalar>(buf: &mut EvalBuffer<T>, nodes: &[Node], parent: usize, rows: usize) {
    binary_kernel(buf, nodes, parent, rows, |a, b| a.powf(b));
}

/// Analytic quotient `a / sqrt(1 + b^2)`.
pub fn aq<T: Scalar>(buf: &mut EvalBuffer<T>, nodes: &[Node], parent: usize, rows: usize) {
    binary_kernel(buf, nodes, parent, rows, |a, b| {
        a / (T::from_float(1.0) + b.square()).sqrt()
    });
}

/// Absolute value.
pub fn abs<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::abs);
}

/// Arc cosine.
pub fn acos<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::acos);
}

/// Arc sine.
pub fn asin<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::asin);
}

/// Arc tangent.
pub fn atan<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::atan);
}

/// Real cube root.
pub fn cbrt<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::cbrt);
}

/// Ceiling.
pub fn ceil<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::ceil);
}

/// Cosine.
pub fn cos<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::cos);
}

/// Hyperbolic cosine.
pub fn cosh<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::cosh);
}

/// Exponential.
pub fn exp<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::exp);
}

/// Floor.
pub fn floor<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::floor);
}

/// Natural logarithm.
pub fn log<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::ln);
}

/// `ln(|x|)`.
pub fn logabs<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, |x| x.abs().ln());
}

/// `ln(1 + x)`.
pub fn log1p<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::ln_1p);
}

/// Sine.
pub fn sin<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::sin);
}

/// Hyperbolic sine.
pub fn sinh<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::sinh);
}

/// Square root.
pub fn sqrt<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::sqrt);
}

/// `sqrt(|x|)`.
pub fn sqrtabs<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, |x| x.abs().sqrt());
}

/// Tangent.
pub fn tan<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::tan);
}

/// Hyperbolic tangent.
pub fn tanh<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::tanh);
}

/// `x * x`.
pub fn square<T: Scalar>(buf: &mut EvalBuffer<T>, _nodes: &[Node], parent: usize, rows: usize) {
    unary_kernel(buf, parent, rows, T::square);
}
