//! Explicit SIMD distance kernels using the `wide` crate.
//!
//! Each kernel processes 8 lanes per iteration and finishes the remainder
//! with a scalar loop. The `wide` crate picks AVX2/SSE, NEON or SIMD128 at
//! compile time and falls back to scalar code elsewhere.
//!
//! Callers are responsible for passing slices of equal length; the public
//! index APIs check dimensions before any kernel runs.

use wide::f32x8;

const LANES: usize = 8;

/// Computes the dot product of two vectors.
///
/// # Example
///
/// ```
/// use fastann_core::simd::dot_product;
///
/// let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
/// let b = vec![1.0; 9];
/// assert!((dot_product(&a, &b) - 45.0).abs() < 1e-5);
/// ```
#[inline]
#[must_use]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let simd_len = a.len() / LANES;
    let mut sum = f32x8::ZERO;

    for i in 0..simd_len {
        let offset = i * LANES;
        let va = f32x8::from(&a[offset..offset + LANES]);
        let vb = f32x8::from(&b[offset..offset + LANES]);
        sum = va.mul_add(vb, sum);
    }

    let mut result = sum.reduce_add();
    for i in simd_len * LANES..a.len() {
        result += a[i] * b[i];
    }
    result
}

/// Computes the squared L2 distance of two vectors.
#[inline]
#[must_use]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let simd_len = a.len() / LANES;
    let mut sum = f32x8::ZERO;

    for i in 0..simd_len {
        let offset = i * LANES;
        let va = f32x8::from(&a[offset..offset + LANES]);
        let vb = f32x8::from(&b[offset..offset + LANES]);
        let diff = va - vb;
        sum = diff.mul_add(diff, sum);
    }

    let mut result = sum.reduce_add();
    for i in simd_len * LANES..a.len() {
        let diff = a[i] - b[i];
        result += diff * diff;
    }
    result
}

/// Computes the L1 (Manhattan) distance of two vectors.
#[inline]
#[must_use]
pub fn manhattan(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let simd_len = a.len() / LANES;
    let mut sum = f32x8::ZERO;

    for i in 0..simd_len {
        let offset = i * LANES;
        let va = f32x8::from(&a[offset..offset + LANES]);
        let vb = f32x8::from(&b[offset..offset + LANES]);
        sum = sum + (va - vb).abs();
    }

    let mut result = sum.reduce_add();
    for i in simd_len * LANES..a.len() {
        result += (a[i] - b[i]).abs();
    }
    result
}

/// Computes `1 - cos(a, b)` in a single fused pass.
///
/// Returns `1.0` when either vector has zero norm, and never returns a
/// negative value (rounding can push `cos` slightly above 1).
#[inline]
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let simd_len = a.len() / LANES;
    let mut dot = f32x8::ZERO;
    let mut norm_a = f32x8::ZERO;
    let mut norm_b = f32x8::ZERO;

    for i in 0..simd_len {
        let offset = i * LANES;
        let va = f32x8::from(&a[offset..offset + LANES]);
        let vb = f32x8::from(&b[offset..offset + LANES]);
        dot = va.mul_add(vb, dot);
        norm_a = va.mul_add(va, norm_a);
        norm_b = vb.mul_add(vb, norm_b);
    }

    let mut dot = dot.reduce_add();
    let mut norm_a = norm_a.reduce_add();
    let mut norm_b = norm_b.reduce_add();
    for i in simd_len * LANES..a.len() {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 1.0;
    }

    (1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())).max(0.0)
}
