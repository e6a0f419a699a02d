//! Elementwise transfer functions, vectorized and in-place.
//!
//! These are the standard mathematical definitions with no further
//! invariants; `softmax` is the only one with shape requirements.

/// Identity function. Present so callers can treat every transfer function
/// uniformly.
pub fn linear(_values: &mut [f32]) {}

/// Logistic sigmoid `1 / (1 + e^-x)`.
pub fn sigmoid(values: &mut [f32]) {
    for v in values.iter_mut() {
        *v = 1.0 / (1.0 + (-*v).exp());
    }
}

/// Hyperbolic tangent.
pub fn tanh(values: &mut [f32]) {
    for v in values.iter_mut() {
        *v = v.tanh();
    }
}

/// Rectified linear unit `max(x, 0)`.
pub fn relu(values: &mut [f32]) {
    for v in values.iter_mut() {
        *v = v.max(0.0);
    }
}

/// Exponential linear unit: `x` for `x >= 0`, `e^x - 1` otherwise.
pub fn elu(values: &mut [f32]) {
    for v in values.iter_mut() {
        if *v < 0.0 {
            *v = v.exp() - 1.0;
        }
    }
}

/// Row-wise softmax over `num_classes` columns, max-subtracted for
/// numerical stability.
///
/// # Panics
///
/// Panics if `num_classes` is 0 or does not divide the buffer length.
pub fn softmax(values: &mut [f32], num_classes: usize) {
    assert!(
        num_classes > 0 && values.len() % num_classes == 0,
        "softmax buffer length {} is not a multiple of {num_classes} classes",
        values.len()
    );
    for row in values.chunks_mut(num_classes) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut sum = 0.0f32;
        for v in row.iter_mut() {
            *v = (*v - max).exp();
            sum += *v;
        }
        for v in row.iter_mut() {
            *v /= sum;
        }
    }
}
