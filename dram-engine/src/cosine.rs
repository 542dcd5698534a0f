/// Compute the plain dot product of two vectors.
/// Returns 0.0 on dimension mismatch.
pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
	if a.len() != b.len() {
		return 0.0;
	}
	a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Dot product with a per-dimension weight.
/// Returns 0.0 if the three slices disagree in length.
pub fn weighted_dot_product(a: &[f64], b: &[f64], weights: &[f64]) -> f64 {
	if a.len() != b.len() || a.len() != weights.len() {
		return 0.0;
	}
	let mut sum = 0.0;
	for i in 0..a.len() {
		sum += a[i] * b[i] * weights[i];
	}
	sum
}

/// Compute the magnitude (L2 norm) of a vector.
pub fn compute_magnitude(v: &[f64]) -> f64 {
	v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Compute cosine similarity between two vectors.
/// Returns 0.0 for zero-magnitude vectors or dimension mismatches.
/// Result clamped to [-1.0, 1.0].
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}

	let denom = compute_magnitude(a) * compute_magnitude(b);
	if denom == 0.0 {
		return 0.0;
	}

	let result = dot_product(a, b) / denom;
	if !result.is_finite() {
		return 0.0;
	}
	result.clamp(-1.0, 1.0)
}
