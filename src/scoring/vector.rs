/// Cosine similarity in [-1, 1]; zero-length or mismatched vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0)
}

/// Scale to unit length in place. The zero vector is left untouched.
pub fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Mean of unit-normalised vectors, re-normalised. `None` when empty or ragged.
pub fn centroid(vectors: &[Vec<f32>]) -> Option<Vec<f32>> {
    let dims = vectors.first()?.len();
    if dims == 0 || vectors.iter().any(|v| v.len() != dims) {
        return None;
    }

    let mut sum = vec![0.0_f32; dims];
    for vector in vectors {
        let mut unit = vector.clone();
        normalize(&mut unit);
        for (acc, x) in sum.iter_mut().zip(&unit) {
            *acc += x;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let count = vectors.len() as f32;
    for x in &mut sum {
        *x /= count;
    }
    normalize(&mut sum);
    Some(sum)
}
