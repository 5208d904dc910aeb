/// Cosine similarity in `[-1, 1]`. Returns `0.0` when either side has zero norm, the
/// lengths differ, or a component is not finite.
///
/// Sums are accumulated in `f64`, so components near `f32::MAX` do not overflow.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), (&av, &bv)| {
            let (av, bv) = (f64::from(av), f64::from(bv));
            (dot + av * bv, na + av * av, nb + bv * bv)
        });

    let denom = norm_a_sq.sqrt() * norm_b_sq.sqrt();
    let score = dot / denom;
    if denom == 0.0 || !score.is_finite() {
        0.0
    } else {
        score.clamp(-1.0, 1.0) as f32
    }
}
