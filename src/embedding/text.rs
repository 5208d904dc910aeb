//! Text preparation and vector post-processing.

/// Cuts `text` to at most `max_chars` characters, backing up to the last whitespace so no
/// word is split. A single word longer than the limit is hard-cut.
pub fn truncate_at_word_boundary(text: &str, max_chars: usize) -> &str {
    let Some((cut, next)) = text.char_indices().nth(max_chars) else {
        return text;
    };

    let head = &text[..cut];
    if next.is_whitespace() {
        return head.trim_end();
    }

    match head.rfind(char::is_whitespace) {
        Some(ws) if !head[..ws].trim_end().is_empty() => head[..ws].trim_end(),
        _ => head,
    }
}

/// Trims and truncates a text before fingerprinting and submission.
pub fn prepare_text(text: &str, max_chars: usize) -> String {
    truncate_at_word_boundary(text.trim(), max_chars).to_string()
}

#[inline]
pub fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scales `vector` to unit length in place. A zero vector is left unchanged.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = l2_norm(vector);
    if norm > f32::EPSILON {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}
